use crate::types::events::{ColumnData, EventColumns};
use crate::utils::misc::dedupe_names;
use polars::prelude::*;

/// Create a DataFrame with one column per parameter, named by `names`.
///
/// With `cast_to_int` every column is cast to `Int64`, dropping fractional parts.
pub fn to_dataframe(
    events: &EventColumns,
    names: &[String],
    cast_to_int: bool,
) -> Result<DataFrame, PolarsError> {
    let names = dedupe_names(names.iter().cloned());

    let columns: Vec<Column> = events
        .columns
        .iter()
        .zip(&names)
        .map(|(data, name)| to_series(name, data).into())
        .collect();
    let df = DataFrame::new(columns)?;

    if !cast_to_int {
        return Ok(df);
    }
    df.lazy()
        .select([all().cast(DataType::Int64)])
        .collect()
}

fn to_series(name: &str, data: &ColumnData) -> Series {
    match data {
        ColumnData::UInt32(values) => Series::new(name.into(), values),
        ColumnData::UInt64(values) => Series::new(name.into(), values),
        ColumnData::Float32(values) => Series::new(name.into(), values),
        ColumnData::Float64(values) => Series::new(name.into(), values),
    }
}
