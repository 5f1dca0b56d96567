use crate::types::events::{ColumnData, EventColumns};
use crate::types::parameter::{Amplification, Parameter};
use log::warn;

/// Converts channel values to linear scale values.
///
/// Log-amplified integer parameters map `v` to `offset * 10^(decades * v / range)`.
/// Linear parameters with a `$PnG` gain are divided by it. Parameters needing
/// neither are returned unchanged.
pub fn scale(events: &EventColumns, parameters: &[Parameter]) -> EventColumns {
    let columns = events
        .columns
        .iter()
        .zip(parameters)
        .map(|(column, parameter)| scale_column(column, parameter))
        .collect();
    EventColumns::new(events.names.clone(), columns)
}

fn scale_column(column: &ColumnData, parameter: &Parameter) -> ColumnData {
    let is_integer = matches!(column, ColumnData::UInt32(_) | ColumnData::UInt64(_));
    match parameter.amplification {
        Amplification::Logarithmic { decades, offset } if is_integer && parameter.range > 0.0 => {
            let range = parameter.range;
            ColumnData::Float64(
                column
                    .to_f64()
                    .into_iter()
                    .map(|v| offset * 10f64.powf(decades * v / range))
                    .collect(),
            )
        }
        Amplification::Logarithmic { .. } if !is_integer => {
            warn!(
                "ignoring log amplification of floating point parameter {}",
                parameter.short_name
            );
            apply_gain(column, parameter)
        }
        _ => apply_gain(column, parameter),
    }
}

fn apply_gain(column: &ColumnData, parameter: &Parameter) -> ColumnData {
    match parameter.gain {
        Some(gain) if gain != 0.0 && gain != 1.0 => {
            ColumnData::Float64(column.to_f64().into_iter().map(|v| v / gain).collect())
        }
        _ => column.clone(),
    }
}
