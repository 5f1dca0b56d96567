pub mod error;
pub mod fcs_file;
pub mod options;
pub mod parser;
pub mod processing;
pub mod types;
pub mod utils;

pub use error::{FcsError, Result};
pub use fcs_file::FcsFile;
pub use options::{ChannelNaming, ReaderOptions};
pub use types::{Dataset, EventColumns, Keywords, Parameter, Spillover};

use polars::prelude::DataFrame;
use std::path::Path;

/// Reads dataset `sample_number` of the FCS file at `path` into a DataFrame.
///
/// `sample_number` is the zero-based position of the dataset along the
/// `$NEXTDATA` chain. Columns are named by `$PnN` and cast to `Int64`.
pub fn convert_df(path: impl AsRef<Path>, sample_number: usize) -> Result<DataFrame> {
    let file = FcsFile::open(path)?;
    let options = ReaderOptions::builder().cast_to_int(true).build();
    file.to_dataframe(sample_number, &options)
}

#[cfg(feature = "python")]
mod python {
    use super::*;
    use pyo3::{
        Bound, PyResult, pyfunction, pymodule,
        types::{PyModule, PyModuleMethods},
        wrap_pyfunction,
    };
    use pyo3_polars::PyDataFrame;
    use std::path::PathBuf;

    /// Reads one dataset of an FCS file into a Polars DataFrame.
    ///
    /// Args:
    ///     fcs (str): Path to the .fcs file.
    ///     sample_number (int): Zero-based dataset index in multi-dataset files.
    ///
    /// Returns:
    ///     polars.DataFrame: One integer column per parameter, named by `$PnN`.
    ///
    /// Raises:
    ///     FileNotFoundError: If the file cannot be opened.
    ///     ValueError: If the file is not a readable FCS file or the dataset does not exist.
    #[pyfunction]
    #[pyo3(signature = (fcs, sample_number = 0))]
    fn convert_df(fcs: PathBuf, sample_number: usize) -> PyResult<PyDataFrame> {
        let df = super::convert_df(&fcs, sample_number)?;
        Ok(PyDataFrame(df))
    }

    /// Returns the HEADER offsets, layout, parameters and keywords of one
    /// dataset as a JSON string.
    #[pyfunction]
    #[pyo3(signature = (fcs, sample_number = 0))]
    fn read_metadata(fcs: PathBuf, sample_number: usize) -> PyResult<String> {
        let file = FcsFile::open(&fcs)?;
        let metadata = file.dataset(sample_number)?.metadata();
        serde_json::to_string(&metadata)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }

    /// The name of this function must match the `lib.name` setting in the
    /// `Cargo.toml`, else Python will not be able to import the module.
    #[pymodule]
    fn fcsdf(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(convert_df, m)?)?;
        m.add_function(wrap_pyfunction!(read_metadata, m)?)?;
        Ok(())
    }
}
