use polars::prelude::PolarsError;
use thiserror::Error;

pub type Result<T, E = FcsError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum FcsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid HEADER segment: {0}")]
    InvalidHeader(String),

    #[error("invalid TEXT segment: {0}")]
    InvalidText(String),

    #[error("required keyword {0} is missing")]
    MissingKeyword(String),

    #[error("keyword {key} has invalid value {value:?}")]
    InvalidKeyword { key: String, value: String },

    #[error("invalid DATA segment: {0}")]
    InvalidData(String),

    #[error("unsupported FCS feature: {0}")]
    Unsupported(String),

    #[error("{segment} segment {start}..={end} lies outside the file ({file_len} bytes)")]
    SegmentOutOfBounds {
        segment: &'static str,
        start: u64,
        end: u64,
        file_len: u64,
    },

    #[error("DATA segment holds {available} bytes but {expected} are needed")]
    DataSegmentTooShort { expected: u64, available: u64 },

    #[error("dataset {requested} requested but the file contains {available}")]
    DatasetNotFound { requested: usize, available: usize },

    #[error("spillover matrix is singular")]
    SingularSpillover,

    #[error("spillover refers to unknown parameter {0:?}")]
    UnknownParameter(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl FcsError {
    pub(crate) fn invalid_keyword(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidKeyword {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[cfg(feature = "python")]
impl From<FcsError> for pyo3::PyErr {
    fn from(err: FcsError) -> pyo3::PyErr {
        match err {
            FcsError::Io(e) => pyo3::exceptions::PyFileNotFoundError::new_err(e.to_string()),
            other => pyo3::exceptions::PyValueError::new_err(other.to_string()),
        }
    }
}
