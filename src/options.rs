//! Reader configuration

use bon::Builder;
use serde::{Deserialize, Serialize};

/// Which parameter keyword names the output columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelNaming {
    /// `$PnN`
    #[default]
    Short,
    /// `$PnS`, falling back to `$PnN` when absent
    Long,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct ReaderOptions {
    #[builder(default)]
    pub naming: ChannelNaming,
    /// Convert channel values to linear scale values using `$PnE` and `$PnG`
    #[builder(default)]
    pub scale: bool,
    /// Apply the dataset's spillover matrix, if it has one
    #[builder(default)]
    pub compensate: bool,
    /// Cast every column to `Int64`
    #[builder(default)]
    pub cast_to_int: bool,
    /// Treat tolerated inconsistencies as errors
    #[builder(default)]
    pub strict: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ReaderOptions {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
