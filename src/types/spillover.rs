use crate::error::{FcsError, Result};
use crate::types::keywords::Keywords;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Keywords that may carry a spillover matrix, in lookup order.
pub const SPILLOVER_KEYWORDS: [&str; 3] = ["$SPILLOVER", "SPILL", "$COMP"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spillover {
    pub parameters: Vec<String>,
    /// Row `i` holds the fraction of parameter `i`'s signal seen in each column parameter.
    pub matrix: Array2<f64>,
}

impl Spillover {
    /// Parse `n,name_1,...,name_n,s_11,...,s_nn`.
    pub fn parse(key: &str, value: &str) -> Result<Self> {
        let invalid = || FcsError::invalid_keyword(key, value);
        let mut fields = value.split(',').map(str::trim);

        let n: usize = fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(invalid)?;
        if n == 0 {
            return Err(invalid());
        }

        let parameters: Vec<String> = fields.by_ref().take(n).map(str::to_string).collect();
        let values: Vec<f64> = fields
            .map(|f| f.parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| invalid())?;
        if parameters.len() != n || values.len() != n * n {
            return Err(invalid());
        }

        let matrix = Array2::from_shape_vec((n, n), values).map_err(|_| invalid())?;
        Ok(Self { parameters, matrix })
    }

    /// First spillover keyword found in `keywords`, if any.
    pub fn from_keywords(keywords: &Keywords) -> Result<Option<Self>> {
        for key in SPILLOVER_KEYWORDS {
            if let Some(value) = keywords.get(key) {
                return Self::parse(key, value).map(Some);
            }
        }
        Ok(None)
    }
}
