//! Per-parameter (channel) description assembled from `$Pn*` keywords

use crate::error::{FcsError, Result};
use crate::types::keywords::{Keywords, parameter_key};
use crate::types::layout::DataType;
use bon::Builder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterWidth {
    Bits(u32),
    /// `$PnB = *`, only valid for delimited ASCII data
    Delimited,
}

impl ParameterWidth {
    /// Bytes one value occupies in the DATA segment. ASCII widths count characters.
    pub fn field_bytes(&self, data_type: DataType) -> Option<usize> {
        match (self, data_type) {
            (Self::Bits(chars), DataType::Ascii) => Some(*chars as usize),
            (Self::Bits(bits), _) => Some(*bits as usize / 8),
            (Self::Delimited, _) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Amplification {
    Linear,
    Logarithmic { decades: f64, offset: f64 },
}

impl Amplification {
    /// Parse `$PnE`, written as `f1,f2`.
    pub fn from_keyword(key: &str, value: &str) -> Result<Self> {
        let mut parts = value.split(',').map(|p| p.trim().parse::<f64>());
        let (Some(Ok(decades)), Some(Ok(offset)), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(FcsError::invalid_keyword(key, value));
        };

        if decades <= 0.0 {
            return Ok(Self::Linear);
        }
        // `n,0` is invalid but widely written; it means an offset of 1
        let offset = if offset == 0.0 { 1.0 } else { offset };
        Ok(Self::Logarithmic { decades, offset })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct Parameter {
    /// 1-based parameter number `n`
    pub index: usize,
    #[builder(into)]
    pub short_name: String,
    #[builder(into)]
    pub long_name: Option<String>,
    pub width: ParameterWidth,
    pub range: f64,
    #[builder(default = Amplification::Linear)]
    pub amplification: Amplification,
    pub gain: Option<f64>,
    #[builder(into)]
    pub detector_type: Option<String>,
    pub voltage: Option<f64>,
}

impl Parameter {
    pub fn from_keywords(keywords: &Keywords, index: usize) -> Result<Self> {
        let required = |suffix| required_keyword(keywords, index, suffix);
        let optional_f64 = |suffix| keywords.parse::<f64>(&parameter_key(index, suffix));

        let short_name = required("N")?.trim().to_string();

        let raw_width = required("B")?;
        let width = match raw_width.trim() {
            "*" => ParameterWidth::Delimited,
            bits => bits
                .parse::<u32>()
                .map(ParameterWidth::Bits)
                .map_err(|_| FcsError::invalid_keyword(parameter_key(index, "B"), raw_width))?,
        };

        let raw_range = required("R")?;
        let range = raw_range
            .trim()
            .parse::<f64>()
            .map_err(|_| FcsError::invalid_keyword(parameter_key(index, "R"), raw_range))?;

        let amplification = match keywords.parameter(index, "E") {
            Some(value) => Amplification::from_keyword(&parameter_key(index, "E"), value)?,
            None => Amplification::Linear,
        };

        let long_name = keywords
            .parameter(index, "S")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Parameter::builder()
            .index(index)
            .short_name(short_name)
            .maybe_long_name(long_name)
            .width(width)
            .range(range)
            .amplification(amplification)
            .maybe_gain(optional_f64("G")?)
            .maybe_detector_type(keywords.parameter(index, "T").map(str::to_string))
            .maybe_voltage(optional_f64("V")?)
            .build())
    }

    /// Name used for output columns: `$PnS` when `long` is set and present, else `$PnN`.
    pub fn display_name(&self, long: bool) -> &str {
        match (&self.long_name, long) {
            (Some(name), true) => name,
            _ => &self.short_name,
        }
    }

    /// Mask applied to raw integer values. Only the lowest
    /// `ceil(log2($PnR))` bits carry data when `$PnR` is below `2^bits`.
    pub fn bit_mask(&self) -> u64 {
        let bits = match self.width {
            ParameterWidth::Bits(bits) => bits.min(64),
            ParameterWidth::Delimited => 64,
        };
        let full = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
        if !(self.range.is_finite() && self.range >= 1.0) {
            return full;
        }
        let range = self.range.ceil() as u64;
        match range.checked_next_power_of_two() {
            Some(p) if p - 1 < full => p - 1,
            _ => full,
        }
    }
}

fn required_keyword<'k>(keywords: &'k Keywords, index: usize, suffix: &str) -> Result<&'k str> {
    keywords
        .parameter(index, suffix)
        .ok_or_else(|| FcsError::MissingKeyword(parameter_key(index, suffix)))
}
