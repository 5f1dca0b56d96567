//! DATA segment layout described by `$DATATYPE`, `$BYTEORD`, `$MODE`, `$TOT` and `$PAR`

use crate::error::{FcsError, Result};
use bon::Builder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// `I`: unsigned integers, `$PnB` bits each
    Integer,
    /// `F`: IEEE 754 single precision
    Float,
    /// `D`: IEEE 754 double precision
    Double,
    /// `A`: ASCII encoded numbers
    Ascii,
}

impl DataType {
    pub fn from_keyword(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "I" => Ok(Self::Integer),
            "F" => Ok(Self::Float),
            "D" => Ok(Self::Double),
            "A" => Ok(Self::Ascii),
            _ => Err(FcsError::invalid_keyword("$DATATYPE", value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
    /// Explicit permutation: output byte `i` (least significant first) is read
    /// from input byte `order[i]`.
    Permuted(Vec<usize>),
}

impl ByteOrder {
    /// Parse `$BYTEORD`, e.g. `1,2,3,4` or `4,3,2,1`.
    pub fn from_keyword(value: &str) -> Result<Self> {
        let positions: Vec<usize> = value
            .split(',')
            .map(|p| p.trim().parse::<usize>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| FcsError::invalid_keyword("$BYTEORD", value))?;

        let n = positions.len();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        if n == 0 || sorted != (1..=n).collect::<Vec<_>>() {
            return Err(FcsError::invalid_keyword("$BYTEORD", value));
        }

        if positions.iter().copied().eq(1..=n) {
            return Ok(Self::LittleEndian);
        }
        if positions.iter().copied().eq((1..=n).rev()) {
            return Ok(Self::BigEndian);
        }

        // positions[k] is the significance (1 = least) of the k-th stored byte
        let mut order = vec![0; n];
        for (stored, &significance) in positions.iter().enumerate() {
            order[significance - 1] = stored;
        }
        Ok(Self::Permuted(order))
    }

    /// Reorder `bytes` into little-endian order in place.
    pub fn to_little_endian(&self, bytes: &mut [u8]) -> Result<()> {
        match self {
            Self::LittleEndian => Ok(()),
            Self::BigEndian => {
                bytes.reverse();
                Ok(())
            }
            Self::Permuted(order) => {
                if order.len() != bytes.len() {
                    return Err(FcsError::Unsupported(format!(
                        "byte order permutation of {} bytes applied to {}-byte values",
                        order.len(),
                        bytes.len()
                    )));
                }
                let mut buf = [0u8; 8];
                for (i, &src) in order.iter().enumerate() {
                    buf[i] = bytes[src];
                }
                bytes.copy_from_slice(&buf[..bytes.len()]);
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataMode {
    List,
    Correlated,
    Uncorrelated,
}

impl DataMode {
    pub fn from_keyword(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(Self::List),
            "C" => Ok(Self::Correlated),
            "U" => Ok(Self::Uncorrelated),
            _ => Err(FcsError::invalid_keyword("$MODE", value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct DataLayout {
    pub data_type: DataType,
    pub byte_order: ByteOrder,
    pub mode: DataMode,
    pub events: usize,
    pub parameter_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_order_variants() -> Result<()> {
        assert_eq!(ByteOrder::from_keyword("1,2,3,4")?, ByteOrder::LittleEndian);
        assert_eq!(ByteOrder::from_keyword("1,2")?, ByteOrder::LittleEndian);
        assert_eq!(ByteOrder::from_keyword("4,3,2,1")?, ByteOrder::BigEndian);
        assert_eq!(
            ByteOrder::from_keyword("3,4,1,2")?,
            ByteOrder::Permuted(vec![2, 3, 0, 1])
        );
        assert!(ByteOrder::from_keyword("1,1,2,3").is_err());
        assert!(ByteOrder::from_keyword("").is_err());
        Ok(())
    }

    #[test]
    fn permuted_bytes_become_little_endian() -> Result<()> {
        let order = ByteOrder::from_keyword("3,4,1,2")?;
        let value: u32 = 0x0A0B_0C0D;
        let le = value.to_le_bytes();
        // stored byte k holds significance positions[k]
        let mut stored = [le[2], le[3], le[0], le[1]];
        order.to_little_endian(&mut stored)?;
        assert_eq!(u32::from_le_bytes(stored), value);

        let mut short = [0u8; 2];
        assert!(order.to_little_endian(&mut short).is_err());
        Ok(())
    }

    #[test]
    fn data_type_and_mode_keywords() {
        assert_eq!(DataType::from_keyword("f").unwrap(), DataType::Float);
        assert!(DataType::from_keyword("X").is_err());
        assert_eq!(DataMode::from_keyword("L").unwrap(), DataMode::List);
        assert_eq!(DataMode::from_keyword("C").unwrap(), DataMode::Correlated);
    }
}
