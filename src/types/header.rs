use bon::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// FCS version announced in the first six bytes of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FcsVersion {
    Fcs2_0,
    Fcs3_0,
    Fcs3_1,
    Fcs3_2,
}

impl FcsVersion {
    pub fn from_magic(magic: &[u8]) -> Option<Self> {
        match magic {
            b"FCS2.0" => Some(Self::Fcs2_0),
            b"FCS3.0" => Some(Self::Fcs3_0),
            b"FCS3.1" => Some(Self::Fcs3_1),
            b"FCS3.2" => Some(Self::Fcs3_2),
            _ => None,
        }
    }
}

impl fmt::Display for FcsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fcs2_0 => "FCS2.0",
            Self::Fcs3_0 => "FCS3.0",
            Self::Fcs3_1 => "FCS3.1",
            Self::Fcs3_2 => "FCS3.2",
        };
        f.write_str(s)
    }
}

/// Inclusive byte range of a segment. `0..=0` means the segment is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRange {
    pub start: u64,
    pub end: u64,
}

impl SegmentRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        (self.start == 0 && self.end == 0) || self.end < self.start
    }

    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// Shift a dataset-relative range to an absolute file position.
    /// `None` when the shifted range does not fit in a `u64`.
    pub fn offset_by(&self, base: u64) -> Option<Self> {
        if self.is_empty() {
            return Some(*self);
        }
        Some(Self::new(
            self.start.checked_add(base)?,
            self.end.checked_add(base)?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Builder)]
pub struct Header {
    pub version: FcsVersion,
    pub text: SegmentRange,
    pub data: SegmentRange,
    pub analysis: SegmentRange,
    #[builder(default)]
    pub other: Vec<SegmentRange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_range_has_no_length() {
        assert!(SegmentRange::default().is_empty());
        assert_eq!(SegmentRange::default().len(), 0);
        assert_eq!(SegmentRange::new(58, 157).len(), 100);
    }

    #[test]
    fn offset_leaves_empty_ranges_alone() {
        assert_eq!(
            SegmentRange::default().offset_by(1000),
            Some(SegmentRange::default())
        );
        assert_eq!(
            SegmentRange::new(10, 20).offset_by(1000),
            Some(SegmentRange::new(1010, 1020))
        );
    }

    #[test]
    fn offset_past_u64_is_none() {
        assert_eq!(SegmentRange::new(u64::MAX - 5, u64::MAX).offset_by(10), None);
    }
}
