//! One dataset of an FCS file: HEADER, TEXT keywords and the resolved segment layout

use crate::error::Result;
use crate::parser::{parse_text, segment_bytes};
use crate::types::header::{FcsVersion, Header, SegmentRange};
use crate::types::keywords::Keywords;
use crate::types::layout::DataLayout;
use crate::types::parameter::Parameter;
use bon::Builder;
use serde::Serialize;

/// Dataset metadata. All segment ranges are absolute file offsets.
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct Dataset {
    /// Absolute offset of this dataset's HEADER
    pub offset: u64,
    pub header: Header,
    pub keywords: Keywords,
    pub parameters: Vec<Parameter>,
    pub layout: DataLayout,
    pub text: SegmentRange,
    #[builder(default)]
    pub supplemental_text: SegmentRange,
    pub data: SegmentRange,
    #[builder(default)]
    pub analysis: SegmentRange,
    /// Absolute offset of the next dataset, if any
    pub next: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetMetadata<'a> {
    pub version: FcsVersion,
    pub offset: u64,
    pub text: SegmentRange,
    pub supplemental_text: SegmentRange,
    pub data: SegmentRange,
    pub analysis: SegmentRange,
    pub events: usize,
    pub layout: &'a DataLayout,
    pub parameters: &'a [Parameter],
    pub keywords: &'a Keywords,
}

impl Dataset {
    pub fn version(&self) -> FcsVersion {
        self.header.version
    }

    pub fn event_count(&self) -> usize {
        self.layout.events
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.short_name == name || p.long_name.as_deref() == Some(name))
    }

    /// Short parameter names (`$PnN`) in parameter order.
    pub fn channel_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.short_name.as_str()).collect()
    }

    /// Keywords stored in the ANALYSIS segment, read from the bytes of the
    /// whole file. `None` when the dataset has no ANALYSIS segment.
    pub fn analysis_keywords(&self, file: &[u8]) -> Result<Option<Keywords>> {
        if self.analysis.is_empty() {
            return Ok(None);
        }
        parse_text(segment_bytes(file, self.analysis)).map(Some)
    }

    pub fn metadata(&self) -> DatasetMetadata<'_> {
        DatasetMetadata {
            version: self.header.version,
            offset: self.offset,
            text: self.text,
            supplemental_text: self.supplemental_text,
            data: self.data,
            analysis: self.analysis,
            events: self.layout.events,
            layout: &self.layout,
            parameters: &self.parameters,
            keywords: &self.keywords,
        }
    }
}
