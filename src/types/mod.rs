//! Type definitions for the FCS file format

pub mod dataset;
pub mod events;
pub mod header;
pub mod keywords;
pub mod layout;
pub mod parameter;
pub mod spillover;

// Re-export the main types for convenience
pub use dataset::{Dataset, DatasetMetadata};
pub use events::{ColumnData, EventColumns};
pub use header::{FcsVersion, Header, SegmentRange};
pub use keywords::Keywords;
pub use layout::{ByteOrder, DataLayout, DataMode, DataType};
pub use parameter::{Amplification, Parameter, ParameterWidth};
pub use spillover::Spillover;
