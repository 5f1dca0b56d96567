//! FCS file parsing functionality

mod data_parser;
mod dataset_parser;
mod header_parser;
mod text_parser;

// Re-export the parsing functions
pub use data_parser::decode_events;
pub use dataset_parser::parse_dataset;
pub(crate) use dataset_parser::segment_bytes;
pub use header_parser::{HEADER_LEN, parse_header};
pub use text_parser::parse_text;
