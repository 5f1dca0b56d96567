//! Utility functions for file handling and other operations

pub mod file_utils;
pub mod misc;
#[cfg(test)]
pub mod test_utils;

// Re-export commonly used utility functions for convenience
pub use file_utils::*;
pub use misc::*;
