//! Post-processing of decoded events: scaling, compensation and DataFrame assembly

pub mod compensation;
pub mod frame;
pub mod transform;

// Re-export for easier access
pub use compensation::{compensate, invert};
pub use frame::to_dataframe;
pub use transform::scale;
