//! Data module - CSV loading and table transformations

mod loader;
pub mod transform;

pub use loader::{DatasetCache, LoadError};
pub use transform::TransformError;
