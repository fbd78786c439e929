//! Batch API
//!
//! Transforms test files on disk, one blocking task per file.

pub mod model;

mod common;
mod transform_files;

pub use model::{FileReport, TransformFilesConfig};
pub use transform_files::transform_files;
