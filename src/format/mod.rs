//! Preview script import and merged keyframe export.

mod error;
mod export;

pub use error::FormatError;
pub use export::{MergedExport, read_script};
