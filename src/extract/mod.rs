//! # Extraction
//!
//! Turns workbooks into the two inputs of the merge: chart datasets keyed by
//! sheet name, and metadata records gathered from `module*` sheets.
pub mod dataset;
pub mod metadata;

use thiserror::Error;

pub use dataset::extract_datasets;
pub use dataset::DatasetMap;
pub use metadata::extract_metadata;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Input directory '{0}' is not readable")]
    InputDirectory(String),

    #[error("No objects to concatenate: no 'module' sheet of '{0}' could be read")]
    NoMetadataSheets(String),

    #[error("Sheet has no header row")]
    MissingHeader,
}
