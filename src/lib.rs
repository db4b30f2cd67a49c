//! # Rusty Charts
//!
//! Builds chart configuration files from curated spreadsheet data.
//!
//! ## Pipeline
//!
//! - **Dataset extraction**: every sheet of each `Module <N> - Datasets for Charts`
//!   workbook becomes a comma separated blob keyed by its trimmed sheet name
//! - **Metadata extraction**: the `module*` sheets of a metadata workbook are read
//!   as records (banner row, header row, data rows) tagged with their sheet name
//! - **Merge**: records that are ready to be recreated are joined with their dataset
//!   by `Figure ID`; later duplicates replace earlier ones
//! - **Rendering**: each merged chart is dispatched on its chart type, its dataset
//!   columns are bound into a JSON template and the result is written to disk
//!
//! ## Workbook formats
//!
//! Office Open XML (`.xlsx`, `.xlsm`, `.xlam`) and OpenDocument (`.ods`) workbooks
//! are read directly from their zip packages.
pub mod error;
pub mod extract;
pub(crate) mod helpers;
pub mod keyed;
pub mod merge;
pub mod pipeline;
pub mod render;
pub mod spreadsheet;
pub mod table;

pub use error::ChartError;
pub use pipeline::Pipeline;
pub use pipeline::PipelineConfig;
pub use pipeline::RunSummary;
