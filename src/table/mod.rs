//! In-memory tabular values shared by the extractors, the merge engine and the renderer.
pub mod blob;
pub mod grid;
pub mod record;
pub mod scalar;

pub use blob::TabularBlob;
pub use grid::Grid;
pub use record::Record;
pub use record::RecordTable;
pub use scalar::Scalar;
