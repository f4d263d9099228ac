//! Batch pipeline: uploaded hotel documents in, merged `hotels.json` and verified images out.

mod batch;
mod downloads;
mod error;

pub use batch::{BatchProcessor, BatchResult, InputDocument, PipelineConfig};
pub use error::BatchError;
