//! Storage layer: where a run's merged result and verified images land.

mod error;
pub use error::StoreError;

mod sink;
pub use sink::{FsOutputSink, OutputSink, RESULT_FILE_NAME, RunLayout};
