//! Run output sink.
//!
//! A run writes to `<base>/<yyyyMMdd_HHmmss>/hotels.json`, with verified
//! images under `<base>/<yyyyMMdd_HHmmss>/images/`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tracing::info;

use crate::StoreError;

pub const RESULT_FILE_NAME: &str = "hotels.json";
const IMAGES_DIR_NAME: &str = "images";
const RUN_DIR_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Locations prepared for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    pub output_dir: PathBuf,
    pub images_dir: PathBuf,
}

impl RunLayout {
    pub fn new(output_dir: PathBuf) -> Self {
        let images_dir = output_dir.join(IMAGES_DIR_NAME);
        Self {
            output_dir,
            images_dir,
        }
    }

    /// Where the merged result is written.
    pub fn result_file(&self) -> PathBuf {
        self.output_dir.join(RESULT_FILE_NAME)
    }
}

/// Destination for a run's merged result.
///
/// The images directory is only reserved here; image fetchers create it on first write.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Create backing storage for a run started at `timestamp`.
    async fn prepare_run(&self, timestamp: DateTime<Local>) -> Result<RunLayout, StoreError>;

    /// Persist the serialized merged result. Returns the written file's path.
    async fn write_result(&self, bytes: &[u8], layout: &RunLayout)
    -> Result<PathBuf, StoreError>;
}

/// Local filesystem sink rooted at a base output directory.
#[derive(Debug, Clone)]
pub struct FsOutputSink {
    base_dir: PathBuf,
}

impl FsOutputSink {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn run_dir(&self, timestamp: DateTime<Local>) -> PathBuf {
        self.base_dir.join(timestamp.format(RUN_DIR_FORMAT).to_string())
    }
}

#[async_trait]
impl OutputSink for FsOutputSink {
    async fn prepare_run(&self, timestamp: DateTime<Local>) -> Result<RunLayout, StoreError> {
        let output_dir = self.run_dir(timestamp);
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|source| StoreError::CreateDir {
                path: output_dir.clone(),
                source,
            })?;
        info!(path = %output_dir.display(), "prepared run directory");
        Ok(RunLayout::new(output_dir))
    }

    async fn write_result(
        &self,
        bytes: &[u8],
        layout: &RunLayout,
    ) -> Result<PathBuf, StoreError> {
        let path = layout.result_file();
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StoreError::WriteResult {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), bytes = bytes.len(), "saved result");
        Ok(path)
    }
}
