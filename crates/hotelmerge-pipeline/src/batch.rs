//! Batch orchestration.
//!
//! Documents are handled strictly in input order: that order decides which
//! document wins a hotel's provider slot. Image downloads are the only
//! concurrent work and are joined once, under a single deadline, after every
//! document has been merged.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use hotelmerge_core::{
    HotelIndex, decode, extract_image_urls, resolve_format, resolve_key, resolve_kind,
};
use hotelmerge_fetch::ImageFetcher;
use hotelmerge_store::OutputSink;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::BatchError;
use crate::downloads::Downloads;

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct InputDocument {
    pub filename: String,
    pub content: Vec<u8>,
}

impl InputDocument {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Budget for all image downloads of a batch, measured from the join.
    pub deadline: Duration,
    pub max_concurrent_fetches: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(5 * 60),
            max_concurrent_fetches: 16,
        }
    }
}

/// Summary of a completed batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub json_file: PathBuf,
    pub images_directory: PathBuf,
    pub timestamp: DateTime<Local>,
    /// Every input document, including skipped unnamed ones.
    pub processed_files: usize,
    /// Images fetched, verified, and written. Failed fetches are not counted.
    pub downloaded_images: usize,
}

pub struct BatchProcessor<S> {
    sink: S,
    fetcher: ImageFetcher,
    config: PipelineConfig,
}

impl<S: OutputSink> BatchProcessor<S> {
    pub fn new(sink: S, fetcher: ImageFetcher, config: PipelineConfig) -> Self {
        Self {
            sink,
            fetcher,
            config,
        }
    }

    /// Merge `documents` per hotel, download every discovered image, and write `hotels.json`.
    ///
    /// Fails fast on the first bad filename or undecodable document, and on a
    /// deadline breach; no result file is written in those cases. Individual
    /// image failures only lower `downloaded_images`.
    pub async fn process(&self, documents: &[InputDocument]) -> Result<BatchResult, BatchError> {
        let start = Instant::now();
        let timestamp = Local::now();
        let layout = self.sink.prepare_run(timestamp).await?;
        info!(
            documents = documents.len(),
            output = %layout.output_dir.display(),
            "processing batch"
        );

        let mut hotels = HotelIndex::new();
        let mut downloads = Downloads::new(self.config.max_concurrent_fetches);

        for doc in documents {
            if doc.filename.is_empty() {
                warn!("skipping document without a filename");
                continue;
            }

            let hotel_id = resolve_key(&doc.filename)?;
            let kind = resolve_kind(&doc.filename)?;
            let format = resolve_format(&doc.filename)?;
            let content = decode(&doc.content, format).map_err(|source| BatchError::Decode {
                filename: doc.filename.clone(),
                source,
            })?;

            let urls = extract_image_urls(&content);
            debug!(
                filename = %doc.filename,
                hotel_id = %hotel_id,
                source = %kind,
                images = urls.len(),
                "merged document"
            );
            hotels.upsert(&hotel_id, kind, content);

            for url in urls {
                let fetcher = self.fetcher.clone();
                let hotel_id = hotel_id.clone();
                let images_dir = layout.images_dir.clone();
                downloads.spawn(async move { fetcher.fetch(&url, &hotel_id, &images_dir).await });
            }
        }

        let dispatched = downloads.len();
        let downloaded = downloads.join(self.config.deadline).await?;

        let bytes = serde_json::to_vec_pretty(&hotels)?;
        let json_file = self.sink.write_result(&bytes, &layout).await?;

        info!(
            hotels = hotels.len(),
            images = downloaded,
            failed = dispatched - downloaded,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "batch complete"
        );

        Ok(BatchResult {
            json_file,
            images_directory: layout.images_dir,
            timestamp,
            processed_files: documents.len(),
            downloaded_images: downloaded,
        })
    }
}
