//! Fail-soft image download.
//!
//! A fetch is one GET, no retries. The body must decode as an image with
//! non-zero dimensions before anything is written, so HTML error pages and
//! truncated payloads served with a 200 never reach the images directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::GenericImageView;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

const FALLBACK_EXTENSION: &str = "jpg";

#[derive(Error, Debug)]
enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(u16),
    #[error("payload is not an image: {0}")]
    NotImage(#[from] image::ImageError),
    #[error("image has degenerate dimensions {width}x{height}")]
    Degenerate { width: u32, height: u32 },
    #[error("image check did not finish: {0}")]
    Check(#[from] tokio::task::JoinError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// HTTP settings for image downloads.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Whole-request budget for one image. Keep it well under the batch deadline.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("hotelmerge/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Downloads and verifies hotel images. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
}

impl ImageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }

    /// Fetch `url` into `images_dir` as `<hotel_id>_<uuid>.<ext>`.
    ///
    /// Returns `true` only when a valid image was written. Every failure is
    /// logged and reported as `false`; nothing propagates to the caller.
    pub async fn fetch(&self, url: &str, hotel_id: &str, images_dir: &Path) -> bool {
        match self.try_fetch(url, hotel_id, images_dir).await {
            Ok(path) => {
                debug!(url, path = %path.display(), "downloaded image");
                true
            }
            Err(e) => {
                warn!(url, hotel_id, error = %e, "failed to download image");
                false
            }
        }
    }

    async fn try_fetch(
        &self,
        url: &str,
        hotel_id: &str,
        images_dir: &Path,
    ) -> Result<PathBuf, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let bytes = resp.bytes().await?;
        verify_image(bytes.clone()).await?;

        // Concurrent fetches race on this; create_dir_all tolerates an existing directory.
        tokio::fs::create_dir_all(images_dir)
            .await
            .map_err(|source| FetchError::Write {
                path: images_dir.to_path_buf(),
                source,
            })?;
        let path = images_dir.join(image_file_name(hotel_id, url));
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| FetchError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

/// Decoding is CPU-bound, so it runs on the blocking pool.
async fn verify_image<B>(bytes: B) -> Result<(), FetchError>
where
    B: AsRef<[u8]> + Send + 'static,
{
    tokio::task::spawn_blocking(move || check_image(bytes.as_ref())).await?
}

fn check_image(bytes: &[u8]) -> Result<(), FetchError> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();
    check_dimensions(width, height)
}

fn check_dimensions(width: u32, height: u32) -> Result<(), FetchError> {
    if width == 0 || height == 0 {
        return Err(FetchError::Degenerate { width, height });
    }
    Ok(())
}

/// `<hotel_id>_<uuid>.<ext>`, with `ext` taken from the URL path (`jpg` if absent).
pub fn image_file_name(hotel_id: &str, url: &str) -> String {
    format!("{hotel_id}_{}.{}", Uuid::new_v4(), url_extension(url))
}

fn url_extension(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| {
            let last = u.path_segments()?.last()?.to_string();
            let (_, ext) = last.rsplit_once('.')?;
            (!ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
                .then(|| ext.to_string())
        })
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}
