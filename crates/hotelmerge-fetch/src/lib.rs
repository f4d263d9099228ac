//! Image fetch layer: one GET per URL, payload validated before it touches disk.

mod fetcher;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use fetcher::{FetchConfig, ImageFetcher, image_file_name};
