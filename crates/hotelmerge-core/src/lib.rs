//! Core model for hotelmerge: filename identity, decoding, image URL discovery, per-hotel merge.

pub mod decode;
mod error;
pub mod extract;
pub mod identity;
pub mod merge;

pub use decode::decode;
pub use error::{DecodeError, ValidationError};
pub use extract::extract_image_urls;
pub use identity::{DocumentFormat, SourceKind, resolve_format, resolve_key, resolve_kind};
pub use merge::{HotelIndex, HotelRecord};

/// Decoded document content. JSON and XML both land in this shape.
pub type Tree = serde_json::Value;
