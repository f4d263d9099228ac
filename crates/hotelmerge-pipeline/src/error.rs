use std::time::Duration;

use hotelmerge_core::{DecodeError, ValidationError};
use hotelmerge_store::StoreError;
use thiserror::Error;

/// Why a batch produced no result.
///
/// Only [`BatchError::Validation`] is the caller's fault; everything else is a
/// processing failure on our side. Individual image failures never show up here.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to process file: {filename}")]
    Decode {
        filename: String,
        #[source]
        source: DecodeError,
    },

    #[error("Failed to serialize merged result")]
    Serialize(#[from] serde_json::Error),

    #[error("{}", .0.category())]
    Store(#[from] StoreError),

    #[error("Failed to complete processing")]
    DeadlineExceeded { deadline: Duration },
}

impl BatchError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, BatchError::Validation(_))
    }
}
