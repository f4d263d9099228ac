//! Outcome → caller-facing response.
//!
//! Validation failures are the caller's fault (400) and carry their message.
//! Processing failures are ours (500) and carry a categorized message.
//! Anything unanticipated is a 500 with no detail.

use chrono::Local;
use hotelmerge_pipeline::{BatchError, BatchResult};
use serde::Serialize;
use tracing::{error, warn};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const UNEXPECTED: &str = "An unexpected error occurred";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub status: u16,
    pub error: &'static str,
    pub timestamp: String,
}

impl ErrorResponse {
    fn bad_request(message: String) -> Self {
        Self::new(400, "Bad Request", message)
    }

    fn internal(message: String) -> Self {
        Self::new(500, "Internal Server Error", message)
    }

    fn new(status: u16, error: &'static str, message: String) -> Self {
        Self {
            message,
            status,
            error,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Response {
    Completed(BatchResult),
    Failed(ErrorResponse),
}

impl Response {
    pub fn from_outcome(outcome: anyhow::Result<BatchResult>) -> Self {
        let err = match outcome {
            Ok(result) => return Response::Completed(result),
            Err(err) => err,
        };
        let response = match err.downcast_ref::<BatchError>() {
            Some(batch) if batch.is_client_error() => {
                warn!("Validation error: {batch}");
                ErrorResponse::bad_request(batch.to_string())
            }
            Some(batch) => {
                error!("File processing error: {err:#}");
                ErrorResponse::internal(batch.to_string())
            }
            None => {
                error!("Unexpected error: {err:#}");
                ErrorResponse::internal(UNEXPECTED.to_string())
            }
        };
        Response::Failed(response)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Completed(_))
    }
}
