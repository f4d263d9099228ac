use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to save JSON result to {path}: {source}")]
    WriteResult {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StoreError {
    /// Message without paths or OS detail, safe to hand to callers.
    pub fn category(&self) -> &'static str {
        match self {
            StoreError::CreateDir { .. } => "Failed to create output directory",
            StoreError::WriteResult { .. } => "Failed to save JSON result",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_omits_detail() {
        let err = StoreError::WriteResult {
            path: PathBuf::from("/srv/out/hotels.json"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.category(), "Failed to save JSON result");
        assert!(err.to_string().contains("/srv/out/hotels.json"));
    }
}
