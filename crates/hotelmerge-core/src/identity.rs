//! Filename conventions for uploaded hotel documents.
//!
//! An upload is named `<hotel id>-<anything>-<source>.<ext>`, e.g. `123-giata.json`
//! or `123-paris-coah.xml`. The hotel id is everything before the first `-`,
//! the source is one of two fixed markers, and the extension picks the decoder.

use serde::Serialize;

use crate::ValidationError;

const KEY_DELIMITER: char = '-';
const GIATA_MARKER: &str = "-giata.";
const COAH_MARKER: &str = "-coah.";

/// Third-party provider a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// GIATA hotel content (primary source).
    Giata,
    /// COAH hotel content (secondary source).
    Coah,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Giata => "giata",
            SourceKind::Coah => "coah",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured-text encoding of a document, taken from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Xml,
}

/// Hotel id: the filename prefix before the first `-`.
pub fn resolve_key(filename: &str) -> Result<String, ValidationError> {
    if filename.is_empty() {
        return Err(ValidationError::MissingFilename);
    }
    let (key, _) = filename
        .split_once(KEY_DELIMITER)
        .ok_or_else(|| ValidationError::MissingHotelId(filename.to_string()))?;
    if key.is_empty() {
        return Err(ValidationError::MissingHotelId(filename.to_string()));
    }
    // The id becomes part of image filenames.
    if key.contains(['/', '\\']) {
        return Err(ValidationError::InvalidHotelId(filename.to_string()));
    }
    Ok(key.to_string())
}

/// Source provider, from the `-giata.` / `-coah.` marker. GIATA is checked first.
pub fn resolve_kind(filename: &str) -> Result<SourceKind, ValidationError> {
    if filename.contains(GIATA_MARKER) {
        Ok(SourceKind::Giata)
    } else if filename.contains(COAH_MARKER) {
        Ok(SourceKind::Coah)
    } else {
        Err(ValidationError::UnknownSourceKind(filename.to_string()))
    }
}

/// Decoder choice from the text after the last `.`, case-insensitive.
pub fn resolve_format(filename: &str) -> Result<DocumentFormat, ValidationError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or_default();
    if ext.eq_ignore_ascii_case("json") {
        Ok(DocumentFormat::Json)
    } else if ext.eq_ignore_ascii_case("xml") {
        Ok(DocumentFormat::Xml)
    } else {
        Err(ValidationError::UnsupportedFormat(ext.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_prefix_before_first_dash() {
        assert_eq!(resolve_key("123-giata.json").unwrap(), "123");
        assert_eq!(resolve_key("123-paris-coah.xml").unwrap(), "123");
        assert_eq!(resolve_key("H42-x-y-z-giata.json").unwrap(), "H42");
    }

    #[test]
    fn key_requires_delimiter() {
        assert_eq!(
            resolve_key("123giata.json"),
            Err(ValidationError::MissingHotelId("123giata.json".into()))
        );
    }

    #[test]
    fn key_rejects_empty_prefix_and_filename() {
        assert!(matches!(
            resolve_key("-giata.json"),
            Err(ValidationError::MissingHotelId(_))
        ));
        assert_eq!(resolve_key(""), Err(ValidationError::MissingFilename));
    }

    #[test]
    fn key_rejects_path_separators() {
        assert!(matches!(
            resolve_key("../etc-giata.json"),
            Err(ValidationError::InvalidHotelId(_))
        ));
        assert!(matches!(
            resolve_key("a\\b-giata.json"),
            Err(ValidationError::InvalidHotelId(_))
        ));
    }

    #[test]
    fn kind_from_marker() {
        assert_eq!(resolve_kind("123-giata.json").unwrap(), SourceKind::Giata);
        assert_eq!(resolve_kind("123-coah.xml").unwrap(), SourceKind::Coah);
        assert_eq!(resolve_kind("123-rome-coah.json").unwrap(), SourceKind::Coah);
    }

    #[test]
    fn kind_marker_is_case_sensitive() {
        assert!(resolve_kind("123-GIATA.json").is_err());
        assert!(resolve_kind("123-Coah.json").is_err());
    }

    #[test]
    fn kind_needs_trailing_dot() {
        // `-giata` must be followed by the extension dot.
        assert!(resolve_kind("123-giatax.json").is_err());
        assert!(resolve_kind("123-giata").is_err());
    }

    #[test]
    fn kind_prefers_giata_when_both_present() {
        assert_eq!(
            resolve_kind("123-coah.-giata.json").unwrap(),
            SourceKind::Giata
        );
    }

    #[test]
    fn unknown_kind_fails() {
        let err = resolve_kind("invalid-filename.json").unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownSourceKind("invalid-filename.json".into())
        );
        assert_eq!(err.to_string(), "Unknown file type: invalid-filename.json");
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(resolve_format("1-giata.json").unwrap(), DocumentFormat::Json);
        assert_eq!(resolve_format("1-giata.XML").unwrap(), DocumentFormat::Xml);
        assert_eq!(
            resolve_format("1-giata.csv"),
            Err(ValidationError::UnsupportedFormat("csv".into()))
        );
        assert_eq!(
            resolve_format("no_extension"),
            Err(ValidationError::UnsupportedFormat(String::new()))
        );
    }

    #[test]
    fn source_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SourceKind::Coah).unwrap(), "\"coah\"");
        assert_eq!(SourceKind::Giata.to_string(), "giata");
    }
}
