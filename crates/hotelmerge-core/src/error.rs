use thiserror::Error;

/// Rejected input naming. Always the caller's fault.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Filename is missing")]
    MissingFilename,

    #[error("Filename has no hotel id: {0}")]
    MissingHotelId(String),

    #[error("Invalid hotel id in filename: {0}")]
    InvalidHotelId(String),

    #[error("Unknown file type: {0}")]
    UnknownSourceKind(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("XML document has no root element")]
    EmptyXml,

    #[error("XML document is not well-formed: {0}")]
    MalformedXml(String),
}
