//! Error handling for the job tailor application

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TailorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Word document error: {0}")]
    Document(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("Spreadsheet update failed: {0}")]
    Sheets(String),
}

pub type Result<T> = std::result::Result<T, TailorError>;

/// Convert quick-xml parse errors to our custom error type
impl From<quick_xml::Error> for TailorError {
    fn from(err: quick_xml::Error) -> Self {
        TailorError::Document(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for TailorError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        TailorError::Document(format!("Malformed attribute: {}", err))
    }
}

/// Convert TOML parse errors to our custom error type
impl From<toml::de::Error> for TailorError {
    fn from(err: toml::de::Error) -> Self {
        TailorError::Configuration(format!("Failed to parse config: {}", err))
    }
}
