use serde::{Deserialize, Serialize};
use thiserror::Error;

use bomdiff_models::DocumentFailure;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BomDiffError {
    #[error("Failed to extract tables from {document}: {message}")]
    Extraction { document: String, message: String },

    #[error("Could not find a valid header row in {document}")]
    HeaderNotFound { document: String },

    #[error("Unsupported file extension '{extension}' for {document}")]
    UnsupportedFormat { document: String, extension: String },

    #[error("File not found: {document}")]
    DocumentNotFound { document: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BomDiffError {
    pub fn extraction(document: impl Into<String>, message: impl ToString) -> Self {
        Self::Extraction {
            document: document.into(),
            message: message.to_string(),
        }
    }

    pub fn header_not_found(document: impl Into<String>) -> Self {
        Self::HeaderNotFound {
            document: document.into(),
        }
    }

    pub fn unsupported_format(document: impl Into<String>, extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            document: document.into(),
            extension: extension.into(),
        }
    }

    pub fn document_not_found(document: impl Into<String>) -> Self {
        Self::DocumentNotFound {
            document: document.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Document the error is about, if any
    pub fn document(&self) -> Option<&str> {
        match self {
            Self::Extraction { document, .. }
            | Self::HeaderNotFound { document }
            | Self::UnsupportedFormat { document, .. }
            | Self::DocumentNotFound { document } => Some(document),
            _ => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Extraction { .. } => "EXTRACTION_FAILED",
            Self::HeaderNotFound { .. } => "HEADER_NOT_FOUND",
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::DocumentNotFound { .. } => "DOCUMENT_NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Extraction { .. } => 422,
            Self::HeaderNotFound { .. } => 422,
            Self::UnsupportedFormat { .. } => 415,
            Self::DocumentNotFound { .. } => 404,
            Self::Validation { .. } => 400,
            Self::Configuration { .. } => 500,
            Self::Io { .. } => 500,
            Self::Internal { .. } => 500,
        }
    }

    /// Per-document failure entry for a batch report
    pub fn to_failure(&self, fallback_document: &str) -> DocumentFailure {
        DocumentFailure {
            document: self.document().unwrap_or(fallback_document).to_string(),
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

pub type BomDiffResult<T> = Result<T, BomDiffError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<BomDiffError> for ErrorResponse {
    fn from(error: BomDiffError) -> Self {
        let details = error
            .document()
            .map(|document| serde_json::json!({ "document": document }));

        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
            message: error.to_string(),
            details,
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for BomDiffError {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for BomDiffError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}

impl From<validator::ValidationErrors> for BomDiffError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::validation("model", crate::validation::format_validation_errors(&errors))
    }
}

impl From<config::ConfigError> for BomDiffError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}
