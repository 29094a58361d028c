use std::path::PathBuf;
use thiserror::Error;

/// The main error type for datapub operations.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse metadata from {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse entity JSON: {0}")]
    EntityParse(#[source] serde_json::Error),

    #[error("Expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("Missing field '{field}'")]
    MissingField { field: String },

    #[error("Field '{field}' is not {expected}")]
    FieldType {
        field: String,
        expected: &'static str,
    },

    #[error("Invalid URL '{input}': {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{method} {url} returned HTTP {status}: {body}")]
    Http {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("{method} {url} failed: {source}")]
    Transport {
        method: &'static str,
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("No transfer endpoint matches '{0}'")]
    EndpointNotFound(String),

    #[error("Endpoint {endpoint} could not be activated: {code}")]
    EndpointActivation { endpoint: String, code: String },

    #[error("No dataset found for '{0}'")]
    DatasetNotFound(String),

    #[error("{0}")]
    Precondition(String),
}

impl PublishError {
    /// Shorthand for a local precondition failure.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// True for errors detected locally from the supplied flags.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}
