//! # Error Taxonomy
//!
//! Every failure in the mapping layer surfaces as a [`JsonApiError`]. Errors
//! are raised synchronously at the call that violates the contract and are
//! never retried internally; retry and backoff are caller concerns.

use serde::Deserialize;
use serde_json::Value;

/// Message used when a non-2xx response carries no usable `errors` array.
pub const UNKNOWN_ERROR_MESSAGE: &str =
    "Encountered unknown error. No error details were provided from the server.";

/// Message used when a non-empty response body is not a JSON:API document.
pub const UNSUPPORTED_CONTENT_TYPE_MESSAGE: &str = "Unsupported content type in server response.";

/// A single entry of a JSON:API `errors` array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorObject {
    pub title: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub source: Option<Value>,
}

impl ErrorObject {
    /// Extract every well-formed error object from a response document.
    ///
    /// Elements without a string `title` are skipped; a missing or
    /// non-array `errors` member yields an empty list.
    pub fn from_document(document: Option<&Value>) -> Vec<Self> {
        let Some(errors) = document.and_then(|d| d.get("errors")).and_then(Value::as_array) else {
            return Vec::new();
        };
        errors
            .iter()
            .filter_map(|e| serde_json::from_value(e.clone()).ok())
            .collect()
    }
}

/// Errors from JSON:API calls and model bindings.
#[derive(Debug, thiserror::Error)]
pub enum JsonApiError {
    /// The server answered with a body that is not a JSON:API document.
    #[error("{message} (HTTP {status})")]
    Transport { status: u16, message: String },

    /// HTTP transport failure (connect, timeout, body read).
    #[error("HTTP error calling {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    /// The server returned a non-2xx status.
    #[error("API returned {status}: {message}")]
    Api {
        status: u16,
        errors: Vec<ErrorObject>,
        message: String,
    },

    /// The response document does not have the expected structure.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The operation needs a server-issued id that is missing.
    #[error("unmapped model: {0}")]
    UnmappedModel(String),

    /// A second sort criterion was requested.
    #[error("illegal sort: {0}")]
    IllegalSort(String),

    /// An argument failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Write to a read-only, already-set write-once, or undeclared attribute.
    #[error("attribute policy violation: {0}")]
    AttributePolicy(String),

    /// An attribute value does not fit the type of its binding.
    #[error("attribute `{attribute}` has an unexpected value: {source}")]
    Coercion {
        attribute: String,
        source: serde_json::Error,
    },

    /// A model type or relationship target could not be resolved.
    #[error("registry error: {0}")]
    Registry(String),

    /// A request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl JsonApiError {
    /// Build the protocol error for a non-2xx response.
    pub fn from_response(status: u16, document: Option<&Value>) -> Self {
        let errors = ErrorObject::from_document(document);
        let message = if errors.is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            errors
                .iter()
                .map(|e| e.title.as_str())
                .collect::<Vec<_>>()
                .join("; ")
        };
        Self::Api {
            status,
            errors,
            message,
        }
    }

    /// The parsed JSON:API error objects, if this is a protocol error.
    pub fn errors(&self) -> &[ErrorObject] {
        match self {
            Self::Api { errors, .. } => errors,
            _ => &[],
        }
    }

    /// HTTP status code carried by transport and protocol errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Http { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
