//! Error types for CLOB order signing and request authentication.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Boxed to keep `Result<T>` small.
    #[error("Configuration file error: {0}")]
    ConfigFile(Box<config::ConfigError>),

    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A required input (signer, credentials, tick size) was not supplied.
    #[error("Precondition failed: {message}")]
    Precondition { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Encoding error: {message}")]
    Encoding { message: String },

    #[error("Signing error: {message}")]
    Signing { message: String },

    /// A dependency (custodial signer, RPC node, relayer) could not be reached
    /// or returned an unusable answer.
    #[error("Remote dependency error: {message}")]
    Remote { message: String },

    /// The server received a well-formed request and rejected it.
    #[error("API error: {message}")]
    Api { message: String, status: Option<u16> },
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::ConfigFile(Box::new(err))
    }
}

/// The stage of the pipeline an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    /// Caller input or local configuration was invalid.
    Input,
    Encoding,
    Signing,
    /// A network dependency was unavailable.
    Dependency,
    /// The server rejected the request.
    Rejected,
}

impl Error {
    pub fn precondition(message: impl Into<String>) -> Self {
        Error::Precondition {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Error::Encoding {
            message: message.into(),
        }
    }

    pub fn signing(message: impl Into<String>) -> Self {
        Error::Signing {
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Error::Remote {
            message: message.into(),
        }
    }

    /// Classify the error by the stage that produced it.
    pub fn stage(&self) -> ErrorStage {
        match self {
            Error::Config { .. }
            | Error::ConfigFile(_)
            | Error::Precondition { .. }
            | Error::Validation { .. } => ErrorStage::Input,
            Error::Encoding { .. } | Error::Json(_) => ErrorStage::Encoding,
            Error::Signing { .. } => ErrorStage::Signing,
            Error::Remote { .. } | Error::Http(_) => ErrorStage::Dependency,
            Error::Api { .. } => ErrorStage::Rejected,
        }
    }

    /// Whether a caller may retry the same call. Only dependency failures
    /// qualify; a retry must still re-read nonces and regenerate salts.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Api {
                status: Some(status),
                ..
            } => *status == 429 || *status >= 500,
            other => other.stage() == ErrorStage::Dependency,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
