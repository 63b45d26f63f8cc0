//! Error handling and custom error types
//!
//! Every failure the SDK can report is a variant of [`Error`]. Provider
//! errors keep the numeric code so callers can branch on it.

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Connection, DNS, TLS or timeout failure from the HTTP layer.
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not a JSON envelope.
    #[error("Invalid API response: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// The envelope carried a nonzero `error` code.
    #[error("CDNZZ API error {code}: {msg}")]
    Provider {
        code: i64,
        msg: String,
        result: Option<Value>,
    },

    #[error("Token error: {0}")]
    Token(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),
}

impl Error {
    /// Provider error code, if this is a provider error.
    pub fn code(&self) -> Option<i64> {
        match self {
            Error::Provider { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True when this is a provider error carrying `invalid_token_code`.
    pub fn is_invalid_token(&self, invalid_token_code: i64) -> bool {
        self.code() == Some(invalid_token_code)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
