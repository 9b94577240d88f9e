//! Error types shown to SkyCast users.
//!
//! Lower crates keep their own precise errors. Anything that reaches the
//! terminal is first mapped into [`AppError`], which carries the full cause for
//! logs and a short actionable line via `user_message()`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("History storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// One line suitable for the terminal, without technical detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Lookup(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Storage(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed.",
            AppError::Other(_) => "Something unexpected went wrong.",
        }
    }
}

/// Transport-level failures talking to the weather provider.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Provider returned HTTP {status}: {detail}")]
    Upstream { status: u16, detail: String },

    #[error("Malformed forecast payload: {0}")]
    MalformedPayload(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::Unreachable(_) => "Can't reach the weather service. Check your connection.",
            NetworkError::Timeout => "The weather service took too long to answer.",
            NetworkError::Upstream { status, .. } if *status >= 500 => {
                "The weather service is having trouble. Try again in a moment."
            }
            NetworkError::Upstream { .. } => "The weather service refused the request.",
            NetworkError::MalformedPayload(_) => "The weather service sent data SkyCast can't read.",
        }
    }
}

/// Reasons the provider declined a city lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("No location matches {0:?}")]
    UnknownCity(String),

    #[error("API key missing or rejected")]
    BadApiKey,

    #[error("API quota exhausted")]
    QuotaExceeded,

    #[error("Provider unavailable")]
    Unavailable,

    #[error("Provider rejected the request: {0}")]
    Rejected(String),
}

impl LookupError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LookupError::UnknownCity(_) => "Check the spelling or try a nearby larger city.",
            LookupError::BadApiKey => "Check your weather API key (SKYCAST_API_KEY).",
            LookupError::QuotaExceeded => "The API key has used up its quota. Try again later.",
            LookupError::Unavailable => "The weather service is down. Try again later.",
            LookupError::Rejected(_) => "The weather service rejected this search.",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file unreadable: {0}")]
    Unreadable(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Unreadable(_) => "Config file could not be read, using defaults.",
            ConfigError::Invalid(_) => "Config file has invalid values, using defaults.",
            ConfigError::ParseError(_) => "Config file could not be parsed, using defaults.",
        }
    }
}

/// Failures persisting recent searches and preferences.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Stored data is corrupted: {0}")]
    Corruption(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::Unavailable(_) => "Recent searches can't be stored this session.",
            StorageError::Corruption(_) => "Saved searches were unreadable and have been reset.",
            StorageError::WriteFailed(_) => "Couldn't save your recent searches.",
        }
    }
}

/// Classify a reqwest failure.
///
/// Implemented on `&reqwest::Error` so callers can classify an error they
/// only borrow.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for &reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::MalformedPayload(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::Upstream {
                status: status.as_u16(),
                detail: self.to_string(),
            }
        } else {
            NetworkError::Unreachable(self.to_string())
        }
    }
}
