//! Maps weather-crate errors onto the application error hierarchy for display.

use std::collections::VecDeque;

use skycast_core::{AppError, Config, LookupError, NetworkError, ReqwestErrorExt, StorageError};
use skycast_weather::{
    FetchMessage, FetchState, StorageError as StoreError, WeatherError as FetchError,
};

// weatherapi.com error codes
const CODE_KEY_MISSING: i64 = 1002;
const CODE_QUERY_MISSING: i64 = 1003;
const CODE_NO_LOCATION: i64 = 1006;
const CODE_KEY_INVALID: i64 = 2006;
const CODE_QUOTA_EXCEEDED: i64 = 2007;
const CODE_KEY_DISABLED: i64 = 2008;

pub fn classify_fetch(err: &FetchError) -> AppError {
    match err {
        FetchError::Network(e) => AppError::Network(e.into_network_error()),
        FetchError::Provider {
            status,
            code,
            message,
        } => match code {
            Some(CODE_KEY_MISSING | CODE_KEY_INVALID | CODE_KEY_DISABLED) => {
                AppError::Lookup(LookupError::BadApiKey)
            }
            Some(CODE_NO_LOCATION | CODE_QUERY_MISSING) => {
                AppError::Lookup(LookupError::UnknownCity(message.clone()))
            }
            Some(CODE_QUOTA_EXCEEDED) => AppError::Lookup(LookupError::QuotaExceeded),
            _ if *status == 401 || *status == 403 => AppError::Lookup(LookupError::BadApiKey),
            _ if *status >= 500 => AppError::Lookup(LookupError::Unavailable),
            _ => AppError::Lookup(LookupError::Rejected(message.clone())),
        },
        FetchError::Status(status) => AppError::Network(NetworkError::Upstream {
            status: *status,
            detail: err.to_string(),
        }),
        FetchError::Parse(msg) => AppError::Network(NetworkError::MalformedPayload(msg.clone())),
        FetchError::InvalidQuery => AppError::Lookup(LookupError::UnknownCity(String::new())),
    }
}

/// Hint for a completed fetch, if it failed.
pub fn classify_message(message: &FetchMessage) -> Option<AppError> {
    match message {
        FetchMessage::FetchDone { result: Err(e), .. } => Some(classify_fetch(e)),
        FetchMessage::FetchDone { result: Ok(_), .. } => None,
    }
}

/// Hints for failures the controller accepted, in the order their `Failed`
/// states are rendered.
#[derive(Debug, Default)]
pub struct FailureHints {
    pending: VecDeque<AppError>,
}

impl FailureHints {
    pub fn record(&mut self, hint: Option<AppError>) {
        if let Some(hint) = hint {
            self.pending.push_back(hint);
        }
    }

    pub fn take_for(&mut self, state: &FetchState) -> Option<&'static str> {
        match state {
            FetchState::Failed(_) => self.pending.pop_front().map(|e| e.user_message()),
            _ => None,
        }
    }
}

pub fn classify_storage(err: StoreError) -> AppError {
    match err {
        StoreError::Io(e) => AppError::Storage(StorageError::WriteFailed(e.to_string())),
        StoreError::Serialization(e) => AppError::Storage(StorageError::Corruption(e.to_string())),
        StoreError::InvalidKey(key) => AppError::Storage(StorageError::Unavailable(key)),
    }
}

pub fn classify_config(err: &anyhow::Error) -> AppError {
    AppError::Config(Config::classify_load_error(err))
}
