//! City weather lookup for SkyCast
//!
//! Fetches multi-day forecasts from weatherapi.com, keeps recent results in a
//! persisted search history that doubles as a cache, and drives a small fetch
//! state machine with debounced input.

pub mod controller;
pub mod debounce;
pub mod history;
pub mod outlook;
pub mod provider;
pub mod storage;
pub mod types;

pub use controller::{
    FetchController, FetchMessage, FetchState, FetchStatus, RequestOutcome, RequestToken,
    DEFAULT_CITY,
};
pub use debounce::Debouncer;
pub use history::{HistoryEntry, SearchHistory, MAX_HISTORY_ENTRIES};
pub use outlook::hourly_outlook;
pub use provider::{ForecastSource, ProviderSettings, WeatherProvider, DEFAULT_BASE_URL};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use types::*;
