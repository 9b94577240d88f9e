//! Forecast fetch controller: the single owner of `FetchState`.
//!
//! Fetches run as spawned tasks and report back as [`FetchMessage`]s on the
//! channel returned from [`FetchController::new`]. The owner feeds each message
//! to [`FetchController::apply`]. Every dispatched fetch carries a
//! [`RequestToken`]; only the most recent one is accepted, so a slow response
//! for an older query can never overwrite a newer result.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::history::SearchHistory;
use crate::provider::ForecastSource;
use crate::storage::{save_history, KeyValueStore};
use crate::types::{ForecastResult, WeatherError};

pub const DEFAULT_CITY: &str = "New York";

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Idle,
    Loading,
    Succeeded(ForecastResult),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStatus {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl FetchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl FetchState {
    pub fn status(&self) -> FetchStatus {
        match self {
            Self::Idle => FetchStatus::Idle,
            Self::Loading => FetchStatus::Loading,
            Self::Succeeded(_) => FetchStatus::Succeeded,
            Self::Failed(_) => FetchStatus::Failed,
        }
    }

    pub fn forecast(&self) -> Option<&ForecastResult> {
        match self {
            Self::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Identifies one dispatched fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Messages sent from fetch tasks back to the controller's owner
#[derive(Debug)]
pub enum FetchMessage {
    FetchDone {
        token: RequestToken,
        city: String,
        result: Result<ForecastResult, WeatherError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Blank query, nothing happened
    Ignored,
    /// Served from history without touching the network
    CacheHit,
    /// A fetch is in flight under this token
    Dispatched(RequestToken),
}

#[derive(Debug)]
struct PendingRequest {
    token: RequestToken,
    city: String,
}

type StateListener = Box<dyn FnMut(&FetchState) + Send>;

pub struct FetchController<S> {
    source: Arc<S>,
    runtime: Handle,
    tx: mpsc::UnboundedSender<FetchMessage>,
    state: FetchState,
    history: SearchHistory,
    store: Option<Arc<dyn KeyValueStore>>,
    default_city: String,
    last_token: u64,
    pending: Option<PendingRequest>,
    last_city: Option<String>,
    listeners: Vec<StateListener>,
}

impl<S: ForecastSource> FetchController<S> {
    pub fn new(
        source: Arc<S>,
        history: SearchHistory,
        runtime: Handle,
    ) -> (Self, mpsc::UnboundedReceiver<FetchMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            source,
            runtime,
            tx,
            state: FetchState::Idle,
            history,
            store: None,
            default_city: DEFAULT_CITY.to_string(),
            last_token: 0,
            pending: None,
            last_city: None,
            listeners: Vec::new(),
        };
        (controller, rx)
    }

    /// Persist the history to `store` after every change.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_default_city(mut self, city: impl Into<String>) -> Self {
        self.default_city = city.into();
        self
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn default_city(&self) -> &str {
        &self.default_city
    }

    /// City of the fetch currently awaited, if any.
    pub fn pending_city(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.city.as_str())
    }

    pub fn last_city(&self) -> Option<&str> {
        self.last_city.as_deref()
    }

    /// Register a callback invoked with the new state after every transition.
    pub fn subscribe(&mut self, listener: impl FnMut(&FetchState) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Get weather for `city`, from history when possible.
    pub fn request(&mut self, city: &str) -> RequestOutcome {
        let city = city.trim();
        if city.is_empty() {
            tracing::debug!("Ignoring blank search");
            return RequestOutcome::Ignored;
        }
        self.last_city = Some(city.to_string());

        if let Some(cached) = self.history.lookup(city).cloned() {
            tracing::debug!("History hit for {:?}, skipping network", city);
            self.pending = None;
            if self.history.promote(city) {
                self.persist_history();
            }
            self.transition(FetchState::Succeeded(cached));
            return RequestOutcome::CacheHit;
        }

        RequestOutcome::Dispatched(self.dispatch(city))
    }

    /// Like [`request`](Self::request) but always goes to the network.
    pub fn refresh(&mut self, city: &str) -> RequestOutcome {
        let city = city.trim();
        if city.is_empty() {
            return RequestOutcome::Ignored;
        }
        self.last_city = Some(city.to_string());
        RequestOutcome::Dispatched(self.dispatch(city))
    }

    pub fn reset_to_default(&mut self) -> RequestOutcome {
        let city = self.default_city.clone();
        self.request(&city)
    }

    /// Re-issue the most recently requested city.
    pub fn retry(&mut self) -> RequestOutcome {
        match self.last_city.clone() {
            Some(city) => self.request(&city),
            None => RequestOutcome::Ignored,
        }
    }

    /// Request the city at the top of the history.
    pub fn replay_latest(&mut self) -> RequestOutcome {
        match self.history.latest().map(|e| e.city.clone()) {
            Some(city) => self.request(&city),
            None => RequestOutcome::Ignored,
        }
    }

    fn dispatch(&mut self, city: &str) -> RequestToken {
        self.last_token += 1;
        let token = RequestToken(self.last_token);
        self.pending = Some(PendingRequest {
            token,
            city: city.to_string(),
        });
        tracing::info!("Requesting forecast for {:?} ({:?})", city, token);
        self.transition(FetchState::Loading);

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let city = city.to_string();
        self.runtime.spawn(async move {
            let result = source.fetch_forecast(&city).await;
            if tx
                .send(FetchMessage::FetchDone {
                    token,
                    city,
                    result,
                })
                .is_err()
            {
                tracing::debug!("Controller gone before fetch {:?} completed", token);
            }
        });

        token
    }

    fn is_current(&self, token: RequestToken) -> bool {
        self.pending.as_ref().is_some_and(|p| p.token == token)
    }

    fn accept(&mut self, token: RequestToken) -> bool {
        if self.is_current(token) {
            self.pending = None;
            true
        } else {
            tracing::debug!("Discarding stale completion {:?}", token);
            false
        }
    }

    /// Complete the pending fetch with a result. Returns false for stale tokens.
    pub fn resolve(&mut self, token: RequestToken, city: &str, result: ForecastResult) -> bool {
        if !self.accept(token) {
            return false;
        }
        self.history.insert(city, result.clone());
        self.persist_history();
        self.transition(FetchState::Succeeded(result));
        true
    }

    /// Fail the pending fetch. The history is left untouched.
    pub fn reject(&mut self, token: RequestToken, message: impl Into<String>) -> bool {
        if !self.accept(token) {
            return false;
        }
        self.transition(FetchState::Failed(message.into()));
        true
    }

    /// Route a completed fetch to `resolve` or `reject`.
    pub fn apply(&mut self, message: FetchMessage) -> bool {
        match message {
            FetchMessage::FetchDone {
                token,
                city,
                result: Ok(data),
            } => self.resolve(token, &city, data),
            FetchMessage::FetchDone {
                token,
                city,
                result: Err(e),
            } => {
                if self.is_current(token) {
                    tracing::error!("Failed to fetch weather for {:?}: {}", city, e);
                }
                self.reject(token, e.failure_message())
            }
        }
    }

    pub fn remove_history(&mut self, id: u64) -> bool {
        let removed = self.history.remove(id);
        if removed {
            self.persist_history();
        }
        removed
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist_history();
    }

    fn transition(&mut self, next: FetchState) {
        tracing::debug!(
            "Fetch state {} -> {}",
            self.state.status().as_str(),
            next.status().as_str()
        );
        self.state = next;
        for listener in self.listeners.iter_mut() {
            listener(&self.state);
        }
    }

    fn persist_history(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = save_history(store.as_ref(), &self.history) {
                tracing::warn!("Failed to save search history: {}", e);
            }
        }
    }
}
