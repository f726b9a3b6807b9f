//! Analysis request orchestration
//!
//! `Analyzer` validates the policy text, picks between the demo backend and
//! the live API, enforces the daily quota for live calls, tracks the state of
//! the current request, and publishes an event when a request finishes.
//!
//! # Usage
//!
//! ```rust,ignore
//! let store = Arc::new(SqliteQuotaStore::open(&path)?);
//! let analyzer = Analyzer::new(&AppConfig::load(None)?, store)?;
//! let mut events = analyzer.subscribe();
//!
//! let request = AnalysisRequest::new(text, PolicyType::Health, Jurisdiction::US);
//! match analyzer.analyze(request).await {
//!     Ok(outcome) => println!("risk: {:?}", outcome.result.risk_level),
//!     Err(e) => eprintln!("{}", e.user_message()),
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::backend::{AnalysisBackend, AnalysisClient};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::models::{AnalysisRequest, AnalysisResult};
use crate::quota::{Clock, QuotaGate, QuotaStore};

/// Capacity of the event channel; slow subscribers miss older events
const EVENT_CAPACITY: usize = 16;

/// Where a result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    /// Synthesized locally
    Demo,
    /// Returned by the analysis API
    Live,
}

/// A finished analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub source: ResultSource,
    /// Live calls left today, reported after a live call
    pub remaining_calls: Option<u32>,
}

impl AnalysisOutcome {
    pub fn is_demo(&self) -> bool {
        self.source == ResultSource::Demo
    }
}

/// State of an analyzer's current (or last) request
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnalysisState {
    #[default]
    Idle,
    Loading,
    Success(AnalysisOutcome),
    Failure(String),
}

impl AnalysisState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AnalysisState::Loading)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisState::Success(outcome) => Some(&outcome.result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AnalysisState::Failure(message) => Some(message),
            _ => None,
        }
    }
}

/// Notification published when a request finishes
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    Completed(AnalysisOutcome),
    Failed { message: String },
}

/// Request orchestrator
pub struct Analyzer {
    client: AnalysisClient,
    quota: QuotaGate,
    contact: String,
    state: Mutex<AnalysisState>,
    events: broadcast::Sender<AnalysisEvent>,
}

impl Analyzer {
    /// Build an analyzer for the given configuration
    pub fn new(config: &AppConfig, store: Arc<dyn QuotaStore>) -> Result<Self> {
        let client = AnalysisClient::from_config(config)?;
        let quota = QuotaGate::new(store, config.daily_allowance);
        Ok(Self::with_client(client, quota, &config.contact()))
    }

    /// Build an analyzer around an explicit client and quota gate
    pub fn with_client(client: AnalysisClient, quota: QuotaGate, contact: &str) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            quota,
            contact: contact.to_string(),
            state: Mutex::new(AnalysisState::Idle),
            events,
        }
    }

    /// Replace the quota gate's clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.quota = self.quota.with_clock(clock);
        self
    }

    /// Receive an event for every finished request
    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisEvent> {
        self.events.subscribe()
    }

    pub fn is_demo(&self) -> bool {
        self.client.is_demo()
    }

    pub fn quota(&self) -> &QuotaGate {
        &self.quota
    }

    /// Snapshot of the current state
    pub fn state(&self) -> Result<AnalysisState> {
        Ok(self.lock_state()?.clone())
    }

    /// Run one analysis
    ///
    /// Rejected with [`Error::Busy`] while another request is in flight.
    /// Empty text fails validation without touching any backend and without
    /// publishing an event; every other failure publishes
    /// [`AnalysisEvent::Failed`].
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisOutcome> {
        {
            let mut state = self.lock_state()?;
            if state.is_loading() {
                warn!("Analysis requested while another is in progress");
                return Err(Error::Busy);
            }
            if !request.has_text() {
                *state = AnalysisState::Failure(Error::EmptyPolicy.user_message());
                return Err(Error::EmptyPolicy);
            }
            *state = AnalysisState::Loading;
        }

        let mut in_flight = InFlight {
            state: &self.state,
            finished: false,
        };

        match self.run(&request).await {
            Ok(outcome) => {
                info!(
                    source = ?outcome.source,
                    risk = ?outcome.result.risk_level,
                    remaining_calls = ?outcome.remaining_calls,
                    "Analysis complete"
                );
                in_flight.finish(AnalysisState::Success(outcome.clone()));
                let _ = self.events.send(AnalysisEvent::Completed(outcome.clone()));
                Ok(outcome)
            }
            Err(e) => {
                let message = e.user_message();
                warn!(error = %message, "Analysis failed");
                in_flight.finish(AnalysisState::Failure(message.clone()));
                let _ = self.events.send(AnalysisEvent::Failed { message });
                Err(e)
            }
        }
    }

    async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome> {
        if self.client.is_demo() {
            let result = self.client.analyze(request).await?;
            return Ok(AnalysisOutcome {
                result,
                source: ResultSource::Demo,
                remaining_calls: None,
            });
        }

        let remaining = self.quota.remaining_calls_today()?;
        if remaining == 0 {
            warn!(
                allowance = self.quota.allowance(),
                "Daily live analysis limit reached"
            );
            return Err(Error::QuotaExhausted {
                allowance: self.quota.allowance(),
                contact: self.contact.clone(),
            });
        }

        let result = self.client.analyze(request).await?;

        // The API already answered; a bookkeeping failure must not discard it.
        let remaining_calls = match self.quota.record_call() {
            Ok(remaining) => Some(remaining),
            Err(e) => {
                warn!(error = %e, "Failed to record live analysis call");
                None
            }
        };

        Ok(AnalysisOutcome {
            result,
            source: ResultSource::Live,
            remaining_calls,
        })
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, AnalysisState>> {
        self.state
            .lock()
            .map_err(|_| Error::State("Failed to acquire analyzer state lock".into()))
    }
}

/// Leaves `Loading` even if the request future is dropped mid-flight
struct InFlight<'a> {
    state: &'a Mutex<AnalysisState>,
    finished: bool,
}

impl InFlight<'_> {
    fn finish(&mut self, next: AnalysisState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.is_loading() {
                *state = AnalysisState::Idle;
            }
        }
    }
}
