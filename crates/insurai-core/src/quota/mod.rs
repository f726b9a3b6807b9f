//! Daily quota for live analysis calls
//!
//! The gate keeps two persisted values, the calendar day they belong to and
//! the number of live calls made on that day, and resets the count whenever
//! the stored day is not today. Persistence is pluggable through
//! [`QuotaStore`] so tests can use [`MemoryQuotaStore`].

mod sqlite;

pub use sqlite::SqliteQuotaStore;

use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Persistence for the quota counters (get/set date, get/set/increment count)
pub trait QuotaStore: Send + Sync {
    /// Day the stored count belongs to, if any
    fn get_date(&self) -> Result<Option<NaiveDate>>;

    fn set_date(&self, date: NaiveDate) -> Result<()>;

    /// Live calls recorded for the stored day (0 if nothing is stored)
    fn get_calls(&self) -> Result<u32>;

    fn set_calls(&self, calls: u32) -> Result<()>;

    /// Atomically add one call, returning the new count
    fn increment_calls(&self) -> Result<u32>;
}

/// Source of "today" for day-boundary checks
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar day from the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a settable day
#[derive(Debug)]
pub struct FixedClock {
    day: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day: Mutex::new(day),
        }
    }

    pub fn set(&self, day: NaiveDate) {
        let mut current = self.day.lock().unwrap_or_else(|e| e.into_inner());
        *current = day;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.day.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Snapshot of today's quota usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaStatus {
    pub date: NaiveDate,
    pub calls_used: u32,
    pub remaining: u32,
    pub allowance: u32,
}

/// Computes and enforces the daily allowance of live calls
#[derive(Clone)]
pub struct QuotaGate {
    store: Arc<dyn QuotaStore>,
    clock: Arc<dyn Clock>,
    allowance: u32,
}

impl QuotaGate {
    pub fn new(store: Arc<dyn QuotaStore>, allowance: u32) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            allowance,
        }
    }

    /// Replace the system clock (tests pin the day with [`FixedClock`])
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn allowance(&self) -> u32 {
        self.allowance
    }

    /// Live calls still allowed today
    pub fn remaining_calls_today(&self) -> Result<u32> {
        self.roll_over()?;
        let used = self.store.get_calls()?;
        Ok(self.allowance.saturating_sub(used))
    }

    /// Count one successful live call, returning the new remaining count
    pub fn record_call(&self) -> Result<u32> {
        self.roll_over()?;
        let used = self.store.increment_calls()?;
        let remaining = self.allowance.saturating_sub(used);
        debug!(used, remaining, "Recorded live analysis call");
        Ok(remaining)
    }

    pub fn status(&self) -> Result<QuotaStatus> {
        let date = self.roll_over()?;
        let calls_used = self.store.get_calls()?;
        Ok(QuotaStatus {
            date,
            calls_used,
            remaining: self.allowance.saturating_sub(calls_used),
            allowance: self.allowance,
        })
    }

    /// Reset the stored counters if they belong to another day; returns today
    fn roll_over(&self) -> Result<NaiveDate> {
        let today = self.clock.today();
        let stored = self.store.get_date()?;
        if stored != Some(today) {
            info!(
                stored = ?stored,
                today = %today,
                "New quota day, resetting live call count"
            );
            self.store.set_calls(0)?;
            self.store.set_date(today)?;
        }
        Ok(today)
    }
}

/// In-memory quota store
#[derive(Debug, Default)]
pub struct MemoryQuotaStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    date: Option<NaiveDate>,
    calls: u32,
}

impl MemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously stored values
    pub fn with_state(date: NaiveDate, calls: u32) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                date: Some(date),
                calls,
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| Error::State("Failed to acquire quota store lock".into()))
    }
}

impl QuotaStore for MemoryQuotaStore {
    fn get_date(&self) -> Result<Option<NaiveDate>> {
        Ok(self.lock()?.date)
    }

    fn set_date(&self, date: NaiveDate) -> Result<()> {
        self.lock()?.date = Some(date);
        Ok(())
    }

    fn get_calls(&self) -> Result<u32> {
        Ok(self.lock()?.calls)
    }

    fn set_calls(&self, calls: u32) -> Result<()> {
        self.lock()?.calls = calls;
        Ok(())
    }

    fn increment_calls(&self) -> Result<u32> {
        let mut state = self.lock()?;
        state.calls = state.calls.saturating_add(1);
        Ok(state.calls)
    }
}
