//! InsurAI Core Library
//!
//! Shared functionality for the InsurAI insurance policy analyzer:
//! - Request/result data model for the analysis API
//! - Request orchestration with a loading/success/failure lifecycle
//! - Pluggable analysis backends (remote HTTP API, local demo synthesis)
//! - Daily quota for live calls, persisted in SQLite
//! - Layered configuration (embedded defaults, override file, environment)

pub mod analyzer;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod quota;

/// Test utilities including mock analysis API server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analyzer::{AnalysisEvent, AnalysisOutcome, AnalysisState, Analyzer, ResultSource};
pub use backend::{AnalysisBackend, AnalysisClient, DemoBackend, HttpBackend};
pub use config::{AppConfig, Theme};
pub use error::{Error, Result};
pub use models::{
    Amount, AnalysisRequest, AnalysisResult, Coverage, Deductible, Jurisdiction, PolicyFlags,
    PolicyType, RiskLevel, SAMPLE_POLICY,
};
pub use quota::{
    Clock, FixedClock, MemoryQuotaStore, QuotaGate, QuotaStatus, QuotaStore, SqliteQuotaStore,
    SystemClock,
};
