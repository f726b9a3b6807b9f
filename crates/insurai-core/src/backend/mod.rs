//! Pluggable analysis backend abstraction
//!
//! # Architecture
//!
//! - `AnalysisBackend` trait: the single operation every backend provides
//! - `AnalysisClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `HttpBackend` (the remote API) and `DemoBackend`
//!   (local synthesis with a simulated delay)

mod demo;
mod http;

pub use demo::DemoBackend;
pub use http::{HttpBackend, DEMO_PASSWORD_HEADER};

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::error::Result;
use crate::models::{AnalysisRequest, AnalysisResult};

/// Trait defining the interface for all analysis backends
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Analyze a policy and return the structured result
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult>;

    /// Whether results from this backend are fabricated locally
    fn is_demo(&self) -> bool;

    /// Where requests go (for logging)
    fn host(&self) -> &str;
}

/// Concrete analysis client enum
#[derive(Clone)]
pub enum AnalysisClient {
    /// Remote analysis API
    Http(HttpBackend),
    /// Locally synthesized results
    Demo(DemoBackend),
}

impl AnalysisClient {
    /// Pick the backend the configuration calls for
    ///
    /// Demo mode is used when no password is configured or demo is forced.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        if config.demo_mode() {
            Ok(AnalysisClient::Demo(DemoBackend::new(config.simulated_delay)))
        } else {
            Ok(AnalysisClient::Http(HttpBackend::from_config(config)?))
        }
    }
}

#[async_trait]
impl AnalysisBackend for AnalysisClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        match self {
            AnalysisClient::Http(b) => b.analyze(request).await,
            AnalysisClient::Demo(b) => b.analyze(request).await,
        }
    }

    fn is_demo(&self) -> bool {
        match self {
            AnalysisClient::Http(b) => b.is_demo(),
            AnalysisClient::Demo(b) => b.is_demo(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AnalysisClient::Http(b) => b.host(),
            AnalysisClient::Demo(b) => b.host(),
        }
    }
}
