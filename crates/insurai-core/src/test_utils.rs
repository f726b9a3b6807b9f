//! Test utilities for insurai-core
//!
//! This module provides a mock analysis API server that can be used for
//! development and integration tests. It answers `POST /analyze` with a
//! configurable status and body, and records what it was sent.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use tokio::sync::oneshot;

use crate::backend::DEMO_PASSWORD_HEADER;
use crate::models::AnalysisResult;

/// Canned response for the mock server
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    /// How long to wait before answering
    pub delay: Duration,
}

impl MockResponse {
    /// 200 with the given result as JSON
    pub fn ok(result: &AnalysisResult) -> Self {
        Self {
            status: 200,
            body: serde_json::to_string(result).unwrap(),
            delay: Duration::ZERO,
        }
    }

    /// Any status with a raw body
    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

struct MockState {
    response: Mutex<MockResponse>,
    hits: AtomicUsize,
    last_password: Mutex<Option<String>>,
    last_body: Mutex<Option<serde_json::Value>>,
}

/// Mock analysis API server for testing and development
pub struct MockAnalysisServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockAnalysisServer {
    /// Start the mock server on an available port
    pub async fn start(response: MockResponse) -> Self {
        let state = Arc::new(MockState {
            response: Mutex::new(response),
            hits: AtomicUsize::new(0),
            last_password: Mutex::new(None),
            last_body: Mutex::new(None),
        });

        let app = Router::new()
            .route("/analyze", post(handle_analyze))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of `/analyze` requests received
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// `X-Demo-Password` header of the most recent request
    pub fn last_password(&self) -> Option<String> {
        self.state.last_password.lock().unwrap().clone()
    }

    /// JSON body of the most recent request
    pub fn last_body(&self) -> Option<serde_json::Value> {
        self.state.last_body.lock().unwrap().clone()
    }

    /// Change the canned response for subsequent requests
    pub fn set_response(&self, response: MockResponse) {
        *self.state.response.lock().unwrap() = response;
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAnalysisServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Analysis endpoint
async fn handle_analyze(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_password.lock().unwrap() = headers
        .get(DEMO_PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_body.lock().unwrap() = serde_json::from_str(&body).ok();

    let response = state.response.lock().unwrap().clone();
    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        response.body,
    )
        .into_response()
}
