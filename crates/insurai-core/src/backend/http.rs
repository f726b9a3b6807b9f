//! HTTP backend for the remote analysis API
//!
//! Sends `POST {api_url}/analyze` with the request as JSON and the demo
//! password in the `X-Demo-Password` header. Non-success responses are
//! turned into specific errors from the API's structured error body when it
//! has one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::models::{AnalysisRequest, AnalysisResult, ApiContact, ApiErrorBody};

use super::AnalysisBackend;

pub const DEMO_PASSWORD_HEADER: &str = "X-Demo-Password";

/// `error` value the API uses when no password was sent
const PASSWORD_REQUIRED_ERROR: &str = "Demo password required";
/// `error` value the API uses when the password is wrong
const INVALID_PASSWORD_ERROR: &str = "Invalid demo password";

/// Remote analysis API client
#[derive(Clone)]
pub struct HttpBackend {
    http_client: Client,
    base_url: String,
    demo_password: String,
    timeout: Duration,
}

impl HttpBackend {
    /// Create a backend; requests are cut off after `timeout`
    pub fn new(base_url: &str, demo_password: Option<&str>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            demo_password: demo_password.unwrap_or_default().to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            &config.api_url,
            config.demo_password.as_deref(),
            config.timeout,
        )
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout(self.timeout)
        } else {
            Error::Http(err)
        }
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let url = format!("{}/analyze", self.base_url);
        debug!(
            url = %url,
            policy_type = %request.policy_type,
            jurisdiction = %request.jurisdiction,
            chars = request.policy_text.len(),
            "Sending analysis request"
        );

        let response = self
            .http_client
            .post(&url)
            .header(DEMO_PASSWORD_HEADER, &self.demo_password)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(error_from_response(status, &body));
        }

        let result: AnalysisResult = serde_json::from_str(&body)?;
        info!(status = status.as_u16(), "Analysis API call succeeded");
        Ok(result)
    }

    fn is_demo(&self) -> bool {
        false
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

/// Turn a non-success response into the most specific error available
pub(crate) fn error_from_response(status: StatusCode, body: &str) -> Error {
    let fallback = || Error::Api {
        status: status.as_u16(),
        message: format!(
            "Analysis failed: {}",
            status.canonical_reason().unwrap_or("Unknown status")
        ),
    };

    let parsed: ApiErrorBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(
                status = status.as_u16(),
                error = %e,
                "Error body is not structured JSON, using status text"
            );
            return fallback();
        }
    };

    let message = parsed
        .message
        .clone()
        .filter(|m| !m.trim().is_empty())
        .or_else(|| parsed.error.clone().filter(|e| !e.trim().is_empty()));

    if status == StatusCode::UNAUTHORIZED {
        // `error` only names the case here, so it never stands in for the message
        let detail = parsed.message.clone().filter(|m| !m.trim().is_empty());
        match parsed.error.as_deref() {
            Some(PASSWORD_REQUIRED_ERROR) => {
                let text = detail.unwrap_or_else(|| {
                    "A demo password is needed for live analysis.".to_string()
                });
                return Error::PasswordRequired(with_contact(text, parsed.contact.as_ref()));
            }
            Some(INVALID_PASSWORD_ERROR) => {
                let text = detail
                    .unwrap_or_else(|| "The demo password was not accepted.".to_string());
                return Error::InvalidPassword(with_contact(text, parsed.contact.as_ref()));
            }
            _ => {}
        }
    }

    match message {
        Some(message) => Error::Api {
            status: status.as_u16(),
            message,
        },
        None => fallback(),
    }
}

fn with_contact(message: String, contact: Option<&ApiContact>) -> String {
    let Some(contact) = contact else {
        return message;
    };
    match (contact.email.as_deref(), contact.linkedin.as_deref()) {
        (Some(email), Some(linkedin)) => format!("{} Contact: {} ({})", message, email, linkedin),
        (Some(email), None) => format!("{} Contact: {}", message, email),
        (None, Some(linkedin)) => format!("{} Contact: {}", message, linkedin),
        (None, None) => message,
    }
}
