//! Error types for InsurAI

use std::time::Duration;

use thiserror::Error;

/// Message shown when the policy text is empty or whitespace only
pub const EMPTY_POLICY_MESSAGE: &str = "Please enter policy text to analyze";

/// Fallback message when an error has nothing more specific to say
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to analyze policy. Please try again.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", EMPTY_POLICY_MESSAGE)]
    EmptyPolicy,

    #[error("An analysis is already in progress")]
    Busy,

    #[error(
        "Daily demo limit reached ({allowance} analyses per day). \
         Try again tomorrow, or contact {contact} for extended access."
    )]
    QuotaExhausted { allowance: u32, contact: String },

    #[error("Password Required: {0}")]
    PasswordRequired(String),

    #[error("Invalid Password: {0}")]
    InvalidPassword(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Analysis timed out after {} seconds", whole_or_tenths(.0))]
    Timeout(Duration),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal state error: {0}")]
    State(String),
}

impl Error {
    /// Message suitable for showing to the person who submitted the policy
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

fn whole_or_tenths(duration: &Duration) -> String {
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        format!("{:.1}", duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_policy_message() {
        assert_eq!(Error::EmptyPolicy.to_string(), EMPTY_POLICY_MESSAGE);
    }

    #[test]
    fn test_user_message_falls_back_when_blank() {
        let err = Error::Api {
            status: 502,
            message: "  ".to_string(),
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_timeout_message_in_seconds() {
        assert_eq!(
            Error::Timeout(Duration::from_secs(30)).to_string(),
            "Analysis timed out after 30 seconds"
        );
        assert_eq!(
            Error::Timeout(Duration::from_millis(200)).to_string(),
            "Analysis timed out after 0.2 seconds"
        );
    }

    #[test]
    fn test_quota_message_names_contact() {
        let err = Error::QuotaExhausted {
            allowance: 5,
            contact: "team@example.com".to_string(),
        };
        let msg = err.user_message();
        assert!(msg.contains("5 analyses per day"));
        assert!(msg.contains("team@example.com"));
    }
}
