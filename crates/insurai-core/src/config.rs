//! Analyzer configuration
//!
//! ## Configuration Resolution
//!
//! Config is resolved in layers, later layers winning:
//! 1. Embedded defaults (compiled into binary)
//! 2. Override file (`--config` or ~/.local/share/insurai/config.toml)
//! 3. Environment variables (`INSURAI_API_URL`, `INSURAI_DEMO_PASSWORD`,
//!    `INSURAI_FORCE_DEMO`)
//!
//! The CLI applies its own flags on top of the result.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Jurisdiction, PolicyType};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/insurai.toml");

pub const API_URL_ENV: &str = "INSURAI_API_URL";
pub const DEMO_PASSWORD_ENV: &str = "INSURAI_DEMO_PASSWORD";
pub const FORCE_DEMO_ENV: &str = "INSURAI_FORCE_DEMO";

/// Visual theme requested by the embedding page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("Unknown theme '{}'. Expected light or dark", other)),
        }
    }
}

/// Effective configuration for an analyzer
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the analysis API (no trailing slash)
    pub api_url: String,
    /// Upper bound for a single analysis request
    pub timeout: Duration,
    /// Demo password sent as `X-Demo-Password`; `None` means demo mode
    pub demo_password: Option<String>,
    pub theme: Theme,
    pub default_type: PolicyType,
    pub default_jurisdiction: Jurisdiction,
    /// Live calls allowed per calendar day
    pub daily_allowance: u32,
    /// How long a demo analysis pretends to take
    pub simulated_delay: Duration,
    /// Use demo mode even when a password is configured
    pub force_demo: bool,
    pub contact_email: String,
    pub contact_linkedin: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".to_string(),
            timeout: Duration::from_secs(30),
            demo_password: None,
            theme: Theme::Light,
            default_type: PolicyType::Health,
            default_jurisdiction: Jurisdiction::US,
            daily_allowance: 5,
            simulated_delay: Duration::from_millis(1500),
            force_demo: false,
            contact_email: "hello@insurai.app".to_string(),
            contact_linkedin: None,
        }
    }
}

impl AppConfig {
    /// Load configuration: embedded defaults, override file, then environment
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::embedded()?;

        let path = override_path
            .map(Path::to_path_buf)
            .or_else(default_config_path);
        if let Some(path) = path {
            if path.exists() {
                debug!(path = %path.display(), "Loading config override");
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                config.apply_toml(&content)?;
            } else if override_path.is_some() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
        }

        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Defaults compiled into the binary
    pub fn embedded() -> Result<Self> {
        let mut config = Self::default();
        config.apply_toml(DEFAULT_CONFIG)?;
        Ok(config)
    }

    /// Layer a (possibly partial) TOML document over this config
    pub fn apply_toml(&mut self, content: &str) -> Result<()> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        if let Some(api) = raw.api {
            if let Some(url) = api.url {
                self.set_api_url(&url);
            }
            if let Some(secs) = api.timeout_secs {
                self.timeout = Duration::from_secs(secs);
            }
            if let Some(password) = api.demo_password {
                self.set_demo_password(&password);
            }
        }

        if let Some(widget) = raw.widget {
            if let Some(theme) = widget.theme {
                self.theme = theme.parse().map_err(Error::Config)?;
            }
            if let Some(policy_type) = widget.default_type {
                self.default_type = policy_type.parse().map_err(Error::Config)?;
            }
            if let Some(jurisdiction) = widget.default_jurisdiction {
                self.default_jurisdiction = jurisdiction.parse().map_err(Error::Config)?;
            }
        }

        if let Some(demo) = raw.demo {
            if let Some(allowance) = demo.daily_allowance {
                self.daily_allowance = allowance;
            }
            if let Some(ms) = demo.simulated_delay_ms {
                self.simulated_delay = Duration::from_millis(ms);
            }
            if let Some(force) = demo.force {
                self.force_demo = force;
            }
        }

        if let Some(contact) = raw.contact {
            if let Some(email) = contact.email {
                self.contact_email = email;
            }
            if let Some(linkedin) = contact.linkedin {
                self.contact_linkedin = Some(linkedin).filter(|l| !l.trim().is_empty());
            }
        }

        Ok(())
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV) {
            self.set_api_url(&url);
        }
        if let Some(password) = lookup(DEMO_PASSWORD_ENV) {
            self.set_demo_password(&password);
        }
        if let Some(force) = lookup(FORCE_DEMO_ENV) {
            self.force_demo = match force.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                other => {
                    return Err(Error::Config(format!(
                        "{} must be true or false, got '{}'",
                        FORCE_DEMO_ENV, other
                    )))
                }
            };
        }
        Ok(())
    }

    pub fn set_api_url(&mut self, url: &str) {
        self.api_url = url.trim().trim_end_matches('/').to_string();
    }

    /// Set the demo password; an empty value clears it
    pub fn set_demo_password(&mut self, password: &str) {
        self.demo_password = Some(password.to_string()).filter(|p| !p.is_empty());
    }

    /// Whether a demo password is configured
    pub fn has_credential(&self) -> bool {
        self.demo_password.is_some()
    }

    /// Contact line for user-facing messages: email, plus LinkedIn when set
    pub fn contact(&self) -> String {
        match &self.contact_linkedin {
            Some(linkedin) => format!("{} ({})", self.contact_email, linkedin),
            None => self.contact_email.clone(),
        }
    }

    /// Whether analyses run against the local demo backend
    pub fn demo_mode(&self) -> bool {
        self.force_demo || !self.has_credential()
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("insurai").join("config.toml"))
}

/// Default location of the persisted quota counters
pub fn default_state_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("insurai").join("state.db"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    api: Option<RawApi>,
    widget: Option<RawWidget>,
    demo: Option<RawDemo>,
    contact: Option<RawContact>,
}

#[derive(Debug, Deserialize)]
struct RawApi {
    url: Option<String>,
    timeout_secs: Option<u64>,
    demo_password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawWidget {
    theme: Option<String>,
    default_type: Option<String>,
    default_jurisdiction: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDemo {
    daily_allowance: Option<u32>,
    simulated_delay_ms: Option<u64>,
    force: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawContact {
    email: Option<String>,
    linkedin: Option<String>,
}
