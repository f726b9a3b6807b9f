//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Policy analysis and result rendering
//! - `core` - Shared utilities (load_config, open_store)
//! - `quota` - Daily live analysis usage
//! - `settings` - Sample policy and effective configuration

pub mod analyze;
pub mod core;
pub mod quota;
pub mod settings;

// Re-export command functions for main.rs
pub use analyze::*;
pub use core::*;
pub use quota::*;
pub use settings::*;

/// Mask a secret for display
pub fn mask(secret: &str) -> String {
    "*".repeat(secret.chars().count().min(8))
}
