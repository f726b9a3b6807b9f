//! Quota command implementation

use std::sync::Arc;

use anyhow::{Context, Result};
use insurai_core::{AppConfig, QuotaGate, QuotaStatus, QuotaStore};

pub fn cmd_quota(config: &AppConfig, store: Arc<dyn QuotaStore>) -> Result<()> {
    let status = quota_status(config, store)?;

    println!();
    println!("📊 Live Analysis Quota");
    println!("   ─────────────────────────────");
    println!("   Day: {}", status.date.format("%Y-%m-%d"));
    println!("   Used: {} of {}", status.calls_used, status.allowance);
    if status.remaining == 0 {
        println!("   ⚠️  No live analyses left today");
        println!("      Contact {} for extended access", config.contact());
    } else {
        println!("   Remaining: {}", status.remaining);
    }
    if config.demo_mode() {
        println!();
        println!("   💡 Demo mode is active; demo analyses do not use the quota");
    }
    println!();
    Ok(())
}

/// Today's usage, resetting yesterday's count first
pub fn quota_status(config: &AppConfig, store: Arc<dyn QuotaStore>) -> Result<QuotaStatus> {
    QuotaGate::new(store, config.daily_allowance)
        .status()
        .context("Failed to read quota")
}
