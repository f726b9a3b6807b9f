//! Sample and config command implementations

use std::path::Path;

use anyhow::Result;
use insurai_core::config::default_config_path;
use insurai_core::{AppConfig, Jurisdiction, PolicyType, SAMPLE_POLICY};

use super::mask;

pub fn cmd_sample() -> Result<()> {
    println!("{}", SAMPLE_POLICY);
    Ok(())
}

pub fn cmd_config(config: &AppConfig, override_path: Option<&Path>) -> Result<()> {
    print!("{}", render_config(config, override_path));
    Ok(())
}

/// Effective configuration with the credential masked
pub fn render_config(config: &AppConfig, override_path: Option<&Path>) -> String {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(default_config_path);
    let path_line = match &path {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not present)", p.display()),
        None => "(no data directory)".to_string(),
    };

    let password = config
        .demo_password
        .as_deref()
        .map(mask)
        .unwrap_or_else(|| "(not set)".to_string());

    let mode = if config.force_demo {
        "demo (forced)"
    } else if config.demo_mode() {
        "demo (no password)"
    } else {
        "live"
    };

    let types: Vec<&str> = PolicyType::all().iter().map(|t| t.as_str()).collect();
    let jurisdictions: Vec<&str> = Jurisdiction::all().iter().map(|j| j.as_str()).collect();

    let mut out = String::new();
    out.push('\n');
    out.push_str("⚙️  InsurAI Configuration\n");
    out.push_str("   ─────────────────────────────\n");
    out.push_str(&format!("   Override file: {}\n", path_line));
    out.push_str(&format!("   Mode: {}\n", mode));
    out.push_str(&format!("   API URL: {}\n", config.api_url));
    out.push_str(&format!("   Timeout: {}s\n", config.timeout.as_secs()));
    out.push_str(&format!("   Demo password: {}\n", password));
    out.push_str(&format!("   Theme: {}\n", config.theme));
    out.push_str(&format!(
        "   Default policy: {} ({})\n",
        config.default_type,
        types.join(", ")
    ));
    out.push_str(&format!(
        "   Default jurisdiction: {} ({})\n",
        config.default_jurisdiction,
        jurisdictions.join(", ")
    ));
    out.push_str(&format!("   Daily live allowance: {}\n", config.daily_allowance));
    out.push_str(&format!(
        "   Demo delay: {}ms\n",
        config.simulated_delay.as_millis()
    ));
    out.push_str(&format!("   Contact: {}", config.contact_email));
    if let Some(linkedin) = &config.contact_linkedin {
        out.push_str(&format!(" ({})", linkedin));
    }
    out.push('\n');
    out
}
