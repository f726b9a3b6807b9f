//! Analyze command implementation and result rendering

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use insurai_core::{
    AnalysisOutcome, AnalysisRequest, AnalysisResult, Analyzer, AppConfig, Jurisdiction,
    PolicyType, QuotaStore, SAMPLE_POLICY,
};

/// Where the policy text comes from
#[derive(Debug, Clone, PartialEq)]
pub enum PolicySource {
    File(PathBuf),
    Text(String),
    Sample,
    Stdin,
}

impl PolicySource {
    pub fn from_args(file: Option<PathBuf>, text: Option<String>, sample: bool) -> Self {
        match (file, text) {
            (Some(path), _) => PolicySource::File(path),
            (None, Some(text)) => PolicySource::Text(text),
            (None, None) if sample => PolicySource::Sample,
            (None, None) => PolicySource::Stdin,
        }
    }

    pub fn read(&self) -> Result<String> {
        match self {
            PolicySource::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
            PolicySource::Text(text) => Ok(text.clone()),
            PolicySource::Sample => Ok(SAMPLE_POLICY.to_string()),
            PolicySource::Stdin => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read policy text from stdin")?;
                Ok(text)
            }
        }
    }
}

/// Per-invocation overrides for `analyze`
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub policy_type: Option<PolicyType>,
    pub jurisdiction: Option<Jurisdiction>,
    pub demo: bool,
    pub json: bool,
}

/// Run one analysis and print the outcome
pub async fn cmd_analyze(
    config: AppConfig,
    store: Arc<dyn QuotaStore>,
    source: &PolicySource,
    options: &AnalyzeOptions,
) -> Result<()> {
    let outcome = run_analysis(config, store, source, options).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcome.result)?);
    } else {
        print!("{}", render_outcome(&outcome));
    }
    Ok(())
}

/// Analyze without printing; failures carry the user-facing message
pub async fn run_analysis(
    mut config: AppConfig,
    store: Arc<dyn QuotaStore>,
    source: &PolicySource,
    options: &AnalyzeOptions,
) -> Result<AnalysisOutcome> {
    if options.demo {
        config.force_demo = true;
    }
    let policy_type = options.policy_type.unwrap_or(config.default_type);
    let jurisdiction = options.jurisdiction.unwrap_or(config.default_jurisdiction);

    let text = source.read()?;
    let analyzer = Analyzer::new(&config, store).context("Failed to set up analyzer")?;

    if !options.json {
        if analyzer.is_demo() {
            println!("🧪 Analyzing {} policy ({}) in demo mode...", policy_type, jurisdiction);
        } else {
            println!(
                "🔍 Analyzing {} policy ({}) with {}...",
                policy_type, jurisdiction, config.api_url
            );
        }
    }

    let request = AnalysisRequest::new(&text, policy_type, jurisdiction);
    analyzer
        .analyze(request)
        .await
        .map_err(|e| anyhow!(e.user_message()))
}

/// Human-readable report for an outcome
pub fn render_outcome(outcome: &AnalysisOutcome) -> String {
    let mut out = String::new();
    out.push('\n');
    if outcome.is_demo() {
        out.push_str("📋 Policy Analysis (demo)\n");
    } else {
        out.push_str("📋 Policy Analysis\n");
    }
    out.push_str("   ─────────────────────────────\n");
    out.push_str(&render_result(&outcome.result));

    if outcome.is_demo() {
        out.push('\n');
        out.push_str("💡 Demo result generated locally. Set a demo password for a live analysis.\n");
    } else if let Some(remaining) = outcome.remaining_calls {
        out.push('\n');
        out.push_str(&format!("   Live analyses left today: {}\n", remaining));
    }
    out
}

/// Render each section that is present in the result
pub fn render_result(result: &AnalysisResult) -> String {
    let mut out = String::new();

    if let Some(coverage) = &result.coverage {
        out.push_str("   Coverage\n");
        if let Some(kind) = &coverage.coverage_type {
            out.push_str(&format!("     Type: {}\n", kind));
        }
        if let Some(amount) = &coverage.coverage_amount {
            out.push_str(&format!("     Amount: {}\n", amount));
        }
        if let Some(serde_json::Value::Object(breakdown)) = &coverage.coverage_breakdown {
            for (key, value) in breakdown {
                out.push_str(&format!("     {}: {}\n", key, display_value(value)));
            }
        }
    }

    if let Some(risk) = result.risk_level {
        out.push_str(&format!(
            "   Risk: {} {}\n",
            risk.indicator(),
            risk.as_str().to_uppercase()
        ));
    }

    if let Some(deductibles) = result.deductibles.as_ref().filter(|d| !d.is_empty()) {
        out.push_str("   Deductibles\n");
        for deductible in deductibles {
            out.push_str(&format!("     • {}\n", deductible));
        }
    }

    if let Some(exclusions) = result.exclusions.as_ref().filter(|e| !e.is_empty()) {
        out.push_str("   Exclusions\n");
        for exclusion in exclusions {
            out.push_str(&format!("     • {}\n", exclusion));
        }
    }

    if let Some(flags) = &result.flags {
        out.push_str("   Flags\n");
        if flags.needs_legal_review {
            out.push_str("     ⚠️  Needs legal review\n");
        }
        if flags.inconsistent_clauses_detected {
            out.push_str("     ⚠️  Inconsistent clauses detected\n");
        }
        if !flags.any() {
            out.push_str("     ✅ No issues detected\n");
        }
    }

    if let Some(actions) = result.required_actions.as_ref().filter(|a| !a.is_empty()) {
        out.push_str("   Recommended actions\n");
        for (i, action) in actions.iter().enumerate() {
            out.push_str(&format!("     {}. {}\n", i + 1, action));
        }
    }

    out
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
