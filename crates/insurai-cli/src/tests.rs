//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use insurai_core::test_utils::{MockAnalysisServer, MockResponse};
use insurai_core::{
    AnalysisOutcome, AnalysisResult, AppConfig, Coverage, Deductible, Jurisdiction, PolicyFlags,
    PolicyType, QuotaStore, ResultSource, RiskLevel, SqliteQuotaStore,
};
use tempfile::TempDir;

use crate::cli::{Cli, Commands};
use crate::commands::{self, AnalyzeOptions, PolicySource};

fn temp_store() -> (TempDir, Arc<SqliteQuotaStore>) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteQuotaStore::open(&dir.path().join("state.db")).unwrap());
    (dir, store)
}

fn demo_config() -> AppConfig {
    AppConfig {
        simulated_delay: Duration::ZERO,
        ..AppConfig::default()
    }
}

fn live_config(url: &str) -> AppConfig {
    let mut config = AppConfig {
        timeout: Duration::from_secs(5),
        ..AppConfig::default()
    };
    config.set_api_url(url);
    config.set_demo_password("letmein");
    config
}

fn sample_result() -> AnalysisResult {
    AnalysisResult {
        coverage: Some(Coverage {
            coverage_type: Some("Comprehensive Health".to_string()),
            coverage_amount: Some(insurai_core::Amount::Number(100000.0)),
            coverage_breakdown: Some(serde_json::json!({
                "covered": ["Emergency room visits", "Preventive care"]
            })),
        }),
        risk_level: Some(RiskLevel::Medium),
        deductibles: Some(vec![
            Deductible::Itemized {
                kind: "Annual".to_string(),
                amount: Some(insurai_core::Amount::Text("$1,000".to_string())),
            },
            Deductible::Text("$50 per visit".to_string()),
        ]),
        exclusions: Some(vec!["Cosmetic procedures".to_string()]),
        flags: Some(PolicyFlags::default()),
        required_actions: Some(vec!["Review exclusions".to_string()]),
    }
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_analyze_args() {
    let cli = Cli::try_parse_from([
        "insurai",
        "analyze",
        "--text",
        "Policy",
        "--type",
        "Travel",
        "-j",
        "uk",
        "--json",
    ])
    .unwrap();

    match cli.command {
        Commands::Analyze {
            text,
            policy_type,
            jurisdiction,
            json,
            demo,
            ..
        } => {
            assert_eq!(text.as_deref(), Some("Policy"));
            assert_eq!(policy_type, Some(PolicyType::Travel));
            assert_eq!(jurisdiction, Some(Jurisdiction::UK));
            assert!(json);
            assert!(!demo);
        }
        _ => panic!("expected analyze"),
    }
}

#[test]
fn test_parse_rejects_unknown_policy_type() {
    let result = Cli::try_parse_from(["insurai", "analyze", "--sample", "--type", "pet"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_rejects_two_sources() {
    let result = Cli::try_parse_from(["insurai", "analyze", "--sample", "--text", "Policy"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "insurai",
        "quota",
        "--db",
        "/tmp/state.db",
        "--password",
        "pw",
        "-v",
    ])
    .unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.password.as_deref(), Some("pw"));
    assert!(matches!(cli.command, Commands::Quota));
}

#[test]
fn test_policy_source_from_args() {
    assert_eq!(
        PolicySource::from_args(None, None, true),
        PolicySource::Sample
    );
    assert_eq!(PolicySource::from_args(None, None, false), PolicySource::Stdin);
    assert_eq!(
        PolicySource::from_args(None, Some("x".to_string()), false),
        PolicySource::Text("x".to_string())
    );
}

#[test]
fn test_policy_source_reads_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("policy.txt");
    std::fs::write(&path, "Life policy").unwrap();

    let source = PolicySource::File(path);
    assert_eq!(source.read().unwrap(), "Life policy");

    let missing = PolicySource::File(dir.path().join("missing.txt"));
    assert!(missing.read().unwrap_err().to_string().contains("Failed to read"));
}

// ========== Rendering Tests ==========

#[test]
fn test_render_result_sections() {
    let out = commands::render_result(&sample_result());

    assert!(out.contains("Type: Comprehensive Health"));
    assert!(out.contains("Amount: 100000"));
    assert!(out.contains("covered: Emergency room visits, Preventive care"));
    assert!(out.contains("Risk: 🟡 MEDIUM"));
    assert!(out.contains("• Annual: $1,000"));
    assert!(out.contains("• $50 per visit"));
    assert!(out.contains("• Cosmetic procedures"));
    assert!(out.contains("✅ No issues detected"));
    assert!(out.contains("1. Review exclusions"));
}

#[test]
fn test_render_flags() {
    let result = AnalysisResult {
        risk_level: Some(RiskLevel::High),
        flags: Some(PolicyFlags {
            needs_legal_review: true,
            inconsistent_clauses_detected: false,
        }),
        ..Default::default()
    };
    let out = commands::render_result(&result);
    assert!(out.contains("🔴 HIGH"));
    assert!(out.contains("Needs legal review"));
    assert!(!out.contains("Inconsistent clauses"));
    assert!(!out.contains("No issues detected"));
}

#[test]
fn test_render_skips_missing_sections() {
    let out = commands::render_result(&AnalysisResult::default());
    assert!(out.is_empty());
}

#[test]
fn test_render_outcome_labels_demo() {
    let demo = AnalysisOutcome {
        result: sample_result(),
        source: ResultSource::Demo,
        remaining_calls: None,
    };
    let out = commands::render_outcome(&demo);
    assert!(out.contains("Policy Analysis (demo)"));
    assert!(out.contains("Demo result generated locally"));

    let live = AnalysisOutcome {
        source: ResultSource::Live,
        remaining_calls: Some(3),
        ..demo
    };
    let out = commands::render_outcome(&live);
    assert!(!out.contains("(demo)"));
    assert!(out.contains("Live analyses left today: 3"));
}

#[test]
fn test_render_config_masks_password() {
    let mut config = AppConfig::default();
    config.set_demo_password("hunter2");
    let out = commands::render_config(&config, None);
    assert!(!out.contains("hunter2"));
    assert!(out.contains("*******"));
    assert!(out.contains("Mode: live"));

    let out = commands::render_config(&AppConfig::default(), None);
    assert!(out.contains("Demo password: (not set)"));
    assert!(out.contains("Mode: demo (no password)"));
}

#[test]
fn test_mask() {
    assert_eq!(commands::mask("abc"), "***");
    assert_eq!(commands::mask("a-very-long-password"), "********");
}

// ========== Config Command Tests ==========

#[test]
fn test_load_config_flag_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[api]\nurl = \"http://file.example\"\n").unwrap();

    let config =
        commands::load_config(Some(&path), Some("http://flag.example/"), Some("pw")).unwrap();
    assert_eq!(config.api_url, "http://flag.example");
    assert_eq!(config.demo_password.as_deref(), Some("pw"));
}

#[test]
fn test_load_config_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = commands::load_config(Some(&dir.path().join("nope.toml")), None, None);
    assert!(result.is_err());
}

#[test]
fn test_cmd_sample_and_config() {
    assert!(commands::cmd_sample().is_ok());
    assert!(commands::cmd_config(&AppConfig::default(), None).is_ok());
}

// ========== Quota Command Tests ==========

#[test]
fn test_cmd_quota_fresh_store() {
    let (_dir, store) = temp_store();
    let config = AppConfig::default();

    let status = commands::quota_status(&config, store.clone()).unwrap();
    assert_eq!(status.calls_used, 0);
    assert_eq!(status.remaining, config.daily_allowance);
    assert!(commands::cmd_quota(&config, store).is_ok());
}

#[test]
fn test_cmd_quota_exhausted_today() {
    let (_dir, store) = temp_store();
    store.set_date(Local::now().date_naive()).unwrap();
    store.set_calls(7).unwrap();

    let status = commands::quota_status(&AppConfig::default(), store.clone()).unwrap();
    assert_eq!(status.calls_used, 7);
    assert_eq!(status.remaining, 0);
    assert!(commands::cmd_quota(&AppConfig::default(), store).is_ok());
}

#[test]
fn test_open_store_creates_parent_dirs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("state.db");
    let store = commands::open_store(Some(&path)).unwrap();
    assert_eq!(store.get_calls().unwrap(), 0);
    assert!(path.exists());
}

// ========== Analyze Command Tests ==========

#[tokio::test]
async fn test_analyze_demo_sample() {
    let (_dir, store) = temp_store();
    let outcome = commands::run_analysis(
        demo_config(),
        store.clone(),
        &PolicySource::Sample,
        &AnalyzeOptions::default(),
    )
    .await
    .unwrap();

    assert!(outcome.is_demo());
    assert_eq!(outcome.result.risk_level, Some(RiskLevel::Medium));
    assert_eq!(store.get_calls().unwrap(), 0);
}

#[tokio::test]
async fn test_analyze_empty_text_fails() {
    let (_dir, store) = temp_store();
    let err = commands::run_analysis(
        demo_config(),
        store,
        &PolicySource::Text("   ".to_string()),
        &AnalyzeOptions::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Please enter policy text to analyze");
}

#[tokio::test]
async fn test_analyze_live_end_to_end() {
    let server = MockAnalysisServer::start(MockResponse::ok(&sample_result())).await;
    let (_dir, store) = temp_store();
    let options = AnalyzeOptions {
        policy_type: Some(PolicyType::Home),
        jurisdiction: Some(Jurisdiction::AU),
        json: true,
        ..Default::default()
    };

    commands::cmd_analyze(
        live_config(&server.url()),
        store.clone(),
        &PolicySource::Text("Home policy".to_string()),
        &options,
    )
    .await
    .unwrap();

    assert_eq!(server.hits(), 1);
    assert_eq!(server.last_password().as_deref(), Some("letmein"));
    let body = server.last_body().unwrap();
    assert_eq!(body["policyType"], "home");
    assert_eq!(body["jurisdiction"], "AU");
    assert_eq!(store.get_calls().unwrap(), 1);
}

#[tokio::test]
async fn test_analyze_demo_flag_skips_server() {
    let server = MockAnalysisServer::start(MockResponse::ok(&sample_result())).await;
    let (_dir, store) = temp_store();
    let mut config = live_config(&server.url());
    config.simulated_delay = Duration::ZERO;
    let options = AnalyzeOptions {
        demo: true,
        ..Default::default()
    };

    let outcome = commands::run_analysis(config, store, &PolicySource::Sample, &options)
        .await
        .unwrap();
    assert!(outcome.is_demo());
    assert_eq!(server.hits(), 0);
}

#[tokio::test]
async fn test_analyze_live_error_message() {
    let server = MockAnalysisServer::start(MockResponse::status(
        401,
        r#"{"error": "Demo password required", "message": "Ask us for a password."}"#,
    ))
    .await;
    let (_dir, store) = temp_store();

    let err = commands::run_analysis(
        live_config(&server.url()),
        store.clone(),
        &PolicySource::Sample,
        &AnalyzeOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(err
        .to_string()
        .starts_with("Password Required: Ask us for a password."));
    assert_eq!(store.get_calls().unwrap(), 0);
}

#[tokio::test]
async fn test_analyze_live_quota_exhausted() {
    let server = MockAnalysisServer::start(MockResponse::ok(&sample_result())).await;
    let (_dir, store) = temp_store();
    store.set_date(Local::now().date_naive()).unwrap();
    store.set_calls(5).unwrap();

    let err = commands::run_analysis(
        live_config(&server.url()),
        store,
        &PolicySource::Sample,
        &AnalyzeOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("Daily demo limit reached"));
    assert_eq!(server.hits(), 0);
}
