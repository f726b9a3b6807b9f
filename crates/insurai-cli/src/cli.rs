//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use insurai_core::{Jurisdiction, PolicyType};

/// InsurAI - Understand your insurance policy before you need it
#[derive(Parser)]
#[command(name = "insurai")]
#[command(about = "Insurance policy analyzer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Quota database path (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config override file (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Analysis API base URL (overrides INSURAI_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Demo password for live analysis (overrides INSURAI_DEMO_PASSWORD)
    ///
    /// Without a password every analysis runs in demo mode.
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a policy (reads stdin when no source is given)
    Analyze {
        /// Policy text file
        #[arg(short, long, conflicts_with_all = ["text", "sample"])]
        file: Option<PathBuf>,

        /// Policy text
        #[arg(short, long, conflicts_with = "sample")]
        text: Option<String>,

        /// Analyze the bundled sample health policy
        #[arg(long)]
        sample: bool,

        /// Policy type: health, auto, life, home, travel
        #[arg(long = "type")]
        policy_type: Option<PolicyType>,

        /// Jurisdiction: US, CA, UK, EU, AU
        #[arg(short, long)]
        jurisdiction: Option<Jurisdiction>,

        /// Force demo mode even when a password is configured
        #[arg(long)]
        demo: bool,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the bundled sample policy
    Sample,

    /// Show today's live analysis usage
    Quota,

    /// Show the effective configuration
    Config,
}
