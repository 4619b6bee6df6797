//! bugverify - skeptical verification of bug-hunt reports
//!
//! ## Commands
//!
//! - `verify`: verify a report file (or the newest `*.json` in a directory)
//! - `rules`: print the rule table and effective config
//!
//! ## Exit codes
//!
//! - `0`: verification completed
//! - `1`: verification confidence below `--min-confidence`
//! - `2`: fatal error (unreadable or malformed report, invalid config)

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::{info, Level};

use bugverify_core::{
    render_verification_md, verify_report, verify_report_concurrent,
    write_verification_artifact, AggregateReport, PatternRuleSet, RawReport, VerificationArtifact,
    VerificationContext, VerifierConfig,
};

#[derive(Parser)]
#[command(name = "bugverify")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Skeptical verification of bug-hunt reports", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a bug-hunt report
    Verify {
        /// Report file, or a directory whose newest *.json report is used
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Verifier config file (TOML, or JSON with a .json extension)
        #[arg(short, long, env = "BUGVERIFY_CONFIG")]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Write <dir>/<run-id>/verification.json with an integrity digest
        #[arg(long)]
        artifacts_dir: Option<PathBuf>,

        /// Verify bugs on concurrent tasks
        #[arg(long)]
        concurrent: bool,

        /// Exit with status 1 when overall confidence is below this value
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Run identifier (default: random UUID)
        #[arg(long)]
        run_id: Option<String>,
    },

    /// Print the rule table and effective config as JSON
    Rules {
        /// Verifier config file
        #[arg(short, long, env = "BUGVERIFY_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    bugverify_core::init_tracing(cli.json, level);

    match run(cli.command).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

async fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Verify {
            path,
            config,
            format,
            artifacts_dir,
            concurrent,
            min_confidence,
            run_id,
        } => {
            let run_id = run_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let config = load_config(config.as_deref())?;
            let report_path = resolve_report_path(&path)?;
            let report = cmd_verify(&report_path, &run_id, config, concurrent).await?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Markdown => print!("{}", render_verification_md(&report)),
            }

            if let Some(dir) = artifacts_dir {
                let artifact = VerificationArtifact::new(
                    run_id.as_str(),
                    Some(report_path.display().to_string()),
                    report.clone(),
                );
                let written = write_verification_artifact(&artifact, &dir)
                    .with_context(|| format!("write artifact under {}", dir.display()))?;
                info!(path = %written.display(), "verification artifact written");
            }

            if below_min_confidence(&report, min_confidence) {
                return Ok(ExitCode::from(1));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Rules { config } => {
            let config = load_config(config.as_deref())?;
            let out = json!({
                "rules": PatternRuleSet::standard(),
                "config": config,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn cmd_verify(
    report_path: &Path,
    run_id: &str,
    config: VerifierConfig,
    concurrent: bool,
) -> Result<AggregateReport> {
    info!(path = %report_path.display(), run_id = %run_id, "verifying report");
    let raw = RawReport::load(report_path)
        .with_context(|| format!("load report {}", report_path.display()))?;
    let ctx = VerificationContext::new(run_id).with_config(config);

    let report = if concurrent {
        verify_report_concurrent(Arc::new(ctx), Arc::new(raw)).await?
    } else {
        verify_report(&ctx, &raw)?
    };
    Ok(report)
}

fn load_config(path: Option<&Path>) -> Result<VerifierConfig> {
    match path {
        Some(p) => VerifierConfig::load(p).with_context(|| format!("load config {}", p.display())),
        None => Ok(VerifierConfig::default()),
    }
}

/// A file is used as-is; a directory resolves to its most recently modified
/// `*.json` file (ties broken by file name).
fn resolve_report_path(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(path).with_context(|| format!("read {}", path.display()))? {
        let entry = entry?;
        let candidate = entry.path();
        if !candidate.is_file() || candidate.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        candidates.push((modified, candidate));
    }

    match candidates.into_iter().max() {
        Some((_, latest)) => Ok(latest),
        None => bail!("no *.json report found in {}", path.display()),
    }
}

fn below_min_confidence(report: &AggregateReport, min_confidence: Option<f64>) -> bool {
    match min_confidence {
        Some(min) if report.verification_confidence < min => {
            tracing::warn!(
                confidence = report.verification_confidence,
                min_confidence = min,
                "verification confidence below threshold"
            );
            true
        }
        _ => false,
    }
}
