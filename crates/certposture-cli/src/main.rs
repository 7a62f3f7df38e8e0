//! CLI entry point for certposture.
//!
//! Thin by design: argument parsing, artifact paths, output and exit codes.
//! All decision logic lives in `certposture-core`.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use certposture_core::{
    artifacts, check_links, evaluate_artifacts, OsFacts, PipelinePaths, PostureError,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Exit code for usage errors (no resolvable OS key).
const EXIT_USAGE: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "certposture",
    version,
    about = "Compliance-posture scoring from certification evidence and host FIPS facts"
)]
struct Cli {
    /// Pipeline root; default artifact paths are resolved under it.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Verbose logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score an OS key's evidence and write the report.
    Score {
        /// OS key such as "debian-13"; defaults to the detected key.
        os_key: Option<String>,

        /// Evidence database [default: <root>/data/cert_evidence.json].
        #[arg(long)]
        evidence: Option<PathBuf>,

        /// OS facts artifact [default: <root>/out/os_facts.json].
        #[arg(long)]
        os_facts: Option<PathBuf>,

        /// Host FIPS facts artifact [default: <root>/out/host_fips.json].
        #[arg(long)]
        host_fips: Option<PathBuf>,

        /// Where to write the report [default: <root>/out/cert_status.json].
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check that every evidence URL is http(s).
    Links {
        /// Evidence database [default: <root>/data/cert_evidence.json].
        #[arg(long)]
        evidence: Option<PathBuf>,
    },

    /// Derive the OS key from os-release and write the OS facts artifact.
    Detect {
        /// os-release file to read.
        #[arg(long, default_value = "/etc/os-release")]
        os_release: PathBuf,

        /// Where to write the facts [default: <root>/out/os_facts.json].
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print only the OS key.
        #[arg(long)]
        echo_key: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = PipelinePaths::from_root(&cli.root);
    let result = match cli.command {
        Commands::Score {
            os_key,
            evidence,
            os_facts,
            host_fips,
            out,
        } => {
            let paths = PipelinePaths {
                evidence: evidence.unwrap_or(paths.evidence),
                os_facts: os_facts.unwrap_or(paths.os_facts),
                host_fips: host_fips.unwrap_or(paths.host_fips),
                report: out.unwrap_or(paths.report),
            };
            cmd_score(os_key.as_deref(), &paths)
        }
        Commands::Links { evidence } => cmd_links(evidence.unwrap_or(paths.evidence)),
        Commands::Detect {
            os_release,
            out,
            echo_key,
        } => cmd_detect(os_release, out.unwrap_or(paths.os_facts), echo_key),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_score(os_key: Option<&str>, paths: &PipelinePaths) -> anyhow::Result<ExitCode> {
    let report = match evaluate_artifacts(os_key, paths) {
        Ok(report) => report,
        Err(e @ PostureError::MissingOsKey) => {
            eprintln!("[!] {e}");
            return Ok(ExitCode::from(EXIT_USAGE));
        }
    };

    artifacts::write_json(&paths.report, &report).context("writing score report")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::SUCCESS)
}

fn cmd_links(evidence: PathBuf) -> anyhow::Result<ExitCode> {
    let value = artifacts::read_json(&evidence).context("loading evidence database")?;
    let db = certposture_core::EvidenceDatabase::from_value(value);
    let issues = check_links(&db);

    if issues.is_empty() {
        println!("[✓] All evidence URLs look syntactically OK.");
        return Ok(ExitCode::SUCCESS);
    }

    println!("[!] URL format issues found:");
    for issue in &issues {
        println!("  - {issue}");
    }
    tracing::warn!(count = issues.len(), "evidence URL issues");
    Ok(ExitCode::FAILURE)
}

fn cmd_detect(os_release: PathBuf, out: PathBuf, echo_key: bool) -> anyhow::Result<ExitCode> {
    let contents = fs::read_to_string(&os_release)
        .with_context(|| format!("reading {}", os_release.display()))?;
    let facts = OsFacts::from_os_release(&contents);

    if facts.os_key.is_none() {
        tracing::warn!(path = %os_release.display(), "os-release lacks ID or VERSION_ID");
    }

    artifacts::write_json(&out, &facts).context("writing OS facts")?;

    if echo_key {
        println!("{}", facts.os_key.as_deref().unwrap_or(""));
    } else {
        println!("{}", serde_json::to_string_pretty(&facts)?);
    }
    Ok(ExitCode::SUCCESS)
}
