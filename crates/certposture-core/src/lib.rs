//! # certposture-core
//!
//! Deterministic compliance-posture scoring for operating system instances.
//!
//! Declared certification evidence (NIAP, FIPS) is reconciled with
//! host-observed FIPS configuration and mapped to a score:
//!
//! 1. **Normalize** the evidence record, whichever shape it was written in
//! 2. **Derive** an effective FIPS status from the host snapshot, if any
//! 3. **Reconcile** declared and observed FIPS status, noting mismatches
//! 4. **Score** the result with an ordered first-match rule table
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same inputs always produce the same report
//! 2. **Host-authoritative**: A supplied host snapshot always decides the FIPS status used
//! 3. **Never fails on bad evidence**: Malformed fields are treated as absent
//!
//! ## Example
//!
//! ```rust
//! use certposture_core::{evaluate, EvidenceRecord};
//! use serde_json::json;
//!
//! let record = EvidenceRecord::from_value(json!({
//!     "niap": {"status": "current"},
//!     "fips": {"status": "current"}
//! }));
//! let report = evaluate("debian-13", &record, None);
//!
//! assert_eq!(report.score, 10);
//! ```

pub mod artifacts;
pub mod evidence;
pub mod host;
pub mod links;
pub mod os_release;
pub mod paths;
pub mod reconcile;
pub mod report;
pub mod score;
pub mod status;

// Re-export main types at crate root
pub use artifacts::ArtifactError;
pub use evidence::{normalize, DeclaredStatus, EvidenceDatabase, EvidenceRecord, NormalizedEvidence};
pub use host::{derive_fips_status, HostChecks, HostFipsSnapshot, HostSnapshotRecord};
pub use links::{check_links, LinkField, LinkIssue};
pub use os_release::OsFacts;
pub use paths::PipelinePaths;
pub use reconcile::{reconcile, FipsSource, Mismatch, Reconciliation};
pub use report::{assemble, ReconciledReport};
pub use score::{score, Score, ScoreRule, SCORE_RULES};
pub use status::StatusLevel;

use thiserror::Error;

/// Errors that stop an evaluation.
#[derive(Error, Debug)]
pub enum PostureError {
    #[error("No OS key: run OS detection first or pass <os_key>")]
    MissingOsKey,
}

/// Pick the OS key to evaluate.
///
/// An explicitly supplied key wins over the detected one. Blank keys count
/// as missing.
pub fn resolve_os_key(
    explicit: Option<&str>,
    detected: Option<String>,
) -> Result<String, PostureError> {
    explicit
        .map(str::to_string)
        .or(detected)
        .filter(|key| !key.trim().is_empty())
        .ok_or(PostureError::MissingOsKey)
}

/// Evaluate one OS key's evidence against an optional host snapshot.
///
/// This is the main entry point: normalize, reconcile, score, assemble.
pub fn evaluate(
    os_key: &str,
    record: &EvidenceRecord,
    host: Option<&HostFipsSnapshot>,
) -> ReconciledReport {
    let evidence = normalize(record);
    let reconciliation = reconcile(&evidence, host);

    tracing::info!(
        os_key,
        score = reconciliation.score.value,
        fips_used = %reconciliation.fips_used,
        source = ?reconciliation.source,
        "evaluated compliance posture"
    );

    assemble(os_key, evidence, &reconciliation, host)
}

/// Evaluate from the on-disk artifacts named by `paths`.
///
/// Missing or malformed inputs degrade to absent; only an unresolvable OS
/// key is an error. Nothing is written.
pub fn evaluate_artifacts(
    explicit_os_key: Option<&str>,
    paths: &PipelinePaths,
) -> Result<ReconciledReport, PostureError> {
    let os_key = resolve_os_key(
        explicit_os_key,
        artifacts::load_detected_os_key(&paths.os_facts),
    )?;

    let db = artifacts::load_evidence_database(&paths.evidence);
    let record = db.record(&os_key);
    if record.is_empty() {
        tracing::warn!(os_key = %os_key, "no evidence on file for OS key");
    }
    let host = artifacts::load_host_snapshot(&paths.host_fips);

    Ok(evaluate(&os_key, &record, host.as_ref()))
}
