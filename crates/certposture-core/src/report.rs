//! The reconciled report: the single artifact this engine emits.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::evidence::NormalizedEvidence;
use crate::host::{HostFipsSnapshot, HostSnapshotRecord};
use crate::reconcile::{FipsSource, Mismatch, Reconciliation};
use crate::status::StatusLevel;

/// Compliance-posture report for one OS key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledReport {
    pub os_key: String,
    pub score: u8,
    /// Scoring rule that produced `score`; absent when no rule matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_rule: Option<String>,
    pub niap_status_declared: StatusLevel,
    pub fips_status_used: StatusLevel,
    pub fips_status_source: FipsSource,
    pub fips_status_declared: StatusLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fips_status_observed: Option<StatusLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mismatch: Option<Mismatch>,
    pub niap_entries: Vec<String>,
    pub cmvp_modules: Vec<String>,
    /// Host snapshot as collected, or `null` when none was supplied.
    pub host_snapshot: Option<HostSnapshotRecord>,
    pub provenance: Value,
}

/// Assemble the report. Pure: no I/O happens here.
pub fn assemble(
    os_key: &str,
    evidence: NormalizedEvidence,
    reconciliation: &Reconciliation,
    host: Option<&HostFipsSnapshot>,
) -> ReconciledReport {
    ReconciledReport {
        os_key: os_key.to_string(),
        score: reconciliation.score.value,
        score_rule: reconciliation.score.rule.map(str::to_string),
        niap_status_declared: reconciliation.niap_declared,
        fips_status_used: reconciliation.fips_used,
        fips_status_source: reconciliation.source,
        fips_status_declared: reconciliation.fips_declared,
        fips_status_observed: reconciliation.fips_observed,
        mismatch: reconciliation.mismatch,
        niap_entries: evidence.niap_entries,
        cmvp_modules: evidence.cmvp_modules,
        host_snapshot: host.map(|snapshot| snapshot.record().clone()),
        provenance: evidence.provenance,
    }
}
