//! Normalization of dual-shape evidence records.
//!
//! Each canonical field is resolved by an ordered list of accessor
//! strategies. The first strategy that finds a well-typed value wins; a
//! field missing from every shape falls back to its default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::record::EvidenceRecord;
use crate::status::StatusLevel;

/// Sentinel used when no shape declares a status.
pub const STATUS_ABSENT: &str = "none";

/// An accessor strategy: look in one place, report absence as `None`.
type Accessor<T> = fn(&EvidenceRecord) -> Option<T>;

const NIAP_STATUS: &[Accessor<String>] = &[nested_niap_status, legacy_niap_status];
const FIPS_STATUS: &[Accessor<String>] = &[nested_fips_status, legacy_fips_status];
const NIAP_ENTRIES: &[Accessor<Vec<String>>] = &[nested_pcl_entries, legacy_niap_ids];
const CMVP_MODULES: &[Accessor<Vec<String>>] = &[nested_cmvp_modules, legacy_fips_cert_ids];

fn nested_niap_status(r: &EvidenceRecord) -> Option<String> {
    string_at(r.nested("niap", "status"))
}

fn legacy_niap_status(r: &EvidenceRecord) -> Option<String> {
    string_at(r.field("niap_status"))
}

fn nested_fips_status(r: &EvidenceRecord) -> Option<String> {
    string_at(r.nested("fips", "status"))
}

fn legacy_fips_status(r: &EvidenceRecord) -> Option<String> {
    string_at(r.field("fips_status"))
}

fn nested_pcl_entries(r: &EvidenceRecord) -> Option<Vec<String>> {
    strings_at(r.nested("niap", "pcl_entries"))
}

fn legacy_niap_ids(r: &EvidenceRecord) -> Option<Vec<String>> {
    strings_at(r.field("niap_ids"))
}

fn nested_cmvp_modules(r: &EvidenceRecord) -> Option<Vec<String>> {
    strings_at(r.nested("fips", "cmvp_modules"))
}

fn legacy_fips_cert_ids(r: &EvidenceRecord) -> Option<Vec<String>> {
    strings_at(r.field("fips_cert_ids"))
}

/// Evaluate strategies in priority order; first present result wins.
fn first_present<T>(record: &EvidenceRecord, strategies: &[Accessor<T>]) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy(record))
}

fn string_at(value: Option<&Value>) -> Option<String> {
    value?.as_str().map(str::to_string)
}

/// A list field. Non-string elements are dropped.
fn strings_at(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
    )
}

/// A declared certification status, kept alongside its raw spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredStatus {
    raw: String,
    level: StatusLevel,
}

impl DeclaredStatus {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let level = StatusLevel::parse(&raw);
        Self { raw, level }
    }

    /// The status used when neither record shape declares one.
    pub fn absent() -> Self {
        Self::new(STATUS_ABSENT)
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn level(&self) -> StatusLevel {
        self.level
    }

    /// True when the record declared the field but left it blank.
    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }
}

impl Default for DeclaredStatus {
    fn default() -> Self {
        Self::absent()
    }
}

/// The canonical evidence view consumed by reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvidence {
    pub niap_status: DeclaredStatus,
    pub niap_entries: Vec<String>,
    pub fips_status: DeclaredStatus,
    pub cmvp_modules: Vec<String>,
    /// Opaque provenance object, passed through untouched.
    pub provenance: Value,
}

/// Produce the canonical evidence view for a record.
///
/// Never fails: malformed fields are treated as absent.
pub fn normalize(record: &EvidenceRecord) -> NormalizedEvidence {
    let niap_status = first_present(record, NIAP_STATUS)
        .map(DeclaredStatus::new)
        .unwrap_or_default();
    let fips_status = first_present(record, FIPS_STATUS)
        .map(DeclaredStatus::new)
        .unwrap_or_default();

    let provenance = record
        .field("provenance")
        .filter(|v| v.is_object())
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));

    tracing::debug!(
        niap = %niap_status.level(),
        fips = %fips_status.level(),
        "normalized declared evidence"
    );

    NormalizedEvidence {
        niap_status,
        niap_entries: first_present(record, NIAP_ENTRIES).unwrap_or_default(),
        fips_status,
        cmvp_modules: first_present(record, CMVP_MODULES).unwrap_or_default(),
        provenance,
    }
}
