//! Raw evidence records as they appear in the evidence database.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single OS key's evidence, exactly as the analyst wrote it.
///
/// Records come in a nested shape (`niap.status`, `fips.cmvp_modules`, ...)
/// and an older flat shape (`niap_status`, `fips_cert_ids`, ...). The record
/// stays untyped so that one malformed field never poisons the rest; typed
/// views are produced by [`normalize`](super::normalize).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceRecord(Map<String, Value>);

impl EvidenceRecord {
    /// Build a record from any JSON value. Non-objects yield an empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self(fields),
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Top-level field lookup. `null` counts as absent.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Field lookup one level down (`section.key`).
    ///
    /// Absent when the section is missing or is not an object.
    pub fn nested(&self, section: &str, key: &str) -> Option<&Value> {
        self.field(section)?
            .as_object()?
            .get(key)
            .filter(|v| !v.is_null())
    }
}

/// The evidence database: OS key to evidence record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceDatabase(BTreeMap<String, Value>);

impl EvidenceDatabase {
    /// Build a database from a parsed JSON document.
    ///
    /// Anything other than a top-level object yields an empty database.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(entries) => Self(entries.into_iter().collect()),
            _ => Self::default(),
        }
    }

    /// Evidence for one OS key, or an empty record when none is on file.
    pub fn record(&self, os_key: &str) -> EvidenceRecord {
        self.0
            .get(os_key)
            .cloned()
            .map(EvidenceRecord::from_value)
            .unwrap_or_default()
    }

    /// All records, ordered by OS key.
    pub fn records(&self) -> impl Iterator<Item = (&str, EvidenceRecord)> + '_ {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), EvidenceRecord::from_value(value.clone())))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
