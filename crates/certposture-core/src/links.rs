//! URL sanity for the evidence database.
//!
//! A pre-commit gate: every link-bearing list must hold `http(s)://` URLs.
//! Issues are collected across the whole database and reported together.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::evidence::{EvidenceDatabase, EvidenceRecord};

lazy_static! {
    /// Accepted URL prefix.
    pub static ref URL_PATTERN: Regex = Regex::new(r"^https?://").unwrap();
}

/// The list fields that must contain URLs, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkField {
    #[serde(rename = "niap.pcl_entries")]
    NiapPclEntries,
    #[serde(rename = "fips.cmvp_modules")]
    FipsCmvpModules,
    #[serde(rename = "claims.urls")]
    ClaimsUrls,
    #[serde(rename = "provenance.sources")]
    ProvenanceSources,
}

impl LinkField {
    pub const ALL: [LinkField; 4] = [
        LinkField::NiapPclEntries,
        LinkField::FipsCmvpModules,
        LinkField::ClaimsUrls,
        LinkField::ProvenanceSources,
    ];

    fn path(&self) -> (&'static str, &'static str) {
        match self {
            LinkField::NiapPclEntries => ("niap", "pcl_entries"),
            LinkField::FipsCmvpModules => ("fips", "cmvp_modules"),
            LinkField::ClaimsUrls => ("claims", "urls"),
            LinkField::ProvenanceSources => ("provenance", "sources"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkField::NiapPclEntries => "niap.pcl_entries",
            LinkField::FipsCmvpModules => "fips.cmvp_modules",
            LinkField::ClaimsUrls => "claims.urls",
            LinkField::ProvenanceSources => "provenance.sources",
        }
    }
}

impl fmt::Display for LinkField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A list entry that is not a well-formed URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkIssue {
    pub os_key: String,
    pub field: LinkField,
    pub value: String,
}

impl fmt::Display for LinkIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :: {} :: {}", self.os_key, self.field, self.value)
    }
}

/// Check every OS key's link fields. Keys are visited in sorted order.
pub fn check_links(db: &EvidenceDatabase) -> Vec<LinkIssue> {
    db.records()
        .flat_map(|(os_key, record)| check_record(os_key, &record))
        .collect()
}

fn check_record(os_key: &str, record: &EvidenceRecord) -> Vec<LinkIssue> {
    let mut issues = Vec::new();

    for field in LinkField::ALL {
        let (section, key) = field.path();
        let Some(entries) = record.nested(section, key).and_then(Value::as_array) else {
            continue;
        };

        for entry in entries {
            let ok = entry.as_str().is_some_and(|url| URL_PATTERN.is_match(url));
            if !ok {
                let value = match entry {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                issues.push(LinkIssue {
                    os_key: os_key.to_string(),
                    field,
                    value,
                });
            }
        }
    }

    issues
}
