//! Certification status vocabulary shared by NIAP and FIPS evidence.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A normalized certification status.
///
/// NIAP and FIPS declarations draw from the same small vocabulary.
/// `ConfigPresent` is only ever produced by host derivation: FIPS signals
/// were observed on the host but enforcement is incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Current,
    Previous,
    InProcess,
    ClaimOnly,
    ModuleVendor,
    ConfigPresent,
    #[default]
    None,
}

impl StatusLevel {
    /// Every level, in declaration order.
    pub const ALL: [StatusLevel; 7] = [
        StatusLevel::Current,
        StatusLevel::Previous,
        StatusLevel::InProcess,
        StatusLevel::ClaimOnly,
        StatusLevel::ModuleVendor,
        StatusLevel::ConfigPresent,
        StatusLevel::None,
    ];

    /// Normalize a raw status string.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Anything outside the vocabulary, including the empty string, is `None`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "current" => StatusLevel::Current,
            "previous" => StatusLevel::Previous,
            "in_process" => StatusLevel::InProcess,
            "claim_only" => StatusLevel::ClaimOnly,
            "module_vendor" => StatusLevel::ModuleVendor,
            "config_present" => StatusLevel::ConfigPresent,
            _ => StatusLevel::None,
        }
    }

    /// The canonical wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusLevel::Current => "current",
            StatusLevel::Previous => "previous",
            StatusLevel::InProcess => "in_process",
            StatusLevel::ClaimOnly => "claim_only",
            StatusLevel::ModuleVendor => "module_vendor",
            StatusLevel::ConfigPresent => "config_present",
            StatusLevel::None => "none",
        }
    }
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
