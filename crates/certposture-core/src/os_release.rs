//! OS identification from `os-release`.
//!
//! The canonical OS key is `<id>-<major version>`, e.g. `debian-13` for
//! `ID=debian` / `VERSION_ID="13.1"`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The OS facts artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OsFacts {
    pub os_key: Option<String>,
    pub os_release: BTreeMap<String, String>,
}

impl OsFacts {
    pub fn from_os_release(contents: &str) -> Self {
        let os_release = parse_os_release(contents);
        Self {
            os_key: canonical_os_key(&os_release),
            os_release,
        }
    }
}

/// Parse `KEY=value` lines. Values lose surrounding whitespace and quotes.
pub fn parse_os_release(contents: &str) -> BTreeMap<String, String> {
    contents
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            (
                key.trim().to_string(),
                value.trim().trim_matches('"').to_string(),
            )
        })
        .collect()
}

/// `<id>-<major>` from `ID` and `VERSION_ID`; `None` if either is blank.
pub fn canonical_os_key(facts: &BTreeMap<String, String>) -> Option<String> {
    let id = facts.get("ID")?.trim().to_lowercase();
    let version = facts.get("VERSION_ID")?.trim().to_lowercase();
    if id.is_empty() || version.is_empty() {
        return None;
    }
    let major = version.split('.').next().unwrap_or(version.as_str());
    Some(format!("{id}-{major}"))
}
