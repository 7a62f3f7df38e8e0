//! Host FIPS observations.
//!
//! The host-inspection collaborator writes its facts with loosely typed
//! values (`"true"`/`"false"` strings, `0`/`1` integers). They are decoded
//! here, at the ingestion boundary, into [`HostChecks`]; derivation then
//! works on plain booleans and integers only.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::status::StatusLevel;

/// Decoded host check results. Absent checks decode to `false` / `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostChecks {
    pub openssl_fips_provider_active: bool,
    pub openssl_conf_has_fips_include: bool,
    pub proc_fips_enabled: i64,
    pub kernel_cmdline_fips: i64,
    pub disallowed_algorithms_count: i64,
}

impl HostChecks {
    /// Decode a raw `checks` object. Non-objects decode to all-absent.
    pub fn from_value(value: Option<&Value>) -> Self {
        let empty = Map::new();
        let checks = value.and_then(Value::as_object).unwrap_or(&empty);

        Self {
            openssl_fips_provider_active: decode_flag(checks.get("openssl_fips_provider_active")),
            openssl_conf_has_fips_include: decode_flag(checks.get("openssl_conf_has_fips_include")),
            proc_fips_enabled: decode_count(checks.get("proc_fips_enabled")),
            kernel_cmdline_fips: decode_count(checks.get("kernel_cmdline_fips")),
            disallowed_algorithms_count: decode_count(checks.get("disallowed_algorithms_count")),
        }
    }

    /// Collapse the checks into the signals derivation reasons about.
    pub fn signals(&self) -> FipsSignals {
        let proc = self.proc_fips_enabled == 1;
        let cmdline = self.kernel_cmdline_fips == 1;

        FipsSignals {
            provider_active: self.openssl_fips_provider_active,
            conf_include: self.openssl_conf_has_fips_include,
            kernel_active: proc || cmdline,
            bad_algs: self.disallowed_algorithms_count > 0,
        }
    }
}

/// Boolean enforcement signals derived from [`HostChecks`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FipsSignals {
    pub provider_active: bool,
    pub conf_include: bool,
    pub kernel_active: bool,
    pub bad_algs: bool,
}

/// `"true"` in any case is set; JSON booleans are accepted as-is.
fn decode_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

/// Integers, integral strings and booleans decode; anything else is zero.
fn decode_count(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

/// The host snapshot fields echoed into the report, byte-for-byte as read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshotRecord {
    pub fips_compliant: Value,
    pub checks: Value,
    pub collected_at: Value,
}

/// A host FIPS snapshot, decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct HostFipsSnapshot {
    pub fips_compliant: Option<bool>,
    pub checks: HostChecks,
    /// Parsed collection time, when the collaborator wrote RFC 3339.
    pub collected_at: Option<DateTime<FixedOffset>>,
    record: HostSnapshotRecord,
}

impl HostFipsSnapshot {
    /// Decode a host-fips document.
    ///
    /// Returns `None` for anything that is not a non-empty object: an empty
    /// snapshot means the host was never inspected, not that it was
    /// inspected and found lacking.
    pub fn from_value(value: &Value) -> Option<Self> {
        let fields = value.as_object().filter(|f| !f.is_empty())?;
        let raw = |key: &str| fields.get(key).cloned().unwrap_or(Value::Null);

        let collected_at = match fields.get("collected_at").and_then(Value::as_str) {
            Some(ts) => match DateTime::parse_from_rfc3339(ts) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::debug!(collected_at = ts, error = %e, "collected_at is not RFC 3339");
                    None
                }
            },
            None => None,
        };

        Some(Self {
            fips_compliant: fields.get("fips_compliant").and_then(Value::as_bool),
            checks: HostChecks::from_value(fields.get("checks")),
            collected_at,
            record: HostSnapshotRecord {
                fips_compliant: raw("fips_compliant"),
                checks: raw("checks"),
                collected_at: raw("collected_at"),
            },
        })
    }

    /// True when the collaborator's own `fips_compliant` verdict contradicts
    /// the status derived from its checks. An absent verdict never conflicts.
    pub fn verdict_conflicts_with(&self, derived: StatusLevel) -> bool {
        match self.fips_compliant {
            Some(claimed) => claimed != (derived == StatusLevel::Current),
            None => false,
        }
    }

    /// The raw fields for audit echo.
    pub fn record(&self) -> &HostSnapshotRecord {
        &self.record
    }
}

#[cfg(test)]
impl HostFipsSnapshot {
    /// Build a snapshot directly from decoded checks.
    pub(crate) fn from_checks(checks: HostChecks) -> Self {
        let record = HostSnapshotRecord {
            checks: serde_json::to_value(checks).unwrap_or(Value::Null),
            ..Default::default()
        };
        Self {
            fips_compliant: None,
            checks,
            collected_at: None,
            record,
        }
    }
}

/// Derive the effective FIPS status from host checks.
///
/// First match wins:
/// 1. provider active, corroborated by kernel or config enforcement, and no
///    disallowed algorithms in use: `current`
/// 2. any single signal present: `config_present`
/// 3. otherwise: `none`
pub fn derive_fips_status(checks: &HostChecks) -> StatusLevel {
    let s = checks.signals();

    let status = if s.provider_active && (s.kernel_active || s.conf_include) && !s.bad_algs {
        StatusLevel::Current
    } else if s.provider_active || s.conf_include || s.kernel_active {
        StatusLevel::ConfigPresent
    } else {
        StatusLevel::None
    };

    tracing::debug!(
        provider_active = s.provider_active,
        conf_include = s.conf_include,
        kernel_active = s.kernel_active,
        bad_algs = s.bad_algs,
        %status,
        "derived host fips status"
    );

    status
}
