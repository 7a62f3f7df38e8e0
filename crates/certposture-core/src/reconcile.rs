//! Reconciliation of declared evidence with host observation.
//!
//! Policy:
//! 1. With a host snapshot, the observed FIPS status is used, even when it
//!    is `none`. Host observation is authoritative once available.
//! 2. Without one, the declared FIPS status is used.
//! 3. A non-blank declaration that disagrees with the used status is
//!    recorded as a mismatch. Mismatches never change the score.

use serde::{Deserialize, Serialize};

use crate::evidence::NormalizedEvidence;
use crate::host::{derive_fips_status, HostFipsSnapshot};
use crate::score::{score, Score};
use crate::status::StatusLevel;

/// Where the FIPS status used for scoring came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FipsSource {
    Host,
    Declared,
}

/// Declared and observed FIPS statuses that disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    pub declared: StatusLevel,
    pub observed: StatusLevel,
}

/// The engine's decision for one OS key.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub niap_declared: StatusLevel,
    pub fips_declared: StatusLevel,
    /// Derived host status; `None` when no snapshot was supplied.
    pub fips_observed: Option<StatusLevel>,
    pub fips_used: StatusLevel,
    pub source: FipsSource,
    pub mismatch: Option<Mismatch>,
    pub score: Score,
}

/// Reconcile normalized evidence against an optional host snapshot.
pub fn reconcile(evidence: &NormalizedEvidence, host: Option<&HostFipsSnapshot>) -> Reconciliation {
    let niap_declared = evidence.niap_status.level();
    let fips_declared = evidence.fips_status.level();

    let fips_observed = host.map(|snapshot| {
        let observed = derive_fips_status(&snapshot.checks);
        if snapshot.verdict_conflicts_with(observed) {
            tracing::warn!(
                fips_compliant = ?snapshot.fips_compliant,
                %observed,
                collected_at = ?snapshot.collected_at.map(|t| t.to_rfc3339()),
                "host compliance verdict disagrees with its own checks; using checks"
            );
        }
        observed
    });
    let (fips_used, source) = match fips_observed {
        Some(observed) => (observed, FipsSource::Host),
        None => (fips_declared, FipsSource::Declared),
    };

    let mismatch = if !evidence.fips_status.is_blank() && fips_declared != fips_used {
        let mismatch = Mismatch {
            declared: fips_declared,
            observed: fips_observed.unwrap_or_default(),
        };
        tracing::warn!(
            declared = %mismatch.declared,
            observed = %mismatch.observed,
            "declared FIPS status disagrees with host observation"
        );
        Some(mismatch)
    } else {
        None
    };

    Reconciliation {
        niap_declared,
        fips_declared,
        fips_observed,
        fips_used,
        source,
        mismatch,
        score: score(niap_declared, fips_used),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::{normalize, EvidenceRecord};
    use crate::host::HostChecks;
    use proptest::prelude::*;
    use serde_json::json;

    fn evidence(value: serde_json::Value) -> NormalizedEvidence {
        normalize(&EvidenceRecord::from_value(value))
    }

    fn host(checks: HostChecks) -> HostFipsSnapshot {
        HostFipsSnapshot::from_checks(checks)
    }

    fn enforced() -> HostChecks {
        HostChecks {
            openssl_fips_provider_active: true,
            proc_fips_enabled: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_declared_used_without_snapshot() {
        let r = reconcile(&evidence(json!({"fips": {"status": "module_vendor"}})), None);

        assert_eq!(r.fips_used, StatusLevel::ModuleVendor);
        assert_eq!(r.source, FipsSource::Declared);
        assert!(r.fips_observed.is_none());
        assert!(r.mismatch.is_none());
    }

    #[test]
    fn test_observed_none_overrides_declared_current() {
        let r = reconcile(
            &evidence(json!({"fips": {"status": "current"}})),
            Some(&host(HostChecks::default())),
        );

        assert_eq!(r.fips_observed, Some(StatusLevel::None));
        assert_eq!(r.fips_used, StatusLevel::None);
        assert_eq!(r.source, FipsSource::Host);
        assert_eq!(
            r.mismatch,
            Some(Mismatch {
                declared: StatusLevel::Current,
                observed: StatusLevel::None,
            })
        );
        assert_eq!(r.score.value, 0);
    }

    #[test]
    fn test_agreeing_host_has_no_mismatch() {
        let r = reconcile(
            &evidence(json!({"niap": {"status": "current"}, "fips": {"status": "Current"}})),
            Some(&host(enforced())),
        );

        assert_eq!(r.fips_used, StatusLevel::Current);
        assert!(r.mismatch.is_none());
        assert_eq!(r.score.value, 10);
    }

    #[test]
    fn test_absent_declaration_still_reports_mismatch() {
        let r = reconcile(&evidence(json!({})), Some(&host(enforced())));

        assert_eq!(
            r.mismatch,
            Some(Mismatch {
                declared: StatusLevel::None,
                observed: StatusLevel::Current,
            })
        );
        assert_eq!(r.score.value, 5);
    }

    #[test]
    fn test_blank_declaration_suppresses_mismatch() {
        let r = reconcile(&evidence(json!({"fips_status": ""})), Some(&host(enforced())));

        assert_eq!(r.fips_used, StatusLevel::Current);
        assert!(r.mismatch.is_none());
    }

    #[test]
    fn test_conflicting_host_verdict_does_not_override_checks() {
        let snapshot = HostFipsSnapshot::from_value(&json!({
            "fips_compliant": true,
            "checks": {"openssl_conf_has_fips_include": "true"},
            "collected_at": "2025-06-01T12:00:00Z"
        }))
        .unwrap();
        assert!(snapshot.verdict_conflicts_with(StatusLevel::ConfigPresent));

        let r = reconcile(&evidence(json!({"niap_status": "current"})), Some(&snapshot));

        assert_eq!(r.fips_used, StatusLevel::ConfigPresent);
        assert_eq!(r.source, FipsSource::Host);
        assert_eq!(r.score.value, 5);
    }

    #[test]
    fn test_config_present_is_used_and_scores_nothing_extra() {
        let checks = HostChecks {
            openssl_conf_has_fips_include: true,
            ..Default::default()
        };
        let r = reconcile(
            &evidence(json!({"niap_status": "previous", "fips_status": "current"})),
            Some(&host(checks)),
        );

        assert_eq!(r.fips_used, StatusLevel::ConfigPresent);
        assert_eq!(r.score.value, 0);
    }

    fn declared() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just("current".to_string()),
            Just("PREVIOUS".to_string()),
            Just(" in_process ".to_string()),
            Just("claim_only".to_string()),
            Just("module_vendor".to_string()),
            Just("bogus".to_string()),
        ]
    }

    fn checks() -> impl Strategy<Value = HostChecks> {
        (any::<bool>(), any::<bool>(), 0i64..3, 0i64..3, 0i64..4).prop_map(
            |(provider, conf, proc, cmdline, bad)| HostChecks {
                openssl_fips_provider_active: provider,
                openssl_conf_has_fips_include: conf,
                proc_fips_enabled: proc,
                kernel_cmdline_fips: cmdline,
                disallowed_algorithms_count: bad,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_host_always_wins(niap in declared(), fips in declared(), c in checks()) {
            let e = evidence(json!({"niap_status": niap, "fips_status": fips}));
            let r = reconcile(&e, Some(&host(c)));

            prop_assert_eq!(Some(r.fips_used), r.fips_observed);
            prop_assert_eq!(r.source, FipsSource::Host);
        }

        #[test]
        fn prop_declared_used_without_host(niap in declared(), fips in declared()) {
            let e = evidence(json!({"niap_status": niap, "fips_status": fips.clone()}));
            let r = reconcile(&e, None);

            prop_assert_eq!(r.fips_used, StatusLevel::parse(&fips));
            prop_assert!(r.mismatch.is_none());
        }

        #[test]
        fn prop_mismatch_iff_nonblank_disagreement(fips in declared(), c in checks()) {
            let e = evidence(json!({"fips_status": fips.clone()}));
            let r = reconcile(&e, Some(&host(c)));

            let expected = !fips.trim().is_empty() && StatusLevel::parse(&fips) != r.fips_used;
            prop_assert_eq!(r.mismatch.is_some(), expected);
        }
    }
}
