//! Scoring: ordered first-match rules over `(niap, fips_used)`.
//!
//! The rules are evaluated strictly in order and the first match wins, so a
//! NIAP-`current` record with only a FIPS claim lands on rule 3 (5 points),
//! never rule 4. These rules are policy, not a lookup table.

use serde::Serialize;

use crate::status::StatusLevel;

/// One row of the scoring table.
#[derive(Debug, Clone, Copy)]
pub struct ScoreRule {
    /// Stable identifier surfaced in reports.
    pub id: &'static str,
    pub description: &'static str,
    pub score: u8,
    applies: fn(StatusLevel, StatusLevel) -> bool,
}

impl ScoreRule {
    pub fn applies(&self, niap: StatusLevel, fips: StatusLevel) -> bool {
        (self.applies)(niap, fips)
    }
}

/// Score when no rule matches.
pub const DEFAULT_SCORE: u8 = 0;

pub const SCORE_RULES: [ScoreRule; 4] = [
    ScoreRule {
        id: "niap_and_fips_current",
        description: "NIAP current and FIPS current",
        score: 10,
        applies: both_current,
    },
    ScoreRule {
        id: "niap_pending_fips_current",
        description: "NIAP previous or in process, FIPS current",
        score: 8,
        applies: niap_pending_fips_current,
    },
    ScoreRule {
        id: "single_scheme",
        description: "NIAP current, or FIPS current or vendor module",
        score: 5,
        applies: single_scheme,
    },
    ScoreRule {
        id: "claim_only",
        description: "NIAP or FIPS claimed without certification",
        score: 2,
        applies: claim_only,
    },
];

fn both_current(niap: StatusLevel, fips: StatusLevel) -> bool {
    niap == StatusLevel::Current && fips == StatusLevel::Current
}

fn niap_pending_fips_current(niap: StatusLevel, fips: StatusLevel) -> bool {
    fips == StatusLevel::Current && matches!(niap, StatusLevel::Previous | StatusLevel::InProcess)
}

fn single_scheme(niap: StatusLevel, fips: StatusLevel) -> bool {
    niap == StatusLevel::Current || matches!(fips, StatusLevel::Current | StatusLevel::ModuleVendor)
}

fn claim_only(niap: StatusLevel, fips: StatusLevel) -> bool {
    niap == StatusLevel::ClaimOnly || fips == StatusLevel::ClaimOnly
}

/// Outcome of scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub value: u8,
    /// The rule that fired, `None` when the default applied.
    pub rule: Option<&'static str>,
}

/// Score a `(niap, fips_used)` pair against [`SCORE_RULES`].
pub fn score(niap: StatusLevel, fips_used: StatusLevel) -> Score {
    let matched = SCORE_RULES.iter().find(|rule| rule.applies(niap, fips_used));

    tracing::debug!(
        %niap,
        %fips_used,
        rule = matched.map(|r| r.id).unwrap_or("default"),
        "scored evidence"
    );

    match matched {
        Some(rule) => Score {
            value: rule.score,
            rule: Some(rule.id),
        },
        None => Score {
            value: DEFAULT_SCORE,
            rule: None,
        },
    }
}
