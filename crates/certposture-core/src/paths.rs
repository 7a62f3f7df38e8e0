//! Artifact locations for a pipeline run.

use std::path::{Path, PathBuf};

/// Default evidence database, relative to the pipeline root.
pub const EVIDENCE_DB: &str = "data/cert_evidence.json";
/// Default OS facts artifact.
pub const OS_FACTS: &str = "out/os_facts.json";
/// Default host FIPS facts artifact.
pub const HOST_FIPS: &str = "out/host_fips.json";
/// Default scoring report.
pub const CERT_STATUS: &str = "out/cert_status.json";

/// Where each stage reads and writes its artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    pub evidence: PathBuf,
    pub os_facts: PathBuf,
    pub host_fips: PathBuf,
    pub report: PathBuf,
}

impl PipelinePaths {
    /// The conventional layout under `root`.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            evidence: root.join(EVIDENCE_DB),
            os_facts: root.join(OS_FACTS),
            host_fips: root.join(HOST_FIPS),
            report: root.join(CERT_STATUS),
        }
    }
}

impl Default for PipelinePaths {
    fn default() -> Self {
        Self::from_root(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_root() {
        let paths = PipelinePaths::from_root("/srv/posture");

        assert_eq!(paths.evidence, Path::new("/srv/posture/data/cert_evidence.json"));
        assert_eq!(paths.os_facts, Path::new("/srv/posture/out/os_facts.json"));
        assert_eq!(paths.host_fips, Path::new("/srv/posture/out/host_fips.json"));
        assert_eq!(paths.report, Path::new("/srv/posture/out/cert_status.json"));
    }
}
