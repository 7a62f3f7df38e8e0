use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::{json, Value};
use tempfile::TempDir;

struct Pipeline {
    _tmp: TempDir,
    root: PathBuf,
}

impl Pipeline {
    fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        Self { _tmp: tmp, root }
    }

    fn write(&self, rel: &str, value: &Value) {
        self.write_raw(rel, &serde_json::to_string_pretty(value).unwrap());
    }

    fn write_raw(&self, rel: &str, contents: &str) {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("certposture").unwrap();
        cmd.env_remove("RUST_LOG").arg("--root").arg(&self.root);
        cmd
    }
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout is a JSON report")
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn score_declared_evidence_without_host() {
    let p = Pipeline::new();
    p.write(
        "data/cert_evidence.json",
        &json!({"debian-13": {"niap": {"status": "current"}, "fips": {"status": "current"}}}),
    );

    let output = p.cmd().args(["score", "debian-13"]).assert().success().get_output().stdout.clone();
    let report = stdout_json(&output);

    assert_eq!(report["score"], 10);
    assert_eq!(report["fips_status_used"], "current");
    assert_eq!(report["fips_status_source"], "declared");
    assert_eq!(report["host_snapshot"], Value::Null);
    assert!(report.get("mismatch").is_none());
    assert_eq!(read_json(&p.path("out/cert_status.json")), report);
}

#[test]
fn score_host_observation_overrides_declaration() {
    let p = Pipeline::new();
    p.write("data/cert_evidence.json", &json!({"debian-13": {"fips": {"status": "current"}}}));
    p.write("out/os_facts.json", &json!({"os_key": "debian-13", "os_release": {}}));
    p.write(
        "out/host_fips.json",
        &json!({
            "fips_compliant": false,
            "checks": {
                "openssl_fips_provider_active": "false",
                "openssl_conf_has_fips_include": "false",
                "proc_fips_enabled": 0,
                "kernel_cmdline_fips": 0,
                "disallowed_algorithms_count": 0
            },
            "collected_at": "2025-06-01T12:00:00Z"
        }),
    );

    let output = p.cmd().arg("score").assert().success().get_output().stdout.clone();
    let report = stdout_json(&output);

    assert_eq!(report["os_key"], "debian-13");
    assert_eq!(report["fips_status_observed"], "none");
    assert_eq!(report["fips_status_used"], "none");
    assert_eq!(report["fips_status_source"], "host");
    assert_eq!(report["mismatch"], json!({"declared": "current", "observed": "none"}));
    assert_eq!(report["score"], 0);
    assert_eq!(report["host_snapshot"]["collected_at"], "2025-06-01T12:00:00Z");
}

#[test]
fn score_positional_key_overrides_detected() {
    let p = Pipeline::new();
    p.write(
        "data/cert_evidence.json",
        &json!({
            "debian-13": {"niap_status": "current"},
            "rhel-9": {"niap_status": "claim_only"}
        }),
    );
    p.write("out/os_facts.json", &json!({"os_key": "debian-13", "os_release": {}}));

    let output = p.cmd().args(["score", "rhel-9"]).assert().success().get_output().stdout.clone();
    let report = stdout_json(&output);

    assert_eq!(report["os_key"], "rhel-9");
    assert_eq!(report["score"], 2);
}

#[test]
fn score_without_os_key_exits_2_and_writes_nothing() {
    let p = Pipeline::new();
    p.write("data/cert_evidence.json", &json!({}));

    let output = p.cmd().arg("score").assert().code(2).get_output().stderr.clone();
    let stderr = String::from_utf8_lossy(&output);

    assert_eq!(stderr.matches("No OS key").count(), 1, "stderr: {stderr}");
    assert!(!p.path("out/cert_status.json").exists());
}

#[test]
fn score_malformed_inputs_still_report() {
    let p = Pipeline::new();
    p.write_raw("data/cert_evidence.json", "{ definitely not json");
    p.write_raw("out/host_fips.json", "[]");

    let output = p.cmd().args(["score", "debian-13"]).assert().success().get_output().stdout.clone();
    let report = stdout_json(&output);

    assert_eq!(report["niap_status_declared"], "none");
    assert_eq!(report["fips_status_source"], "declared");
    assert_eq!(report["score"], 0);
    assert_eq!(report["provenance"], json!({}));
}

#[test]
fn score_custom_output_path() {
    let p = Pipeline::new();
    let out = p.path("reports/debian.json");

    p.cmd()
        .args(["score", "debian-13", "--out"])
        .arg(&out)
        .assert()
        .success();

    assert_eq!(read_json(&out)["os_key"], "debian-13");
    assert!(!p.path("out/cert_status.json").exists());
}

#[test]
fn links_clean_database() {
    let p = Pipeline::new();
    p.write(
        "data/cert_evidence.json",
        &json!({"debian-13": {"niap": {"pcl_entries": ["https://www.niap-ccevs.org/p/1"]}}}),
    );

    p.cmd()
        .arg("links")
        .assert()
        .success()
        .stdout(contains("All evidence URLs look syntactically OK"));
}

#[test]
fn links_reports_bad_entries() {
    let p = Pipeline::new();
    p.write(
        "data/cert_evidence.json",
        &json!({
            "debian-13": {"claims": {"urls": ["www.debian.org"]}},
            "rhel-9": {"provenance": {"sources": ["https://access.redhat.com", "file:///tmp/x"]}}
        }),
    );

    p.cmd()
        .arg("links")
        .assert()
        .code(1)
        .stdout(contains("debian-13 :: claims.urls :: www.debian.org"))
        .stdout(contains("rhel-9 :: provenance.sources :: file:///tmp/x"));
}

#[test]
fn links_missing_database_fails() {
    let p = Pipeline::new();

    p.cmd().arg("links").assert().failure().stderr(contains("evidence database"));
}

#[test]
fn detect_writes_os_facts() {
    let p = Pipeline::new();
    p.write_raw("os-release", "NAME=\"Debian GNU/Linux\"\nID=debian\nVERSION_ID=\"13.1\"\n");

    p.cmd()
        .args(["detect", "--echo-key", "--os-release"])
        .arg(p.path("os-release"))
        .assert()
        .success()
        .stdout("debian-13\n");

    let facts = read_json(&p.path("out/os_facts.json"));
    assert_eq!(facts["os_key"], "debian-13");
    assert_eq!(facts["os_release"]["NAME"], "Debian GNU/Linux");
}

#[test]
fn detect_then_score() {
    let p = Pipeline::new();
    p.write_raw("os-release", "ID=rhel\nVERSION_ID=\"9.4\"\n");
    p.write(
        "data/cert_evidence.json",
        &json!({"rhel-9": {"niap": {"status": "in_process"}, "fips": {"status": "current"}}}),
    );

    p.cmd()
        .args(["detect", "--os-release"])
        .arg(p.path("os-release"))
        .assert()
        .success();

    let output = p.cmd().arg("score").assert().success().get_output().stdout.clone();
    assert_eq!(stdout_json(&output)["score"], 8);
}

#[test]
fn detect_missing_os_release_fails() {
    let p = Pipeline::new();

    p.cmd()
        .args(["detect", "--os-release"])
        .arg(p.path("does-not-exist"))
        .assert()
        .failure();
}
