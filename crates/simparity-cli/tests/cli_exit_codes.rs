//! Exit-code and output contract of the `simparity` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write(root: &Path, step: &str, file: &str, contents: &str) {
    let dir = root.join(step).join("matrix");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), contents).unwrap();
}

/// Reference/candidate pair plus an isolated working directory.
struct Fixture {
    reference: TempDir,
    candidate: TempDir,
    work: TempDir,
}

impl Fixture {
    fn new(candidate_values: &str) -> Self {
        let fx = Self {
            reference: tempfile::tempdir().unwrap(),
            candidate: tempfile::tempdir().unwrap(),
            work: tempfile::tempdir().unwrap(),
        };
        write(fx.reference.path(), "step0000_cycle000010", "velocity.csv", "1.0\n2.0\n3.0\n");
        write(fx.candidate.path(), "step0000_cycle000010", "velocity.csv", candidate_values);
        fx
    }

    fn cmd(&self, subcommand: &str) -> Command {
        let mut cmd = Command::cargo_bin("simparity").unwrap();
        cmd.current_dir(self.work.path())
            .env_remove("RUST_LOG")
            .arg(subcommand)
            .arg("--reference")
            .arg(self.reference.path())
            .arg("--candidate")
            .arg(self.candidate.path());
        cmd
    }
}

#[test]
fn help_works() {
    Command::cargo_bin("simparity").unwrap().arg("--help").assert().success();
}

#[test]
fn compare_identical_runs_exit_zero() {
    let fx = Fixture::new("1.0\n2.0\n3.0\n");
    fx.cmd("compare")
        .assert()
        .code(0)
        .stdout(predicate::str::contains(
            "step0000_cycle000010/velocity.csv: count=3 max_abs=0.000e0 max_rel=0.000e0 oob=0",
        ))
        .stdout(predicate::str::contains("Compared 1 files (missing=0, failures=0)."));
}

#[test]
fn compare_breach_exit_one() {
    let fx = Fixture::new("1.0\n2.0\n999.0\n");
    fx.cmd("compare")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("oob=1"))
        .stdout(predicate::str::contains("failures=1"));
}

#[test]
fn quiet_suppresses_progress() {
    let fx = Fixture::new("1.0\n2.0\n3.0\n");
    fx.cmd("compare").arg("--quiet").assert().code(0).stdout(predicate::str::is_empty());
}

#[test]
fn compare_json_receipt() {
    let fx = Fixture::new("1.0\n2.0\n999.0\n");
    let out = fx.cmd("compare").arg("--json").assert().code(1).get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["summary"]["failure_count"], 1);
    assert_eq!(json["cycles"][0]["cycle"], 10);
}

#[test]
fn empty_reference_exit_two_and_writes_nothing() {
    let fx = Fixture::new("1.0\n");
    let empty = tempfile::tempdir().unwrap();
    let out_csv = fx.work.path().join("cycles.csv");
    let out_steps = fx.work.path().join("steps.csv");

    Command::cargo_bin("simparity")
        .unwrap()
        .current_dir(fx.work.path())
        .arg("report")
        .arg("--reference")
        .arg(empty.path())
        .arg("--candidate")
        .arg(fx.candidate.path())
        .arg("--out-csv")
        .arg(&out_csv)
        .arg("--out-steps-csv")
        .arg(&out_steps)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no step directories found"));

    assert!(!out_csv.exists());
    assert!(!out_steps.exists());
}

#[test]
fn report_writes_tables_and_receipt() {
    let fx = Fixture::new("1.0\n2.0\n999.0\n");
    let out = fx.work.path().join("out");
    fx.cmd("report")
        .arg("--out-csv")
        .arg(out.join("cycles.csv"))
        .arg("--out-steps-csv")
        .arg(out.join("steps.csv"))
        .arg("--receipt")
        .arg(out.join("receipt.json"))
        .arg("--quiet")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Wrote CSV:"));

    let cycles = fs::read_to_string(out.join("cycles.csv")).unwrap();
    assert!(cycles.starts_with("cycle,max_abs,max_rel,out_of_bounds,files_compared\n10,996.0,"));
    let steps = fs::read_to_string(out.join("steps.csv")).unwrap();
    assert!(steps.lines().nth(1).unwrap().starts_with("step0000_cycle000010,10,"));
    assert!(out.join("receipt.json").is_file());
}

#[test]
fn missing_candidate_field_fails_unless_allowed() {
    let fx = Fixture::new("1.0\n2.0\n3.0\n");
    write(fx.reference.path(), "step0000_cycle000010", "energy.csv", "1\n");

    fx.cmd("compare").assert().code(1).stdout(predicate::str::contains("missing=1"));
    fx.cmd("compare").arg("--allow-missing").assert().code(0);
}

#[test]
fn field_filter_limits_comparison() {
    let fx = Fixture::new("1.0\n2.0\n3.0\n");
    write(fx.reference.path(), "step0000_cycle000010", "energy.csv", "1\n");
    write(fx.candidate.path(), "step0000_cycle000010", "energy.csv", "5\n");

    fx.cmd("compare")
        .args(["--fields", "velocity"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Compared 1 files"));
}

#[test]
fn invalid_precision_is_usage_error() {
    let fx = Fixture::new("1.0\n");
    fx.cmd("compare").args(["--precision", "half"]).assert().code(2);
}

#[test]
fn negative_tolerance_is_usage_error() {
    let fx = Fixture::new("1.0\n");
    fx.cmd("compare").arg("--rel-tol=-0.5").assert().code(2);
}

#[test]
fn config_file_in_working_directory_is_used() {
    let fx = Fixture::new("1.0\n2.0\n3.000001\n");
    fx.cmd("compare").assert().code(1);

    fs::write(fx.work.path().join("simparity.toml"), "precision = \"float\"\n").unwrap();
    fx.cmd("compare").assert().code(0);
}

#[test]
fn env_override_beats_config_file() {
    let fx = Fixture::new("1.0\n2.0\n3.000001\n");
    fs::write(fx.work.path().join("simparity.toml"), "precision = \"float\"\n").unwrap();
    fx.cmd("compare").env("SIMPARITY_PRECISION", "double").assert().code(1);
}

#[test]
fn explicit_missing_config_is_usage_error() {
    let fx = Fixture::new("1.0\n");
    fx.cmd("compare").args(["--config", "nope.toml"]).assert().code(2);
}

#[test]
fn config_default_prints_toml() {
    Command::cargo_bin("simparity")
        .unwrap()
        .args(["config", "default"])
        .assert()
        .success()
        .stdout(predicate::str::contains("precision = \"double\""));
}

#[test]
fn speedup_empty_sizes_is_usage_error() {
    let work = tempfile::tempdir().unwrap();
    Command::cargo_bin("simparity")
        .unwrap()
        .current_dir(work.path())
        .args(["speedup", "--reference-bin", "/bin/true", "--candidate-bin", "/bin/true"])
        .args(["--sizes", ","])
        .assert()
        .code(2);
    assert!(!work.path().join("speedup.csv").exists());
}

#[cfg(unix)]
#[test]
fn speedup_writes_csv_from_scripted_binaries() {
    use std::os::unix::fs::PermissionsExt;

    let work = tempfile::tempdir().unwrap();
    let script = |name: &str, elapsed: &str, fom: &str| {
        let path = work.path().join(name);
        let body = format!(
            "#!/bin/sh\necho \"Elapsed time = {elapsed} (s)\"\necho \"FOM = {fom} (z/s)\"\n"
        );
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    };
    let reference = script("ref.sh", "8.0", "100.0");
    let candidate = script("cand.sh", "2.0", "400.0");

    Command::cargo_bin("simparity")
        .unwrap()
        .current_dir(work.path())
        .arg("speedup")
        .arg("--reference-bin")
        .arg(&reference)
        .arg("--candidate-bin")
        .arg(&candidate)
        .args(["--sizes", "30", "--out", "bench/speedup.csv"])
        .assert()
        .code(0);

    let csv = fs::read_to_string(work.path().join("bench").join("speedup.csv")).unwrap();
    assert_eq!(
        csv,
        "size,reference_elapsed_s,candidate_elapsed_s,reference_fom,\
         candidate_fom,speedup_time,speedup_fom\n\
         30,8.0,2.0,100.0,400.0,4.0,4.0\n"
    );
}

#[test]
fn report_help_mentions_plotting() {
    Command::cargo_bin("simparity")
        .unwrap()
        .args(["report", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plots are not rendered"));
}

#[cfg(unix)]
#[test]
fn non_utf8_field_mismatch_fails() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let fx = Fixture::new("1.0\n2.0\n3.0\n");
    let name = OsStr::from_bytes(b"vel\xffocity.csv");
    let pairs = [(fx.reference.path(), "1,2,3\n"), (fx.candidate.path(), "1,2,999\n")];
    for (root, contents) in pairs {
        let dir = root.join("step0000_cycle000010").join("matrix");
        fs::write(dir.join(name), contents).unwrap();
    }

    fx.cmd("compare")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Compared 2 files (missing=0, failures=1)."));
}
