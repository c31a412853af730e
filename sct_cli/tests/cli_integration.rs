use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &tempfile::TempDir, toml: &str) -> PathBuf {
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn sct() -> Command {
    Command::cargo_bin("sct_cli").unwrap()
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["testcomm", "--seed", "1"], 0, "communication test succeeded", "stdout")]
#[case(&["getosccal"], 0, "pre-programmed OSCCAL: 100   current OSCCAL: 61", "stdout")]
#[case(&["getadc"], 0, "0", "stdout")]
#[case(&["getcnt"], 0, "0", "stdout")]
#[case(&["self-check"], 0, "OK", "stdout")]
#[case(&[], 2, "Usage:", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let mut cmd = sct();
    for a in args {
        cmd.arg(a);
    }
    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn runadc_prints_nothing() {
    sct().arg("runadc").assert().success().stdout(predicate::str::is_empty());
}

#[test]
fn measure_reports_a_closed_window() {
    let out = sct().arg("measure").assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out).unwrap();
    let field = |name: &str| -> u32 {
        text.lines()
            .find_map(|l| l.strip_prefix(name))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or_else(|| panic!("missing {name} in {text}"))
    };
    let average = field("average:");
    let accumulated = field("accumulated:");
    let count = field("count:");
    assert!((600..=700).contains(&count), "count {count}");
    assert!((240..=270).contains(&average), "average {average}");
    assert_eq!((accumulated + count / 2) / count, average);
}

#[test]
fn measure_too_early_reads_zeros() {
    sct()
        .args(["measure", "--settle-ms", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("average: 0\naccumulated: 0\ncount: 0"));
}

#[test]
fn json_output_is_one_object_per_result() {
    let out = sct()
        .args(["--json", "getosccal"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let line = String::from_utf8(out).unwrap();
    let v: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(v["command"], "getosccal");
    assert_eq!(v["result"]["factory"], 100);
    assert_eq!(v["result"]["active"], 61);
}

#[test]
fn config_selects_factory_value_and_range() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[device]\nfactory_calibration = 200\n");
    sct()
        .arg("--config")
        .arg(&cfg)
        .arg("getosccal")
        .assert()
        .success()
        .stdout(predicate::str::contains("pre-programmed OSCCAL: 200   current OSCCAL: 150"));
}

#[test]
fn invalid_config_exits_with_code_2() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[window]\ninterval_ms = 0\n");
    sct()
        .arg("--config")
        .arg(&cfg)
        .arg("getadc")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("window.interval_ms must be > 0"));
}

#[test]
fn unparsable_config_is_reported() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[window\n");
    sct()
        .arg("--config")
        .arg(&cfg)
        .arg("getadc")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Could not load the config file"));
}

#[test]
fn invalid_config_json_error() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[device]\ncpu_hz = 0\n");
    let out = sct()
        .arg("--config")
        .arg(&cfg)
        .args(["--json", "getadc"])
        .assert()
        .code(2)
        .get_output()
        .stderr
        .clone();
    let text = String::from_utf8(out).unwrap();
    let last = text.lines().last().unwrap();
    let v: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(v["reason"], "Config");
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    sct()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("getosccal")
        .assert()
        .success()
        .stdout(predicate::str::contains("current OSCCAL: 61"));
}

#[test]
fn file_logging_writes_json_lines() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("sct.log");
    let toml = format!(
        "[logging]\nfile = \"{}\"\nlevel = \"info\"\n",
        log.display().to_string().replace('\\', "\\\\")
    );
    let cfg = write_config(&dir, &toml);
    sct().arg("--config").arg(&cfg).arg("getosccal").assert().success();
    let content = fs::read_to_string(&log).unwrap();
    assert!(content.contains("oscillator calibrated"));
}
