use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use tempfile::NamedTempFile;

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_simtab"))
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

fn run_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(bin_path())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap_or_else(|e| panic!("failed to spawn {:?} {:?}: {}", bin_path(), args, e));
    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn write_tmp(contents: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    write!(tmp, "{}", contents).unwrap();
    tmp
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn mean_with_default_precision() {
    let tmp = write_tmp("1 2 3\n4 5 6\n7 8 9\n");
    let out = run(&[tmp.path().to_str().unwrap(), "--column", "2", "--stat", "mean"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "2 5.000000\n");
}

#[test]
fn field_count_and_where_filters() {
    let tmp = write_tmp(
        "# Step Temp PotEng KinEng Press Volume\n\
         0 300.0 -10.0 5.0 1.0 100.0\n\
         species Li 0 0.5 1.2 -3.0 0.0\n\
         100 310.0 -11.0 5.2 2.0 101.0\n\
         Pair | 1.0 | 2.0 | 3.0 | 40.0 50.0\n\
         200 290.0 -12.0 4.8 3.0 102.0\n",
    );
    let path = tmp.path().to_str().unwrap();
    let out = run(&[
        path, "--comment", "#", "-n", "6", "-w", "1>0", "-k", "2,6", "-s", "mean,count", "-p", "2",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "2 300.00 2.00\n6 101.50 2.00\n");
}

#[test]
fn empty_selection_exits_with_failure() {
    let tmp = write_tmp("1 2 3\n4 5 6\n");
    let out = run(&[tmp.path().to_str().unwrap(), "--fields", "7", "--column", "1"]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("no records to aggregate"), "stderr: {err}");
    assert!(err.contains("NF==7"), "stderr: {err}");
}

#[test]
fn zero_temperature_point_is_reported_not_fatal() {
    let tmp = write_tmp("1.0e13\n2.0e13\n");
    let out = run(&[
        tmp.path().to_str().unwrap(),
        "--column",
        "1",
        "--stat",
        "helmholtz",
        "--grid",
        "0:200:100",
        "--precision",
        "3",
    ]);
    assert_eq!(out.status.code(), Some(2));
    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "0.000 nan");
    assert!(lines[1].starts_with("100.000 "));
    assert_eq!(stderr(&out).matches("at T = 0 K").count(), 1, "stderr: {}", stderr(&out));
}

#[test]
fn malformed_lines_skipped_on_request() {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(b"1.0 2.0\n\xff\xfe 9.0\n3.0 4.0\n").unwrap();
    let path = tmp.path().to_str().unwrap();

    let out = run(&[path, "--column", "2", "--stat", "sum"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains(":2: malformed line"));

    let out = run(&[path, "--column", "2", "--stat", "sum", "--skip-malformed"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "2 6.000000\n");
    assert!(stderr(&out).contains("skipped 1 malformed lines"));
}

#[test]
fn config_file_with_command_line_override() {
    let data = write_tmp("O 1.0 10.0\nH 2.0 20.0\nO 3.0 30.0\n");
    let config = write_tmp(
        r#"{
            "targets": [{ "column": 2, "statistics": ["sum"] }],
            "group_by": 1,
            "precision": 1
        }"#,
    );
    let out = run(&[
        data.path().to_str().unwrap(),
        "--config",
        config.path().to_str().unwrap(),
        "--stat",
        "mean",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "O 2 2.0\nH 2 2.0\n");
}

#[test]
fn json_output_is_parseable() {
    let tmp = write_tmp("1 2\n3 4\n");
    let out = run(&[tmp.path().to_str().unwrap(), "-k", "1", "-s", "sum,stdev", "--json"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let v: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(v["rows"], 2);
    assert_eq!(v["scalars"][0]["value"]["Ok"], 4.0);
    assert_eq!(v["scalars"][1]["statistic"], "stdev");
}

#[test]
fn reads_standard_input() {
    let out = run_with_stdin(&["--column", "1", "--stat", "sum"], "1.5\n2.5\n");
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "1 4.000000\n");

    let out = run_with_stdin(&["-", "-k", "2", "-s", "max", "-p", "1"], "a 3\nb 7\n");
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "2 7.0\n");
}

#[test]
fn output_file_receives_the_table() {
    let tmp = write_tmp("1 2\n3 4\n");
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("stats.txt");
    let out = run(&[
        tmp.path().to_str().unwrap(),
        "-k",
        "2",
        "-s",
        "mean",
        "-o",
        target.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).is_empty());
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "2 3.000000\n");
}

#[test]
fn planck_override_changes_zpe() {
    let tmp = write_tmp("1.0e13\n3.0e13\n");
    let planck = 6.0e-34;
    let out = run(&[
        tmp.path().to_str().unwrap(),
        "-k",
        "1",
        "-s",
        "zpe",
        "--planck",
        "6.0e-34",
        "--json",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let v: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    let zpe = v["scalars"][0]["value"]["Ok"].as_f64().unwrap();
    let expected = 4.0e13 * 6.022_140_76e23 * planck * 0.5;
    assert!((zpe - expected).abs() <= expected * 1e-12, "{zpe} vs {expected}");
}

#[test]
fn zero_boltzmann_is_rejected() {
    let tmp = write_tmp("1.0e13\n");
    let out = run(&[
        tmp.path().to_str().unwrap(),
        "-k",
        "1",
        "-s",
        "helmholtz",
        "--grid",
        "300:300:1",
        "--boltzmann",
        "0",
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("boltzmann"), "stderr: {}", stderr(&out));
}
