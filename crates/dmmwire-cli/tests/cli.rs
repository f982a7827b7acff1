use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

const KILO_OHMS: &[u8] = &[
    0x27, 0x3D, 0x42, 0x57, 0x69, 0x75, 0x80, 0x95, 0xA2, 0xB0, 0xC4, 0xD0, 0xE8,
];

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("dmmwire"))
}

fn repo_root() -> PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .parent()
        .and_then(|p| p.parent())
        .expect("repo root")
        .to_path_buf()
}

fn session_bytes() -> Vec<u8> {
    let path = repo_root().join("tests").join("fixtures").join("session.hex");
    let text = fs::read_to_string(path).expect("read session fixture");
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(str::split_whitespace)
        .map(|token| u8::from_str_radix(token, 16).expect("hex byte"))
        .collect()
}

fn write_capture(temp: &TempDir, bytes: &[u8]) -> PathBuf {
    let path = temp.path().join("capture.bin");
    fs::write(&path, bytes).expect("write capture");
    path
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("read").and(contains("decode")));
    cmd().arg("read").arg("--help").assert().success();
}

#[test]
fn long_version_carries_build_id() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(
            contains(concat!("dmmwire ", env!("CARGO_PKG_VERSION"), " (")).and(contains(")")),
        );
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.bin");

    cmd()
        .arg("read")
        .arg(missing)
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn read_capture_prints_readings_and_summary() {
    let temp = TempDir::new().expect("tempdir");
    let capture = write_capture(&temp, &session_bytes());

    cmd()
        .arg("read")
        .arg(capture)
        .assert()
        .success()
        .stdout(
            contains("04.71 kilo Ohms (unknown E8)\n")
                .and(contains("-1.234 AUTO DC mili Volts (unknown E8)\n")),
        )
        .stderr(contains("Meter ON.").and(contains("OK: 4 readings, 2 rejected frames")));
}

#[test]
fn read_from_stdin() {
    cmd()
        .arg("read")
        .arg("-")
        .write_stdin(KILO_OHMS)
        .assert()
        .success()
        .stdout("04.71 kilo Ohms (unknown E8)\n");
}

#[test]
fn quiet_suppresses_notices() {
    let temp = TempDir::new().expect("tempdir");
    let capture = write_capture(&temp, &session_bytes());

    cmd()
        .arg("read")
        .arg(capture)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not().and(contains("Meter ON.").not()));
}

#[test]
fn count_stops_early() {
    let temp = TempDir::new().expect("tempdir");
    let capture = write_capture(&temp, &session_bytes());

    let assert = cmd()
        .arg("read")
        .arg(capture)
        .arg("-n")
        .arg("2")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    assert_eq!(stdout.lines().count(), 2);
}

#[test]
fn json_lines_carry_reading_fields() {
    let temp = TempDir::new().expect("tempdir");
    let capture = write_capture(&temp, KILO_OHMS);

    let assert = cmd()
        .arg("read")
        .arg(capture)
        .arg("--format")
        .arg("json")
        .arg("--raw")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let line: Value = serde_json::from_str(stdout.trim()).expect("valid json");
    assert_eq!(line["display"], "04.71");
    assert_eq!(line["value"], 4.71);
    assert_eq!(
        line["attributes"],
        serde_json::json!(["kilo", "Ohms", "(unknown E8)"])
    );
    assert!(line["received_at"].is_string());
    assert_eq!(
        line["slots"],
        serde_json::json!([0, 7, 13, 2, 7, 9, 5, 0, 5, 2, 0, 4, 0, 8])
    );
}

#[test]
fn strict_fails_when_frames_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let capture = write_capture(&temp, &session_bytes());

    cmd()
        .arg("read")
        .arg(capture)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(contains("2 frame(s) rejected"));
}

#[test]
fn rejected_frames_are_logged_at_warn() {
    let temp = TempDir::new().expect("tempdir");
    let capture = write_capture(&temp, &session_bytes());

    cmd()
        .arg("read")
        .arg(capture)
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(contains("[WARN").and(contains("invalid framing byte 0xF3")));
}

#[test]
fn decode_hex_frame() {
    cmd()
        .arg("decode")
        .args(["27", "3D", "42", "57", "69", "75", "80", "95", "A2", "B0", "C4", "D0", "E8"])
        .assert()
        .success()
        .stdout("04.71 kilo Ohms (unknown E8)\n");
}

#[test]
fn decode_short_frame_fails_with_hint() {
    cmd()
        .arg("decode")
        .arg("27,3D,E8")
        .assert()
        .failure()
        .stderr(contains("short frame").and(contains("hint:")));
}

#[test]
fn decode_rejects_bad_hex() {
    cmd()
        .arg("decode")
        .arg("zz")
        .assert()
        .failure()
        .stderr(contains("invalid byte 'zz'"));
}
