use std::path::{Path, PathBuf};
use std::process::Command;

use channel_quality::testing::synthetic;
use serde_json::Value;

const RATE: u32 = 16_000;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_channel_cli"))
}

fn write_capture(dir: &Path, name: &str, noise: f64, seed: u64) -> PathBuf {
    let path = dir.join(name);
    let samples = synthetic::noisy_tone(1000.0, RATE, RATE as usize, 0.5, noise, seed);
    synthetic::write_wav(&path, &samples, RATE).expect("write capture");
    path
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn analyze_prints_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let capture = write_capture(dir.path(), "pro1.wav", 0.02, 1);

    let output = cli()
        .args(["analyze", &path_arg(&capture)])
        .output()
        .expect("failed to run channel_cli analyze");
    assert!(
        output.status.success(),
        "CLI exited with {:?}: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let json: Value = serde_json::from_str(stdout.trim()).expect("report JSON payload");
    assert_eq!(json["name"], "pro1.wav");
    assert_eq!(json["sample_rate"], RATE);
    assert!(json["error"].is_null());
    assert!(json["snr"].as_f64().unwrap_or_default() > 10.0);
}

#[test]
fn analyze_writes_full_output_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let capture = write_capture(dir.path(), "pro2.wav", 0.05, 2);
    let report = dir.path().join("report.json");

    let output = cli()
        .args([
            "analyze",
            &path_arg(&capture),
            "--full",
            "--output",
            &path_arg(&report),
        ])
        .output()
        .expect("failed to run channel_cli analyze --full");
    assert!(output.status.success());

    let json: Value =
        serde_json::from_str(&std::fs::read_to_string(&report).expect("report file"))
            .expect("full JSON payload");
    assert_eq!(json["name"], "pro2.wav");
    assert_eq!(
        json["waveform"]["raw"].as_array().map(Vec::len),
        Some(RATE as usize)
    );
}

#[test]
fn analyze_rejects_inverted_band() {
    let dir = tempfile::tempdir().expect("tempdir");
    let capture = write_capture(dir.path(), "pro4.wav", 0.05, 3);

    let output = cli()
        .args([
            "analyze",
            &path_arg(&capture),
            "--low-cut",
            "500",
            "--high-cut",
            "300",
        ])
        .output()
        .expect("failed to run channel_cli analyze");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("pro4.wav"), "unexpected stderr: {stderr}");
}

#[test]
fn compare_names_cleanest_channel() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pro1 = write_capture(dir.path(), "pro1.wav", 0.1, 4);
    let pro2 = write_capture(dir.path(), "pro2.wav", 0.01, 5);
    let pro4 = write_capture(dir.path(), "pro4.wav", 0.3, 6);

    let output = cli()
        .args([
            "compare",
            "--json",
            &path_arg(&pro1),
            &path_arg(&pro2),
            &path_arg(&pro4),
        ])
        .output()
        .expect("failed to run channel_cli compare");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("compare JSON payload");
    assert_eq!(json["best"], "pro2.wav");
    assert_eq!(json["channels"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["errors"].as_array().map(Vec::len), Some(0));
}

#[test]
fn compare_exits_2_when_nothing_analyzable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let junk = dir.path().join("junk.wav");
    std::fs::write(&junk, b"not audio").expect("write junk");
    let missing = dir.path().join("missing.wav");

    let output = cli()
        .args(["compare", &path_arg(&junk), &path_arg(&missing)])
        .output()
        .expect("failed to run channel_cli compare");
    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert!(stdout.contains("best: none"), "unexpected stdout: {stdout}");
}

#[test]
fn compare_lists_failures_in_argument_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("missing.wav");
    let pro1 = write_capture(dir.path(), "pro1.wav", 0.05, 8);
    let junk = dir.path().join("junk.wav");
    std::fs::write(&junk, b"not audio").expect("write junk");

    let output = cli()
        .args([
            "compare",
            "--json",
            &path_arg(&missing),
            &path_arg(&pro1),
            &path_arg(&junk),
        ])
        .output()
        .expect("failed to run channel_cli compare");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("compare JSON payload");
    assert_eq!(json["errors"][0]["name"], "missing.wav");
    assert_eq!(json["errors"][0]["code"], 4001);
    assert_eq!(json["errors"][1]["name"], "junk.wav");
    assert_eq!(json["best"], "pro1.wav");
}

#[test]
fn synth_writes_decodable_capture() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("synth.wav");

    let output = cli()
        .args([
            "synth",
            &path_arg(&path),
            "--rate",
            "8000",
            "--seconds",
            "0.5",
            "--seed",
            "7",
        ])
        .output()
        .expect("failed to run channel_cli synth");
    assert!(output.status.success());

    let decoded = channel_quality::audio::decode_file(&path).expect("decode synth output");
    assert_eq!(decoded.sample_rate, 8_000);
    assert_eq!(decoded.samples.len(), 4_000);
}
