use std::fs;
use std::path::{Path, PathBuf};

use tic_core::{DecoderConfig, ErrorKind, Report, decode_capture_file};

fn golden_dir(case: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("tests")
        .join("golden")
        .join(case)
}

fn load_expected_report(case: &str) -> Report {
    let expected_path = golden_dir(case).join("expected_report.json");
    let expected_json = fs::read_to_string(&expected_path).expect("read expected_report.json");
    serde_json::from_str(&expected_json).expect("parse expected report")
}

fn run_golden(case: &str) {
    let input = golden_dir(case).join("input.tic");
    let expected = load_expected_report(case);

    let mut actual = decode_capture_file(&input, DecoderConfig::default()).expect("decode capture");
    actual.generated_at = expected.generated_at.clone();
    actual.input.path = expected.input.path.clone();

    let actual_value = serde_json::to_value(actual).expect("serialize actual");
    let expected_value = serde_json::to_value(expected).expect("serialize expected");

    assert_eq!(actual_value, expected_value, "golden mismatch in {case}");
}

#[test]
fn golden_historic() {
    run_golden("historic");
}

#[test]
fn golden_standard() {
    run_golden("standard");
}

#[test]
fn golden_noisy() {
    run_golden("noisy");
}

#[test]
fn golden_noisy_has_one_error_of_each_stream_fault() {
    let report = load_expected_report("noisy");
    let kinds: Vec<_> = report.errors.iter().map(|summary| summary.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ErrorKind::Parity,
            ErrorKind::Framing,
            ErrorKind::NameTooLong,
            ErrorKind::ChecksumMismatch,
            ErrorKind::InvalidFieldCount,
        ]
    );
    assert_eq!(report.summary.datasets_truncated, 1);
    assert_eq!(report.datasets.last().map(|d| d.value.as_str()), Some("005"));
}

#[test]
fn golden_standard_keeps_timestamps() {
    let report = load_expected_report("standard");
    let sinsts = report
        .labels
        .iter()
        .find(|label| label.name == "SINSTS")
        .expect("SINSTS label");
    assert_eq!(sinsts.count, 2);
    assert_eq!(sinsts.last_timestamp.as_deref(), Some("e190223132522"));
    assert_eq!(sinsts.last_value, "00310");
}
