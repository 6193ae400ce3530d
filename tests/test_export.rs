//! Dashboard snapshot export, plain and gzip.

mod common;

use std::io::Read;

use swachh_sdk::export::{read_report, write_report};

#[test]
fn json_export_is_readable_back() {
    let (sdk, tmp) = common::setup_sample_db();
    let path = tmp.path().join("exports").join("impact.json");

    let view = sdk.export_dashboard(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"wasteCollected\": 20.0"));
    assert!(text.contains("\"recyclingRates\""));

    assert_eq!(read_report(&path).unwrap(), view);
}

#[test]
fn gz_export_is_compressed() {
    let (sdk, tmp) = common::setup_sample_db();
    let path = tmp.path().join("impact.json.gz");
    let view = sdk.dashboard();
    write_report(&path, &view).unwrap();

    let raw = std::fs::read(&path).unwrap();
    assert_eq!(&raw[..2], &[0x1f, 0x8b]);

    let mut decoded = String::new();
    flate2::read::GzDecoder::new(&raw[..])
        .read_to_string(&mut decoded)
        .unwrap();
    assert!(decoded.contains("\"tokensEarned\": 70"));

    assert_eq!(read_report(&path).unwrap(), view);
}

#[test]
fn read_report_of_missing_file_fails() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(read_report(tmp.path().join("nope.json")).is_err());
}
