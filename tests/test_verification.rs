//! Verification reply parsing and image payload handling. No network.

use std::time::Duration;

use swachh_sdk::models::VerificationResult;
use swachh_sdk::verify::{clean_model_text, parse_verification};
use swachh_sdk::{ImagePayload, SwachhError, VisionClient};

const PLAIN: &str = r#"{"wasteType": "plastic bottles", "quantity": "2 kg", "confidence": 0.8}"#;

// ---------------------------------------------------------------------------
// parse_verification
// ---------------------------------------------------------------------------

#[test]
fn parses_plain_json() {
    let result = parse_verification(PLAIN).unwrap();
    assert_eq!(result.waste_type, "plastic bottles");
    assert_eq!(result.quantity, "2 kg");
    assert_eq!(result.confidence, 0.8);
}

#[test]
fn fenced_reply_parses_like_plain_json() {
    let fenced = format!("```json\n{}\n```", PLAIN);
    assert_eq!(parse_verification(&fenced).unwrap(), parse_verification(PLAIN).unwrap());

    let bare_fence = format!("```\n{}\n```\n", PLAIN);
    assert_eq!(parse_verification(&bare_fence).unwrap(), parse_verification(PLAIN).unwrap());
}

#[test]
fn bold_heading_lines_are_dropped() {
    let reply = format!("**Analysis**\n{}", PLAIN);
    assert_eq!(parse_verification(&reply).unwrap().waste_type, "plastic bottles");
    assert_eq!(clean_model_text(&reply), PLAIN);
}

#[test]
fn numeric_quantity_is_accepted() {
    let result =
        parse_verification(r#"{"wasteType": "glass", "quantity": 3, "confidence": 1}"#).unwrap();
    assert_eq!(result.quantity, "3");
    assert_eq!(result.confidence, 1.0);
}

#[test]
fn missing_fields_fail() {
    for reply in [
        r#"{"quantity": "2 kg", "confidence": 0.8}"#,
        r#"{"wasteType": "", "quantity": "2 kg", "confidence": 0.8}"#,
        r#"{"wasteType": "paper", "confidence": 0.8}"#,
        r#"{"wasteType": "paper", "quantity": "", "confidence": 0.8}"#,
        r#"{"wasteType": "paper", "quantity": "1 kg"}"#,
        r#"{"wasteType": "paper", "quantity": "1 kg", "confidence": "high"}"#,
    ] {
        assert!(
            matches!(parse_verification(reply), Err(SwachhError::Verification(_))),
            "accepted {}",
            reply
        );
    }
}

#[test]
fn confidence_outside_unit_interval_fails() {
    let reply = r#"{"wasteType": "metal", "quantity": "1 kg", "confidence": 85}"#;
    assert!(matches!(parse_verification(reply), Err(SwachhError::Verification(_))));
}

#[test]
fn validate_rejects_client_supplied_verdicts_the_parser_would_reject() {
    let verdict = |waste_type: &str, quantity: &str, confidence: f64| VerificationResult {
        waste_type: waste_type.to_string(),
        quantity: quantity.to_string(),
        confidence,
    };

    assert!(verdict("metal", "1 kg", 0.85).validate().is_ok());
    assert!(verdict("metal", "1 kg", 0.0).validate().is_ok());
    assert!(verdict("metal", "1 kg", 1.0).validate().is_ok());

    for bad in [
        verdict("x", "1 kg", 85.0),
        verdict("x", "1 kg", -0.1),
        verdict("  ", "1 kg", 0.5),
        verdict("x", "", 0.5),
    ] {
        assert!(
            matches!(bad.validate(), Err(SwachhError::Verification(_))),
            "{:?} should be rejected",
            bad
        );
    }
}

#[test]
fn prompt_forbids_markup_in_replies() {
    let prompt = swachh_sdk::config::VERIFICATION_PROMPT;
    for rule in [
        "- NO markdown formatting",
        "- NO code blocks or backticks",
        "- NO additional text or explanations",
        "- NO bold text or asterisks",
    ] {
        assert!(prompt.contains(rule), "prompt is missing {:?}", rule);
    }
}

#[test]
fn prose_reply_fails() {
    let reply = "I think this is a pile of plastic bottles, roughly 2 kg.";
    assert!(matches!(parse_verification(reply), Err(SwachhError::Verification(_))));
}

// ---------------------------------------------------------------------------
// ImagePayload
// ---------------------------------------------------------------------------

#[test]
fn data_uri_round_trip_keeps_bytes_and_mime() {
    let image = ImagePayload::new("image/png", vec![0x89, b'P', b'N', b'G', 0, 1, 2]);
    let uri = image.to_data_uri();
    assert!(uri.starts_with("data:image/png;base64,"));
    assert_eq!(ImagePayload::from_data_uri(&uri).unwrap(), image);
}

#[test]
fn malformed_data_uris_are_rejected() {
    for uri in [
        "image/png;base64,AAAA",
        "data:image/png,AAAA",
        "data:text/plain;base64,AAAA",
        "data:image/png;base64,not base64!",
    ] {
        assert!(
            matches!(ImagePayload::from_data_uri(uri), Err(SwachhError::InvalidArgument(_))),
            "accepted {}",
            uri
        );
    }
}

#[test]
fn from_path_infers_mime_from_extension() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("heap.JPG");
    std::fs::write(&path, [0xff, 0xd8, 0xff]).unwrap();

    let image = ImagePayload::from_path(&path).unwrap();
    assert_eq!(image.mime_type, "image/jpeg");
    assert_eq!(image.data, vec![0xff, 0xd8, 0xff]);

    let other = tmp.path().join("notes.txt");
    std::fs::write(&other, "x").unwrap();
    assert!(ImagePayload::from_path(&other).is_err());
}

// ---------------------------------------------------------------------------
// VisionClient
// ---------------------------------------------------------------------------

#[test]
fn client_without_key_fails_without_network() {
    let client = VisionClient::new(
        "http://127.0.0.1:9",
        Some("   ".into()),
        "m",
        Duration::from_secs(1),
    );
    assert!(!client.is_configured());
    let err = client
        .verify(&ImagePayload::new("image/png", vec![1]))
        .unwrap_err();
    assert!(matches!(err, SwachhError::Verification(_)));
}

#[test]
fn unreachable_endpoint_surfaces_http_error_and_releases_guard() {
    let client = VisionClient::new(
        "http://127.0.0.1:9",
        Some("key".into()),
        "m",
        Duration::from_secs(2),
    );
    let err = client
        .verify(&ImagePayload::new("image/png", vec![1]))
        .unwrap_err();
    assert!(matches!(err, SwachhError::Http(_)));
    assert!(!client.is_busy());
}
