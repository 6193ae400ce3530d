//! Image verification against a generative vision model.
//!
//! The photo is sent inline with a fixed instruction asking for a strict JSON
//! verdict. Models still wrap answers in markdown now and then, so the reply
//! is cleaned before parsing, and anything short of a complete verdict is a
//! verification failure.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use regex::Regex;
use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config;
use crate::error::{Result, SwachhError};
use crate::models::VerificationResult;

// ---------------------------------------------------------------------------
// ImagePayload
// ---------------------------------------------------------------------------

/// Raw image bytes plus their MIME type.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Read an image file, inferring the MIME type from its extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let mime = match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "heic" => "image/heic",
            _ => {
                return Err(SwachhError::InvalidArgument(format!(
                    "Unsupported image type: {}",
                    path.display()
                )))
            }
        };
        Ok(Self::new(mime, std::fs::read(path)?))
    }

    /// Parse a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let invalid = || SwachhError::InvalidArgument("Malformed image data URI".into());
        let rest = uri.trim().strip_prefix("data:").ok_or_else(invalid)?;
        let (header, payload) = rest.split_once(',').ok_or_else(invalid)?;
        let mime = header.strip_suffix(";base64").ok_or_else(invalid)?;
        if !mime.starts_with("image/") {
            return Err(SwachhError::InvalidArgument(format!(
                "Not an image MIME type: {}",
                mime
            )));
        }
        let data = general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| SwachhError::InvalidArgument(format!("Invalid base64 image: {}", e)))?;
        Ok(Self::new(mime, data))
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.data)
    }

    /// Render as a `data:` URI, the form stored on a report.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```(?:json)?\n?").expect("static regex"))
}

fn bold_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\*\*.*?\*\*$").expect("static regex"))
}

/// Strip code fences and whole-line bold headings from a model reply.
pub fn clean_model_text(text: &str) -> String {
    let without_fences = fence_regex().replace_all(text, "");
    bold_line_regex()
        .replace_all(&without_fences, "")
        .trim()
        .to_string()
}

/// Parse a model reply into a verdict.
///
/// Requires a non-empty `wasteType`, a non-empty `quantity` (numbers are
/// accepted and rendered as text) and a numeric `confidence` in `[0, 1]`.
pub fn parse_verification(text: &str) -> Result<VerificationResult> {
    let cleaned = clean_model_text(text);
    debug!(raw = text, cleaned = %cleaned, "parsing verification reply");

    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| SwachhError::Verification(format!("reply is not valid JSON: {}", e)))?;

    let waste_type = value
        .get("wasteType")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    let quantity = match value.get("quantity") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .ok_or_else(|| SwachhError::Verification("missing numeric confidence".into()))?;

    let result = VerificationResult {
        waste_type: waste_type.to_string(),
        quantity,
        confidence,
    };
    result.validate()?;
    Ok(result)
}

// ---------------------------------------------------------------------------
// VisionClient
// ---------------------------------------------------------------------------

/// Client for the vision model's `generateContent` endpoint.
///
/// Cheap to clone; clones share the HTTP client and the in-flight flag, so
/// at most one verification runs at a time across all of them.
#[derive(Clone)]
pub struct VisionClient {
    api_base: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
    client: Arc<Mutex<Option<Client>>>,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the request finishes, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl VisionClient {
    pub fn new(
        api_base: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            timeout,
            client: Arc::new(Mutex::new(None)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Whether a verification is currently outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Lazy HTTP client, created on first use.
    fn http(&self) -> Result<Client> {
        let mut guard = self
            .client
            .lock()
            .map_err(|_| SwachhError::InvalidArgument("HTTP client lock poisoned".into()))?;
        if guard.is_none() {
            *guard = Some(Client::builder().timeout(self.timeout).build()?);
        }
        guard
            .clone()
            .ok_or_else(|| SwachhError::InvalidArgument("HTTP client unavailable".into()))
    }

    /// Classify one image.
    ///
    /// Fails fast with [`SwachhError::VerificationInFlight`] while another
    /// verification is outstanding, and with [`SwachhError::Verification`]
    /// when no API key is configured or the reply is unusable.
    pub fn verify(&self, image: &ImagePayload) -> Result<VerificationResult> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SwachhError::Verification("vision API key is not configured".into()))?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SwachhError::VerificationInFlight);
        }
        let _in_flight = InFlight(&self.in_flight);

        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);
        let body = json!({
            "contents": [{
                "parts": [
                    { "text": config::VERIFICATION_PROMPT },
                    { "inline_data": { "mime_type": image.mime_type, "data": image.to_base64() } }
                ]
            }]
        });

        info!(model = %self.model, bytes = image.data.len(), "verifying waste image");
        let resp: Value = self
            .http()?
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        let text = response_text(&resp).ok_or_else(|| {
            warn!("vision reply carried no text");
            SwachhError::Verification("empty model reply".into())
        })?;

        let result = parse_verification(&text);
        match &result {
            Ok(r) => info!(
                waste_type = %r.waste_type,
                confidence = r.confidence,
                "verification succeeded"
            ),
            Err(e) => warn!(error = %e, "verification reply rejected"),
        }
        result
    }
}

/// Concatenated text parts of the first candidate.
fn response_text(resp: &Value) -> Option<String> {
    let parts = resp
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
