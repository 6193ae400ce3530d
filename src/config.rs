use std::path::PathBuf;
use std::time::Duration;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_VISION_MODEL: &str = "gemini-1.5-flash";

/// Environment variable holding the vision API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SWACHH_DATA_DIR";
/// Environment variable overriding the vision model name.
pub const MODEL_ENV: &str = "SWACHH_VISION_MODEL";

pub const DATABASE_FILE: &str = "swachh.duckdb";

/// How many reports and collection tasks the dashboard pulls per refresh.
pub const DASHBOARD_FETCH_LIMIT: usize = 100;

pub const NOTIFICATION_POLL_PERIOD: Duration = Duration::from_secs(30);

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Name recorded for users whose identity carries no display name.
pub const ANONYMOUS_USER_NAME: &str = "Anonymous User";

/// Instruction sent alongside every image submitted for verification.
pub const VERIFICATION_PROMPT: &str = r#"You are an expert in waste management and recycling. Analyze this image and provide:
1. The type of waste (e.g., plastic, paper, glass, metal, organic)
2. An estimate of the quantity or amount (in kg or liters)
3. Your confidence level in this assessment (as a percentage)

Return your response as a JSON object with this exact structure:
{
  "wasteType": "type of waste",
  "quantity": "estimated quantity with unit",
  "confidence": confidence level as a number between 0 and 1
}

CRITICAL INSTRUCTIONS:
- Return ONLY the JSON object
- NO markdown formatting
- NO code blocks or backticks
- NO additional text or explanations
- NO bold text or asterisks
- Start your response directly with the opening brace {
- End your response with the closing brace }

Example format:
{"wasteType": "plastic bottles", "quantity": "2 kg", "confidence": 0.8}"#;

pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_local_dir() {
        data.join("swachh-sdk")
    } else {
        PathBuf::from(".swachh-sdk")
    }
}
