use serde::{Deserialize, Serialize};

use crate::error::{Result, SwachhError};

/// Classification returned by the vision model for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub waste_type: String,
    pub quantity: String,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
}

impl VerificationResult {
    /// Check that the verdict is complete enough to file a report on:
    /// non-blank type and quantity, confidence within `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.waste_type.trim().is_empty() {
            return Err(SwachhError::Verification("missing wasteType".into()));
        }
        if self.quantity.trim().is_empty() {
            return Err(SwachhError::Verification("missing quantity".into()));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(SwachhError::Verification(format!(
                "confidence {} outside [0, 1]",
                self.confidence
            )));
        }
        Ok(())
    }
}
