//! State of the report form: image, verification and submission.

use tracing::{info, warn};

use crate::error::{Result, SwachhError};
use crate::models::{NewReport, User, VerificationResult};
use crate::verify::{ImagePayload, VisionClient};

#[derive(Debug, Clone, PartialEq)]
pub enum VerificationStatus {
    Idle,
    Verifying,
    Success(VerificationResult),
    Failure(String),
}

impl VerificationStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, VerificationStatus::Success(_))
    }
}

/// One in-progress report.
///
/// Type and amount are filled in by a successful verification but stay
/// editable afterwards, like the location.
#[derive(Debug, Clone)]
pub struct ReportForm {
    image: Option<ImagePayload>,
    status: VerificationStatus,
    pub location: String,
    pub waste_type: String,
    pub amount: String,
}

impl Default for ReportForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportForm {
    pub fn new() -> Self {
        Self {
            image: None,
            status: VerificationStatus::Idle,
            location: String::new(),
            waste_type: String::new(),
            amount: String::new(),
        }
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    pub fn status(&self) -> &VerificationStatus {
        &self.status
    }

    /// The verified result, once verification has succeeded.
    pub fn verification(&self) -> Option<&VerificationResult> {
        match &self.status {
            VerificationStatus::Success(result) => Some(result),
            _ => None,
        }
    }

    /// Select a new image (or none). Any earlier verdict no longer applies.
    pub fn set_image(&mut self, image: Option<ImagePayload>) {
        self.image = image;
        self.status = VerificationStatus::Idle;
    }

    /// Drop the image along with the fields its verification filled in.
    pub fn remove_image(&mut self) {
        self.set_image(None);
        self.waste_type.clear();
        self.amount.clear();
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn can_verify(&self) -> bool {
        self.image.is_some() && self.status != VerificationStatus::Verifying
    }

    /// Enter `Verifying` and hand back the image to send.
    pub fn begin_verification(&mut self) -> Result<ImagePayload> {
        if self.status == VerificationStatus::Verifying {
            return Err(SwachhError::VerificationInFlight);
        }
        let image = self
            .image
            .clone()
            .ok_or_else(|| SwachhError::InvalidArgument("no image selected".into()))?;
        self.status = VerificationStatus::Verifying;
        Ok(image)
    }

    /// Record the outcome of the request started by
    /// [`begin_verification`](Self::begin_verification).
    ///
    /// A verdict that fails [`VerificationResult::validate`] counts as a
    /// failure.
    pub fn complete_verification(&mut self, outcome: Result<VerificationResult>) {
        let outcome = outcome.and_then(|result| result.validate().map(|_| result));
        match outcome {
            Ok(result) => {
                self.waste_type = result.waste_type.clone();
                self.amount = result.quantity.clone();
                self.status = VerificationStatus::Success(result);
            }
            Err(e) => {
                warn!(error = %e, "waste verification failed");
                self.status = VerificationStatus::Failure(e.to_string());
            }
        }
    }

    /// Run a whole verification through `client`.
    pub fn verify_with(&mut self, client: &VisionClient) -> &VerificationStatus {
        match self.begin_verification() {
            Ok(image) => {
                let outcome = client.verify(&image);
                self.complete_verification(outcome);
            }
            Err(e) => warn!(error = %e, "verification not started"),
        }
        &self.status
    }

    /// Leave the failure state so the user can try again.
    pub fn retry(&mut self) {
        self.status = VerificationStatus::Idle;
    }

    /// Build the report to persist.
    ///
    /// Needs a successful verification, a signed-in user and a location.
    pub fn prepare_submission(&self, user: Option<&User>) -> Result<NewReport> {
        let result = self.verification().ok_or_else(|| {
            SwachhError::InvalidArgument("verify the waste before submitting".into())
        })?;
        let user = user.ok_or_else(|| SwachhError::Auth("log in before submitting".into()))?;
        if self.location.trim().is_empty() {
            return Err(SwachhError::InvalidArgument("location is required".into()));
        }

        Ok(NewReport {
            user_id: user.id,
            location: self.location.trim().to_string(),
            waste_type: self.waste_type.clone(),
            amount: self.amount.clone(),
            image_url: self.image.as_ref().map(ImagePayload::to_data_uri),
            verification_result: Some(serde_json::to_string(result)?),
        })
    }

    /// Clear the form after the report has been stored.
    pub fn finish_submission(&mut self) {
        info!(location = %self.location, "report submitted; resetting form");
        *self = Self::new();
    }
}
