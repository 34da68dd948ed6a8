//! Error taxonomy for the wizard.
//!
//! Field errors are user-correctable and travel as data inside a
//! `ValidationResult`. Upload errors come back from a single submission
//! attempt. Resource errors only ever degrade the preview.

use crate::models::{Navigation, Step, ValidationResult};
use thiserror::Error;

/// Message used when a failure carries no usable text.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Why a single field failed validation. Each reason has a fixed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("This field is required")]
    EmptyField,
    #[error("A video file is required")]
    MissingFile,
    #[error("Only video files are accepted")]
    InvalidType,
    #[error("You must accept the terms and conditions")]
    TermsNotAccepted,
}

/// Outcome of a failed submission attempt.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("submission is invalid: {0}")]
    ValidationFailed(ValidationResult),
    #[error("{0}")]
    Transport(String),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected response from upload endpoint: {0}")]
    MalformedResponse(String),
}

impl UploadError {
    /// Build a transport failure, falling back to a generic message.
    pub fn transport(message: Option<String>) -> Self {
        match message {
            Some(m) if !m.trim().is_empty() => UploadError::Transport(m),
            _ => UploadError::Transport(UNKNOWN_ERROR.to_string()),
        }
    }

    /// Text surfaced to the user as a notification.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Failure to create a local preview for the selected media.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("media `{0}` has no content to preview")]
    Empty(String),
}

/// Rejections raised by the wizard controller.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("a submission is already in flight; the form is read-only")]
    SubmissionInFlight,
    #[error("cannot {action} from the {step} step")]
    InvalidTransition { step: Step, action: Navigation },
    #[error("validation failed: {0}")]
    Validation(ValidationResult),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("submission ticket does not belong to the active submission")]
    StaleSubmission,
}

impl WizardError {
    /// Field errors to show inline, if this rejection came from validation.
    pub fn validation(&self) -> Option<&ValidationResult> {
        match self {
            WizardError::Validation(result) => Some(result),
            WizardError::Upload(UploadError::ValidationFailed(result)) => Some(result),
            _ => None,
        }
    }
}
