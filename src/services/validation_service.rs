//! Validation rules for a submission draft.
//!
//! Each rule is a pure predicate over one field returning an optional
//! error. `ValidationSchema` composes them into a `ValidationResult`, either
//! for the whole draft or for a subset of fields (step gating).

use crate::{
    errors::FieldError,
    models::{Field, MediaFile, SubmissionDraft, ValidationResult},
};

/// Top-level media type accepted by the wizard.
const ACCEPTED_MEDIA_TYPE: &str = "video";

/// The title must be non-empty. Whitespace is not trimmed.
pub fn check_title(title: &str) -> Option<FieldError> {
    if title.is_empty() {
        Some(FieldError::EmptyField)
    } else {
        None
    }
}

/// At least one file must be attached and every file must be a video.
pub fn check_media(files: &[MediaFile]) -> Option<FieldError> {
    if files.is_empty() {
        return Some(FieldError::MissingFile);
    }
    if files
        .iter()
        .any(|f| f.top_level_type() != Some(ACCEPTED_MEDIA_TYPE))
    {
        return Some(FieldError::InvalidType);
    }
    None
}

pub fn check_terms(accepted: bool) -> Option<FieldError> {
    if accepted {
        None
    } else {
        Some(FieldError::TermsNotAccepted)
    }
}

/// Classifies drafts as valid or invalid with per-field reasons.
///
/// `location` and `startDateTime` are part of the schema but carry no
/// constraint.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationSchema;

impl ValidationSchema {
    pub fn new() -> Self {
        Self
    }

    /// Validate every field of the draft.
    pub fn validate(&self, draft: &SubmissionDraft) -> ValidationResult {
        self.validate_fields(draft, &Field::ALL)
    }

    /// Validate only `fields`; rules for other fields are not evaluated.
    pub fn validate_fields(&self, draft: &SubmissionDraft, fields: &[Field]) -> ValidationResult {
        let mut result = ValidationResult::default();
        for &field in fields {
            if let Some(reason) = self.check(draft, field) {
                result.insert(field, reason);
            }
        }
        result
    }

    fn check(&self, draft: &SubmissionDraft, field: Field) -> Option<FieldError> {
        match field {
            Field::Title => check_title(&draft.title),
            Field::Media => check_media(&draft.media),
            Field::TermsAccepted => check_terms(draft.terms_accepted),
            Field::Location | Field::StartDateTime => None,
        }
    }
}
