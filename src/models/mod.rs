//! Core data models for the upload wizard.
//!
//! The draft is the only mutable aggregate. Steps, wizard state and
//! validation results are small value types the presentation shell reads.

pub mod draft;
pub mod media;
pub mod step;
pub mod validation;

pub use draft::{FieldEdit, SubmissionDraft};
pub use media::{MediaFile, MediaSource};
pub use step::{Navigation, Step, WizardState};
pub use validation::{Field, ValidationError, ValidationResult};
