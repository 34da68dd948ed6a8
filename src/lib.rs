//! Multi-step video upload wizard.
//!
//! A two-step form (media + metadata, then terms) backed by a validation
//! schema, and an upload client that sends the finished draft as a single
//! multipart request while reporting progress.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod transport;

pub use errors::{FieldError, ResourceError, UploadError, WizardError};
pub use models::{
    Field, FieldEdit, MediaFile, MediaSource, Navigation, Step, SubmissionDraft, ValidationResult,
    WizardState,
};
pub use services::{SuccessInfo, UploadClient, ValidationSchema, WizardController};
pub use transport::{HttpTransport, Transport};
