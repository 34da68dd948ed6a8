//! Core services: validation rules, preview resources, the upload client
//! and the wizard controller that ties them together.

pub mod preview_service;
pub mod upload_service;
pub mod validation_service;
pub mod wizard_service;

pub use preview_service::{ObjectUrlStore, PreviewHandle, PreviewStore};
pub use upload_service::{NoProgress, ProgressObserver, ProgressTracker, SuccessInfo, UploadClient};
pub use validation_service::ValidationSchema;
pub use wizard_service::{SubmissionTicket, WizardController};
