//! The in-progress, not yet submitted form data.

use super::media::MediaFile;
use chrono::{DateTime, Utc};

/// Mutable aggregate edited field by field while the wizard runs.
///
/// `media` is a batch so validation can reject mixed selections; only the
/// first entry is uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionDraft {
    pub title: String,
    pub start_date_time: DateTime<Utc>,
    pub location: String,
    pub media: Vec<MediaFile>,
    pub terms_accepted: bool,
}

impl SubmissionDraft {
    /// Fresh draft whose scheduled start defaults to `created_at`.
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            title: String::new(),
            start_date_time: created_at,
            location: String::new(),
            media: Vec::new(),
            terms_accepted: false,
        }
    }

    /// The file that will actually be uploaded.
    pub fn primary_media(&self) -> Option<&MediaFile> {
        self.media.first()
    }

    pub(crate) fn apply(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::Title(title) => self.title = title,
            FieldEdit::StartDateTime(at) => self.start_date_time = at,
            FieldEdit::Location(location) => self.location = location,
            FieldEdit::Media(files) => self.media = files,
            FieldEdit::TermsAccepted(accepted) => self.terms_accepted = accepted,
        }
    }
}

impl Default for SubmissionDraft {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

/// One field-edit event coming from the presentation shell.
#[derive(Debug, Clone)]
pub enum FieldEdit {
    Title(String),
    StartDateTime(DateTime<Utc>),
    Location(String),
    Media(Vec<MediaFile>),
    TermsAccepted(bool),
}

impl FieldEdit {
    pub fn field(&self) -> super::Field {
        use super::Field;
        match self {
            FieldEdit::Title(_) => Field::Title,
            FieldEdit::StartDateTime(_) => Field::StartDateTime,
            FieldEdit::Location(_) => Field::Location,
            FieldEdit::Media(_) => Field::Media,
            FieldEdit::TermsAccepted(_) => Field::TermsAccepted,
        }
    }
}
