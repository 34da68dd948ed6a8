//! Headless shell: turns command-line values into wizard edits, walks the
//! steps and reports the outcome as text.

use crate::{
    config::Args,
    errors::WizardError,
    models::{FieldEdit, MediaFile},
    services::{ProgressObserver, SuccessInfo, UploadClient, WizardController},
    transport::Transport,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::{self, Write};

/// Values the user typed into the form.
#[derive(Debug, Clone)]
pub struct FormInput {
    pub title: String,
    pub location: String,
    pub start: Option<DateTime<Utc>>,
    pub files: Vec<MediaFile>,
    pub accept_terms: bool,
}

impl FormInput {
    /// Open every media path named on the command line.
    pub async fn from_args(args: &Args) -> Result<Self> {
        let mut files = Vec::with_capacity(args.files.len());
        for path in &args.files {
            let mut media = MediaFile::open(path)
                .await
                .with_context(|| format!("opening media file {}", path.display()))?;
            if let Some(format) = &args.format {
                media = media.with_mime_type(format.clone());
            }
            files.push(media);
        }

        Ok(Self {
            title: args.title.clone(),
            location: args.location.clone(),
            start: args.start,
            files,
            accept_terms: args.accept_terms,
        })
    }

    fn step_one_edits(&self) -> Vec<FieldEdit> {
        let mut edits = vec![
            FieldEdit::Title(self.title.clone()),
            FieldEdit::Location(self.location.clone()),
            FieldEdit::Media(self.files.clone()),
        ];
        if let Some(start) = self.start {
            edits.push(FieldEdit::StartDateTime(start));
        }
        edits
    }
}

/// Fill in both steps and submit.
pub async fn fill_and_submit<T, O>(
    wizard: &mut WizardController,
    client: &UploadClient<T>,
    input: FormInput,
    observer: O,
) -> Result<SuccessInfo, WizardError>
where
    T: Transport,
    O: ProgressObserver,
{
    for edit in input.step_one_edits() {
        wizard.apply(edit)?;
    }
    if let Some(preview) = wizard.preview_url() {
        tracing::debug!("preview ready at {}", preview);
    }
    wizard.advance()?;

    wizard.set_terms_accepted(input.accept_terms)?;
    wizard.submit(client, observer).await
}

/// Lines to print for a failed run: one per invalid field, or the
/// notification text.
pub fn describe_failure(err: &WizardError) -> Vec<String> {
    match err.validation() {
        Some(result) => result
            .errors()
            .map(|e| format!("{}: {}", e.field, e.reason))
            .collect(),
        None => match err {
            WizardError::Upload(upload) => vec![format!("Upload failed: {}", upload.message())],
            other => vec![other.to_string()],
        },
    }
}

/// Renders progress on a single terminal line.
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl ProgressObserver for ConsoleProgress {
    fn on_progress(&mut self, percent: u8) {
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\rUploading... {:>3}%", percent);
        if percent == 100 {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }
}
