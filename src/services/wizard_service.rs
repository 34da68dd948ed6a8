//! WizardController: owns the draft and the current step, gates step
//! transitions on validation and drives submissions.
//!
//! While a submission is in flight the form is read-only: every edit or
//! navigation is rejected with `SubmissionInFlight`. A successful submission
//! returns the wizard to its initial state with a fresh draft; a failed one
//! leaves step and draft untouched so the user can retry.

use crate::{
    errors::{UploadError, WizardError},
    models::{
        FieldEdit, MediaFile, Navigation, Step, SubmissionDraft, ValidationResult, WizardState,
    },
    services::{
        preview_service::{ObjectUrlStore, PreviewHandle, PreviewStore},
        upload_service::{ProgressObserver, SuccessInfo, UploadClient},
        validation_service::ValidationSchema,
    },
    transport::Transport,
};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Proof that a submission was started. Exactly one exists per submission
/// and `finish_submit` consumes it, which clears the in-flight flag once.
#[derive(Debug)]
#[must_use = "a started submission must be finished"]
pub struct SubmissionTicket {
    id: Uuid,
    draft: SubmissionDraft,
}

impl SubmissionTicket {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Snapshot of the draft taken when the submission started.
    pub fn draft(&self) -> &SubmissionDraft {
        &self.draft
    }
}

pub struct WizardController<P: PreviewStore = ObjectUrlStore> {
    step: Step,
    draft: SubmissionDraft,
    active_submission: Option<Uuid>,
    progress: u8,
    schema: ValidationSchema,
    previews: P,
    preview: Option<PreviewHandle>,
    clock: fn() -> DateTime<Utc>,
}

impl WizardController<ObjectUrlStore> {
    pub fn new() -> Self {
        Self::with_preview_store(ObjectUrlStore::new())
    }
}

impl Default for WizardController<ObjectUrlStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PreviewStore> WizardController<P> {
    pub fn with_preview_store(previews: P) -> Self {
        Self {
            step: Step::INITIAL,
            draft: SubmissionDraft::new(Utc::now()),
            active_submission: None,
            progress: 0,
            schema: ValidationSchema::new(),
            previews,
            preview: None,
            clock: Utc::now,
        }
    }

    /// Replace the clock used to stamp default drafts. Resets the current
    /// draft's start time.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self.draft.start_date_time = clock();
        self
    }

    pub fn state(&self) -> WizardState {
        WizardState {
            current_step: self.step,
            submission_in_flight: self.active_submission.is_some(),
            upload_progress_percent: self.progress,
        }
    }

    pub fn draft(&self) -> &SubmissionDraft {
        &self.draft
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview.as_ref().map(PreviewHandle::url)
    }

    pub fn previews(&self) -> &P {
        &self.previews
    }

    /// Apply one field edit from the shell.
    pub fn apply(&mut self, edit: FieldEdit) -> Result<(), WizardError> {
        self.ensure_editable()?;
        if let FieldEdit::Media(files) = &edit {
            self.refresh_preview(files.first());
        }
        debug!("edited draft field {}", edit.field());
        self.draft.apply(edit);
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), WizardError> {
        self.apply(FieldEdit::Title(title.into()))
    }

    pub fn set_location(&mut self, location: impl Into<String>) -> Result<(), WizardError> {
        self.apply(FieldEdit::Location(location.into()))
    }

    pub fn set_start_date_time(&mut self, at: DateTime<Utc>) -> Result<(), WizardError> {
        self.apply(FieldEdit::StartDateTime(at))
    }

    pub fn select_media(&mut self, files: Vec<MediaFile>) -> Result<(), WizardError> {
        self.apply(FieldEdit::Media(files))
    }

    pub fn set_terms_accepted(&mut self, accepted: bool) -> Result<(), WizardError> {
        self.apply(FieldEdit::TermsAccepted(accepted))
    }

    /// Errors for the fields gating the current step, for inline display.
    pub fn validate_current_step(&self) -> ValidationResult {
        self.schema
            .validate_fields(&self.draft, self.step.gated_fields())
    }

    /// Move from details to terms once title and media are valid.
    pub fn advance(&mut self) -> Result<Step, WizardError> {
        self.ensure_editable()?;
        let next = self.allowed(Navigation::Advance)?;

        let result = self.validate_current_step();
        if !result.is_valid() {
            debug!(errors = %result, "advance blocked by validation");
            return Err(WizardError::Validation(result));
        }

        info!("wizard advanced from {} to {}", self.step, next);
        self.step = next;
        Ok(next)
    }

    /// Go back to the details step. Draft values are kept.
    pub fn retreat(&mut self) -> Result<Step, WizardError> {
        self.ensure_editable()?;
        let previous = self.allowed(Navigation::Retreat)?;
        info!("wizard went back from {} to {}", self.step, previous);
        self.step = previous;
        Ok(previous)
    }

    /// Start a submission: checks terms, marks the wizard in flight and
    /// snapshots the draft. Rejected while another submission is active.
    pub fn begin_submit(&mut self) -> Result<SubmissionTicket, WizardError> {
        self.ensure_editable()?;
        self.allowed(Navigation::Submit)?;

        let result = self.validate_current_step();
        if !result.is_valid() {
            debug!(errors = %result, "submit blocked by validation");
            return Err(WizardError::Validation(result));
        }

        let id = Uuid::new_v4();
        self.active_submission = Some(id);
        self.progress = 0;
        info!(submission = %id, title = %self.draft.title, "submission started");

        Ok(SubmissionTicket {
            id,
            draft: self.draft.clone(),
        })
    }

    /// Record progress for the active submission. Values never go down.
    pub fn record_progress(&mut self, ticket: &SubmissionTicket, percent: u8) {
        if self.active_submission == Some(ticket.id) {
            self.progress = self.progress.max(percent.min(100));
        }
    }

    /// Close a submission. Success resets the wizard; failure keeps the
    /// step and draft for a retry.
    pub fn finish_submit(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<SuccessInfo, UploadError>,
    ) -> Result<SuccessInfo, WizardError> {
        if self.active_submission != Some(ticket.id) {
            return Err(WizardError::StaleSubmission);
        }
        self.active_submission = None;

        match outcome {
            Ok(success) => {
                info!(submission = %ticket.id, message = %success.message, "submission succeeded");
                self.reset();
                Ok(success)
            }
            Err(err) => {
                warn!(
                    submission = %ticket.id,
                    error = %err,
                    "submission failed; draft kept for retry"
                );
                self.progress = 0;
                Err(WizardError::Upload(err))
            }
        }
    }

    /// Run a whole submission through `client`, forwarding progress to
    /// `observer` and recording it on the wizard as it arrives.
    pub async fn submit<T, O>(
        &mut self,
        client: &UploadClient<T>,
        mut observer: O,
    ) -> Result<SuccessInfo, WizardError>
    where
        T: Transport,
        O: ProgressObserver,
    {
        let ticket = self.begin_submit()?;
        let snapshot = ticket.draft().clone();
        let mut in_flight = InFlight {
            controller: self,
            ticket: Some(ticket),
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
        let upload = client.submit(snapshot, move |percent: u8| {
            let _ = tx.send(percent);
        });
        tokio::pin!(upload);

        let outcome = loop {
            tokio::select! {
                biased;
                Some(percent) = rx.recv() => in_flight.progress(percent, &mut observer),
                outcome = &mut upload => break outcome,
            }
        };
        while let Ok(percent) = rx.try_recv() {
            in_flight.progress(percent, &mut observer);
        }

        in_flight.finish(outcome)
    }

    /// Discard the draft and start over, e.g. "upload another video".
    pub fn start_new_upload(&mut self) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.reset();
        Ok(())
    }

    fn allowed(&self, nav: Navigation) -> Result<Step, WizardError> {
        self.step
            .transition(nav)
            .ok_or(WizardError::InvalidTransition {
                step: self.step,
                action: nav,
            })
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.active_submission.is_some() {
            return Err(WizardError::SubmissionInFlight);
        }
        Ok(())
    }

    /// Release the current preview, then create one for `file`. A failed
    /// creation leaves the wizard without a preview.
    fn refresh_preview(&mut self, file: Option<&MediaFile>) {
        self.release_preview();
        let Some(file) = file else {
            return;
        };
        match self.previews.create(file) {
            Ok(handle) => self.preview = Some(handle),
            Err(err) => warn!("no preview for {}: {}", file.name, err),
        }
    }

    fn release_preview(&mut self) {
        if let Some(handle) = self.preview.take() {
            self.previews.release(handle);
        }
    }

    fn reset(&mut self) {
        self.release_preview();
        self.draft = SubmissionDraft::new((self.clock)());
        self.step = Step::INITIAL;
        self.progress = 0;
    }

    fn abandon(&mut self, ticket: SubmissionTicket) {
        if self.active_submission == Some(ticket.id) {
            warn!("submission {} dropped before completion", ticket.id);
            self.active_submission = None;
            self.progress = 0;
        }
    }
}

impl<P: PreviewStore> Drop for WizardController<P> {
    fn drop(&mut self) {
        self.release_preview();
    }
}

/// Clears the in-flight flag even if a `submit` future is dropped early.
struct InFlight<'a, P: PreviewStore> {
    controller: &'a mut WizardController<P>,
    ticket: Option<SubmissionTicket>,
}

impl<P: PreviewStore> InFlight<'_, P> {
    fn progress<O: ProgressObserver>(&mut self, percent: u8, observer: &mut O) {
        if let Some(ticket) = &self.ticket {
            self.controller.record_progress(ticket, percent);
        }
        observer.on_progress(percent);
    }

    fn finish(
        mut self,
        outcome: Result<SuccessInfo, UploadError>,
    ) -> Result<SuccessInfo, WizardError> {
        match self.ticket.take() {
            Some(ticket) => self.controller.finish_submit(ticket, outcome),
            None => Err(WizardError::StaleSubmission),
        }
    }
}

impl<P: PreviewStore> Drop for InFlight<'_, P> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.controller.abandon(ticket);
        }
    }
}
