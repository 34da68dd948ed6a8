//! UploadClient: validates a draft snapshot, sends it through a transport
//! and reports progress.
//!
//! Progress is delivered through a `ProgressObserver`. Values are whole
//! percentages of media bytes sent, never decreasing, and a successful
//! upload always ends with 100. The final result is returned only after the
//! last progress value has been delivered.

use crate::{
    errors::{FieldError, UploadError},
    models::{Field, SubmissionDraft, ValidationResult},
    services::validation_service::ValidationSchema,
    transport::{TransferProgress, Transport, TransportResponse, UploadPayload},
};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Status code the endpoint returns when the upload was created.
pub const CREATED: u16 = 201;

/// Receives upload progress as a percentage in `0..=100`.
pub trait ProgressObserver: Send {
    fn on_progress(&mut self, percent: u8);
}

impl<F> ProgressObserver for F
where
    F: FnMut(u8) + Send,
{
    fn on_progress(&mut self, percent: u8) {
        self(percent)
    }
}

/// Observer that ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _percent: u8) {}
}

/// Whole percentage of `sent` over `total`, rounded half up.
///
/// An empty transfer counts as complete.
pub fn percent_of(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let sent = u128::from(sent.min(total));
    let total = u128::from(total);
    ((sent * 100 + total / 2) / total) as u8
}

/// Converts byte counts into a monotonic, de-duplicated percent stream.
#[derive(Debug)]
pub struct ProgressTracker<O> {
    observer: O,
    total_bytes: u64,
    last: Option<u8>,
}

impl<O: ProgressObserver> ProgressTracker<O> {
    pub fn new(total_bytes: u64, observer: O) -> Self {
        Self {
            observer,
            total_bytes,
            last: None,
        }
    }

    pub fn bytes_sent(&mut self, sent: u64) {
        self.report(percent_of(sent, self.total_bytes));
    }

    /// Forward `percent` unless it would repeat or go backwards.
    pub fn report(&mut self, percent: u8) {
        let percent = percent.min(100);
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        self.observer.on_progress(percent);
    }

    /// Emit the final 100 if it has not been reported yet.
    pub fn complete(&mut self) {
        self.report(100);
    }

    pub fn last(&self) -> Option<u8> {
        self.last
    }
}

/// What the endpoint says when an upload is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuccessInfo {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Serializes drafts and issues one upload request per call. No retries.
#[derive(Debug, Clone)]
pub struct UploadClient<T> {
    transport: T,
    schema: ValidationSchema,
}

impl<T: Transport> UploadClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            schema: ValidationSchema::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Validate and upload `draft`.
    ///
    /// Fails fast with `ValidationFailed` without touching the network when
    /// any rule fails.
    pub async fn submit<O: ProgressObserver>(
        &self,
        draft: SubmissionDraft,
        observer: O,
    ) -> Result<SuccessInfo, UploadError> {
        let validation = self.schema.validate(&draft);
        if !validation.is_valid() {
            warn!(errors = %validation, "refusing to upload an invalid draft");
            return Err(UploadError::ValidationFailed(validation));
        }

        let payload = UploadPayload::from_draft(&draft).ok_or_else(|| {
            let mut missing = ValidationResult::default();
            missing.insert(Field::Media, FieldError::MissingFile);
            UploadError::ValidationFailed(missing)
        })?;

        let file_name = payload.media.name.clone();
        let mut tracker = ProgressTracker::new(payload.total_bytes(), observer);
        tracker.report(0);

        info!(
            title = %draft.title,
            file = %file_name,
            size_bytes = payload.total_bytes(),
            "starting upload"
        );

        let (progress, mut ticks) = TransferProgress::channel();
        let send = self.transport.send(payload, progress);
        tokio::pin!(send);

        let result = loop {
            tokio::select! {
                biased;
                Some(sent) = ticks.recv() => tracker.bytes_sent(sent),
                result = &mut send => break result,
            }
        };
        while let Ok(sent) = ticks.try_recv() {
            tracker.bytes_sent(sent);
        }

        let response = result.map_err(|err| {
            warn!(file = %file_name, error = %err, "upload transport failed");
            UploadError::transport(err.message)
        })?;

        let success = classify_response(response)?;
        tracker.complete();
        info!("upload of {} created: {}", file_name, success.message);
        Ok(success)
    }
}

/// Anything but 201 is a failure, even when the transport succeeded.
fn classify_response(response: TransportResponse) -> Result<SuccessInfo, UploadError> {
    if response.status == CREATED {
        return serde_json::from_slice::<SuccessInfo>(&response.body).map_err(|err| {
            warn!("created response without a message: {}", err);
            UploadError::MalformedResponse(err.to_string())
        });
    }

    let body: ErrorBody = serde_json::from_slice(&response.body).unwrap_or_default();
    let message = body
        .message
        .or(body.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Upload failed with status {}", response.status));

    debug!(status = response.status, %message, "upload rejected by endpoint");
    Err(UploadError::Rejected {
        status: response.status,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::MediaFile,
        transport::{TransportError, TransportResponse},
    };
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::Utc;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    /// Reports progress in fixed steps, then answers with a canned response.
    struct ScriptedTransport {
        ticks: Vec<u64>,
        outcome: Result<TransportResponse, TransportError>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(ticks: Vec<u64>, outcome: Result<TransportResponse, TransportError>) -> Self {
            Self {
                ticks,
                outcome,
                calls: AtomicUsize::new(0),
            }
        }

        fn responding(status: u16, body: &'static str) -> Self {
            Self::new(
                vec![250_000, 500_000, 500_000, 1_000_000],
                Ok(TransportResponse {
                    status,
                    body: Bytes::from_static(body.as_bytes()),
                }),
            )
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            _payload: UploadPayload,
            progress: TransferProgress,
        ) -> Result<TransportResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            for sent in &self.ticks {
                progress.bytes_sent(*sent);
                tokio::task::yield_now().await;
            }
            self.outcome.clone()
        }
    }

    fn valid_draft() -> SubmissionDraft {
        let mut draft = SubmissionDraft::new(Utc::now());
        draft.title = "Launch".into();
        draft.media = vec![MediaFile::in_memory(
            "video.mp4",
            "video/mp4",
            Bytes::from(vec![0u8; 1_000_000]),
        )];
        draft.terms_accepted = true;
        draft
    }

    fn recorder() -> (Arc<Mutex<Vec<u8>>>, impl ProgressObserver) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |p: u8| sink.lock().unwrap().push(p))
    }

    #[test]
    fn percent_rounds_half_up_and_handles_empty() {
        assert_eq!(percent_of(0, 1000), 0);
        assert_eq!(percent_of(5, 1000), 1);
        assert_eq!(percent_of(4, 1000), 0);
        assert_eq!(percent_of(999, 1000), 100);
        assert_eq!(percent_of(2000, 1000), 100);
        assert_eq!(percent_of(0, 0), 100);
    }

    #[test]
    fn tracker_drops_repeats_and_regressions() {
        let (seen, observer) = recorder();
        let mut tracker = ProgressTracker::new(100, observer);
        for sent in [0, 10, 10, 5, 50, 40, 100] {
            tracker.bytes_sent(sent);
        }
        tracker.complete();
        assert_eq!(*seen.lock().unwrap(), vec![0, 10, 50, 100]);
        assert_eq!(tracker.last(), Some(100));
    }

    #[tokio::test]
    async fn created_response_yields_message_and_final_hundred() {
        let client = UploadClient::new(ScriptedTransport::responding(
            201,
            r#"{"message":"Created"}"#,
        ));
        let (seen, observer) = recorder();

        let info = client.submit(valid_draft(), observer).await.unwrap();
        assert_eq!(info.message, "Created");

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen, vec![0, 25, 50, 100]);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn success_emits_hundred_even_without_final_tick() {
        let transport = ScriptedTransport::new(
            vec![100_000],
            Ok(TransportResponse {
                status: 201,
                body: Bytes::from_static(br#"{"message":"ok"}"#),
            }),
        );
        let (seen, observer) = recorder();
        UploadClient::new(transport)
            .submit(valid_draft(), observer)
            .await
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![0, 10, 100]);
    }

    #[tokio::test]
    async fn non_created_status_is_a_failure() {
        let client = UploadClient::new(ScriptedTransport::responding(
            200,
            r#"{"message":"OK"}"#,
        ));
        let err = client.submit(valid_draft(), NoProgress).await.unwrap_err();
        assert!(matches!(err, UploadError::Rejected { status: 200, .. }));

        let client = UploadClient::new(ScriptedTransport::responding(
            500,
            r#"{"error":"disk full"}"#,
        ));
        let err = client.submit(valid_draft(), NoProgress).await.unwrap_err();
        assert_eq!(err.message(), "disk full");

        let client = UploadClient::new(ScriptedTransport::responding(
            502,
            "<html>bad gateway</html>",
        ));
        let err = client.submit(valid_draft(), NoProgress).await.unwrap_err();
        assert_eq!(err.message(), "Upload failed with status 502");
    }

    #[tokio::test]
    async fn created_without_message_is_malformed() {
        let client = UploadClient::new(ScriptedTransport::responding(201, "{}"));
        let err = client.submit(valid_draft(), NoProgress).await.unwrap_err();
        assert!(matches!(err, UploadError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn transport_error_without_message_is_unknown() {
        let client = UploadClient::new(ScriptedTransport::new(
            vec![],
            Err(TransportError::without_message()),
        ));
        let err = client.submit(valid_draft(), NoProgress).await.unwrap_err();
        assert_eq!(err.message(), "Unknown error");
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_transport() {
        let client = UploadClient::new(ScriptedTransport::responding(
            201,
            r#"{"message":"Created"}"#,
        ));
        let mut draft = valid_draft();
        draft.terms_accepted = false;
        draft.title.clear();

        let err = client.submit(draft, NoProgress).await.unwrap_err();
        match err {
            UploadError::ValidationFailed(result) => {
                assert_eq!(result.error(Field::Title), Some(FieldError::EmptyField));
                assert_eq!(
                    result.error(Field::TermsAccepted),
                    Some(FieldError::TermsNotAccepted)
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(client.transport().calls.load(Ordering::SeqCst), 0);
    }
}
