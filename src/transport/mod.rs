//! Contract between the upload client and the network.
//!
//! The transport is opaque: it receives a fully built payload, reports how
//! many media bytes have been handed to the wire, and returns the raw
//! response. Status interpretation belongs to the upload client.

pub mod http;

use crate::models::{MediaFile, MediaSource, SubmissionDraft};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::SecondsFormat;
use thiserror::Error;
use tokio::sync::mpsc;

pub use http::HttpTransport;

/// Multipart field name carrying the binary media content.
pub const MEDIA_PART: &str = "video";

/// Named parts of one upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub media: MediaFile,
    pub title: String,
    pub location: String,
    /// ISO-8601 timestamp (RFC 3339, millisecond precision, UTC).
    pub start_date_time: String,
    /// Byte count as a decimal string.
    pub file_size: String,
    /// MIME type of the media.
    pub format: String,
}

impl UploadPayload {
    /// Serialize a draft snapshot. Returns `None` when no media is attached.
    pub fn from_draft(draft: &SubmissionDraft) -> Option<Self> {
        let media = draft.primary_media()?.clone();
        Some(Self {
            title: draft.title.clone(),
            location: draft.location.clone(),
            start_date_time: draft
                .start_date_time
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            file_size: media.size.to_string(),
            format: media.mime_type.clone(),
            media,
        })
    }

    /// Text parts in the order they are written to the request.
    pub fn text_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("title", self.title.as_str()),
            ("location", self.location.as_str()),
            ("startDateTime", self.start_date_time.as_str()),
            ("fileSize", self.file_size.as_str()),
            ("format", self.format.as_str()),
        ]
    }

    /// Number of media bytes the transport will send.
    pub fn total_bytes(&self) -> u64 {
        match &self.media.source {
            MediaSource::Memory(data) => data.len() as u64,
            MediaSource::Path(_) => self.media.size,
        }
    }
}

/// Cumulative count of media bytes sent, pushed by the transport.
#[derive(Debug, Clone)]
pub struct TransferProgress {
    tx: mpsc::UnboundedSender<u64>,
}

impl TransferProgress {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<u64>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Report the running total. Ignored once nobody is listening.
    pub fn bytes_sent(&self, total_sent: u64) {
        let _ = self.tx.send(total_sent);
    }
}

/// Raw response from the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

/// The request could not be completed at the network level.
#[derive(Debug, Clone, Error)]
#[error("transport failure: {}", .message.as_deref().unwrap_or(crate::errors::UNKNOWN_ERROR))]
pub struct TransportError {
    pub message: Option<String>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn without_message() -> Self {
        Self { message: None }
    }
}

/// Issues a single, non-resumable upload request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        payload: UploadPayload,
        progress: TransferProgress,
    ) -> Result<TransportResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn payload_parts_follow_the_draft() {
        let start = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
        let mut draft = SubmissionDraft::new(start);
        draft.title = "Launch".into();
        draft.location = "Pad 39A".into();
        draft.media = vec![
            MediaFile::in_memory("launch.mp4", "video/mp4", Bytes::from(vec![0u8; 2048])),
            MediaFile::in_memory("ignored.mp4", "video/mp4", Bytes::from_static(b"x")),
        ];

        let payload = UploadPayload::from_draft(&draft).unwrap();
        assert_eq!(payload.media.name, "launch.mp4");
        assert_eq!(payload.total_bytes(), 2048);
        assert_eq!(
            payload.text_fields(),
            [
                ("title", "Launch"),
                ("location", "Pad 39A"),
                ("startDateTime", "2026-03-14T15:09:26.000Z"),
                ("fileSize", "2048"),
                ("format", "video/mp4"),
            ]
        );
    }

    #[test]
    fn payload_requires_media() {
        let draft = SubmissionDraft::new(Utc::now());
        assert!(UploadPayload::from_draft(&draft).is_none());
    }
}
