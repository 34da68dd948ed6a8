//! HTTP transport: one multipart POST per submission.
//!
//! The media part is streamed (from disk or memory) with a known length so
//! progress can be counted as the body is pulled onto the connection.

use super::{
    MEDIA_PART, Transport, TransferProgress, TransportError, TransportResponse, UploadPayload,
};
use crate::models::MediaSource;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream::BoxStream};
use reqwest::{
    Body, Client,
    multipart::{Form, Part},
};
use std::io;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// Size of the chunks handed to the connection; one progress tick each.
const CHUNK_SIZE: usize = 64 * 1024;

/// Sends uploads to a fixed endpoint with `reqwest`.
///
/// No application-level timeout is set; the connection's own limits apply.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> reqwest::Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn open_media(
        source: &MediaSource,
    ) -> Result<BoxStream<'static, io::Result<Bytes>>, TransportError> {
        match source {
            MediaSource::Path(path) => {
                let file = File::open(path).await.map_err(|err| {
                    TransportError::new(format!("failed to open {}: {}", path.display(), err))
                })?;
                Ok(ReaderStream::with_capacity(file, CHUNK_SIZE).boxed())
            }
            MediaSource::Memory(data) => {
                let chunks = chunk_bytes(data.clone())
                    .into_iter()
                    .map(Ok::<_, io::Error>)
                    .collect::<Vec<_>>();
                Ok(futures::stream::iter(chunks).boxed())
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        payload: UploadPayload,
        progress: TransferProgress,
    ) -> Result<TransportResponse, TransportError> {
        let total = payload.total_bytes();
        let stream = Self::open_media(&payload.media.source).await?;

        let mut sent: u64 = 0;
        let counted = stream.map(move |chunk| {
            if let Ok(bytes) = &chunk {
                sent += bytes.len() as u64;
                progress.bytes_sent(sent);
            }
            chunk
        });

        let media_part = Part::stream_with_length(Body::wrap_stream(counted), total)
            .file_name(payload.media.name.clone())
            .mime_str(&payload.media.mime_type)
            .map_err(|err| TransportError::new(format!("invalid media type: {}", err)))?;

        let mut form = Form::new().part(MEDIA_PART, media_part);
        for (name, value) in payload.text_fields() {
            form = form.text(name, value.to_string());
        }

        debug!(
            endpoint = %self.endpoint,
            file = %payload.media.name,
            size_bytes = total,
            "sending upload request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|err| {
                warn!("upload request to {} failed: {}", self.endpoint, err);
                TransportError::new(err.to_string())
            })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::new(format!("failed to read response body: {}", err)))?;

        Ok(TransportResponse { status, body })
    }
}

/// Split an in-memory buffer into zero-copy chunks.
fn chunk_bytes(data: Bytes) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(data.len() / CHUNK_SIZE + 1);
    let mut start = 0;
    while start < data.len() {
        let end = (start + CHUNK_SIZE).min(data.len());
        chunks.push(data.slice(start..end));
        start = end;
    }
    chunks
}
