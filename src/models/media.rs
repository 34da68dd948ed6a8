//! Represents a media file attached to a draft.

use bytes::Bytes;
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;

/// Fallback content type for extensions we do not recognise.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Where the bytes of a media file live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// File on local disk, streamed at upload time.
    Path(PathBuf),
    /// Content already held in memory.
    Memory(Bytes),
}

/// A single file handle selected by the user.
///
/// The struct carries the metadata needed for validation and for the
/// multipart payload; content is only read when the transport sends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Original filename (last path component).
    pub name: String,

    /// Content type (MIME type), e.g. `video/mp4`.
    pub mime_type: String,

    /// Size in bytes.
    pub size: u64,

    /// Where the content is read from at upload time.
    pub source: MediaSource,
}

impl MediaFile {
    /// Build a file backed by an in-memory buffer.
    pub fn in_memory(name: impl Into<String>, mime_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: data.len() as u64,
            source: MediaSource::Memory(data),
        }
    }

    /// Open a file on disk, reading its size and guessing the MIME type
    /// from the extension.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let meta = fs::metadata(path).await?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            mime_type: guess_mime_type(path).to_string(),
            name,
            size: meta.len(),
            source: MediaSource::Path(path.to_path_buf()),
        })
    }

    /// Override the guessed content type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Top-level media type, i.e. the part before `/` (`video` for `video/mp4`).
    pub fn top_level_type(&self) -> Option<&str> {
        self.mime_type.split_once('/').map(|(top, _)| top)
    }
}

/// Map common file extensions to their content type.
///
/// Only the extension has to be valid UTF-8; the rest of the name may not be.
pub fn guess_mime_type(path: impl AsRef<Path>) -> &'static str {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        // Videos
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "m4v" => "video/x-m4v",
        "mpeg" | "mpg" => "video/mpeg",
        "ogv" => "video/ogg",
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        // Documents
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => DEFAULT_MIME_TYPE,
    }
}
