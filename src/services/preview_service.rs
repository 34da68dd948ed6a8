//! Local preview resources for the selected media.
//!
//! A preview is a temporary reference the shell uses to show the chosen
//! file before upload. Handles are not `Clone`: each one is released exactly
//! once, when new media replaces it or the draft resets.

use crate::{errors::ResourceError, models::MediaFile};
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// A live preview reference.
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    id: Uuid,
    url: String,
}

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Creates and releases preview resources.
pub trait PreviewStore: Send {
    fn create(&mut self, media: &MediaFile) -> Result<PreviewHandle, ResourceError>;
    fn release(&mut self, handle: PreviewHandle);
}

/// Issues `blob:`-style URLs and keeps track of the ones still alive.
#[derive(Debug, Default)]
pub struct ObjectUrlStore {
    live: HashMap<Uuid, String>,
}

impl ObjectUrlStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of previews created and not yet released.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, id: Uuid) -> bool {
        self.live.contains_key(&id)
    }
}

impl PreviewStore for ObjectUrlStore {
    fn create(&mut self, media: &MediaFile) -> Result<PreviewHandle, ResourceError> {
        // Size was captured when the file was opened; no disk access here.
        if media.size == 0 {
            return Err(ResourceError::Empty(media.name.clone()));
        }

        let id = Uuid::new_v4();
        let url = format!("blob:preview/{}", id);
        self.live.insert(id, media.name.clone());
        debug!("created preview {} for {}", url, media.name);

        Ok(PreviewHandle { id, url })
    }

    fn release(&mut self, handle: PreviewHandle) {
        match self.live.remove(&handle.id) {
            Some(name) => debug!("released preview {} for {}", handle.url, name),
            None => warn!(preview = %handle.url, "released a preview this store does not own"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaSource;
    use bytes::Bytes;

    #[test]
    fn create_and_release_tracks_live_previews() {
        let mut store = ObjectUrlStore::new();
        let media = MediaFile::in_memory("a.mp4", "video/mp4", Bytes::from_static(b"abc"));

        let first = store.create(&media).unwrap();
        let second = store.create(&media).unwrap();
        assert_ne!(first.url(), second.url());
        assert!(first.url().starts_with("blob:preview/"));
        assert_eq!(store.live_count(), 2);

        let first_id = first.id();
        store.release(first);
        assert!(!store.is_live(first_id));
        assert_eq!(store.live_count(), 1);

        store.release(second);
        assert_eq!(store.live_count(), 0);
    }

    fn on_disk(name: &str, size: u64) -> MediaFile {
        let dir = tempfile::tempdir().unwrap();
        MediaFile {
            name: name.into(),
            mime_type: "video/mp4".into(),
            size,
            source: MediaSource::Path(dir.path().join(name)),
        }
    }

    #[test]
    fn empty_media_has_no_preview() {
        let mut store = ObjectUrlStore::new();
        let empty = MediaFile::in_memory("empty.mp4", "video/mp4", Bytes::new());
        assert!(matches!(store.create(&empty), Err(ResourceError::Empty(_))));

        let empty_on_disk = on_disk("empty.mp4", 0);
        assert!(matches!(
            store.create(&empty_on_disk),
            Err(ResourceError::Empty(_))
        ));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn create_trusts_the_size_captured_at_open() {
        // The backing tempdir is already gone; creating the preview must not
        // go back to the filesystem.
        let mut store = ObjectUrlStore::new();
        let media = on_disk("launch.mp4", 10);
        let handle = store.create(&media).unwrap();
        assert!(store.is_live(handle.id()));
        store.release(handle);
        assert_eq!(store.live_count(), 0);
    }
}
