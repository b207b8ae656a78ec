#![warn(missing_docs)]
//! # fourcut-gallery
//!
//! ## Purpose
//! Persists exported photo strips so they survive restarts.
//!
//! ## Responsibilities
//! - Abstract the synchronous string store ([`KeyValueStore`]).
//! - Keep the gallery as one JSON array of PNG data URLs under
//!   [`GALLERY_KEY`].
//! - Degrade to an empty gallery when the stored value is missing or corrupt.
//!
//! ## Data flow
//! Export encodes a PNG -> [`GalleryEntry::from_png`] -> [`Gallery::append`]
//! reads, extends and rewrites the array -> the viewer page calls
//! [`Gallery::load_all`].
//!
//! ## Ownership and lifetimes
//! [`Gallery`] shares its backend through `Rc<dyn KeyValueStore>`; the app
//! context and pages hold cheap clones.
//!
//! ## Error model
//! Corrupt data is logged and treated as empty. A full backend surfaces as
//! [`GalleryError::StorageExhausted`] and leaves the stored collection as it
//! was.

use std::rc::Rc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};

/// Store key holding the serialized gallery.
pub const GALLERY_KEY: &str = "fourcut.gallery";

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// One stored strip, as an encoded-image data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GalleryEntry(String);

impl GalleryEntry {
    /// Wraps PNG bytes as a `data:image/png;base64,...` URL.
    pub fn from_png(png: &[u8]) -> Self {
        Self(format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png)))
    }

    /// Data URL text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decodes the PNG bytes back out of the data URL.
    ///
    /// # Errors
    /// Returns [`GalleryError::InvalidEntry`] for non-PNG URLs or bad base64.
    pub fn png_bytes(&self) -> Result<Vec<u8>, GalleryError> {
        let payload = self
            .0
            .strip_prefix(PNG_DATA_URL_PREFIX)
            .ok_or_else(|| GalleryError::InvalidEntry("not a png data url".to_string()))?;
        STANDARD
            .decode(payload)
            .map_err(|error| GalleryError::InvalidEntry(error.to_string()))
    }
}

/// Ordered collection of exported strips over a [`KeyValueStore`].
#[derive(Clone)]
pub struct Gallery {
    store: Rc<dyn KeyValueStore>,
}

impl Gallery {
    /// Creates a gallery persisted in `store`.
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads every entry in append order.
    ///
    /// Missing, unreadable or malformed data yields an empty list.
    pub fn load_all(&self) -> Vec<GalleryEntry> {
        self.read_entries().unwrap_or_else(|error| {
            tracing::warn!(stage = "gallery", action = "read_failed", error = %error);
            Vec::new()
        })
    }

    /// Appends `entry` and returns the new gallery length.
    ///
    /// # Errors
    /// Returns [`GalleryError::StorageExhausted`] when the backend is full and
    /// [`GalleryError::Backend`] when the current list cannot be read. In both
    /// cases the stored collection is unchanged.
    pub fn append(&self, entry: GalleryEntry) -> Result<usize, GalleryError> {
        let mut entries = self.read_entries().map_err(|error| {
            tracing::warn!(stage = "gallery", action = "append_read_failed", error = %error);
            GalleryError::Backend(error.to_string())
        })?;
        entries.push(entry);
        let serialized = serde_json::to_string(&entries)
            .map_err(|error| GalleryError::Backend(error.to_string()))?;

        match self.store.set(GALLERY_KEY, &serialized) {
            Ok(()) => {
                tracing::info!(stage = "gallery", action = "append", entries = entries.len());
                Ok(entries.len())
            }
            Err(StoreError::QuotaExceeded { requested, quota }) => {
                tracing::warn!(stage = "gallery", action = "quota_exceeded", requested, quota);
                Err(GalleryError::StorageExhausted)
            }
            Err(error) => Err(GalleryError::Backend(error.to_string())),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.load_all().len()
    }

    /// Returns `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Gallery {
    /// Reads the stored list. Only backend failures are errors; corrupt or
    /// non-array data reads as empty.
    fn read_entries(&self) -> Result<Vec<GalleryEntry>, StoreError> {
        let Some(raw) = self.store.get(GALLERY_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<GalleryEntry>>(&raw) {
            Ok(entries) => Ok(entries),
            Err(error) => {
                tracing::warn!(
                    stage = "gallery",
                    action = "corrupt_data",
                    bytes = raw.len(),
                    error = %error
                );
                Ok(Vec::new())
            }
        }
    }
}

impl std::fmt::Debug for Gallery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gallery").finish_non_exhaustive()
    }
}

/// Gallery error type.
#[derive(Debug, Error)]
pub enum GalleryError {
    /// Backend quota exceeded; the entry was not stored.
    #[error("gallery storage is full")]
    StorageExhausted,
    /// Backend failed for another reason.
    #[error("gallery backend failure: {0}")]
    Backend(String),
    /// Entry is not a PNG data URL.
    #[error("invalid gallery entry: {0}")]
    InvalidEntry(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for gallery entries.

    use super::*;

    #[test]
    fn entry_wraps_png_as_data_url() {
        let entry = GalleryEntry::from_png(&[0x89, b'P', b'N', b'G']);
        assert_eq!(entry.as_str(), "data:image/png;base64,iVBORw==");
        assert_eq!(
            entry.png_bytes().expect("valid entry"),
            vec![0x89, b'P', b'N', b'G']
        );
    }

    #[test]
    fn entry_serializes_as_plain_string() {
        let entry = GalleryEntry::from_png(b"x");
        let json = serde_json::to_string(&vec![entry]).expect("serialize");
        assert_eq!(json, r#"["data:image/png;base64,eA=="]"#);
    }
}
