//! Download delivery for exported strips.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use time::OffsetDateTime;

use crate::BoothError;

/// Receives finished download artifacts.
pub trait DownloadSink {
    /// Delivers `bytes` under `file_name`.
    ///
    /// # Errors
    /// Returns [`BoothError::Export`] when the artifact cannot be written.
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<(), BoothError>;
}

/// Unique artifact name `web_fourcut_<unix-millis>.png`.
pub fn export_file_name(at: OffsetDateTime) -> String {
    let millis = at.unix_timestamp_nanos() / 1_000_000;
    format!("web_fourcut_{millis}.png")
}

/// Writes downloads into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    /// Targets `dir`; it is created on first delivery.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectoryDownloads {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<(), BoothError> {
        fs::create_dir_all(&self.dir)
            .map_err(|error| BoothError::Export(format!("{}: {error}", self.dir.display())))?;
        let target = self.dir.join(file_name);
        fs::write(&target, bytes)
            .map_err(|error| BoothError::Export(format!("{}: {error}", target.display())))?;
        tracing::info!(
            stage = "export",
            action = "download_written",
            path = %target.display(),
            bytes = bytes.len()
        );
        Ok(())
    }
}

/// Keeps downloads in memory, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryDownloads {
    files: RefCell<Vec<(String, Vec<u8>)>>,
}

impl MemoryDownloads {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered `(file_name, bytes)` pairs in order.
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.files.borrow().clone()
    }
}

impl DownloadSink for MemoryDownloads {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<(), BoothError> {
        self.files
            .borrow_mut()
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(())
    }
}
