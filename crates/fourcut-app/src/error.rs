//! User-facing error taxonomy.

use fourcut_capture::CaptureError;
use fourcut_compose::ComposeError;
use fourcut_ui::{Notice, Severity};
use thiserror::Error;

/// Recoverable photo booth failure. Every variant is shown as a notice; none
/// is fatal.
#[derive(Debug, Error)]
pub enum BoothError {
    /// Camera denied, missing, disabled or revoked.
    #[error("camera unavailable: {0}")]
    ResourceUnavailable(String),
    /// Wrong number of uploaded files.
    #[error("select exactly {expected} photos (got {actual})")]
    InputValidation {
        /// Required count.
        expected: usize,
        /// Selected count.
        actual: usize,
    },
    /// Gallery write refused for lack of space.
    #[error("gallery storage is full")]
    StorageExhausted,
    /// An uploaded file is not a readable image.
    #[error("cannot read {file}: {reason}")]
    DecodeFailure {
        /// Offending file name.
        file: String,
        /// Decoder message.
        reason: String,
    },
    /// Strip composition failed.
    #[error("cannot compose strip: {0}")]
    Compose(#[from] ComposeError),
    /// Export could not be produced or delivered.
    #[error("export failed: {0}")]
    Export(String),
}

impl BoothError {
    /// Translates the error into a notification.
    pub fn notice(&self) -> Notice {
        let (severity, title) = match self {
            Self::ResourceUnavailable(_) => (Severity::Error, "Camera unavailable"),
            Self::InputValidation { .. } => (Severity::Warning, "Wrong number of photos"),
            Self::StorageExhausted => (Severity::Warning, "Gallery is full"),
            Self::DecodeFailure { .. } => (Severity::Error, "Unreadable photo"),
            Self::Compose(_) => (Severity::Error, "Could not build the strip"),
            Self::Export(_) => (Severity::Error, "Download failed"),
        };
        Notice::new(severity, title, self.to_string())
    }
}

impl From<CaptureError> for BoothError {
    fn from(error: CaptureError) -> Self {
        match error {
            CaptureError::ResourceUnavailable(reason) => Self::ResourceUnavailable(reason),
            other => Self::ResourceUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_exhausted_is_a_warning() {
        let notice = BoothError::StorageExhausted.notice();
        assert_eq!(notice.severity, Severity::Warning);
        assert_eq!(notice.message, "gallery storage is full");
    }

    #[test]
    fn capture_errors_become_resource_unavailable() {
        let error = BoothError::from(CaptureError::ResourceUnavailable("denied".to_string()));
        assert_eq!(error.to_string(), "camera unavailable: denied");
        assert_eq!(error.notice().severity, Severity::Error);
    }
}
