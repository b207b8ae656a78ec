#![warn(missing_docs)]
//! # fourcut-ui
//!
//! ## Purpose
//! Defines the headless rendering model the pages draw into.
//!
//! ## Responsibilities
//! - Describe every screen as a [`View`] value.
//! - Own the single mount target ([`Surface`]) and hand out generation-scoped
//!   [`MountLease`]s so stale renders from a torn-down page are ignored.
//! - Route user input ([`UiAction`]) to the handler the active page registered.
//! - Collect user-visible notifications ([`Notifier`]).
//!
//! ## Data flow
//! Router clears the surface -> page receives a lease -> page renders views and
//! registers an action handler -> shell dispatches [`UiAction`]s through the
//! surface.
//!
//! ## Ownership and lifetimes
//! The surface is shared as `Rc<Surface>`. Leases own an `Rc` to it; the
//! registered handler is dropped on every clear, so pages should capture only
//! `Weak` references to themselves inside it.
//!
//! ## Error model
//! Rendering never fails. A stale lease is reported by returning `false` and a
//! warning log.

use std::cell::RefCell;
use std::fmt;

mod surface;

pub use surface::{ActionHandler, EVENT_LOG_CAPACITY, MountLease, Surface, SurfaceEvent};

/// One rendered screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Landing page with the shoot entry point.
    Home {
        /// Application version shown in the footer.
        version: String,
    },
    /// Static about page.
    About {
        /// Application version.
        version: String,
    },
    /// No route matched `path`.
    NotFound {
        /// Normalized path that failed to resolve.
        path: String,
    },
    /// Work in progress (file decoding, composing).
    Loading {
        /// Status line.
        message: String,
    },
    /// Photo booth idle: capture or upload entry points.
    Start {
        /// Shots per session.
        capture_count: usize,
    },
    /// Live preview while a sequence runs.
    Capture {
        /// Zero-based shot being prepared.
        shot: usize,
        /// Countdown value on screen, `None` right after a capture.
        countdown: Option<u32>,
        /// Thumbnail slots already filled.
        thumbnails: usize,
    },
    /// Composite preview with style and export controls.
    Result {
        /// Active frame style name.
        style: String,
        /// Composite width.
        width: u32,
        /// Composite height.
        height: u32,
    },
    /// Full-size composite overlay.
    Viewer {
        /// Composite width.
        width: u32,
        /// Composite height.
        height: u32,
    },
    /// Persisted gallery listing.
    Gallery {
        /// Stored strips.
        entries: usize,
    },
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home { version } => write!(f, "home (v{version})"),
            Self::About { version } => write!(f, "about (v{version})"),
            Self::NotFound { path } => write!(f, "not found: {path}"),
            Self::Loading { message } => write!(f, "loading: {message}"),
            Self::Start { capture_count } => write!(f, "ready to take {capture_count} shots"),
            Self::Capture {
                shot,
                countdown: Some(remaining),
                thumbnails,
            } => write!(f, "shot {} in {remaining} ({thumbnails} taken)", shot + 1),
            Self::Capture {
                shot,
                countdown: None,
                thumbnails,
            } => write!(f, "shot {} captured ({thumbnails} taken)", shot + 1),
            Self::Result {
                style,
                width,
                height,
            } => write!(f, "result {width}x{height} ({style} frame)"),
            Self::Viewer { width, height } => write!(f, "viewer {width}x{height}"),
            Self::Gallery { entries } => write!(f, "gallery with {entries} strips"),
        }
    }
}

/// Encoded image picked through the file input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name as reported by the picker.
    pub name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

/// User input routed to the active page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// Home "shoot" button.
    Shoot,
    /// Start the camera capture sequence.
    StartCapture,
    /// Files chosen through the upload input, in selection order.
    SelectFiles(Vec<SelectedFile>),
    /// Frame style picked on the result screen.
    ChangeStyle(String),
    /// Export the composite.
    Download,
    /// Open the full-size viewer.
    OpenViewer,
    /// Close the full-size viewer.
    CloseViewer,
    /// Discard the session and return to start.
    Retake,
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational.
    Info,
    /// Recoverable problem.
    Warning,
    /// Operation failed.
    Error,
}

/// User-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Short headline.
    pub title: String,
    /// Detail line.
    pub message: String,
    /// Severity.
    pub severity: Severity,
}

impl Notice {
    /// Creates a notice.
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Sink for user-visible notifications.
#[derive(Debug, Default)]
pub struct Notifier {
    shown: RefCell<Vec<Notice>>,
}

impl Notifier {
    /// Creates an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `notice`.
    pub fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => tracing::info!(stage = "notice", title = %notice.title, message = %notice.message),
            Severity::Warning | Severity::Error => {
                tracing::warn!(stage = "notice", title = %notice.title, message = %notice.message)
            }
        }
        self.shown.borrow_mut().push(notice);
    }

    /// Every notice shown so far, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.shown.borrow().clone()
    }

    /// Most recent notice.
    pub fn last(&self) -> Option<Notice> {
        self.shown.borrow().last().cloned()
    }
}
