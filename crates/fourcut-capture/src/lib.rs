#![warn(missing_docs)]
//! # fourcut-capture
//!
//! ## Purpose
//! Owns everything between the host camera and a sealed
//! [`fourcut_core::CaptureSet`].
//!
//! ## Responsibilities
//! - Define the host media seam ([`MediaDevices`], [`MediaStream`]).
//! - Wrap a live stream in an exclusively owned [`ResourceHandle`].
//! - Provide the [`CancellableTask`] primitive used for every timer-driven flow.
//! - Run the countdown -> capture loop in [`CaptureSequencer`].
//! - Expose a deterministic [`SyntheticCamera`] for CI, tests and the CLI.
//!
//! ## Data flow
//! Page requests a stream from [`MediaDevices`] -> stream installed in a
//! [`CameraHandle`] -> [`CaptureSequencer::start`] grabs and mirrors one frame
//! per shot -> [`SequenceObserver::on_complete`] receives the sealed set.
//!
//! ## Ownership and lifetimes
//! All types are single-threaded (`Rc`, `Cell`): every task runs on one
//! `tokio` `LocalSet`, so handles and observers are shared without locks.
//!
//! ## Error model
//! Denied or vanished cameras surface as [`CaptureError::ResourceUnavailable`];
//! cancellation is not an error and is reported as [`Cancelled`] only inside
//! task bodies.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use fourcut_core::Frame;
use futures_util::FutureExt as _;
use futures_util::future::LocalBoxFuture;
use thiserror::Error;

mod resource;
mod sequencer;
mod task;

pub use resource::{AcquisitionState, CameraHandle, Resource, ResourceHandle};
pub use sequencer::{CaptureSequencer, SequenceObserver, SequenceSettings};
pub use task::{CancellableTask, Cancelled, TaskScope};

/// Resolution hint passed with a stream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    /// Preferred frame width in pixels.
    pub ideal_width: u32,
    /// Preferred frame height in pixels.
    pub ideal_height: u32,
    /// Whether an audio track is requested alongside video.
    pub audio: bool,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            audio: false,
        }
    }
}

/// Geometry the host actually granted for a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    /// Granted frame width in pixels.
    pub width: u32,
    /// Granted frame height in pixels.
    pub height: u32,
}

/// A live video stream handed out by the host.
pub trait MediaStream {
    /// Returns the geometry the host granted.
    fn settings(&self) -> StreamSettings;

    /// Grabs the current frame, unmirrored.
    ///
    /// # Errors
    /// Returns [`CaptureError::ResourceUnavailable`] when the stream has been
    /// stopped or revoked.
    fn grab_frame(&self) -> Result<Frame, CaptureError>;

    /// Stops every track of the stream. Must be safe to call repeatedly.
    fn stop(&self);

    /// Returns `true` while the stream still produces frames.
    fn is_live(&self) -> bool;
}

/// Host capability that grants camera streams.
pub trait MediaDevices {
    /// Requests a video stream. The request may stay pending indefinitely.
    ///
    /// # Errors
    /// The future resolves to [`CaptureError::ResourceUnavailable`] when the
    /// user denies permission or no device exists.
    fn request_stream(
        &self,
        constraints: VideoConstraints,
    ) -> LocalBoxFuture<'static, Result<Box<dyn MediaStream>, CaptureError>>;
}

/// Counters shared between a [`SyntheticCamera`] and the streams it grants.
#[derive(Debug, Default)]
pub struct SyntheticStats {
    opened: Cell<usize>,
    stopped: Cell<usize>,
    frames: Cell<u64>,
}

impl SyntheticStats {
    /// Streams granted so far.
    pub fn opened(&self) -> usize {
        self.opened.get()
    }

    /// Streams stopped so far (each stream counts once).
    pub fn stopped(&self) -> usize {
        self.stopped.get()
    }

    /// Streams granted and not yet stopped.
    pub fn live(&self) -> usize {
        self.opened.get() - self.stopped.get()
    }

    /// Frames grabbed across all streams.
    pub fn frames(&self) -> u64 {
        self.frames.get()
    }
}

/// Deterministic camera for CI, tests and the headless CLI.
///
/// Pixel `(x, y)` of every frame carries `x` in the red channel, `y` in the
/// green channel and the per-stream frame sequence number in blue, which makes
/// mirroring and ordering observable.
#[derive(Debug)]
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    denial: Option<String>,
    acquire_delay: Duration,
    stats: Rc<SyntheticStats>,
}

impl SyntheticCamera {
    /// Creates a camera producing `width x height` frames.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            denial: None,
            acquire_delay: Duration::ZERO,
            stats: Rc::new(SyntheticStats::default()),
        }
    }

    /// Creates a camera whose every request is rejected with `reason`.
    pub fn denying(reason: impl Into<String>) -> Self {
        Self {
            denial: Some(reason.into()),
            ..Self::new(4, 3)
        }
    }

    /// Delays every grant by `delay`, simulating a slow permission prompt.
    pub fn with_acquire_delay(mut self, delay: Duration) -> Self {
        self.acquire_delay = delay;
        self
    }

    /// Shared counters for assertions.
    pub fn stats(&self) -> Rc<SyntheticStats> {
        Rc::clone(&self.stats)
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new(64, 48)
    }
}

impl MediaDevices for SyntheticCamera {
    fn request_stream(
        &self,
        constraints: VideoConstraints,
    ) -> LocalBoxFuture<'static, Result<Box<dyn MediaStream>, CaptureError>> {
        let denial = self.denial.clone();
        let delay = self.acquire_delay;
        let stats = Rc::clone(&self.stats);
        let settings = StreamSettings {
            width: self.width,
            height: self.height,
        };

        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if let Some(reason) = denial {
                return Err(CaptureError::ResourceUnavailable(reason));
            }

            tracing::debug!(
                stage = "camera",
                action = "granted",
                requested_width = constraints.ideal_width,
                requested_height = constraints.ideal_height,
                width = settings.width,
                height = settings.height
            );
            stats.opened.set(stats.opened.get() + 1);
            Ok(Box::new(SyntheticStream {
                settings,
                live: Cell::new(true),
                sequence: Cell::new(0),
                stats,
            }) as Box<dyn MediaStream>)
        }
        .boxed_local()
    }
}

#[derive(Debug)]
struct SyntheticStream {
    settings: StreamSettings,
    live: Cell<bool>,
    sequence: Cell<u64>,
    stats: Rc<SyntheticStats>,
}

impl MediaStream for SyntheticStream {
    fn settings(&self) -> StreamSettings {
        self.settings
    }

    fn grab_frame(&self) -> Result<Frame, CaptureError> {
        if !self.live.get() {
            return Err(CaptureError::ResourceUnavailable(
                "camera stream has stopped".to_string(),
            ));
        }

        let sequence = self.sequence.get() + 1;
        self.sequence.set(sequence);
        self.stats.frames.set(self.stats.frames.get() + 1);

        let StreamSettings { width, height } = self.settings;
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                rgba.extend_from_slice(&[x as u8, y as u8, sequence as u8, 255]);
            }
        }

        Frame::new(width, height, rgba).map_err(|error| CaptureError::Backend(error.to_string()))
    }

    fn stop(&self) {
        if self.live.replace(false) {
            self.stats.stopped.set(self.stats.stopped.get() + 1);
        }
    }

    fn is_live(&self) -> bool {
        self.live.get()
    }
}

/// Capture layer error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// Camera denied, missing, stopped or released.
    #[error("camera unavailable: {0}")]
    ResourceUnavailable(String),
    /// A handle can hold one resource for its whole life.
    #[error("resource handle already holds a resource")]
    AlreadyAcquired,
    /// Sequence settings failed validation.
    #[error("invalid capture settings: {0}")]
    InvalidSettings(String),
    /// Backend runtime failure.
    #[error("capture backend failure: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for synthetic capture behavior.

    use super::*;

    #[tokio::test]
    async fn synthetic_camera_grants_and_counts_streams() {
        let camera = SyntheticCamera::new(4, 2);
        let stats = camera.stats();

        let stream = camera
            .request_stream(VideoConstraints::default())
            .await
            .expect("synthetic camera should grant");
        let frame = stream.grab_frame().expect("live stream yields frames");
        assert_eq!((frame.width, frame.height), (4, 2));
        assert_eq!(&frame.rgba[4..8], &[1, 0, 1, 255]);

        stream.stop();
        stream.stop();
        assert_eq!(stats.opened(), 1);
        assert_eq!(stats.stopped(), 1);
        assert!(stream.grab_frame().is_err());
    }

    #[tokio::test]
    async fn denying_camera_rejects_requests() {
        let camera = SyntheticCamera::denying("permission denied");
        let error = camera
            .request_stream(VideoConstraints::default())
            .await
            .err()
            .expect("request must be rejected");
        assert_eq!(
            error,
            CaptureError::ResourceUnavailable("permission denied".to_string())
        );
        assert_eq!(camera.stats().opened(), 0);
    }
}
