//! Countdown -> capture loop over a camera handle.

use std::rc::Rc;
use std::time::Duration;

use fourcut_core::{CAPTURE_COUNT, CaptureSet, Frame};

use crate::{CameraHandle, CancellableTask, Cancelled, CaptureError, TaskScope};

/// Timing and length of one capture sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceSettings {
    /// Shots per sequence.
    pub frame_count: usize,
    /// Countdown values shown before each shot (`steps..=1`).
    pub countdown_steps: u32,
    /// Duration of one countdown step.
    pub tick: Duration,
    /// Pause between two shots; not applied after the last one.
    pub inter_shot_delay: Duration,
}

impl SequenceSettings {
    /// Creates validated settings.
    ///
    /// # Errors
    /// Returns [`CaptureError::InvalidSettings`] when `frame_count` or
    /// `countdown_steps` is zero, or `tick` is zero.
    pub fn new(
        frame_count: usize,
        countdown_steps: u32,
        tick: Duration,
        inter_shot_delay: Duration,
    ) -> Result<Self, CaptureError> {
        if frame_count == 0 {
            return Err(CaptureError::InvalidSettings(
                "frame count must be greater than zero".to_string(),
            ));
        }
        if countdown_steps == 0 {
            return Err(CaptureError::InvalidSettings(
                "countdown needs at least one step".to_string(),
            ));
        }
        if tick.is_zero() {
            return Err(CaptureError::InvalidSettings(
                "countdown tick must be longer than zero".to_string(),
            ));
        }

        Ok(Self {
            frame_count,
            countdown_steps,
            tick,
            inter_shot_delay,
        })
    }

    /// Offset from sequence start at which shot `shot` is taken.
    pub fn capture_offset(&self, shot: usize) -> Duration {
        let countdown = self.tick * self.countdown_steps;
        (countdown + self.inter_shot_delay) * shot as u32 + countdown
    }
}

impl Default for SequenceSettings {
    fn default() -> Self {
        Self {
            frame_count: CAPTURE_COUNT,
            countdown_steps: 3,
            tick: Duration::from_secs(1),
            inter_shot_delay: Duration::from_secs(1),
        }
    }
}

/// Receives the observable steps of a running sequence.
///
/// No method is called after the owning task has been cancelled.
pub trait SequenceObserver {
    /// One countdown step of `shot`; `remaining` runs from the configured step
    /// count down to 1.
    fn on_countdown(&self, shot: usize, remaining: u32);

    /// `frame` (already mirrored) was captured for `shot`.
    fn on_captured(&self, shot: usize, frame: &Frame);

    /// Every shot was captured; `set` holds them in shot order.
    fn on_complete(&self, set: CaptureSet);

    /// The sequence stopped at `shot` (frames captured so far) without
    /// producing a set.
    fn on_failed(&self, shot: usize, error: CaptureError);
}

/// Orchestrates the fixed-length countdown -> capture loop.
#[derive(Debug, Clone, Default)]
pub struct CaptureSequencer {
    settings: SequenceSettings,
}

impl CaptureSequencer {
    /// Creates a sequencer with validated settings.
    pub fn new(settings: SequenceSettings) -> Self {
        Self { settings }
    }

    /// Configured settings.
    pub fn settings(&self) -> SequenceSettings {
        self.settings
    }

    /// Starts the sequence on the current `LocalSet`.
    ///
    /// Shots run strictly in order. The camera handle is only read; releasing
    /// it mid-sequence makes the next capture fail with
    /// [`CaptureError::ResourceUnavailable`].
    pub fn start(
        &self,
        camera: Rc<CameraHandle>,
        observer: Rc<dyn SequenceObserver>,
    ) -> CancellableTask {
        let settings = self.settings;
        tracing::info!(
            stage = "sequence",
            action = "start",
            frame_count = settings.frame_count,
            countdown_steps = settings.countdown_steps
        );
        CancellableTask::spawn("capture-sequence", move |scope| {
            run_sequence(scope, settings, camera, observer)
        })
    }
}

async fn run_sequence(
    scope: TaskScope,
    settings: SequenceSettings,
    camera: Rc<CameraHandle>,
    observer: Rc<dyn SequenceObserver>,
) -> Result<(), Cancelled> {
    // Partial shots stay private to this future until sealed.
    let mut shots: Vec<Frame> = Vec::with_capacity(settings.frame_count);

    for shot in 0..settings.frame_count {
        for remaining in (1..=settings.countdown_steps).rev() {
            scope.checkpoint()?;
            observer.on_countdown(shot, remaining);
            scope.sleep(settings.tick).await?;
        }

        scope.checkpoint()?;
        let frame = match camera.grab_frame() {
            Ok(raw) => raw.mirrored(),
            Err(error) => {
                tracing::warn!(
                    stage = "sequence",
                    action = "capture_failed",
                    shot,
                    error = %error
                );
                observer.on_failed(shots.len(), error);
                return Ok(());
            }
        };

        observer.on_captured(shot, &frame);
        shots.push(frame);
        tracing::debug!(stage = "sequence", action = "captured", shot);

        if shot + 1 < settings.frame_count {
            scope.sleep(settings.inter_shot_delay).await?;
        }
    }

    scope.checkpoint()?;
    match CaptureSet::seal(shots, settings.frame_count) {
        Ok(set) => {
            tracing::info!(stage = "sequence", action = "complete", frames = set.len());
            observer.on_complete(set);
        }
        Err(error) => {
            observer.on_failed(
                settings.frame_count,
                CaptureError::Backend(error.to_string()),
            );
        }
    }
    Ok(())
}
