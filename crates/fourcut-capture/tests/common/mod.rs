//! Shared fixtures for capture integration tests.

use std::cell::RefCell;
use std::rc::Rc;

use fourcut_capture::{
    CameraHandle, CaptureError, MediaDevices, SequenceObserver, SyntheticCamera, VideoConstraints,
};
use fourcut_core::{CaptureSet, Frame};

/// Observer that records every sequence event.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub countdowns: RefCell<Vec<(usize, u32)>>,
    pub captured: RefCell<Vec<Frame>>,
    pub completed: RefCell<Option<CaptureSet>>,
    pub failures: RefCell<Vec<(usize, CaptureError)>>,
}

impl SequenceObserver for RecordingObserver {
    fn on_countdown(&self, shot: usize, remaining: u32) {
        self.countdowns.borrow_mut().push((shot, remaining));
    }

    fn on_captured(&self, _shot: usize, frame: &Frame) {
        self.captured.borrow_mut().push(frame.clone());
    }

    fn on_complete(&self, set: CaptureSet) {
        *self.completed.borrow_mut() = Some(set);
    }

    fn on_failed(&self, shot: usize, error: CaptureError) {
        self.failures.borrow_mut().push((shot, error));
    }
}

/// Requests one stream from `camera` and installs it in a fresh handle.
#[allow(dead_code)]
pub async fn acquired_camera(camera: &SyntheticCamera) -> Rc<CameraHandle> {
    let handle = Rc::new(CameraHandle::new());
    let stream = camera
        .request_stream(VideoConstraints::default())
        .await
        .ok()
        .expect("synthetic camera should grant a stream");
    handle.install(stream).expect("fresh handle accepts a stream");
    handle
}
