//! Photo booth controller.
//!
//! Internal states are full re-renders of the same lease:
//! `Start -> CaptureInProgress -> Result <-> Viewer`, with the upload path
//! going `Start -> Loading -> Result`. Retake returns to `Start` from
//! anywhere. Leaving a state stops whatever it owned before the next state
//! renders, and nothing renders after teardown.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use fourcut_capture::{
    CameraHandle, CancellableTask, Cancelled, CaptureError, CaptureSequencer, MediaDevices,
    SequenceObserver, TaskScope, VideoConstraints,
};
use fourcut_compose::{Bitmap, FrameStyle, compose, encode_png};
use fourcut_core::{CAPTURE_COUNT, CaptureSet, Frame, decode_image};
use fourcut_gallery::{GalleryEntry, GalleryError};
use fourcut_router::{PageContext, Teardown};
use fourcut_ui::{MountLease, Notice, SelectedFile, Severity, UiAction, View};
use time::OffsetDateTime;

use crate::{AppContext, BoothError, export_file_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    CaptureInProgress,
    Loading,
    Result,
    Viewer,
}

#[derive(Default)]
struct Session {
    camera: Option<Rc<CameraHandle>>,
    acquisition: Option<CancellableTask>,
    sequence: Option<CancellableTask>,
    upload: Option<CancellableTask>,
    captures: CaptureSet,
    thumbnails: usize,
    composite: Option<Bitmap>,
}

impl Session {
    fn take_resources(&mut self) -> Resources {
        Resources {
            camera: self.camera.take(),
            tasks: [
                self.acquisition.take(),
                self.sequence.take(),
                self.upload.take(),
            ]
            .into_iter()
            .flatten()
            .collect(),
        }
    }
}

/// Resources detached from the session so they can be stopped with no
/// session borrow held.
struct Resources {
    camera: Option<Rc<CameraHandle>>,
    tasks: Vec<CancellableTask>,
}

impl Resources {
    fn stop(self) -> bool {
        for task in &self.tasks {
            task.cancel();
        }
        self.camera.is_some_and(|camera| camera.release())
    }
}

struct PhotoBooth {
    context: AppContext,
    lease: MountLease,
    sequencer: CaptureSequencer,
    this: Weak<PhotoBooth>,
    phase: Cell<Phase>,
    style: Cell<FrameStyle>,
    torn_down: Cell<bool>,
    session: RefCell<Session>,
}

/// Activates the photo booth on `page` and returns its teardown.
///
/// The teardown cancels every pending acquisition, countdown and decode task,
/// stops the camera and drops captured frames.
pub fn activate(context: AppContext, page: PageContext) -> Teardown {
    let booth = Rc::new_cyclic(|this| PhotoBooth {
        sequencer: CaptureSequencer::new(context.config.sequence),
        style: Cell::new(context.config.frame_style),
        context,
        lease: page.lease,
        this: this.clone(),
        phase: Cell::new(Phase::Start),
        torn_down: Cell::new(false),
        session: RefCell::default(),
    });

    let target = Rc::downgrade(&booth);
    booth.lease.set_action_handler(Rc::new(move |action| {
        if let Some(booth) = target.upgrade() {
            booth.handle(action);
        }
    }));
    booth.show_start();

    Teardown::new(move || booth.teardown())
}

impl PhotoBooth {
    fn handle(&self, action: UiAction) {
        if self.torn_down.get() {
            return;
        }

        match (self.phase.get(), action) {
            (Phase::Start, UiAction::StartCapture) => self.start_capture(),
            (Phase::Start, UiAction::SelectFiles(files)) => self.select_files(files),
            (Phase::Result, UiAction::ChangeStyle(name)) => self.change_style(&name),
            (Phase::Result | Phase::Viewer, UiAction::Download) => self.export(),
            (Phase::Result, UiAction::OpenViewer) => self.open_viewer(),
            (Phase::Viewer, UiAction::CloseViewer) => self.show_result(),
            (_, UiAction::Retake) => self.return_to_start(),
            (phase, other) => {
                tracing::debug!(stage = "photo_booth", action = "ignored", ?phase, input = ?other);
            }
        }
    }

    fn start_capture(&self) {
        self.reset_session();
        if !self.context.config.camera_enabled {
            self.fail_to_start(BoothError::ResourceUnavailable(
                "camera disabled by FOURCUT_CAMERA_ENABLED".to_string(),
            ));
            return;
        }

        let camera = Rc::new(CameraHandle::new());
        self.session.borrow_mut().camera = Some(Rc::clone(&camera));
        self.phase.set(Phase::CaptureInProgress);
        self.lease.render(View::Loading {
            message: "waiting for camera".to_string(),
        });

        let devices = Rc::clone(&self.context.devices);
        let constraints = self.context.config.video;
        let booth = self.this.clone();
        let task = CancellableTask::spawn_settling("camera-acquire", move |scope| {
            acquire_camera(scope, booth, devices, constraints, camera)
        });
        self.session.borrow_mut().acquisition = Some(task);
        tracing::info!(stage = "photo_booth", action = "camera_requested");
    }

    fn begin_sequence(&self, camera: Rc<CameraHandle>) {
        if self.phase.get() != Phase::CaptureInProgress {
            camera.release();
            return;
        }

        {
            let mut session = self.session.borrow_mut();
            session.acquisition = None;
            session.thumbnails = 0;
        }
        self.show_capture(0, Some(self.sequencer.settings().countdown_steps));

        let observer: Rc<dyn SequenceObserver> = Rc::new(BoothObserver {
            booth: self.this.clone(),
        });
        let task = self.sequencer.start(camera, observer);
        self.session.borrow_mut().sequence = Some(task);
    }

    fn finish_capture(&self, set: CaptureSet) {
        let camera = {
            let mut session = self.session.borrow_mut();
            session.sequence = None;
            session.camera.take()
        };
        // The stream stops before the result is shown.
        if let Some(camera) = camera {
            camera.release();
        }

        self.session.borrow_mut().captures = set;
        self.recompose();
    }

    fn capture_failed(&self, shot: usize, error: CaptureError) {
        tracing::warn!(stage = "photo_booth", action = "capture_failed", shot, error = %error);
        self.fail_to_start(BoothError::from(error));
    }

    fn select_files(&self, files: Vec<SelectedFile>) {
        if files.len() != CAPTURE_COUNT {
            self.notify(BoothError::InputValidation {
                expected: CAPTURE_COUNT,
                actual: files.len(),
            });
            return;
        }

        self.reset_session();
        self.phase.set(Phase::Loading);
        self.lease.render(View::Loading {
            message: format!("reading {} photos", files.len()),
        });

        let booth = self.this.clone();
        let task = CancellableTask::spawn("decode-upload", move |scope| {
            decode_selection(scope, booth, files)
        });
        self.session.borrow_mut().upload = Some(task);
    }

    fn finish_upload(&self, set: CaptureSet) {
        {
            let mut session = self.session.borrow_mut();
            session.upload = None;
            session.captures = set;
        }
        self.recompose();
    }

    fn change_style(&self, name: &str) {
        self.style.set(FrameStyle::from_name(name));
        self.recompose();
    }

    fn recompose(&self) {
        let composed = compose(&self.session.borrow().captures, self.style.get());
        match composed {
            Ok(bitmap) => {
                self.session.borrow_mut().composite = Some(bitmap);
                self.show_result();
            }
            Err(error) => self.fail_to_start(BoothError::Compose(error)),
        }
    }

    fn open_viewer(&self) {
        let size = self.composite_size();
        if let Some((width, height)) = size {
            self.phase.set(Phase::Viewer);
            self.lease.render(View::Viewer { width, height });
        }
    }

    fn export(&self) {
        let encoded = match self.session.borrow().composite.as_ref() {
            Some(bitmap) => encode_png(bitmap).map_err(|error| BoothError::Export(error.to_string())),
            None => Err(BoothError::Export("there is no strip to export yet".to_string())),
        };
        let png = match encoded {
            Ok(png) => png,
            Err(error) => {
                self.notify(error);
                return;
            }
        };

        let file_name = export_file_name(OffsetDateTime::now_utc());
        let downloaded = match self.context.downloads.deliver(&file_name, &png) {
            Ok(()) => true,
            Err(error) => {
                self.notify(error);
                false
            }
        };

        match self.context.gallery.append(GalleryEntry::from_png(&png)) {
            Ok(entries) => {
                tracing::info!(stage = "photo_booth", action = "exported", file = %file_name, entries);
                if downloaded {
                    self.context.notifier.notify(Notice::new(
                        Severity::Info,
                        "Saved",
                        format!("{file_name} downloaded; gallery holds {entries} strips"),
                    ));
                }
            }
            Err(GalleryError::StorageExhausted) => self.notify(BoothError::StorageExhausted),
            Err(error) => self.notify(BoothError::Export(error.to_string())),
        }
    }

    fn fail_to_start(&self, error: BoothError) {
        self.notify(error);
        self.return_to_start();
    }

    fn return_to_start(&self) {
        self.reset_session();
        self.show_start();
    }

    fn reset_session(&self) {
        let resources = self.session.borrow_mut().take_resources();
        resources.stop();

        let mut session = self.session.borrow_mut();
        session.captures.clear();
        session.composite = None;
        session.thumbnails = 0;
    }

    fn teardown(&self) {
        if self.torn_down.replace(true) {
            return;
        }

        let resources = self.session.borrow_mut().take_resources();
        let stopped_camera = resources.stop();
        {
            let mut session = self.session.borrow_mut();
            session.captures.clear();
            session.composite = None;
        }
        tracing::info!(
            stage = "photo_booth",
            action = "teardown",
            phase = ?self.phase.get(),
            stopped_camera
        );
    }

    fn show_start(&self) {
        self.phase.set(Phase::Start);
        self.lease.render(View::Start {
            capture_count: CAPTURE_COUNT,
        });
    }

    fn show_capture(&self, shot: usize, countdown: Option<u32>) {
        let thumbnails = self.session.borrow().thumbnails;
        self.lease.render(View::Capture {
            shot,
            countdown,
            thumbnails,
        });
    }

    fn show_result(&self) {
        let Some((width, height)) = self.composite_size() else {
            self.return_to_start();
            return;
        };
        self.phase.set(Phase::Result);
        self.lease.render(View::Result {
            style: self.style.get().name().to_string(),
            width,
            height,
        });
    }

    fn composite_size(&self) -> Option<(u32, u32)> {
        self.session
            .borrow()
            .composite
            .as_ref()
            .map(|bitmap| (bitmap.width, bitmap.height))
    }

    fn notify(&self, error: BoothError) {
        self.context.notifier.notify(error.notice());
    }
}

impl Drop for PhotoBooth {
    fn drop(&mut self) {
        self.teardown();
    }
}

struct BoothObserver {
    booth: Weak<PhotoBooth>,
}

impl BoothObserver {
    fn live_booth(&self) -> Option<Rc<PhotoBooth>> {
        self.booth
            .upgrade()
            .filter(|booth| !booth.torn_down.get())
    }
}

impl SequenceObserver for BoothObserver {
    fn on_countdown(&self, shot: usize, remaining: u32) {
        if let Some(booth) = self.live_booth() {
            booth.show_capture(shot, Some(remaining));
        }
    }

    fn on_captured(&self, shot: usize, _frame: &Frame) {
        if let Some(booth) = self.live_booth() {
            booth.session.borrow_mut().thumbnails = shot + 1;
            booth.show_capture(shot, None);
        }
    }

    fn on_complete(&self, set: CaptureSet) {
        if let Some(booth) = self.live_booth() {
            booth.finish_capture(set);
        }
    }

    fn on_failed(&self, shot: usize, error: CaptureError) {
        if let Some(booth) = self.live_booth() {
            booth.capture_failed(shot, error);
        }
    }
}

async fn acquire_camera(
    scope: TaskScope,
    booth: Weak<PhotoBooth>,
    devices: Rc<dyn MediaDevices>,
    constraints: VideoConstraints,
    camera: Rc<CameraHandle>,
) -> Result<(), Cancelled> {
    scope.checkpoint()?;
    let granted = devices.request_stream(constraints).await;
    // The acquisition task is never aborted mid-request. A grant landing after
    // teardown goes into the retired handle, which stops it on arrival.
    let installed = granted.and_then(|stream| camera.install(stream));
    scope.checkpoint()?;

    let Some(booth) = booth.upgrade() else {
        return Ok(());
    };
    match installed {
        Ok(()) => booth.begin_sequence(camera),
        Err(error) => booth.fail_to_start(BoothError::from(error)),
    }
    Ok(())
}

async fn decode_selection(
    scope: TaskScope,
    booth: Weak<PhotoBooth>,
    files: Vec<SelectedFile>,
) -> Result<(), Cancelled> {
    let mut frames = Vec::with_capacity(files.len());
    for file in &files {
        scope.yield_now().await?;
        match decode_image(&file.bytes) {
            Ok(frame) => frames.push(frame),
            Err(error) => {
                if let Some(booth) = booth.upgrade() {
                    booth.fail_to_start(BoothError::DecodeFailure {
                        file: file.name.clone(),
                        reason: error.to_string(),
                    });
                }
                return Ok(());
            }
        }
    }

    scope.checkpoint()?;
    let Some(booth) = booth.upgrade() else {
        return Ok(());
    };
    match CaptureSet::seal(frames, CAPTURE_COUNT) {
        Ok(set) => booth.finish_upload(set),
        Err(_) => booth.fail_to_start(BoothError::InputValidation {
            expected: CAPTURE_COUNT,
            actual: files.len(),
        }),
    }
    Ok(())
}
