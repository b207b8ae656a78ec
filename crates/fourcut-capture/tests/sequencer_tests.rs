//! Integration tests for the countdown -> capture sequencer.

mod common;

use std::rc::Rc;
use std::time::Duration;

use common::{RecordingObserver, acquired_camera};
use fourcut_capture::{
    AcquisitionState, CaptureError, CaptureSequencer, SequenceSettings, SyntheticCamera,
};
use tokio::task::LocalSet;

#[tokio::test(start_paused = true)]
async fn sequencer_tests_complete_run_yields_mirrored_frames_in_order() {
    LocalSet::new()
        .run_until(async {
            let camera = SyntheticCamera::new(4, 2);
            let handle = acquired_camera(&camera).await;
            let observer = Rc::new(RecordingObserver::default());

            let task = CaptureSequencer::default().start(Rc::clone(&handle), observer.clone());
            tokio::time::sleep(Duration::from_millis(15_500)).await;

            let set = observer
                .completed
                .borrow_mut()
                .take()
                .expect("sequence should complete");
            assert_eq!(set.len(), 4);
            for (shot, frame) in set.frames().iter().enumerate() {
                // Synthetic red channel is the source x coordinate; mirrored
                // frames start with the right-most column.
                assert_eq!(frame.rgba[0], 3);
                assert_eq!(frame.rgba[12], 0);
                // Blue channel carries the grab sequence number.
                assert_eq!(frame.rgba[2], shot as u8 + 1);
            }
            assert!(observer.failures.borrow().is_empty());
            assert!(task.is_finished());
            assert_eq!(handle.state(), AcquisitionState::Acquired);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn sequencer_tests_emit_countdown_steps_before_each_shot() {
    LocalSet::new()
        .run_until(async {
            let camera = SyntheticCamera::new(2, 2);
            let handle = acquired_camera(&camera).await;
            let observer = Rc::new(RecordingObserver::default());

            let _task = CaptureSequencer::default().start(handle, observer.clone());
            tokio::time::sleep(Duration::from_millis(4_500)).await;

            assert_eq!(
                observer.countdowns.borrow().as_slice(),
                &[(0, 3), (0, 2), (0, 1), (1, 3)]
            );
            assert_eq!(observer.captured.borrow().len(), 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn sequencer_tests_cancel_mid_run_never_completes() {
    LocalSet::new()
        .run_until(async {
            let camera = SyntheticCamera::new(2, 2);
            let handle = acquired_camera(&camera).await;
            let observer = Rc::new(RecordingObserver::default());
            let settings = SequenceSettings::default();

            let task = CaptureSequencer::new(settings).start(handle, observer.clone());

            // Shot index 2 is counting down.
            let cancel_at = settings.capture_offset(1) + Duration::from_millis(1_500);
            tokio::time::sleep(cancel_at).await;
            task.cancel();
            let ticks_at_cancel = observer.countdowns.borrow().len();

            tokio::time::sleep(Duration::from_secs(30)).await;
            assert_eq!(observer.captured.borrow().len(), 2);
            assert_eq!(observer.countdowns.borrow().len(), ticks_at_cancel);
            assert!(observer.completed.borrow().is_none());
            assert!(observer.failures.borrow().is_empty());
            assert!(task.is_cancelled());
            assert_eq!(camera.stats().frames(), 2);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn sequencer_tests_released_camera_surfaces_resource_unavailable() {
    LocalSet::new()
        .run_until(async {
            let camera = SyntheticCamera::new(2, 2);
            let handle = acquired_camera(&camera).await;
            let observer = Rc::new(RecordingObserver::default());

            let _task = CaptureSequencer::default().start(Rc::clone(&handle), observer.clone());

            // Three countdown ticks of the first shot have fired.
            tokio::time::sleep(Duration::from_millis(2_500)).await;
            assert_eq!(observer.countdowns.borrow().len(), 3);
            assert!(handle.release());

            tokio::time::sleep(Duration::from_secs(20)).await;
            let failures = observer.failures.borrow();
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].0, 0);
            assert!(matches!(failures[0].1, CaptureError::ResourceUnavailable(_)));
            assert!(observer.captured.borrow().is_empty());
            assert!(observer.completed.borrow().is_none());
            assert_eq!(camera.stats().live(), 0);
        })
        .await;
}
