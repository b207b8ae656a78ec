//! Integration tests for camera handle acquisition and release.

mod common;

use fourcut_capture::{AcquisitionState, CameraHandle, CaptureError, SyntheticCamera};

#[tokio::test]
async fn resource_handle_tests_release_stops_camera_exactly_once() {
    let camera = SyntheticCamera::new(2, 2);
    let handle = common::acquired_camera(&camera).await;
    assert_eq!(handle.state(), AcquisitionState::Acquired);
    assert_eq!(camera.stats().live(), 1);

    assert!(handle.release());
    assert!(!handle.release());
    assert_eq!(camera.stats().stopped(), 1);
    assert_eq!(camera.stats().live(), 0);
}

#[test]
fn resource_handle_tests_unacquired_handle_cannot_grab() {
    let handle = CameraHandle::new();
    assert_eq!(handle.state(), AcquisitionState::Unacquired);
    assert!(matches!(
        handle.grab_frame(),
        Err(CaptureError::ResourceUnavailable(_))
    ));
}
