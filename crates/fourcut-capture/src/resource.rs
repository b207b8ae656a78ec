//! Exclusively owned wrapper around one external resource.

use std::cell::RefCell;
use std::fmt;

use fourcut_core::Frame;

use crate::{CaptureError, MediaStream};

/// Something that holds hardware activity until released.
pub trait Resource {
    /// Stops the underlying activity. Called at most once per resource by
    /// [`ResourceHandle`].
    fn release(&self);
}

impl Resource for Box<dyn MediaStream> {
    fn release(&self) {
        self.stop();
    }
}

/// Observable acquisition state of a [`ResourceHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    /// Created lazily, nothing installed yet.
    Unacquired,
    /// Holds a live resource.
    Acquired,
    /// Retired. Nothing can be installed again.
    Released,
}

enum Slot<R> {
    Unacquired,
    Acquired(R),
    Released,
}

/// Single-owner handle with explicit acquire/release.
///
/// # Invariants
/// - At most one resource is ever installed.
/// - [`ResourceHandle::release`] is idempotent and stops the resource exactly
///   once. Releasing an unacquired handle has no hardware effect but retires
///   the handle, so a late acquisition is stopped on arrival.
/// - Dropping the handle releases it.
pub struct ResourceHandle<R: Resource> {
    slot: RefCell<Slot<R>>,
}

/// Handle type used for camera streams.
pub type CameraHandle = ResourceHandle<Box<dyn MediaStream>>;

impl<R: Resource> ResourceHandle<R> {
    /// Creates an unacquired handle.
    pub fn new() -> Self {
        Self {
            slot: RefCell::new(Slot::Unacquired),
        }
    }

    /// Current acquisition state.
    pub fn state(&self) -> AcquisitionState {
        match &*self.slot.borrow() {
            Slot::Unacquired => AcquisitionState::Unacquired,
            Slot::Acquired(_) => AcquisitionState::Acquired,
            Slot::Released => AcquisitionState::Released,
        }
    }

    /// Installs a freshly acquired resource.
    ///
    /// # Errors
    /// The resource is released immediately and an error returned when the
    /// handle already holds one ([`CaptureError::AlreadyAcquired`]) or was
    /// retired ([`CaptureError::ResourceUnavailable`]).
    pub fn install(&self, resource: R) -> Result<(), CaptureError> {
        match self.state() {
            AcquisitionState::Unacquired => {
                *self.slot.borrow_mut() = Slot::Acquired(resource);
                Ok(())
            }
            AcquisitionState::Acquired => {
                resource.release();
                Err(CaptureError::AlreadyAcquired)
            }
            AcquisitionState::Released => {
                resource.release();
                Err(CaptureError::ResourceUnavailable(
                    "handle was released before the resource arrived".to_string(),
                ))
            }
        }
    }

    /// Releases the resource. Returns `true` only for the call that actually
    /// stopped something.
    pub fn release(&self) -> bool {
        let previous = std::mem::replace(&mut *self.slot.borrow_mut(), Slot::Released);
        match previous {
            Slot::Acquired(resource) => {
                resource.release();
                true
            }
            Slot::Unacquired | Slot::Released => false,
        }
    }

    /// Runs `f` against the installed resource, or returns `None`.
    pub fn with_resource<T>(&self, f: impl FnOnce(&R) -> T) -> Option<T> {
        match &*self.slot.borrow() {
            Slot::Acquired(resource) => Some(f(resource)),
            Slot::Unacquired | Slot::Released => None,
        }
    }
}

impl CameraHandle {
    /// Grabs one raw frame from the installed stream.
    ///
    /// # Errors
    /// Returns [`CaptureError::ResourceUnavailable`] when no live stream is
    /// installed.
    pub fn grab_frame(&self) -> Result<Frame, CaptureError> {
        self.with_resource(|stream| stream.grab_frame())
            .unwrap_or_else(|| {
                Err(CaptureError::ResourceUnavailable(format!(
                    "camera handle is {:?}",
                    self.state()
                )))
            })
    }
}

impl<R: Resource> Default for ResourceHandle<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> Drop for ResourceHandle<R> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<R: Resource> fmt::Debug for ResourceHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    struct Counted(Rc<Cell<u32>>);

    impl Resource for Counted {
        fn release(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn release_is_idempotent_and_stops_once() {
        let stops = Rc::new(Cell::new(0));
        let handle = ResourceHandle::new();
        handle.install(Counted(Rc::clone(&stops))).expect("first install");

        assert!(handle.release());
        assert!(!handle.release());
        assert_eq!(stops.get(), 1);
        assert_eq!(handle.state(), AcquisitionState::Released);
    }

    #[test]
    fn late_install_after_release_is_stopped_on_arrival() {
        let stops = Rc::new(Cell::new(0));
        let handle: ResourceHandle<Counted> = ResourceHandle::new();
        assert!(!handle.release());

        let error = handle
            .install(Counted(Rc::clone(&stops)))
            .expect_err("retired handle rejects installs");
        assert!(matches!(error, CaptureError::ResourceUnavailable(_)));
        assert_eq!(stops.get(), 1);
    }

    #[test]
    fn dropping_handle_releases_resource() {
        let stops = Rc::new(Cell::new(0));
        {
            let handle = ResourceHandle::new();
            handle.install(Counted(Rc::clone(&stops))).expect("install");
        }
        assert_eq!(stops.get(), 1);
    }
}
