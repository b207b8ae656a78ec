//! The single mount target shared by the router and the active page.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::{UiAction, View};

/// Most recent surface events kept for [`Surface::events`].
pub const EVENT_LOG_CAPACITY: usize = 256;

/// Callback receiving user input for the active page.
pub type ActionHandler = Rc<dyn Fn(UiAction)>;

/// Observable mutation of the surface, kept for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// Content removed; a new generation starts.
    Cleared {
        /// Generation that starts with this clear.
        generation: u64,
    },
    /// A view was drawn by the holder of `generation`.
    Rendered {
        /// Generation of the lease that rendered.
        generation: u64,
        /// Drawn view.
        view: View,
    },
}

#[derive(Default)]
struct SurfaceState {
    view: Option<View>,
    handler: Option<ActionHandler>,
    events: VecDeque<SurfaceEvent>,
}

impl SurfaceState {
    fn record(&mut self, event: SurfaceEvent) {
        if self.events.len() == EVENT_LOG_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Mount target. Exactly one page draws into it at a time.
#[derive(Default)]
pub struct Surface {
    generation: Cell<u64>,
    state: RefCell<SurfaceState>,
}

impl Surface {
    /// Creates an empty surface.
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Removes all content and the action handler, invalidating every
    /// outstanding lease, and returns the lease for the next page.
    pub fn clear(self: &Rc<Self>) -> MountLease {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        let dropped_handler = {
            let mut state = self.state.borrow_mut();
            state.view = None;
            state.record(SurfaceEvent::Cleared { generation });
            state.handler.take()
        };
        // The old handler may own page state with its own Drop logic.
        drop(dropped_handler);

        MountLease {
            surface: Rc::clone(self),
            generation,
        }
    }

    /// Current generation (number of clears so far).
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// View currently on screen.
    pub fn current_view(&self) -> Option<View> {
        self.state.borrow().view.clone()
    }

    /// The last [`EVENT_LOG_CAPACITY`] surface events, oldest first.
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.state.borrow().events.iter().cloned().collect()
    }

    /// Returns `true` while a page has registered an action handler.
    pub fn has_handler(&self) -> bool {
        self.state.borrow().handler.is_some()
    }

    /// Delivers `action` to the active page. Returns `false` when nothing is
    /// listening.
    pub fn dispatch(&self, action: UiAction) -> bool {
        let handler = self.state.borrow().handler.clone();
        match handler {
            Some(handler) => {
                handler(action);
                true
            }
            None => {
                tracing::debug!(stage = "surface", action = "dispatch_dropped", input = ?action);
                false
            }
        }
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Surface")
            .field("generation", &self.generation.get())
            .field("view", &state.view)
            .field("has_handler", &state.handler.is_some())
            .finish()
    }
}

/// Right to draw into the surface for one generation.
#[derive(Clone)]
pub struct MountLease {
    surface: Rc<Surface>,
    generation: u64,
}

impl MountLease {
    /// Generation this lease belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` until the surface is cleared again.
    pub fn is_current(&self) -> bool {
        self.surface.generation.get() == self.generation
    }

    /// Draws `view`. Returns `false` (and draws nothing) for a stale lease.
    pub fn render(&self, view: View) -> bool {
        if !self.is_current() {
            tracing::warn!(
                stage = "surface",
                action = "stale_render",
                lease = self.generation,
                current = self.surface.generation.get()
            );
            return false;
        }

        let mut state = self.surface.state.borrow_mut();
        state.record(SurfaceEvent::Rendered {
            generation: self.generation,
            view: view.clone(),
        });
        state.view = Some(view);
        true
    }

    /// Registers the action handler for this generation.
    pub fn set_action_handler(&self, handler: ActionHandler) -> bool {
        if !self.is_current() {
            return false;
        }
        self.surface.state.borrow_mut().handler = Some(handler);
        true
    }
}

impl fmt::Debug for MountLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountLease")
            .field("generation", &self.generation)
            .field("current", &self.is_current())
            .finish()
    }
}
