#![warn(missing_docs)]
//! # fourcut-router
//!
//! ## Purpose
//! Owns the single active page and mediates every transition between pages.
//!
//! ## Responsibilities
//! - Map normalized [`Route`]s to page factories (last registration wins).
//! - Run each transition in strict order: teardown of the outgoing page,
//!   surface clear, route resolution (with fallback), activation, storage of
//!   the new teardown.
//! - Serialize nested navigation requests through a queue so two pages are
//!   never mounted at once.
//! - Route browser-style back/forward through the same transition path.
//!
//! ## Data flow
//! UI action or history move -> [`Router::navigate`] / [`Navigator`] ->
//! pending queue -> transition -> page factory receives a [`PageContext`] and
//! returns its [`Teardown`].
//!
//! ## Ownership and lifetimes
//! [`Router`] is a cheap `Rc` handle. Pages receive a [`Navigator`] holding a
//! `Weak` reference, so a page can request navigation without keeping the
//! router alive. The router owns exactly one teardown callback at a time.
//!
//! ## Error model
//! Navigation never fails. Unknown routes render [`fourcut_ui::View::NotFound`]
//! with no teardown.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::{Rc, Weak};

use fourcut_ui::{MountLease, Surface, View};

mod route;

pub use route::{History, Route};

/// Cleanup callback returned by a page on activation.
///
/// Running it more than once has the same effect as running it once.
#[derive(Default)]
pub struct Teardown {
    action: Option<Box<dyn FnOnce()>>,
}

impl Teardown {
    /// Wraps `action`.
    pub fn new(action: impl FnOnce() + 'static) -> Self {
        Self {
            action: Some(Box::new(action)),
        }
    }

    /// Teardown for a page that owns nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Runs the callback if it has not run yet. Returns `true` when it ran.
    pub fn run(&mut self) -> bool {
        match self.action.take() {
            Some(action) => {
                action();
                true
            }
            None => false,
        }
    }

    /// Returns `true` when there is nothing left to run.
    pub fn is_spent(&self) -> bool {
        self.action.is_none()
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Teardown")
            .field("spent", &self.is_spent())
            .finish()
    }
}

/// Everything a page receives on activation.
#[derive(Debug)]
pub struct PageContext {
    /// Right to draw into the mount target for this activation.
    pub lease: MountLease,
    /// Handle for requesting further navigation.
    pub navigator: Navigator,
    /// Route the page was activated for (after fallback resolution).
    pub route: Route,
}

/// Page constructor registered for a route.
pub type PageFactory = Rc<dyn Fn(PageContext) -> Teardown>;

#[derive(Debug, Clone)]
enum Request {
    Navigate(Route),
    Back,
    Forward,
}

struct ActivePage {
    route: Route,
    teardown: Teardown,
}

struct RouterInner {
    surface: Rc<Surface>,
    fallback: Route,
    routes: RefCell<HashMap<Route, PageFactory>>,
    active: RefCell<Option<ActivePage>>,
    pending: RefCell<VecDeque<Request>>,
    draining: Cell<bool>,
    history: RefCell<History>,
    transitions: Cell<u64>,
}

/// Single-page router over one [`Surface`].
#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

impl Router {
    /// Creates a router drawing into `surface`; empty locations resolve to
    /// `fallback`.
    pub fn new(surface: Rc<Surface>, fallback: &str) -> Self {
        Self {
            inner: Rc::new(RouterInner {
                surface,
                fallback: Route::parse(fallback),
                routes: RefCell::default(),
                active: RefCell::default(),
                pending: RefCell::default(),
                draining: Cell::new(false),
                history: RefCell::default(),
                transitions: Cell::new(0),
            }),
        }
    }

    /// Associates `path` with `factory`, replacing any earlier registration.
    pub fn register(&self, path: &str, factory: impl Fn(PageContext) -> Teardown + 'static) {
        let route = Route::parse(path);
        let replaced = self
            .inner
            .routes
            .borrow_mut()
            .insert(route.clone(), Rc::new(factory))
            .is_some();
        tracing::debug!(stage = "router", action = "register", route = %route, replaced);
    }

    /// Requests a transition to `location`.
    ///
    /// When called from inside a transition (a teardown or a page factory)
    /// the request is queued and runs after the current transition completes.
    pub fn navigate(&self, location: &str) {
        self.submit(Request::Navigate(Route::parse(location)));
    }

    /// Moves one history entry back, if any.
    pub fn back(&self) {
        self.submit(Request::Back);
    }

    /// Moves one history entry forward, if any.
    pub fn forward(&self) {
        self.submit(Request::Forward);
    }

    /// Tears down the active page and clears the surface.
    pub fn shutdown(&self) {
        let outgoing = self.inner.active.borrow_mut().take();
        if let Some(mut page) = outgoing {
            page.teardown.run();
            tracing::info!(stage = "router", action = "shutdown", route = %page.route);
        }
        self.inner.surface.clear();
    }

    /// Navigator bound to this router.
    pub fn navigator(&self) -> Navigator {
        Navigator {
            router: Rc::downgrade(&self.inner),
        }
    }

    /// Route of the mounted page.
    pub fn current_route(&self) -> Option<Route> {
        self.inner
            .active
            .borrow()
            .as_ref()
            .map(|page| page.route.clone())
    }

    /// Mount target.
    pub fn surface(&self) -> Rc<Surface> {
        Rc::clone(&self.inner.surface)
    }

    /// Completed transitions.
    pub fn transitions(&self) -> u64 {
        self.inner.transitions.get()
    }

    /// Snapshot of the navigation history.
    pub fn history(&self) -> History {
        self.inner.history.borrow().clone()
    }

    fn submit(&self, request: Request) {
        self.inner.pending.borrow_mut().push_back(request);
        drain(&self.inner);
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("current", &self.current_route())
            .field("transitions", &self.transitions())
            .finish_non_exhaustive()
    }
}

/// Weak navigation handle given to pages.
#[derive(Debug, Clone)]
pub struct Navigator {
    router: Weak<RouterInner>,
}

impl Navigator {
    /// Requests a transition to `location`. No-op once the router is gone.
    pub fn navigate(&self, location: &str) {
        self.submit(Request::Navigate(Route::parse(location)));
    }

    /// Requests a history move back.
    pub fn back(&self) {
        self.submit(Request::Back);
    }

    /// Requests a history move forward.
    pub fn forward(&self) {
        self.submit(Request::Forward);
    }

    fn submit(&self, request: Request) {
        match self.router.upgrade() {
            Some(inner) => {
                inner.pending.borrow_mut().push_back(request);
                drain(&inner);
            }
            None => tracing::debug!(stage = "router", action = "navigator_detached", request = ?request),
        }
    }
}

struct DrainGuard<'a>(&'a Cell<bool>);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

fn drain(inner: &Rc<RouterInner>) {
    if inner.draining.replace(true) {
        return;
    }
    let _guard = DrainGuard(&inner.draining);

    loop {
        let next = inner.pending.borrow_mut().pop_front();
        match next {
            Some(request) => transition(inner, request),
            None => break,
        }
    }
}

fn transition(inner: &Rc<RouterInner>, request: Request) {
    let from_history = !matches!(request, Request::Navigate(_));
    let requested = match request {
        Request::Navigate(route) => Some(route),
        Request::Back => inner.history.borrow_mut().back(),
        Request::Forward => inner.history.borrow_mut().forward(),
    };
    let Some(requested) = requested else {
        tracing::debug!(stage = "router", action = "history_edge");
        return;
    };

    // Outgoing teardown runs with no router borrows held; it may navigate.
    let outgoing = inner.active.borrow_mut().take();
    if let Some(mut page) = outgoing {
        let ran = page.teardown.run();
        tracing::debug!(stage = "router", action = "teardown", route = %page.route, ran);
    }

    let lease = inner.surface.clear();

    let resolved = if requested.is_empty() {
        inner.fallback.clone()
    } else {
        requested
    };
    if !from_history {
        inner.history.borrow_mut().push(resolved.clone());
    }

    let factory = inner.routes.borrow().get(&resolved).cloned();
    let teardown = match factory {
        Some(factory) => {
            tracing::info!(stage = "router", action = "activate", route = %resolved);
            factory(PageContext {
                lease,
                navigator: Navigator {
                    router: Rc::downgrade(inner),
                },
                route: resolved.clone(),
            })
        }
        None => {
            tracing::info!(stage = "router", action = "not_found", route = %resolved);
            lease.render(View::NotFound {
                path: resolved.to_string(),
            });
            Teardown::none()
        }
    };

    *inner.active.borrow_mut() = Some(ActivePage {
        route: resolved,
        teardown,
    });
    inner.transitions.set(inner.transitions.get() + 1);
}
