#![warn(missing_docs)]
//! # fourcut-app
//!
//! ## Purpose
//! Wires capture, composition, persistence and routing into the `fourcut`
//! photo booth.
//!
//! ## Responsibilities
//! - Load [`BoothConfig`] from the environment (timing, resolution, style,
//!   camera kill switch).
//! - Register the home, photo booth, about and gallery pages on the router.
//! - Translate every recoverable failure into a [`BoothError`] notice.
//! - Deliver exports to a [`DownloadSink`] and the persisted gallery.
//!
//! ## Data flow
//! Shell input -> [`App::dispatch`] -> active page -> capture sequencer or
//! file decode -> compositor -> result view -> export -> download + gallery.
//!
//! ## Ownership and lifetimes
//! One [`AppContext`] is cloned into every page activation; there is no global
//! mutable state. Pages own their camera handle and tasks and give them up in
//! the teardown they return to the router.
//!
//! ## Error model
//! Library failures are mapped to [`BoothError`] at the page boundary and shown
//! through the notifier; nothing propagates as a fault. The binary uses
//! `anyhow` for startup failures only.

use std::rc::Rc;

use fourcut_router::Router;
use fourcut_ui::{Surface, UiAction, View};

mod config;
mod context;
mod error;
mod export;
pub mod logging;
pub mod pages;

pub use config::{BoothConfig, ConfigError, camera_enabled};
pub use context::AppContext;
pub use error::BoothError;
pub use export::{DirectoryDownloads, DownloadSink, MemoryDownloads, export_file_name};
pub use pages::{ABOUT_ROUTE, GALLERY_ROUTE, HOME_ROUTE, PHOTO_ROUTE, register_pages};

/// Build-time application version loaded from root `VERSION`.
pub const APP_VERSION: &str = env!("FOURCUT_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Photo booth application: a router with every page registered.
#[derive(Debug)]
pub struct App {
    router: Router,
    context: AppContext,
}

impl App {
    /// Builds the application over a fresh surface.
    pub fn new(context: AppContext) -> Self {
        let router = Router::new(Surface::new(), HOME_ROUTE);
        register_pages(&router, &context);
        Self { router, context }
    }

    /// Activates the fallback page.
    pub fn start(&self) {
        self.router.navigate("");
    }

    /// Navigates to `location` (`#/photo`, `/about`, ...).
    pub fn navigate(&self, location: &str) {
        self.router.navigate(location);
    }

    /// Browser-style back.
    pub fn back(&self) {
        self.router.back();
    }

    /// Browser-style forward.
    pub fn forward(&self) {
        self.router.forward();
    }

    /// Sends user input to the active page. Returns `false` when no page
    /// listens.
    pub fn dispatch(&self, action: UiAction) -> bool {
        self.router.surface().dispatch(action)
    }

    /// View currently on screen.
    pub fn current_view(&self) -> Option<View> {
        self.router.surface().current_view()
    }

    /// Mount target.
    pub fn surface(&self) -> Rc<Surface> {
        self.router.surface()
    }

    /// Underlying router.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Shared collaborators.
    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Tears down the active page.
    pub fn shutdown(&self) {
        self.router.shutdown();
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for app wiring.

    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!app_version().is_empty());
    }
}
