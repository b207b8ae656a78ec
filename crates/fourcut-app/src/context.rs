//! Explicit state threaded through every page activation.

use std::fmt;
use std::rc::Rc;

use fourcut_capture::MediaDevices;
use fourcut_gallery::Gallery;
use fourcut_ui::Notifier;

use crate::{BoothConfig, DownloadSink};

/// Collaborators shared by all pages. Cloning is cheap.
#[derive(Clone)]
pub struct AppContext {
    /// Runtime configuration.
    pub config: BoothConfig,
    /// Host camera capability.
    pub devices: Rc<dyn MediaDevices>,
    /// Persisted strips.
    pub gallery: Gallery,
    /// Download target for exports.
    pub downloads: Rc<dyn DownloadSink>,
    /// User-visible notifications.
    pub notifier: Rc<Notifier>,
}

impl AppContext {
    /// Bundles the collaborators.
    pub fn new(
        config: BoothConfig,
        devices: Rc<dyn MediaDevices>,
        gallery: Gallery,
        downloads: Rc<dyn DownloadSink>,
        notifier: Rc<Notifier>,
    ) -> Self {
        Self {
            config,
            devices,
            gallery,
            downloads,
            notifier,
        }
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
