//! Shared fixtures for app integration tests.

use std::cell::Cell;
use std::io::Cursor;
use std::rc::Rc;
use std::time::Duration;

use fourcut_app::{App, AppContext, BoothConfig, MemoryDownloads};
use fourcut_capture::{
    CaptureError, MediaDevices, MediaStream, StreamSettings, SyntheticCamera, SyntheticStats,
    VideoConstraints,
};
use fourcut_core::Frame;
use fourcut_gallery::{Gallery, MemoryStore};
use futures_util::FutureExt as _;
use futures_util::future::LocalBoxFuture;
use fourcut_ui::{Notifier, SelectedFile};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

/// Application plus handles on every collaborator it was built with.
#[allow(dead_code)]
pub struct Harness {
    /// Application under test.
    pub app: App,
    /// Counters of the synthetic camera.
    pub camera: Rc<SyntheticStats>,
    /// Notices shown so far.
    pub notifier: Rc<Notifier>,
    /// Delivered downloads.
    pub downloads: Rc<MemoryDownloads>,
    /// Persisted gallery.
    pub gallery: Gallery,
}

/// Builds a harness with default timing (3 x 1 s countdown, 1 s between shots).
#[allow(dead_code)]
pub fn harness() -> Harness {
    harness_with(
        BoothConfig::default(),
        SyntheticCamera::new(8, 6),
        MemoryStore::new(),
    )
}

/// Builds a harness from explicit parts.
#[allow(dead_code)]
pub fn harness_with(config: BoothConfig, camera: SyntheticCamera, store: MemoryStore) -> Harness {
    let stats = camera.stats();
    let notifier = Rc::new(Notifier::new());
    let downloads = Rc::new(MemoryDownloads::new());
    let gallery = Gallery::new(Rc::new(store));
    let context = AppContext::new(
        config,
        Rc::new(camera),
        gallery.clone(),
        downloads.clone(),
        Rc::clone(&notifier),
    );

    Harness {
        app: App::new(context),
        camera: stats,
        notifier,
        downloads,
        gallery,
    }
}

/// Encodes a solid-colour PNG file named `name`.
#[allow(dead_code)]
pub fn png_file(name: &str, red: u8) -> SelectedFile {
    let image = RgbaImage::from_pixel(6, 4, Rgba([red, 40, 80, 255]));
    let mut encoded = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut encoded, ImageFormat::Png)
        .expect("png encoding should succeed");
    SelectedFile {
        name: name.to_string(),
        bytes: encoded.into_inner(),
    }
}

/// Four distinct PNG files in selection order.
#[allow(dead_code)]
pub fn four_pngs() -> Vec<SelectedFile> {
    (0..4_u8)
        .map(|index| png_file(&format!("shot-{index}.png"), 50 * (index + 1)))
        .collect()
}

/// Advances the paused clock by `millis`.
#[allow(dead_code)]
pub async fn advance(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

/// Host whose permission prompt resolves on its own schedule, whether or not
/// anyone still awaits the request. A grant nobody receives stays live.
#[allow(dead_code)]
#[derive(Debug)]
pub struct PromptCamera {
    grant_after: Duration,
    live: Rc<Cell<usize>>,
}

#[allow(dead_code)]
impl PromptCamera {
    /// Grants every request `grant_after` it was made.
    pub fn new(grant_after: Duration) -> Self {
        Self {
            grant_after,
            live: Rc::new(Cell::new(0)),
        }
    }

    /// Streams granted and not yet stopped.
    pub fn live(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.live)
    }
}

impl MediaDevices for PromptCamera {
    fn request_stream(
        &self,
        _constraints: VideoConstraints,
    ) -> LocalBoxFuture<'static, Result<Box<dyn MediaStream>, CaptureError>> {
        let (grant, granted) = tokio::sync::oneshot::channel::<Box<dyn MediaStream>>();
        let delay = self.grant_after;
        let live = Rc::clone(&self.live);
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            live.set(live.get() + 1);
            // An unreceived stream is dropped without being stopped.
            let _ = grant.send(Box::new(PromptStream {
                live,
                stopped: Cell::new(false),
            }));
        });

        async move {
            granted
                .await
                .map_err(|_| CaptureError::ResourceUnavailable("prompt dismissed".to_string()))
        }
        .boxed_local()
    }
}

struct PromptStream {
    live: Rc<Cell<usize>>,
    stopped: Cell<bool>,
}

impl MediaStream for PromptStream {
    fn settings(&self) -> StreamSettings {
        StreamSettings {
            width: 4,
            height: 3,
        }
    }

    fn grab_frame(&self) -> Result<Frame, CaptureError> {
        if self.stopped.get() {
            return Err(CaptureError::ResourceUnavailable("stopped".to_string()));
        }
        Frame::new(4, 3, vec![90; 4 * 3 * 4]).map_err(|error| CaptureError::Backend(error.to_string()))
    }

    fn stop(&self) {
        if !self.stopped.replace(true) {
            self.live.set(self.live.get() - 1);
        }
    }

    fn is_live(&self) -> bool {
        !self.stopped.get()
    }
}

/// Application over an arbitrary camera host, with default config.
#[allow(dead_code)]
pub fn app_with_devices(devices: Rc<dyn MediaDevices>) -> (App, Rc<Notifier>) {
    let notifier = Rc::new(Notifier::new());
    let context = AppContext::new(
        BoothConfig::default(),
        devices,
        Gallery::new(Rc::new(MemoryStore::new())),
        Rc::new(MemoryDownloads::new()),
        Rc::clone(&notifier),
    );
    (App::new(context), notifier)
}
