#![warn(missing_docs)]
//! # fourcut binary
//!
//! Headless driver for the photo booth: runs one session against the
//! synthetic camera (or four image files) and exports the strip.

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use fourcut_app::{
    App, AppContext, BoothConfig, DirectoryDownloads, PHOTO_ROUTE, app_version, logging,
};
use fourcut_capture::{MediaDevices, SyntheticCamera};
use fourcut_gallery::{FileStore, Gallery};
use fourcut_ui::{Notifier, SelectedFile, Severity, UiAction, View};
use tokio::task::LocalSet;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "fourcut", version = app_version(), about = "Four-cut photo booth")]
struct Cli {
    /// Image files to compose instead of using the camera (exactly four).
    #[arg(long, num_args = 1.., value_name = "IMAGE")]
    files: Vec<PathBuf>,

    /// Frame style for the strip (`white` or `black`).
    #[arg(long)]
    style: Option<String>,

    /// Directory receiving downloaded strips.
    #[arg(long, default_value = "downloads")]
    out: PathBuf,

    /// Directory holding the persisted gallery.
    #[arg(long, default_value = ".fourcut")]
    store: PathBuf,

    /// Simulate a denied camera permission.
    #[arg(long, default_value_t = false)]
    deny_camera: bool,

    /// Print the gallery size and exit.
    #[arg(long, default_value_t = false)]
    gallery: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init().map_err(|error| anyhow::anyhow!(error))?;
    let config = BoothConfig::from_env().context("read FOURCUT_* configuration")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("start runtime")?;
    LocalSet::new().block_on(&runtime, run(cli, config))
}

async fn run(cli: Cli, config: BoothConfig) -> anyhow::Result<()> {
    let store = FileStore::open(&cli.store)
        .with_context(|| format!("open gallery store '{}'", cli.store.display()))?;
    let gallery = Gallery::new(Rc::new(store));
    if cli.gallery {
        println!("{} strips in {}", gallery.len(), cli.store.display());
        return Ok(());
    }

    let devices: Rc<dyn MediaDevices> = if cli.deny_camera {
        Rc::new(SyntheticCamera::denying("permission denied"))
    } else {
        Rc::new(SyntheticCamera::new(
            config.video.ideal_width,
            config.video.ideal_height,
        ))
    };
    let notifier = Rc::new(Notifier::new());
    let context = AppContext::new(
        config,
        devices,
        gallery,
        Rc::new(DirectoryDownloads::new(&cli.out)),
        Rc::clone(&notifier),
    );

    let app = App::new(context);
    app.start();
    app.navigate(PHOTO_ROUTE);

    if cli.files.is_empty() {
        app.dispatch(UiAction::StartCapture);
    } else {
        app.dispatch(UiAction::SelectFiles(read_files(&cli.files)?));
    }

    let reached_result = wait_for_result(&app, &notifier).await;
    if reached_result {
        if let Some(style) = cli.style {
            app.dispatch(UiAction::ChangeStyle(style));
        }
        app.dispatch(UiAction::Download);
    }

    for notice in notifier.notices() {
        println!("[{:?}] {}: {}", notice.severity, notice.title, notice.message);
    }
    app.shutdown();

    if reached_result {
        Ok(())
    } else {
        anyhow::bail!("session ended without a strip")
    }
}

fn read_files(paths: &[PathBuf]) -> anyhow::Result<Vec<SelectedFile>> {
    paths
        .iter()
        .map(|path| {
            let bytes = fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
            Ok(SelectedFile {
                name: path.display().to_string(),
                bytes,
            })
        })
        .collect()
}

/// Prints every new view until the result shows or a failure notice lands.
async fn wait_for_result(app: &App, notifier: &Notifier) -> bool {
    let failed = || {
        notifier
            .notices()
            .iter()
            .any(|notice| notice.severity != Severity::Info)
    };
    let mut last_shown = None;

    loop {
        let view = app.current_view();
        if view != last_shown {
            if let Some(view) = &view {
                println!("{view}");
            }
            last_shown = view.clone();
        }

        match view {
            Some(View::Result { .. }) => return true,
            Some(View::Start { .. }) if failed() => return false,
            _ => {}
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
