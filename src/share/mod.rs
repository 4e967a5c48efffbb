//! Sharing the pyramid on WhatsApp Web.
//!
//! The flow is: capture the pyramid to PNG, let the user pick a contact,
//! then copy the image to the clipboard and open the chat. If the
//! clipboard refuses the image, the PNG is saved to disk instead and the
//! user drags it into the chat.

pub mod capture;
pub mod desktop;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::contacts::whatsapp_link;
use crate::pyramid::PyramidState;
use capture::{CaptureOptions, PyramidImage};
use desktop::Desktop;

/// File name used for downloads and exports
pub const FILE_NAME: &str = "tennis-pyramid.png";

pub const COPIED_MESSAGE: &str = "Image copied! Paste with Ctrl+V in WhatsApp";
pub const DOWNLOADED_MESSAGE: &str = "Image downloaded! Drag it into the WhatsApp chat";

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("Share already in progress")]
    InFlight,

    #[error("Could not capture the pyramid: {0}")]
    Capture(String),

    #[error("Failed to create image: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("Could not open WhatsApp: {0}")]
    Open(String),

    #[error("Could not save image: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejects a second share flow while one is running
#[derive(Debug, Clone, Default)]
pub struct ShareGuard {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of one share flow; releases the guard on drop
#[derive(Debug)]
pub struct ShareToken {
    busy: Arc<AtomicBool>,
}

impl ShareGuard {
    pub fn try_begin(&self) -> Result<ShareToken, ShareError> {
        if self.busy.swap(true, Ordering::AcqRel) {
            tracing::info!("Share already in progress");
            return Err(ShareError::InFlight);
        }
        Ok(ShareToken {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn in_flight(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for ShareToken {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// A captured pyramid waiting for a destination
#[derive(Debug, Clone)]
pub struct PendingImage {
    pub image: PyramidImage,
    pub png: Vec<u8>,
}

/// How the image reached the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Copied,
    Downloaded(PathBuf),
}

impl Delivery {
    pub fn message(&self) -> &'static str {
        match self {
            Delivery::Copied => COPIED_MESSAGE,
            Delivery::Downloaded(_) => DOWNLOADED_MESSAGE,
        }
    }
}

fn capture_blocking(state: &PyramidState, options: &CaptureOptions) -> Result<PendingImage, ShareError> {
    let image = capture::render(state, options);
    let png = image.encode_png()?;
    tracing::debug!(width = image.width, height = image.height, bytes = png.len(), "Captured pyramid");
    Ok(PendingImage { image, png })
}

/// Capture the pyramid off the UI thread. Fails with `InFlight` if another
/// share is already running.
pub async fn prepare(
    guard: &ShareGuard,
    state: &PyramidState,
    options: CaptureOptions,
) -> Result<PendingImage, ShareError> {
    let _token = guard.try_begin()?;
    let state = state.clone();

    tokio::task::spawn_blocking(move || capture_blocking(&state, &options))
        .await
        .map_err(|e| ShareError::Capture(e.to_string()))?
}

/// Hand the image to the user: clipboard first, file download as the
/// fallback, then open the chat for `phone` (or the web client root).
pub fn deliver(
    desktop: &mut dyn Desktop,
    pending: &PendingImage,
    phone: Option<&str>,
    download_dir: &Path,
) -> Result<Delivery, ShareError> {
    let url = whatsapp_link(phone);

    let delivery = match desktop.copy_image(&pending.image) {
        Ok(()) => Delivery::Copied,
        Err(e) => {
            tracing::warn!("Clipboard failed, saving image instead: {}", e);
            let path = write_png(&pending.png, download_dir)?;
            Delivery::Downloaded(path)
        }
    };

    desktop.open_url(&url)?;
    desktop.notify(delivery.message());
    Ok(delivery)
}

fn write_png(png: &[u8], dir: &Path) -> Result<PathBuf, ShareError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(FILE_NAME);
    std::fs::write(&path, png)?;
    tracing::info!("Saved pyramid image to {}", path.display());
    Ok(path)
}

/// Render straight to a PNG file (used by `--export`)
pub fn export(state: &PyramidState, options: &CaptureOptions, path: &Path) -> Result<(), ShareError> {
    let pending = capture_blocking(state, options)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &pending.png)?;
    Ok(())
}
