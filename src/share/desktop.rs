//! Desktop side effects of sharing: clipboard, link opening, notifications.

use std::borrow::Cow;
use std::process::{Command, Stdio};

use super::capture::PyramidImage;
use super::ShareError;

pub trait Desktop {
    fn copy_image(&mut self, image: &PyramidImage) -> Result<(), ShareError>;

    fn open_url(&mut self, url: &str) -> Result<(), ShareError>;

    /// Best-effort user notification; never fails the share
    fn notify(&mut self, message: &str);
}

/// Programs that open a URL in the default browser, in preference order
fn openers() -> Vec<(&'static str, Vec<&'static str>)> {
    if cfg!(target_os = "macos") {
        vec![("open", vec![])]
    } else if cfg!(target_os = "windows") {
        vec![("cmd", vec!["/C", "start", ""])]
    } else {
        vec![("xdg-open", vec![]), ("gio", vec!["open"])]
    }
}

/// The real desktop: arboard clipboard, platform URL opener, notify-rust
pub struct SystemDesktop {
    notifications: bool,
}

impl SystemDesktop {
    pub fn new(notifications: bool) -> Self {
        Self { notifications }
    }
}

impl Desktop for SystemDesktop {
    fn copy_image(&mut self, image: &PyramidImage) -> Result<(), ShareError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ShareError::Clipboard(e.to_string()))?;

        clipboard
            .set_image(arboard::ImageData {
                width: image.width as usize,
                height: image.height as usize,
                bytes: Cow::Borrowed(&image.rgba),
            })
            .map_err(|e| ShareError::Clipboard(e.to_string()))
    }

    fn open_url(&mut self, url: &str) -> Result<(), ShareError> {
        // Try each opener until one starts
        let openers = openers();

        for (program, args) in &openers {
            // Keep the opener's chatter off the TUI
            let status = Command::new(program)
                .args(args)
                .arg(url)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            match status {
                Ok(status) if status.success() => {
                    tracing::info!("Opened {} with {}", url, program);
                    return Ok(());
                }
                Ok(status) => tracing::warn!("{} exited with {}", program, status),
                Err(e) => tracing::debug!("{} unavailable: {}", program, e),
            }
        }

        let tried: Vec<&str> = openers.iter().map(|(program, _)| *program).collect();
        Err(ShareError::Open(format!(
            "no browser opener worked (tried {})",
            tried.join(", ")
        )))
    }

    fn notify(&mut self, message: &str) {
        if !self.notifications {
            return;
        }
        if let Err(e) = notify_rust::Notification::new()
            .summary("Tennis Pyramid")
            .body(message)
            .icon("image-x-generic")
            .show()
        {
            tracing::warn!("Notification failed: {}", e);
        }
    }
}
