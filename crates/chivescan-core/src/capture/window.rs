//! Game window discovery and region capture.
//!
//! The game window is located by its localized title and captured with
//! `xcap`. Only the English client is supported for text extraction; a
//! non-English title still resolves so the caller can report why the scan
//! will not work.

use std::path::PathBuf;

use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::{debug, warn};
use xcap::Window;

use super::{CaptureRegion, REFERENCE_HEIGHT, REFERENCE_WIDTH, Region};
use crate::error::{Error, Result};

/// Known window titles, English first.
pub const WINDOW_TITLES: [&str; 6] = [
    "Honkai: Star Rail",
    "崩坏：星穹铁道",
    "崩壞：星穹鐵道",
    "붕괴:\u{a0}스타레일",
    "崩壊：スターレイル",
    "Honkai\u{a0}: Star Rail",
];

/// Aspect ratios the row layout is calibrated for.
const SUPPORTED_ASPECT_RATIOS: [&str; 1] = ["16:9"];

/// A located game window.
pub struct GameWindow {
    window: Window,
    english: bool,
}

impl GameWindow {
    /// Locate the game window by title.
    ///
    /// Fails if the game is not running or the window is minimized.
    pub fn find() -> Result<Self> {
        let windows = Window::all().map_err(|e| {
            Error::UnsupportedEnvironment(format!("failed to enumerate windows: {e}"))
        })?;

        for (i, title) in WINDOW_TITLES.iter().enumerate() {
            if let Some(window) = windows.iter().find(|w| w.title() == *title) {
                if window.is_minimized() {
                    return Err(Error::UnsupportedEnvironment(
                        "the game window is minimized; restore it and try again".to_string(),
                    ));
                }
                debug!("Found game window \"{}\"", title);
                return Ok(Self {
                    window: window.clone(),
                    english: i == 0,
                });
            }
        }

        Err(Error::UnsupportedEnvironment(
            "Honkai: Star Rail not found; open the game and try again".to_string(),
        ))
    }

    /// Whether the matched window title is the English one.
    pub fn is_english(&self) -> bool {
        self.english
    }

    /// Aspect ratio of the window as a reduced "w:h" string.
    pub fn aspect_ratio(&self) -> String {
        let (w, h) = (self.window.width(), self.window.height());
        if w == 0 || h == 0 {
            return "0:0".to_string();
        }
        let d = gcd(w, h);
        format!("{}:{}", w / d, h / d)
    }

    /// Check that the window is presented in a supported configuration.
    pub fn ensure_supported(&self) -> Result<()> {
        let ratio = self.aspect_ratio();
        if !SUPPORTED_ASPECT_RATIOS.contains(&ratio.as_str()) {
            return Err(Error::UnsupportedEnvironment(format!(
                "aspect ratio {} not supported (supported: {})",
                ratio,
                SUPPORTED_ASPECT_RATIOS.join(", ")
            )));
        }
        Ok(())
    }

    /// Build a region capturer for this window.
    pub fn capturer(&self, debug_captures: Option<PathBuf>) -> WindowCapture {
        WindowCapture {
            window: self.window.clone(),
            debug_captures,
        }
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Captures normalized regions of the game window and rescales them to the
/// 1920x1080 reference space.
pub struct WindowCapture {
    window: Window,
    debug_captures: Option<PathBuf>,
}

impl WindowCapture {
    fn dump_debug_capture(&self, frame: &RgbaImage) {
        let Some(dir) = &self.debug_captures else {
            return;
        };
        let name = format!("{}.png", chrono::Local::now().format("%H%M%S%f"));
        let path = dir.join(name);
        if let Err(e) = frame.save(&path) {
            warn!("Failed to save debug capture {}: {}", path.display(), e);
        }
    }
}

impl CaptureRegion for WindowCapture {
    fn capture(&self, region: &Region) -> Result<RgbaImage> {
        let frame = self.window.capture_image().map_err(|e| Error::Capture {
            context: "game window".to_string(),
            message: e.to_string(),
        })?;
        if frame.width() == 0 || frame.height() == 0 {
            return Err(Error::Capture {
                context: "game window".to_string(),
                message: "captured an empty frame".to_string(),
            });
        }

        let (x, y, width, height) = region.to_pixels(frame.width(), frame.height());
        let cropped = imageops::crop_imm(&frame, x, y, width, height).to_image();

        // Rescale to the reference resolution so OCR sees a consistent glyph
        // size regardless of the actual window dimensions.
        let target_w = ((region.width * REFERENCE_WIDTH as f64) as u32).max(1);
        let target_h = ((region.height * REFERENCE_HEIGHT as f64) as u32).max(1);
        let scaled = if cropped.dimensions() == (target_w, target_h) {
            cropped
        } else {
            imageops::resize(&cropped, target_w, target_h, FilterType::Triangle)
        };

        self.dump_debug_capture(&scaled);
        Ok(scaled)
    }
}
