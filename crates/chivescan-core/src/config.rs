//! Typed scan configuration.
//!
//! Every tunable the scanner recognizes lives here, validated at construction.
//! The similarity floors and the claimed-badge color were chosen empirically
//! against 1920x1080 captures and are kept overridable for recalibration.

use std::path::PathBuf;

use strum::{Display, EnumString};

use crate::capture::Rgb;
use crate::error::{Error, Result};

/// Fill color of a claimed reward badge in the achievement list.
pub const DEFAULT_CLAIMED_COLOR: Rgb = Rgb::new(158, 109, 95);

/// Input timing baselines, in milliseconds.
///
/// User-facing delay options are added on top of these; they exist so a slow
/// machine can stretch the settle windows without patching constants.
pub mod timing {
    /// How long a simulated key stays held down.
    pub const KEY_HOLD_MS: u64 = 50;

    /// Hold/settle time for the wake gesture that dismisses idle UI states.
    pub const WAKE_WAIT_MS: u64 = 500;

    /// Settle time after stepping the cursor down one row.
    pub const ROW_SETTLE_MS: u64 = 200;

    /// Settle time after switching to the next tab.
    pub const PAGE_SETTLE_MS: u64 = 200;

    /// Extra wait for a freshly opened tab to finish its load animation.
    pub const TAB_LOAD_MS: u64 = 300;
}

/// OCR engine selection.
///
/// Tesseract (invoked as an external executable) is the supported backend of
/// this port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OcrBackend {
    #[default]
    Tesseract,
}

/// Page-boundary detection policy.
///
/// `Sequential` steps one row at a time and treats a repeated match as the
/// bottom of the page. `Batched` reads a fixed window of rows per pass and
/// treats a window with zero newly confirmed ids as page exhaustion. The two
/// are never mixed within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ScanStrategy {
    #[default]
    Sequential,
    Batched,
}

/// Scan configuration.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Settle time after a row step, in milliseconds.
    pub row_settle_ms: u64,
    /// Settle time after a tab switch, in milliseconds.
    pub page_settle_ms: u64,
    /// Extra wait after opening a new tab, in milliseconds.
    pub tab_load_ms: u64,
    /// Save every captured region as a PNG into this directory.
    pub debug_captures: Option<PathBuf>,
    /// OCR engine to extract text with.
    pub ocr_backend: OcrBackend,
    /// OCR language code (Tesseract convention, e.g. "eng").
    pub language: String,
    /// Page-boundary detection policy.
    pub strategy: ScanStrategy,
    /// Rows read per pass in batched mode.
    pub batch_window: u32,
    /// Minimum name similarity for the matcher to accept a candidate.
    pub match_floor: f64,
    /// Minimum similarity between the OCR'd badge text and "Completed".
    pub completion_label_floor: f64,
    /// Reference fill color of a claimed reward badge.
    pub claimed_color: Rgb,
    /// Maximum Euclidean RGB distance to the claimed color.
    pub claim_color_tolerance: f64,
    /// Total rows evaluated before the scan gives up.
    pub row_budget: u32,
    /// Number of achievement tabs to walk.
    pub page_count: u8,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            row_settle_ms: timing::ROW_SETTLE_MS,
            page_settle_ms: timing::PAGE_SETTLE_MS,
            tab_load_ms: timing::TAB_LOAD_MS,
            debug_captures: None,
            ocr_backend: OcrBackend::Tesseract,
            language: "eng".to_string(),
            strategy: ScanStrategy::Sequential,
            batch_window: 5,
            match_floor: 0.5,
            completion_label_floor: 0.8,
            claimed_color: DEFAULT_CLAIMED_COLOR,
            claim_color_tolerance: 5.0,
            row_budget: 700,
            page_count: 9,
        }
    }
}

impl ScanConfig {
    /// Check that all options are in range.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.match_floor) {
            return Err(Error::InvalidConfig(format!(
                "match_floor must be within [0, 1], got {}",
                self.match_floor
            )));
        }
        if !(0.0..=1.0).contains(&self.completion_label_floor) {
            return Err(Error::InvalidConfig(format!(
                "completion_label_floor must be within [0, 1], got {}",
                self.completion_label_floor
            )));
        }
        if !self.claim_color_tolerance.is_finite() || self.claim_color_tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "claim_color_tolerance must be a non-negative number, got {}",
                self.claim_color_tolerance
            )));
        }
        if self.batch_window == 0 {
            return Err(Error::InvalidConfig(
                "batch_window must be at least 1".to_string(),
            ));
        }
        if self.row_budget == 0 {
            return Err(Error::InvalidConfig(
                "row_budget must be at least 1".to_string(),
            ));
        }
        if self.page_count == 0 || self.page_count > 9 {
            return Err(Error::InvalidConfig(format!(
                "page_count must be within 1..=9, got {}",
                self.page_count
            )));
        }
        if self.language.is_empty() {
            return Err(Error::InvalidConfig(
                "language must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
