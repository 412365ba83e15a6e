//! # chivescan-core
//!
//! Core library for the chivescan achievement scanner.
//!
//! This crate provides:
//! - The reference achievement catalog and fuzzy matcher
//! - The scan controller that walks the paginated achievement UI
//! - Collaborator traits for capture, text extraction, and cursor input,
//!   with production implementations and a scripted mock harness

pub mod capture;
pub mod catalog;
pub mod config;
pub mod error;
pub mod input;
pub mod mock;
pub mod ocr;
pub mod scanner;

// Re-export from capture module
pub use capture::{CaptureRegion, GameWindow, Region, Rgb, WindowCapture, sample_fill_color};

// Re-export from catalog module
pub use catalog::{AchievementRecord, Catalog, MatchResult, similarity};

// Re-export from config module
pub use config::{OcrBackend, ScanConfig, ScanStrategy};

// Re-export from error module
pub use error::{Error, Result};

// Re-export from input module
pub use input::{KeyNavigator, Navigate};

// Re-export from ocr module
pub use ocr::{COMPLETED_LABEL, ExtractText, TesseractExtractor, TextPurpose};

// Re-export from scanner module
pub use scanner::{ScanEvent, ScanOutcome, ScanPhase, ScanState, ScanSummary, Scanner};
