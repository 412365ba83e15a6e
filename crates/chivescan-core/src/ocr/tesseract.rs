//! Tesseract-backed text extraction.
//!
//! Invokes the `tesseract` executable per frame: the image is written to a
//! temporary PNG and recognized in single-line mode (`--psm 7`), matching how
//! the row regions are cropped. The completion badge is read with a character
//! whitelist so stray glyphs cannot leak into the label comparison.

use std::path::PathBuf;
use std::process::Command;

use image::RgbaImage;
use tempfile::NamedTempFile;
use tracing::debug;

use super::{COMPLETED_LABEL, ExtractText, TextPurpose};
use crate::config::OcrBackend;
use crate::error::{Error, Result};

/// Environment variable overriding the tesseract executable location.
const TESSERACT_ENV: &str = "CHIVESCAN_TESSERACT";

pub struct TesseractExtractor {
    executable: PathBuf,
    language: String,
}

impl TesseractExtractor {
    /// Build an extractor for the configured backend.
    pub fn new(backend: OcrBackend, language: &str) -> Result<Self> {
        match backend {
            OcrBackend::Tesseract => Ok(Self {
                executable: locate_executable(),
                language: language.to_string(),
            }),
        }
    }
}

fn locate_executable() -> PathBuf {
    match std::env::var_os(TESSERACT_ENV) {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from("tesseract"),
    }
}

impl ExtractText for TesseractExtractor {
    fn extract(&self, image: &RgbaImage, purpose: TextPurpose) -> Result<String> {
        let input = NamedTempFile::with_suffix(".png")?;
        image
            .save(input.path())
            .map_err(|e| Error::Extraction(format!("failed to write OCR input: {e}")))?;

        let mut command = Command::new(&self.executable);
        command
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg("7");
        if purpose == TextPurpose::CompletionLabel {
            command
                .arg("-c")
                .arg(format!("tessedit_char_whitelist={COMPLETED_LABEL}"));
        }

        let output = command.output().map_err(|e| {
            Error::Extraction(format!(
                "failed to run {}: {e} (install Tesseract or set {TESSERACT_ENV})",
                self.executable.display()
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Extraction(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout)
            .replace('\n', " ")
            .trim()
            .to_string();
        debug!("OCR ({:?}): {:?}", purpose, text);
        Ok(text)
    }
}
