//! Text extraction interface.

mod tesseract;

pub use tesseract::TesseractExtractor;

use image::RgbaImage;

use crate::error::Result;

/// Literal badge text shown on a completed, unclaimed achievement row.
pub const COMPLETED_LABEL: &str = "Completed";

/// What a piece of extracted text will be used for.
///
/// Backends may tune their recognition per purpose (the completion label is
/// read with a character whitelist, for instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPurpose {
    Name,
    Description,
    CompletionLabel,
}

/// Extracts text from a captured frame.
///
/// Implementations return a best-effort (possibly empty) string for
/// unrecognizable input; an `Err` means the engine itself failed.
pub trait ExtractText {
    fn extract(&self, image: &RgbaImage, purpose: TextPurpose) -> Result<String>;
}
