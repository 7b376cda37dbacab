//! Soil Health Card extraction module.

mod parser;
pub mod rules;

pub use parser::{CardParser, ExtractionResult};

use crate::models::record::ShcRecord;
use crate::ocr::OcrResult;

/// Trait for Soil Health Card extractors.
///
/// Extraction never fails: anything that cannot be recognized is simply
/// absent from the record.
pub trait CardExtractor {
    /// Parse card text into a record plus diagnostics.
    fn parse(&self, text: &str) -> ExtractionResult;

    /// Extract a record from an OCR result.
    fn extract(&self, ocr_result: &OcrResult) -> ShcRecord {
        self.parse(&ocr_result.text).record
    }

    /// Extract a record from plain text.
    fn extract_from_text(&self, text: &str) -> ShcRecord {
        self.parse(text).record
    }
}
