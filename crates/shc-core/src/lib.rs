//! Core library for Soil Health Card (SHC) processing.
//!
//! This crate provides:
//! - Field extraction from noisy SHC OCR text (farmer, sample and soil details)
//! - Nutrient table recovery with a fallback strategy
//! - Recommendation and fertilizer combination parsing
//! - An OCR boundary (`OcrProvider`) with a pure Rust engine behind the `native` feature
//! - The upload boundary (`CardScanner`) mapping failures to error responses

pub mod card;
pub mod error;
pub mod models;
pub mod ocr;
pub mod service;

pub use card::{CardExtractor, CardParser, ExtractionResult};
pub use error::{ConfigError, ErrorBody, InputError, OcrError, Result, ShcError};
pub use models::config::ShcConfig;
pub use models::record::{
    CardMetadata, FarmerDetails, FertilizerBlock, FertilizerCombination, FertilizerItem,
    NutrientReading, RawOption, Recommendation, SampleDetails, ShcRecord, SoilInfo,
};
pub use models::vocabulary::{NutrientRule, RatingRule, Vocabulary};
pub use ocr::{ImagePreprocessor, OcrProvider, OcrResult, TextBox};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use service::{CardScanner, ScanReport, Upload};
