//! WASM bindings for Soil Health Card text extraction.
//!
//! OCR runs on the JavaScript side; this crate turns its text (or its boxes)
//! into a structured card record.

use wasm_bindgen::prelude::*;

use shc_core::card::rules::{classify_line, clean_text as clean};
use shc_core::{CardExtractor, CardParser, OcrResult, ShcRecord, TextBox, Vocabulary};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract card data from OCR text with the built-in vocabulary.
#[wasm_bindgen]
pub fn extract_card_from_text(text: &str) -> Result<JsValue, JsValue> {
    to_js(&CardParser::new().extract_from_text(text))
}

/// Extract card data and return it as a JSON string.
#[wasm_bindgen]
pub fn extract_card_json(text: &str) -> Result<String, JsValue> {
    serde_json::to_string(&CardParser::new().extract_from_text(text))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Normalize a raw rating phrase ("MEDIUM" -> "Medium").
#[wasm_bindgen]
pub fn normalize_rating(raw: &str) -> String {
    Vocabulary::default().normalize_rating(raw)
}

/// Canonical nutrient code for a parameter label ("Available Zinc (Zn)" -> "Zn").
#[wasm_bindgen]
pub fn nutrient_code(parameter: &str) -> String {
    Vocabulary::default().classify(parameter).0
}

/// Collapse whitespace runs to single spaces.
#[wasm_bindgen]
pub fn clean_text(text: &str) -> String {
    clean(text)
}

/// Classify one advice line as `{type, text}`.
#[wasm_bindgen]
pub fn classify_recommendation(line: &str) -> Result<JsValue, JsValue> {
    to_js(&classify_line(line))
}

/// Card extractor class for browser use.
#[wasm_bindgen(js_name = CardExtractor)]
pub struct CardExtractorJs {
    parser: CardParser,
}

#[wasm_bindgen(js_class = CardExtractor)]
impl CardExtractorJs {
    /// Create an extractor with the built-in vocabulary.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: CardParser::new(),
        }
    }

    /// Replace the vocabulary (same shape as `extraction.vocabulary` in the config file).
    #[wasm_bindgen]
    pub fn set_vocabulary(&mut self, vocabulary: JsValue) -> Result<(), JsValue> {
        let vocabulary: Vocabulary = serde_wasm_bindgen::from_value(vocabulary)
            .map_err(|e| JsValue::from_str(&format!("Invalid vocabulary: {}", e)))?;
        self.parser = self.parser.clone().with_vocabulary(vocabulary);
        Ok(())
    }

    /// Extract a card record from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.parser.extract_from_text(text))
    }

    /// Get extraction result with warnings and timing.
    #[wasm_bindgen]
    pub fn extract_with_metadata(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.parser.parse(text);

        for warning in &result.warnings {
            web_sys::console::warn_1(&JsValue::from_str(warning));
        }

        #[derive(serde::Serialize)]
        struct ExtractResult {
            record: ShcRecord,
            warnings: Vec<String>,
            processing_time_ms: u64,
        }

        to_js(&ExtractResult {
            record: result.record,
            warnings: result.warnings,
            processing_time_ms: result.processing_time_ms,
        })
    }

    /// Warnings only, as a JS array of strings.
    #[wasm_bindgen]
    pub fn warnings(&self, text: &str) -> js_sys::Array {
        self.parser
            .parse(text)
            .warnings
            .iter()
            .map(|w| JsValue::from_str(w))
            .collect()
    }
}

impl Default for CardExtractorJs {
    fn default() -> Self {
        Self::new()
    }
}

/// OCR result from browser-side processing.
#[wasm_bindgen]
pub struct OcrResultJs {
    inner: OcrResult,
}

#[wasm_bindgen]
impl OcrResultJs {
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            inner: OcrResult::empty(width, height),
        }
    }

    /// Add a text box to the result.
    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen]
    pub fn add_box(
        &mut self,
        text: &str,
        x1: f32, y1: f32,
        x2: f32, y2: f32,
        x3: f32, y3: f32,
        x4: f32, y4: f32,
        confidence: f32,
    ) {
        self.inner.boxes.push(TextBox {
            bbox: [x1, y1, x2, y2, x3, y3, x4, y4],
            text: text.to_string(),
            confidence,
        });
        self.inner.sort_by_reading_order();
    }

    /// Set the full text, replacing what the boxes produced.
    #[wasm_bindgen]
    pub fn set_text(&mut self, text: &str) {
        self.inner.text = text.to_string();
    }

    /// Get the full text.
    #[wasm_bindgen]
    pub fn get_text(&self) -> String {
        self.inner.text.clone()
    }

    /// Whether no usable text has been recognized.
    #[wasm_bindgen]
    pub fn is_blank(&self) -> bool {
        self.inner.is_blank()
    }

    /// Extract a card record from this OCR result.
    #[wasm_bindgen]
    pub fn extract_card(&self) -> Result<JsValue, JsValue> {
        if self.inner.is_blank() {
            return Err(JsValue::from_str("No text detected in the image"));
        }
        to_js(&CardParser::new().extract(&self.inner))
    }
}
