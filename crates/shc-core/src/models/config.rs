//! Configuration structures for the SHC pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::models::vocabulary::Vocabulary;

/// Main configuration for the shc pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShcConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Card extraction configuration.
    pub extraction: ExtractionConfig,

    /// Debug artifact configuration.
    pub debug: DebugConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Apply an Otsu threshold before recognition.
    pub binarize: bool,

    /// Maximum image dimension (longer side) for processing.
    pub max_image_size: u32,

    /// Keep `[UNK]` tokens emitted by the recognizer instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            binarize: true,
            max_image_size: 2048,
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    pub fn detection_path(&self) -> PathBuf {
        self.model_dir.join(&self.detection_model)
    }

    pub fn recognition_path(&self) -> PathBuf {
        self.model_dir.join(&self.recognition_model)
    }

    pub fn dictionary_path(&self) -> PathBuf {
        self.model_dir.join(&self.dictionary)
    }

    /// Whether every model file is present on disk.
    pub fn models_present(&self) -> bool {
        self.detection_path().exists()
            && self.recognition_path().exists()
            && self.dictionary_path().exists()
    }
}

/// Card extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Nutrient, rating and fallback tables.
    pub vocabulary: Vocabulary,

    /// Keep the OCR text in extraction results.
    pub include_raw_text: bool,
}

/// Best-effort debug artifacts. Failures to write them are logged and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Directory for debug artifacts; nothing is written when unset.
    pub dump_dir: Option<PathBuf>,

    /// Save the raw uploaded image.
    pub save_upload: bool,

    /// Save the OCR text as `<stem>_ocr.txt`.
    pub save_ocr_text: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            dump_dir: None,
            save_upload: true,
            save_ocr_text: true,
        }
    }
}

impl ShcConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
