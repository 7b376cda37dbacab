//! Upload boundary: validate an uploaded card image, run OCR, extract.
//!
//! This is the request-level entry point. Every failure becomes an
//! [`ShcError`] carrying a status code and an `{"error": ...}` body.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::card::{CardExtractor, CardParser};
use crate::error::{InputError, OcrError, Result, ShcError};
use crate::models::config::DebugConfig;
use crate::models::record::ShcRecord;
use crate::ocr::OcrProvider;

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Filename without any directory components.
    fn safe_name(&self) -> String {
        Path::new(&self.filename)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("upload")
            .to_string()
    }

    /// Filename up to the first dot, used to name derived artifacts.
    fn stem(&self) -> String {
        let name = self.safe_name();
        match name.split('.').next() {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => "upload".to_string(),
        }
    }
}

/// Outcome of a successful scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Extracted card data.
    pub record: ShcRecord,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// OCR engine name.
    pub ocr_engine: String,
    /// OCR time in milliseconds.
    pub ocr_time_ms: u64,
    /// Extraction time in milliseconds.
    pub extraction_time_ms: u64,
    /// When the scan finished.
    pub scanned_at: DateTime<Utc>,
}

/// Runs uploads through OCR and extraction.
pub struct CardScanner<O, E = CardParser> {
    ocr: O,
    extractor: E,
    debug: DebugConfig,
}

impl<O: OcrProvider> CardScanner<O, CardParser> {
    /// Create a scanner with the default card parser.
    pub fn new(ocr: O) -> Self {
        Self::with_extractor(ocr, CardParser::new())
    }
}

impl<O: OcrProvider, E: CardExtractor> CardScanner<O, E> {
    pub fn with_extractor(ocr: O, extractor: E) -> Self {
        Self {
            ocr,
            extractor,
            debug: DebugConfig::default(),
        }
    }

    /// Set where (and whether) debug artifacts are written.
    pub fn with_debug(mut self, debug: DebugConfig) -> Self {
        self.debug = debug;
        self
    }

    /// Validate, recognize and extract one upload.
    pub fn scan(&self, upload: Option<Upload>) -> Result<ScanReport> {
        let upload = upload.ok_or(InputError::MissingFile)?;
        if upload.filename.is_empty() {
            return Err(InputError::EmptyFilename.into());
        }
        if upload.bytes.is_empty() {
            return Err(InputError::EmptyFile.into());
        }

        info!(
            "Scanning upload {} ({} bytes)",
            upload.filename,
            upload.bytes.len()
        );

        if self.debug.save_upload {
            self.dump(&upload.safe_name(), &upload.bytes);
        }

        let image = image::load_from_memory(&upload.bytes)
            .map_err(|e| InputError::InvalidImage(e.to_string()))?;

        let ocr_result = self.ocr.recognize(&image)?;
        if ocr_result.is_blank() {
            return Err(OcrError::NoText.into());
        }
        debug!(
            "{} produced {} characters",
            self.ocr.name(),
            ocr_result.text.len()
        );

        if self.debug.save_ocr_text {
            self.dump(
                &format!("{}_ocr.txt", upload.stem()),
                ocr_result.text.as_bytes(),
            );
        }

        let extraction = self.extractor.parse(&ocr_result.text);

        Ok(ScanReport {
            record: extraction.record,
            warnings: extraction.warnings,
            ocr_engine: self.ocr.name().to_string(),
            ocr_time_ms: ocr_result.processing_time_ms,
            extraction_time_ms: extraction.processing_time_ms,
            scanned_at: Utc::now(),
        })
    }

    /// Scan and render the response as `(status, body)`.
    ///
    /// Success returns the record itself; failures return `{"error": ...}`.
    pub fn respond(&self, upload: Option<Upload>) -> (u16, Value) {
        let outcome = self.scan(upload).and_then(|report| {
            serde_json::to_value(&report.record).map_err(|e| ShcError::Internal(e.to_string()))
        });

        match outcome {
            Ok(body) => (200, body),
            Err(e) => {
                if e.is_client_error() {
                    warn!("Rejected upload: {}", e);
                } else {
                    warn!("Scan failed: {}", e);
                }
                (e.status_code(), json!(e.to_error_body()))
            }
        }
    }

    /// Best-effort write of a debug artifact. Failures are logged only.
    fn dump(&self, name: &str, bytes: &[u8]) {
        let Some(dir) = self.debug.dump_dir.as_deref() else {
            return;
        };

        match write_artifact(dir, name, bytes) {
            Ok(path) => debug!("Saved debug artifact {}", path.display()),
            Err(e) => warn!("Could not save debug artifact {} in {}: {}", name, dir.display(), e),
        }
    }
}

/// Write `bytes` to `dir/name`, creating `dir` if needed.
fn write_artifact(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::OcrResult;
    use image::{DynamicImage, GrayImage, ImageFormat};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::io::Cursor;

    struct FixedText {
        text: &'static str,
        calls: Cell<usize>,
    }

    impl FixedText {
        fn new(text: &'static str) -> Self {
            Self {
                text,
                calls: Cell::new(0),
            }
        }
    }

    impl OcrProvider for FixedText {
        fn recognize(&self, _image: &DynamicImage) -> std::result::Result<OcrResult, OcrError> {
            self.calls.set(self.calls.get() + 1);
            Ok(OcrResult::from_text(self.text))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct Failing;

    impl OcrProvider for Failing {
        fn recognize(&self, _image: &DynamicImage) -> std::result::Result<OcrResult, OcrError> {
            Err(OcrError::Recognition("service unavailable".into()))
        }
    }

    fn png() -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(GrayImage::new(8, 8))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    const CARD: &str = "Farmer Name: Ram Lal\nSoil Test Results\n1 pH 5.4 Acidic 6.5-7.5\n";

    #[test]
    fn test_scan_success() {
        let scanner = CardScanner::new(FixedText::new(CARD));
        let report = scanner.scan(Some(Upload::new("card.png", png()))).unwrap();

        assert_eq!(report.record.farmer_details.name.as_deref(), Some("Ram Lal"));
        assert_eq!(report.record.nutrients["pH"].value, 5.4);
        assert_eq!(report.ocr_engine, "fixed");
    }

    #[test]
    fn test_input_errors_skip_ocr() {
        let scanner = CardScanner::new(FixedText::new(CARD));

        let (status, body) = scanner.respond(None);
        assert_eq!(status, 400);
        assert_eq!(body, json!({"error": "No file part"}));

        let (status, body) = scanner.respond(Some(Upload::new("", png())));
        assert_eq!(status, 400);
        assert_eq!(body, json!({"error": "No selected file"}));

        let (status, _) = scanner.respond(Some(Upload::new("card.png", Vec::new())));
        assert_eq!(status, 400);

        let (status, body) = scanner.respond(Some(Upload::new("card.png", b"not an image".to_vec())));
        assert_eq!(status, 400);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid image file"));

        assert_eq!(scanner.ocr.calls.get(), 0);
    }

    #[test]
    fn test_no_text_is_client_error() {
        let scanner = CardScanner::new(FixedText::new("  \n "));
        let (status, body) = scanner.respond(Some(Upload::new("card.png", png())));

        assert_eq!(status, 400);
        assert_eq!(body, json!({"error": "No text detected in the image"}));
    }

    #[test]
    fn test_ocr_failure_is_server_error() {
        let scanner = CardScanner::new(Failing);
        let (status, body) = scanner.respond(Some(Upload::new("card.png", png())));

        assert_eq!(status, 500);
        assert!(body["error"].as_str().unwrap().contains("service unavailable"));
    }

    #[test]
    fn test_success_body_is_record() {
        let scanner = CardScanner::new(FixedText::new(CARD));
        let (status, body) = scanner.respond(Some(Upload::new("card.png", png())));

        assert_eq!(status, 200);
        assert_eq!(body["farmer_details"]["name"], "Ram Lal");
        assert_eq!(body["fertilizer_recommendations"], json!([]));
    }

    #[test]
    fn test_debug_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let dump_dir = dir.path().join("uploads");
        let scanner = CardScanner::new(FixedText::new(CARD)).with_debug(DebugConfig {
            dump_dir: Some(dump_dir.clone()),
            ..DebugConfig::default()
        });

        scanner
            .scan(Some(Upload::new("../../etc/card.v2.png", png())))
            .unwrap();

        assert!(dump_dir.join("card.v2.png").exists());
        assert_eq!(
            std::fs::read_to_string(dump_dir.join("card_ocr.txt")).unwrap(),
            CARD
        );
    }

    #[test]
    fn test_unwritable_dump_dir_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let scanner = CardScanner::new(FixedText::new(CARD)).with_debug(DebugConfig {
            dump_dir: Some(blocker.join("nested")),
            ..DebugConfig::default()
        });

        assert!(scanner.scan(Some(Upload::new("card.png", png()))).is_ok());
    }

    #[test]
    fn test_artifact_write_failure_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let err = write_artifact(&blocker.join("nested"), "card.png", b"png").unwrap_err();
        assert!(matches!(err, ShcError::Io(_)));
        assert_eq!(err.status_code(), 500);

        let path = write_artifact(&dir.path().join("ok"), "card_ocr.txt", b"text").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "text");
    }
}
