//! Image preprocessing for OCR.

use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use tracing::debug;

use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Image preprocessor applied before recognition.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    /// Maximum image dimension.
    max_size: u32,
    /// Apply a global Otsu threshold.
    binarize: bool,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self {
            max_size: 2048,
            binarize: true,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            max_size: config.max_image_size,
            binarize: config.binarize,
        }
    }

    /// Set maximum image dimension.
    pub fn with_max_size(mut self, size: u32) -> Self {
        self.max_size = size;
        self
    }

    /// Enable or disable thresholding.
    pub fn with_binarize(mut self, binarize: bool) -> Self {
        self.binarize = binarize;
        self
    }

    /// Downscale, then optionally threshold to black and white.
    pub fn prepare(&self, image: &DynamicImage) -> Result<DynamicImage, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::Preprocessing(format!(
                "image has no pixels ({}x{})",
                width, height
            )));
        }

        let (new_width, new_height) = self.calculate_resize_dimensions(width, height);
        let resized = if (new_width, new_height) != (width, height) {
            debug!(
                "Resizing image {}x{} -> {}x{}",
                width, height, new_width, new_height
            );
            image.resize_exact(
                new_width,
                new_height,
                image::imageops::FilterType::Lanczos3,
            )
        } else {
            image.clone()
        };

        if !self.binarize {
            return Ok(resized);
        }

        let gray = resized.to_luma8();
        let threshold = otsu_threshold(&gray);
        debug!("Otsu threshold: {}", threshold);

        Ok(DynamicImage::ImageLuma8(apply_threshold(&gray, threshold)))
    }

    fn calculate_resize_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let max_dim = width.max(height);

        if max_dim <= self.max_size {
            return (width, height);
        }

        let scale = self.max_size as f32 / max_dim as f32;
        let new_width = (width as f32 * scale) as u32;
        let new_height = (height as f32 * scale) as u32;

        (new_width.max(1), new_height.max(1))
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Global threshold maximizing between-class variance.
///
/// Pixels at or below the returned level are background.
pub fn otsu_threshold(image: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total = (image.width() as u64 * image.height() as u64) as f64;
    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut weight_bg = 0.0;
    let mut sum_bg = 0.0;
    let mut best_variance = 0.0;
    let mut best_threshold = 0u8;

    for (level, &count) in histogram.iter().enumerate() {
        weight_bg += count as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }

        sum_bg += level as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (sum_all - sum_bg) / weight_fg;
        let variance = weight_bg * weight_fg * (mean_bg - mean_fg).powi(2);

        if variance > best_variance {
            best_variance = variance;
            best_threshold = level as u8;
        }
    }

    best_threshold
}

fn apply_threshold(image: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut result = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        let output = if pixel[0] > threshold { 255 } else { 0 };
        result.put_pixel(x, y, Luma([output]));
    }

    result
}
