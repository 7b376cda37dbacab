//! Rule-based extractors for Soil Health Card text.

pub mod fertilizer;
pub mod fields;
pub mod nutrients;
pub mod patterns;
pub mod recommendations;
pub mod region;
pub mod text;

pub use fertilizer::extract_fertilizer_blocks;
pub use fields::{
    extract_card_metadata, extract_farmer_details, extract_sample_details, extract_soil_info,
    LabeledField,
};
pub use nutrients::{extract_nutrients, NutrientTable};
pub use recommendations::{classify_line, extract_recommendations};
pub use region::RegionScanner;
pub use text::clean_text;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// An extracted value with the text it came from.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
