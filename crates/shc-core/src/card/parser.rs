//! Multi-pass Soil Health Card parser.

use chrono::Utc;
use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::record::ShcRecord;
use crate::models::vocabulary::Vocabulary;

use super::rules::{
    extract_card_metadata, extract_farmer_details, extract_fertilizer_blocks, extract_nutrients,
    extract_recommendations, extract_sample_details, extract_soil_info,
    text::normalize_newlines,
};
use super::CardExtractor;

/// Result of card extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted card data.
    pub record: ShcRecord,
    /// Text the record was extracted from, when requested.
    pub raw_text: Option<String>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Rule-based card parser.
///
/// Holds no mutable state, so one instance can serve many threads.
#[derive(Debug, Clone, Default)]
pub struct CardParser {
    vocabulary: Vocabulary,
    include_raw_text: bool,
}

impl CardParser {
    /// Create a parser with the built-in vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different classification vocabulary.
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Keep the input text in [`ExtractionResult::raw_text`].
    pub fn with_raw_text(mut self, include: bool) -> Self {
        self.include_raw_text = include;
        self
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            vocabulary: config.vocabulary.clone(),
            include_raw_text: config.include_raw_text,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

impl CardExtractor for CardParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Utc::now();
        let text = normalize_newlines(text);
        let mut warnings = Vec::new();

        info!("Parsing card from {} characters of text", text.len());

        let card_metadata = extract_card_metadata(&text);
        if card_metadata.shc_number.is_none() {
            warnings.push("Could not extract card number".to_string());
        }

        let farmer_details = extract_farmer_details(&text);
        if farmer_details.name.is_none() {
            warnings.push("Could not extract farmer name".to_string());
        }

        let sample_details = extract_sample_details(&text);
        let soil_info = extract_soil_info(&text);

        let table = extract_nutrients(&text, &self.vocabulary);
        warnings.extend(table.warnings);
        if table.readings.is_empty() {
            warnings.push("Could not extract nutrient readings".to_string());
        } else if table.used_fallback {
            warnings.push("Nutrient table not found, used single-value fallback".to_string());
        }

        let recommendations = extract_recommendations(&text);
        let fertilizer_recommendations = extract_fertilizer_blocks(&text);
        if fertilizer_recommendations.is_empty() {
            warnings.push("Could not extract fertilizer options".to_string());
        }

        let record = ShcRecord {
            card_metadata,
            farmer_details,
            sample_details,
            soil_info,
            nutrients: table.readings,
            recommendations,
            fertilizer_recommendations,
        };

        let processing_time_ms = (Utc::now() - start).num_milliseconds().max(0) as u64;

        debug!(
            "Extracted {} nutrients, {} recommendations, {} fertilizer options in {}ms",
            record.nutrients.len(),
            record.recommendations.len(),
            record.fertilizer_recommendations.len(),
            processing_time_ms
        );

        ExtractionResult {
            record,
            raw_text: self.include_raw_text.then_some(text),
            warnings,
            processing_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::Recommendation;
    use crate::ocr::OcrResult;
    use pretty_assertions::assert_eq;

    const CARD: &str = "Soil Health Card Number: KA/2022/0042\r\n\
                        Farmer Name: Lakshmi Devi\r\n\
                        Soil Test Results\r\n\
                        1 pH 6.8 Neutral 6.5-7.5\r\n\
                        4 Nitrogen (N) 250 kg/ha Low 280-560 kg/ha\r\n\
                        Excess use of Fertilizer is injurious to soil health and plant growth\r\n\
                        Use neem coated urea\r\n\
                        Please use option 1\r\n\
                        Option 1\r\n\
                        Fertilizer Combination-1\r\n\
                        Urea 100 kg/ha\r\n";

    #[test]
    fn test_parse_card() {
        let result = CardParser::new().parse(CARD);
        let record = &result.record;

        assert_eq!(record.card_metadata.shc_number.as_deref(), Some("KA/2022/0042"));
        assert_eq!(record.farmer_details.name.as_deref(), Some("Lakshmi Devi"));
        assert_eq!(record.nutrients.len(), 2);
        assert_eq!(record.nutrient("N").map(|n| n.value), Some(250.0));
        assert_eq!(
            record.recommendations,
            vec![Recommendation::action("Use neem coated urea")]
        );
        assert_eq!(record.fertilizer_recommendations.len(), 1);
        assert!(result.warnings.is_empty());
        assert!(result.raw_text.is_none());
    }

    #[test]
    fn test_warnings_for_empty_text() {
        let result = CardParser::new().parse("");

        assert!(result.record.is_empty());
        assert_eq!(result.warnings.len(), 4);
    }

    #[test]
    fn test_raw_text_is_normalized() {
        let result = CardParser::new().with_raw_text(true).parse("a\r\nb");
        assert_eq!(result.raw_text.as_deref(), Some("a\nb"));
    }

    #[test]
    fn test_extract_from_ocr_result() {
        let parser = CardParser::new();
        let ocr = OcrResult::from_text(CARD);

        assert_eq!(parser.extract(&ocr), parser.extract_from_text(CARD));
    }

    #[test]
    fn test_from_config() {
        let mut config = ExtractionConfig::default();
        config.include_raw_text = true;
        config.vocabulary.ratings.clear();

        let result = CardParser::from_config(&config).parse("1 pH 6.8 neutral 6.5-7.5");
        assert_eq!(result.record.nutrients["pH"].rating, "neutral");
        assert!(result.raw_text.is_some());
    }
}
