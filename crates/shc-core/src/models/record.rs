//! Soil Health Card record produced by the extractor.
//!
//! Every optional field is omitted from the JSON output when its pattern did not
//! match, so consumers treat presence as the per-field success signal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A complete structured Soil Health Card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShcRecord {
    /// Card number and validity period.
    pub card_metadata: CardMetadata,

    /// Farmer identification and contact details.
    pub farmer_details: FarmerDetails,

    /// Where and when the soil sample was taken.
    pub sample_details: SampleDetails,

    /// Soil classification.
    pub soil_info: SoilInfo,

    /// Nutrient readings keyed by nutrient code (pH, EC, OC, N, P, K, ...).
    pub nutrients: BTreeMap<String, NutrientReading>,

    /// Advisory lines in document order.
    pub recommendations: Vec<Recommendation>,

    /// Fertilizer combinations per card option.
    pub fertilizer_recommendations: Vec<FertilizerBlock>,
}

impl ShcRecord {
    /// Get a nutrient reading by code.
    pub fn nutrient(&self, code: &str) -> Option<&NutrientReading> {
        self.nutrients.get(code)
    }

    /// True when no section produced any data.
    pub fn is_empty(&self) -> bool {
        self.card_metadata == CardMetadata::default()
            && self.farmer_details == FarmerDetails::default()
            && self.sample_details == SampleDetails::default()
            && self.soil_info == SoilInfo::default()
            && self.nutrients.is_empty()
            && self.recommendations.is_empty()
            && self.fertilizer_recommendations.is_empty()
    }
}

/// Card identification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shc_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_from: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_to: Option<String>,
}

/// Farmer details block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmerDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub father_husband_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Soil sample details block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_date: Option<String>,

    /// Survey / Khasra / Dag number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survey_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub farm_size: Option<String>,

    /// GPS position as printed on the card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_position: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Soil classification block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil_condition: Option<String>,
}

/// One row of the soil test results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientReading {
    /// Measured value.
    pub value: f64,

    /// Unit as printed, or the nutrient's default unit.
    pub unit: String,

    /// Rating, normalized when a known rating word is present.
    pub rating: String,

    /// Normal range as printed on the card.
    pub normal_level: String,
}

/// A single advisory line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// "Action", "General", or the text before the first colon.
    #[serde(rename = "type")]
    pub kind: String,

    pub text: String,
}

impl Recommendation {
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
        }
    }

    /// Create an "Action" entry.
    pub fn action(text: impl Into<String>) -> Self {
        Self::new("Action", text)
    }
}

/// Fertilizer recommendation for one card option.
///
/// Structured blocks come from the primary strategy; raw blocks are emitted
/// when no option/combination headings could be paired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FertilizerBlock {
    Combination(FertilizerCombination),
    Raw(RawOption),
}

impl FertilizerBlock {
    /// Option number as printed (or ordinal position for raw blocks).
    pub fn option(&self) -> &str {
        match self {
            FertilizerBlock::Combination(c) => &c.option,
            FertilizerBlock::Raw(r) => &r.option,
        }
    }

    pub fn as_combination(&self) -> Option<&FertilizerCombination> {
        match self {
            FertilizerBlock::Combination(c) => Some(c),
            FertilizerBlock::Raw(_) => None,
        }
    }
}

/// Parsed "Option N ... Fertilizer Combination-M" block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FertilizerCombination {
    pub option: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub combination: Option<String>,

    /// Crop variety names listed for this option.
    pub crops: Vec<String>,

    pub fertilizers: Vec<FertilizerItem>,
}

/// One fertilizer line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FertilizerItem {
    pub name: String,

    /// Quantity including unit, e.g. "120 kg/ha".
    pub quantity: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organic_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organic_quantity: Option<String>,
}

/// Unparsed option segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOption {
    pub option: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_record_serializes_all_sections() {
        let record = ShcRecord::default();
        let json = serde_json::to_string(&record).unwrap();

        assert_eq!(
            json,
            r#"{"card_metadata":{},"farmer_details":{},"sample_details":{},"soil_info":{},"nutrients":{},"recommendations":[],"fertilizer_recommendations":[]}"#
        );
        assert!(record.is_empty());
    }

    #[test]
    fn test_recommendation_type_key() {
        let json = serde_json::to_value(Recommendation::action("Apply lime")).unwrap();
        assert_eq!(json["type"], "Action");
        assert_eq!(json["text"], "Apply lime");
    }

    #[test]
    fn test_fertilizer_block_shapes() {
        let structured = FertilizerBlock::Combination(FertilizerCombination {
            option: "1".into(),
            combination: Some("1".into()),
            crops: vec!["Maize".into()],
            fertilizers: vec![FertilizerItem {
                name: "Urea".into(),
                quantity: "120 kg/ha".into(),
                organic_type: None,
                organic_quantity: None,
            }],
        });
        let json = serde_json::to_value(&structured).unwrap();
        assert_eq!(json["combination"], "1");
        assert!(json["fertilizers"][0].get("organic_type").is_none());

        let raw: FertilizerBlock =
            serde_json::from_str(r#"{"option":"2","text":"DAP 50 kg/ha"}"#).unwrap();
        assert_eq!(raw.option(), "2");
        assert!(raw.as_combination().is_none());
    }
}
