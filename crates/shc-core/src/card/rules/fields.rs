//! Single-value field extraction (card metadata, farmer, sample and soil details).

use regex::Regex;

use crate::models::record::{CardMetadata, FarmerDetails, SampleDetails, SoilInfo};

use super::patterns::*;
use super::{ExtractionMatch, FieldExtractor};

/// Extractor for a "Label: value" field whose value is capture group 1.
pub struct LabeledField {
    pattern: &'static Regex,
}

impl LabeledField {
    pub fn new(pattern: &'static Regex) -> Self {
        Self { pattern }
    }

    /// First non-empty trimmed value, if any.
    pub fn value(&self, text: &str) -> Option<String> {
        self.extract(text).map(|m| m.value)
    }
}

impl FieldExtractor for LabeledField {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.pattern
            .captures_iter(text)
            .find_map(|caps| to_match(&caps))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| to_match(&caps))
            .collect()
    }
}

fn to_match(caps: &regex::Captures<'_>) -> Option<ExtractionMatch<String>> {
    let group = caps.get(1)?;
    let value = group.as_str().trim();
    if value.is_empty() {
        return None;
    }
    let full_match = caps.get(0)?;
    Some(
        ExtractionMatch::new(value.to_string(), full_match.as_str())
            .with_position(full_match.start(), full_match.end()),
    )
}

fn field(pattern: &'static Regex, text: &str) -> Option<String> {
    LabeledField::new(pattern).value(text)
}

/// Extract the card number and validity period.
pub fn extract_card_metadata(text: &str) -> CardMetadata {
    let mut metadata = CardMetadata {
        shc_number: field(&SHC_NUMBER, text),
        ..CardMetadata::default()
    };

    // Both ends of the validity period come from one match.
    if let Some(caps) = VALIDITY.captures(text) {
        metadata.validity_from = non_empty(&caps[1]);
        metadata.validity_to = non_empty(&caps[2]);
    }

    metadata
}

pub fn extract_farmer_details(text: &str) -> FarmerDetails {
    FarmerDetails {
        name: field(&FARMER_NAME, text),
        father_husband_name: field(&FATHER_HUSBAND_NAME, text),
        address: field(&ADDRESS, text),
        mobile: field(&MOBILE, text),
        gender: field(&GENDER, text),
        category: field(&CATEGORY, text),
    }
}

pub fn extract_sample_details(text: &str) -> SampleDetails {
    SampleDetails {
        collection_date: field(&COLLECTION_DATE, text),
        survey_number: field(&SURVEY_NUMBER, text),
        farm_size: field(&FARM_SIZE, text),
        geo_position: field(&GEO_POSITION, text),
        district: field(&DISTRICT, text),
        state: field(&STATE, text),
    }
}

/// Extract soil type and condition.
///
/// Cards rarely print a separate condition; when the soil type itself names
/// one (e.g. "Acidic hill soil") that phrase doubles as the condition.
pub fn extract_soil_info(text: &str) -> SoilInfo {
    let soil_type = field(&SOIL_TYPE, text);
    let soil_condition = field(&SOIL_CONDITION, text).or_else(|| {
        soil_type
            .as_deref()
            .filter(|t| describes_condition(t))
            .map(str::to_string)
    });

    SoilInfo {
        soil_type,
        soil_condition,
    }
}

fn describes_condition(soil_type: &str) -> bool {
    let lowered = soil_type.to_lowercase();
    SOIL_CONDITION_WORDS.iter().any(|w| lowered.contains(w))
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_card_metadata() {
        let text = "Soil Health Card Number: HP/2023/KGR/001245\n\
                    Validity - From: 12-03-2023 To: 11-03-2026\n";
        let metadata = extract_card_metadata(text);

        assert_eq!(metadata.shc_number.as_deref(), Some("HP/2023/KGR/001245"));
        assert_eq!(metadata.validity_from.as_deref(), Some("12-03-2023"));
        assert_eq!(metadata.validity_to.as_deref(), Some("11-03-2026"));
    }

    #[test]
    fn test_validity_split_across_lines() {
        let metadata = extract_card_metadata("Validity: From: 01/01/2024\nTo: 31/12/2026");

        assert_eq!(metadata.validity_from.as_deref(), Some("01/01/2024"));
        assert_eq!(metadata.validity_to.as_deref(), Some("31/12/2026"));
    }

    #[test]
    fn test_farmer_details() {
        let text = "Farmer's Name: Ram Lal\n\
                    Father's/Husband Name: Sh. Mohan Lal\n\
                    Address: Village Bhuntar, Tehsil Kullu\n\
                    Mobile No.: 9876543210\n\
                    Gender: Male\n\
                    Category: General\n";

        assert_eq!(
            extract_farmer_details(text),
            FarmerDetails {
                name: Some("Ram Lal".into()),
                father_husband_name: Some("Sh. Mohan Lal".into()),
                address: Some("Village Bhuntar, Tehsil Kullu".into()),
                mobile: Some("9876543210".into()),
                gender: Some("Male".into()),
                category: Some("General".into()),
            }
        );
    }

    #[test]
    fn test_first_match_wins() {
        let farmer = extract_farmer_details("Farmer Name: First\nFarmer Name: Second");
        assert_eq!(farmer.name.as_deref(), Some("First"));
    }

    #[test]
    fn test_sample_details() {
        let text = "Date of Sample Collection: 05-02-2023\n\
                    Survey No./ Khasra No./ Dag No.: 145/2\n\
                    Farm Size: 0.8 ha\n\
                    Geo Position (GPS): 31.8843 N, 77.1480 E\n\
                    District: Kullu, Himachal Pradesh\n\
                    State: Himachal Pradesh\n";
        let sample = extract_sample_details(text);

        assert_eq!(sample.collection_date.as_deref(), Some("05-02-2023"));
        assert_eq!(sample.survey_number.as_deref(), Some("145/2"));
        assert_eq!(sample.farm_size.as_deref(), Some("0.8 ha"));
        assert_eq!(sample.geo_position.as_deref(), Some("31.8843 N, 77.1480 E"));
        assert_eq!(sample.district.as_deref(), Some("Kullu"));
        assert_eq!(sample.state.as_deref(), Some("Himachal Pradesh"));
    }

    #[test]
    fn test_soil_condition_from_type() {
        let soil = extract_soil_info("Soil Type: Acidic hill soil");
        assert_eq!(soil.soil_type.as_deref(), Some("Acidic hill soil"));
        assert_eq!(soil.soil_condition.as_deref(), Some("Acidic hill soil"));

        let soil = extract_soil_info("Soil Type: Sandy loam\nSoil Condition: Saline");
        assert_eq!(soil.soil_condition.as_deref(), Some("Saline"));

        let soil = extract_soil_info("Soil Type: Sandy loam");
        assert!(soil.soil_condition.is_none());
    }

    #[test]
    fn test_missing_labels_are_absent() {
        let text = "nothing recognizable here";

        assert_eq!(extract_card_metadata(text), CardMetadata::default());
        assert_eq!(extract_farmer_details(text), FarmerDetails::default());
        assert_eq!(extract_sample_details(text), SampleDetails::default());
        assert_eq!(extract_soil_info(text), SoilInfo::default());
    }

    #[test]
    fn test_labeled_field_positions() {
        let all = LabeledField::new(&GENDER).extract_all("Gender: Male\nGender: Female");

        assert_eq!(all.len(), 2);
        assert_eq!(all[1].value, "Female");
        assert_eq!(all[0].position, Some((0, 12)));
    }
}
