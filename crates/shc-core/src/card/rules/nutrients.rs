//! Soil test results table extraction.

use std::borrow::Cow;
use std::collections::BTreeMap;

use regex::Regex;
use tracing::{debug, warn};

use crate::models::record::NutrientReading;
use crate::models::vocabulary::Vocabulary;

use super::patterns::{
    EC_FALLBACK, NUTRIENT_ROW, PH_FALLBACK, TABLE_END_MARKERS, TABLE_START_MARKERS,
};
use super::region::RegionScanner;

/// Extracted nutrient table.
#[derive(Debug, Clone, Default)]
pub struct NutrientTable {
    /// Readings keyed by nutrient code.
    pub readings: BTreeMap<String, NutrientReading>,
    /// Rows that were recognized but could not be used.
    pub warnings: Vec<String>,
    /// Whether the single-nutrient fallback produced the readings.
    pub used_fallback: bool,
}

/// Extract nutrient readings from card text.
///
/// Rows are read from the "Soil Test Results" region (or the whole text when
/// the card has no such heading). When no row matches, pH and EC are looked
/// up individually within the same region.
pub fn extract_nutrients(text: &str, vocabulary: &Vocabulary) -> NutrientTable {
    let mut table = NutrientTable::default();

    let region = match RegionScanner::new(TABLE_START_MARKERS, TABLE_END_MARKERS).scan(text) {
        Some(region) => Cow::Owned(region),
        None => {
            debug!("No soil test results heading, scanning whole text");
            Cow::Borrowed(text)
        }
    };

    for caps in NUTRIENT_ROW.captures_iter(&region) {
        let parameter = caps["param"].trim();
        let raw_value = &caps["value"];

        let Ok(value) = raw_value.parse::<f64>() else {
            warn!("Skipping row {:?}: non-numeric value {:?}", parameter, raw_value);
            table.warnings.push(format!(
                "Skipped nutrient row '{}': value '{}' is not a number",
                parameter, raw_value
            ));
            continue;
        };

        let (code, default_unit) = vocabulary.classify(parameter);
        let unit = caps
            .name("unit")
            .map(|m| m.as_str().to_string())
            .unwrap_or(default_unit);

        table.readings.insert(
            code,
            NutrientReading {
                value,
                unit,
                rating: vocabulary.normalize_rating(&caps["rating"]),
                normal_level: caps["normal"].trim().to_string(),
            },
        );
    }

    if table.readings.is_empty() {
        table.used_fallback = true;
        extract_fallback(&region, vocabulary, &mut table);
    }

    debug!(
        "Extracted {} nutrient readings (fallback: {})",
        table.readings.len(),
        table.used_fallback
    );

    table
}

fn extract_fallback(text: &str, vocabulary: &Vocabulary, table: &mut NutrientTable) {
    let levels = &vocabulary.fallback_normal_levels;
    let single = [
        ("pH", &*PH_FALLBACK, levels.ph.as_str()),
        ("EC", &*EC_FALLBACK, levels.ec.as_str()),
    ];

    for (code, pattern, normal_level) in single {
        if let Some(reading) = single_reading(code, pattern, normal_level, text, vocabulary, table) {
            table.readings.insert(code.to_string(), reading);
        }
    }
}

fn single_reading(
    code: &str,
    pattern: &Regex,
    normal_level: &str,
    text: &str,
    vocabulary: &Vocabulary,
    table: &mut NutrientTable,
) -> Option<NutrientReading> {
    let caps = pattern.captures(text)?;

    let value = match caps[1].parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            warn!("Skipping {} reading: non-numeric value {:?}", code, &caps[1]);
            table.warnings.push(format!(
                "Skipped {} reading: value '{}' is not a number",
                code, &caps[1]
            ));
            return None;
        }
    };

    Some(NutrientReading {
        value,
        unit: vocabulary.default_unit(code).to_string(),
        rating: vocabulary.normalize_rating(&caps[2]),
        normal_level: normal_level.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reading(value: f64, unit: &str, rating: &str, normal_level: &str) -> NutrientReading {
        NutrientReading {
            value,
            unit: unit.to_string(),
            rating: rating.to_string(),
            normal_level: normal_level.to_string(),
        }
    }

    #[test]
    fn test_table_rows() {
        let text = "Soil Test Results\n\
                    Sr. No Parameter Test Value Unit Rating Normal Level\n\
                    1 pH 5.4 Acidic 6.5-7.5\n\
                    2 Electrical Conductivity (EC) 0.21 dS/m Normal 0-1 dS/m\n\
                    3 Organic Carbon (OC) 0.62 % medium 0.5-0.75 %\n\
                    5 Phosphorus (P) 12.3 Medium 10-25 kg/ha\n\
                    Option 1\n\
                    7 Stray (X) 1.0 Low 1-2\n";
        let table = extract_nutrients(text, &Vocabulary::default());

        assert!(!table.used_fallback);
        assert_eq!(table.readings.len(), 4);
        assert_eq!(table.readings["pH"], reading(5.4, "", "Acidic", "6.5-7.5"));
        assert_eq!(table.readings["EC"], reading(0.21, "dS/m", "Normal", "0-1 dS/m"));
        assert_eq!(table.readings["OC"], reading(0.62, "%", "Medium", "0.5-0.75 %"));
        assert_eq!(table.readings["P"], reading(12.3, "kg/ha", "Medium", "10-25 kg/ha"));
    }

    #[test]
    fn test_unknown_parameter_keeps_label() {
        let text = "1 Calcium Carbonate 3.2 % Low 1-5 %";
        let table = extract_nutrients(text, &Vocabulary::default());

        assert_eq!(
            table.readings["Calcium Carbonate"],
            reading(3.2, "%", "Low", "1-5 %")
        );
    }

    #[test]
    fn test_non_numeric_value_is_dropped() {
        let text = "Soil Test Results\n\
                    1 pH 1.2.3 Neutral 6.5-7.5\n\
                    4 Nitrogen (N) 210 kg/ha Low 280-560 kg/ha\n";
        let table = extract_nutrients(text, &Vocabulary::default());

        assert!(!table.readings.contains_key("pH"));
        assert_eq!(table.readings["N"].value, 210.0);
        assert_eq!(table.warnings.len(), 1);
    }

    #[test]
    fn test_later_duplicate_overwrites() {
        let text = "1 pH 5.0 Low 6.5-7.5\n2 pH 6.0 Neutral 6.5-7.5";
        let table = extract_nutrients(text, &Vocabulary::default());

        assert_eq!(table.readings["pH"].value, 6.0);
        assert_eq!(table.readings["pH"].rating, "Neutral");
    }

    #[test]
    fn test_fallback_ph_and_ec() {
        let text = "pH 7.9 Moderately Alkaline\nEC 0.4 dS/m Normal";
        let table = extract_nutrients(text, &Vocabulary::default());

        assert!(table.used_fallback);
        assert_eq!(
            table.readings["pH"],
            reading(7.9, "", "Moderately alkaline", "6.5-7.5")
        );
        assert_eq!(table.readings["EC"], reading(0.4, "dS/m", "Normal", "0-1 dS/m"));
    }

    #[test]
    fn test_fallback_stays_in_table_region() {
        let text = "Keep pH 6.5 optimal for crops\n\
                    Soil Test Results\n\
                    pH 5.1 Acidic\n\
                    Option 1\n\
                    pH 9.0 Alkaline\n";
        let table = extract_nutrients(text, &Vocabulary::default());

        assert!(table.used_fallback);
        assert_eq!(table.readings.len(), 1);
        assert_eq!(table.readings["pH"], reading(5.1, "", "Acidic", "6.5-7.5"));
    }

    #[test]
    fn test_fallback_region_without_match_finds_nothing() {
        let text = "EC 0.3 dS/m Normal
Soil Test Results
results pending
";
        let table = extract_nutrients(text, &Vocabulary::default());

        assert!(table.used_fallback);
        assert!(table.readings.is_empty());
    }

    #[test]
    fn test_fallback_levels_from_vocabulary() {
        let mut vocabulary = Vocabulary::default();
        vocabulary.fallback_normal_levels.ph = "6.0-8.0".to_string();

        let table = extract_nutrients("pH 7.1 neutral", &vocabulary);
        assert_eq!(table.readings["pH"], reading(7.1, "", "Neutral", "6.0-8.0"));
    }

    #[test]
    fn test_nothing_found() {
        let table = extract_nutrients("no numbers here", &Vocabulary::default());

        assert!(table.readings.is_empty());
        assert!(table.warnings.is_empty());
    }
}
