//! Classification tables used when interpreting nutrient table rows.
//!
//! The tables are plain data so a caller (or a config file) can substitute a
//! different vocabulary, e.g. for a regional card layout.

use serde::{Deserialize, Serialize};

/// Maps a parameter label to a canonical nutrient code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientRule {
    /// Canonical code, e.g. "N".
    pub code: String,

    /// Case-sensitive substrings; any hit selects this rule.
    pub needles: Vec<String>,

    /// Unit used when the row did not carry one.
    pub default_unit: String,
}

impl NutrientRule {
    pub fn new(code: &str, needles: &[&str], default_unit: &str) -> Self {
        Self {
            code: code.to_string(),
            needles: needles.iter().map(|n| n.to_string()).collect(),
            default_unit: default_unit.to_string(),
        }
    }

    pub fn matches(&self, parameter: &str) -> bool {
        self.needles.iter().any(|n| parameter.contains(n.as_str()))
    }
}

/// Maps a lowercase rating substring to its canonical spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRule {
    pub needle: String,
    pub canonical: String,
}

impl RatingRule {
    pub fn new(needle: &str, canonical: &str) -> Self {
        Self {
            needle: needle.to_lowercase(),
            canonical: canonical.to_string(),
        }
    }
}

/// Normal ranges reported by the single-nutrient fallback patterns, which do
/// not capture a range of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackNormalLevels {
    pub ph: String,
    pub ec: String,
}

impl Default for FallbackNormalLevels {
    fn default() -> Self {
        Self {
            ph: "6.5-7.5".to_string(),
            ec: "0-1 dS/m".to_string(),
        }
    }
}

/// Ordered classification tables. Rules are evaluated in list order and the
/// first hit wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub nutrients: Vec<NutrientRule>,
    pub ratings: Vec<RatingRule>,
    pub fallback_normal_levels: FallbackNormalLevels,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            nutrients: vec![
                NutrientRule::new("pH", &["pH"], ""),
                NutrientRule::new("EC", &["EC"], "dS/m"),
                NutrientRule::new("OC", &["Organic Carbon", "OC"], "%"),
                NutrientRule::new("N", &["Nitrogen", "(N)"], "kg/ha"),
                NutrientRule::new("P", &["Phosphorus", "(P)"], "kg/ha"),
                NutrientRule::new("K", &["Potassium", "(K)"], "kg/ha"),
                NutrientRule::new("S", &["Sulphur", "Sulfur", "(S)"], "ppm"),
                NutrientRule::new("Zn", &["Zinc", "(Zn)"], "ppm"),
                NutrientRule::new("B", &["Boron", "(B)"], "ppm"),
                NutrientRule::new("Fe", &["Iron", "(Fe)"], "ppm"),
                NutrientRule::new("Mn", &["Manganese", "(Mn)"], "ppm"),
                NutrientRule::new("Cu", &["Copper", "(Cu)"], "ppm"),
            ],
            ratings: vec![
                RatingRule::new("low", "Low"),
                RatingRule::new("medium", "Medium"),
                RatingRule::new("high", "High"),
                RatingRule::new("sufficient", "Sufficient"),
                RatingRule::new("moderately alkaline", "Moderately alkaline"),
                RatingRule::new("neutral", "Neutral"),
            ],
            fallback_normal_levels: FallbackNormalLevels::default(),
        }
    }
}

impl Vocabulary {
    /// Canonical key and default unit for a parameter label.
    ///
    /// Unrecognized labels are keyed by their trimmed text with an empty unit.
    pub fn classify(&self, parameter: &str) -> (String, String) {
        let parameter = parameter.trim();
        self.nutrients
            .iter()
            .find(|rule| rule.matches(parameter))
            .map(|rule| (rule.code.clone(), rule.default_unit.clone()))
            .unwrap_or_else(|| (parameter.to_string(), String::new()))
    }

    /// Default unit for a canonical code.
    pub fn default_unit(&self, code: &str) -> &str {
        self.nutrients
            .iter()
            .find(|rule| rule.code == code)
            .map(|rule| rule.default_unit.as_str())
            .unwrap_or("")
    }

    /// Normalize a raw rating phrase.
    ///
    /// Matching is a case-insensitive substring test. When several needles
    /// occur in one phrase the earliest rule in the list wins, so
    /// "Low (moderately alkaline)" becomes "Low".
    pub fn normalize_rating(&self, raw: &str) -> String {
        let raw = raw.trim();
        let lowered = raw.to_lowercase();
        self.ratings
            .iter()
            .find(|rule| lowered.contains(rule.needle.as_str()))
            .map(|rule| rule.canonical.clone())
            .unwrap_or_else(|| raw.to_string())
    }
}
