//! Common regex patterns for Soil Health Card extraction.
//!
//! Labels are case-sensitive. A labeled field captures the rest of its line
//! after an optional `:` or `-` separator.

use lazy_static::lazy_static;
use regex::Regex;

/// Separator between a label and its value, kept on the same line. Covers
/// `:`, `-` and the combined `:-`. The value itself may not start with a
/// separator, so a bare "Label:" line never matches.
const SEP: &str = r"[ \t]*[:\-]*[ \t]*";

/// Build a labeled-field pattern capturing the remainder of the line.
fn labeled(label: &str) -> Regex {
    Regex::new(&format!(r"{label}{SEP}([^:\-\s][^\n]*)")).unwrap()
}

/// Same as [`labeled`], but the value stops at a comma.
fn labeled_until_comma(label: &str) -> Regex {
    Regex::new(&format!(r"{label}{SEP}([^:\-\s,][^\n,]*)")).unwrap()
}

// Region markers
pub const TABLE_START_MARKERS: &[&str] = &["Soil Test Results"];
pub const TABLE_END_MARKERS: &[&str] = &["Option", "Please use", "Excess use"];
pub const ADVICE_START_MARKERS: &[&str] = &["Excess use of Fertilizer is injurious"];
pub const ADVICE_END_MARKERS: &[&str] = &["Please use option"];
pub const ADVICE_HEADER: &str = "injurious to soil health";
pub const FERTILIZER_TERMINAL_MARKERS: &[&str] = &["If you have", "Use the quantity"];

/// Imperative verbs that open an actionable recommendation.
pub const ACTION_VERBS: &[&str] = &["Reclaim", "Treat", "Use", "Adopt", "Apply"];

/// Words in a soil type that describe the soil's condition.
pub const SOIL_CONDITION_WORDS: &[&str] =
    &["acidic", "alkaline", "saline", "sodic", "calcareous", "neutral"];

lazy_static! {
    // Card metadata
    pub static ref SHC_NUMBER: Regex = Regex::new(
        r"(?:Soil Health Card Number|\bHP)[\s\-:/]*([A-Za-z0-9/\-]+)"
    ).unwrap();

    pub static ref VALIDITY: Regex = Regex::new(
        r"Validity\s*[:\-]\s*From:\s*([^\n]+?)\s*To:\s*([^\n]+)"
    ).unwrap();

    // Farmer details
    pub static ref FARMER_NAME: Regex = labeled(r"\bFarmer(?:['’]s)? Name");
    pub static ref FATHER_HUSBAND_NAME: Regex =
        labeled(r"Father(?:['’]s)?/Husband(?:['’]s)? Name");
    pub static ref ADDRESS: Regex = labeled(r"\bAddress\b");
    pub static ref MOBILE: Regex = labeled(r"\bMobile No\.?");
    pub static ref GENDER: Regex = labeled(r"\bGender\b");
    pub static ref CATEGORY: Regex = labeled(r"\bCategory\b");

    // Sample details
    pub static ref COLLECTION_DATE: Regex = labeled(r"Date of Sample Collection");
    pub static ref SURVEY_NUMBER: Regex = labeled(
        r"Survey No[.,]?\s*/?\s*Khasra No[.,]?\s*/?\s*Dag No\.?"
    );
    pub static ref FARM_SIZE: Regex = labeled(r"\bFarm Size\b");
    pub static ref GEO_POSITION: Regex = labeled(r"Geo Position(?:\s*\(?GPS\)?)?");
    pub static ref DISTRICT: Regex = labeled_until_comma(r"\bDistrict\b");
    pub static ref STATE: Regex =
        labeled_until_comma(r"(?:\bState\b|Department of Agriculture,)");

    // Soil info
    pub static ref SOIL_TYPE: Regex = labeled(r"\bSoil Type\b");
    pub static ref SOIL_CONDITION: Regex = labeled(r"\bSoil Condition\b");

    // Nutrient table row: Sr.No, Parameter, Test Value, Unit, Rating, Normal Level.
    // Fields may be separated by line breaks; parameter and rating stay on one line.
    pub static ref NUTRIENT_ROW: Regex = Regex::new(concat!(
        r"\b(?P<sn>\d{1,2})\s+",
        r"(?P<param>[A-Za-z(][A-Za-z() \t]*?)\s+",
        r"(?P<value>[\d.]+)\s*",
        r"(?P<unit>[A-Za-z]*/[A-Za-z]+|%|ppm)?\s+",
        r"(?P<rating>[A-Za-z][A-Za-z \t]*?)\s+",
        r"(?P<normal>(?:[<>][ \t]*[\d.]+|[\d.]+[ \t]*[-–][ \t]*[\d.]+)",
        r"(?:[ \t]*(?:[A-Za-z]*/[A-Za-z]+|%|ppm))?)",
    )).unwrap();

    // Single-nutrient fallbacks
    pub static ref PH_FALLBACK: Regex = Regex::new(
        r"\bpH\s+([\d.]+)\s+([A-Za-z]+(?:[ \t]+[A-Za-z]+)*)"
    ).unwrap();

    pub static ref EC_FALLBACK: Regex = Regex::new(
        r"\bEC\s+([\d.]+)\s*dS/m\s+([A-Za-z]+(?:[ \t]+[A-Za-z]+)*)"
    ).unwrap();

    // Recommendations: a line opening with an action verb, inflections included
    pub static ref ACTION_LINE: Regex =
        Regex::new(&format!(r"^(?:{})", ACTION_VERBS.join("|"))).unwrap();

    // Fertilizer options
    pub static ref OPTION_HEADING: Regex = Regex::new(r"\bOption\s+(\d+)").unwrap();

    pub static ref COMBINATION_HEADING: Regex = Regex::new(
        r"Fertilizer Combination\s*[-–]?\s*(\d+)"
    ).unwrap();

    pub static ref CROP_VARIETY: Regex = Regex::new(
        r"Crop Variet(?:y|ies)\b[ \t]*[:\-]?[ \t]*([^\n\r]+)"
    ).unwrap();

    // "<name> <qty> kg/ha [<organic source> <organic qty>]" on one line
    pub static ref FERTILIZER_ROW: Regex = Regex::new(concat!(
        r"(?m)^[ \t]*(?:[•*\-][ \t]*)?",
        r"(?P<name>[A-Za-z][^\n\r•,]*?)[ \t]+",
        r"(?P<qty>\d+(?:\.\d+)?[ \t]*kg/ha)",
        r"(?:[ \t]+(?P<org>[A-Za-z][^\n\r•,]*?)[ \t]+",
        r"(?P<orgqty>\d+(?:\.\d+)?[ \t]*[A-Za-z][A-Za-z/]*))?",
        r"[ \t]*$",
    )).unwrap();

    // Text cleanup
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}
