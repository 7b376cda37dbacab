//! Record rendering for the json, csv and text output formats.

use std::fmt::Write as _;

use shc_core::{FertilizerBlock, ShcRecord};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV nutrient table
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension used when writing one output per input.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn format_record(record: &ShcRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &ShcRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["code", "value", "unit", "rating", "normal_level"])?;

    for (code, reading) in &record.nutrients {
        let value = reading.value.to_string();
        wtr.write_record([
            code.as_str(),
            value.as_str(),
            reading.unit.as_str(),
            reading.rating.as_str(),
            reading.normal_level.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &ShcRecord) -> String {
    let mut output = String::new();
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

    let meta = &record.card_metadata;
    let _ = writeln!(output, "Soil Health Card: {}", or_dash(&meta.shc_number));
    if meta.validity_from.is_some() || meta.validity_to.is_some() {
        let _ = writeln!(
            output,
            "Valid: {} to {}",
            or_dash(&meta.validity_from),
            or_dash(&meta.validity_to)
        );
    }
    output.push('\n');

    let farmer = &record.farmer_details;
    let _ = writeln!(output, "Farmer: {}", or_dash(&farmer.name));
    let farmer_lines = [
        ("Father/Husband", &farmer.father_husband_name),
        ("Address", &farmer.address),
        ("Mobile", &farmer.mobile),
        ("Gender", &farmer.gender),
        ("Category", &farmer.category),
    ];
    for (label, value) in farmer_lines {
        if let Some(value) = value {
            let _ = writeln!(output, "  {}: {}", label, value);
        }
    }
    output.push('\n');

    let sample = &record.sample_details;
    let sample_lines = [
        ("Collected", &sample.collection_date),
        ("Survey No.", &sample.survey_number),
        ("Farm size", &sample.farm_size),
        ("GPS", &sample.geo_position),
        ("District", &sample.district),
        ("State", &sample.state),
    ];
    if sample_lines.iter().any(|(_, v)| v.is_some()) {
        output.push_str("Sample:\n");
        for (label, value) in sample_lines {
            if let Some(value) = value {
                let _ = writeln!(output, "  {}: {}", label, value);
            }
        }
        output.push('\n');
    }

    if let Some(soil_type) = &record.soil_info.soil_type {
        let _ = writeln!(output, "Soil type: {}", soil_type);
    }
    if let Some(condition) = &record.soil_info.soil_condition {
        let _ = writeln!(output, "Soil condition: {}", condition);
    }

    output.push_str("Nutrients:\n");
    if record.nutrients.is_empty() {
        output.push_str("  (none found)\n");
    }
    for (code, reading) in &record.nutrients {
        let _ = writeln!(
            output,
            "  {:<4} {:>8} {:<6} {:<20} normal {}",
            code, reading.value, reading.unit, reading.rating, reading.normal_level
        );
    }

    if !record.recommendations.is_empty() {
        output.push_str("\nRecommendations:\n");
        for rec in &record.recommendations {
            let _ = writeln!(output, "  [{}] {}", rec.kind, rec.text);
        }
    }

    if !record.fertilizer_recommendations.is_empty() {
        output.push_str("\nFertilizer options:\n");
        for block in &record.fertilizer_recommendations {
            match block {
                FertilizerBlock::Combination(c) => {
                    let _ = write!(output, "  Option {}", c.option);
                    if let Some(combination) = &c.combination {
                        let _ = write!(output, " (combination {})", combination);
                    }
                    if !c.crops.is_empty() {
                        let _ = write!(output, ": {}", c.crops.join(", "));
                    }
                    output.push('\n');
                    for item in &c.fertilizers {
                        let _ = write!(output, "    - {} {}", item.name, item.quantity);
                        if let (Some(kind), Some(qty)) = (&item.organic_type, &item.organic_quantity) {
                            let _ = write!(output, " + {} {}", kind, qty);
                        }
                        output.push('\n');
                    }
                }
                FertilizerBlock::Raw(raw) => {
                    let _ = writeln!(output, "  Option {}: {}", raw.option, raw.text);
                }
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use shc_core::NutrientReading;

    fn record() -> ShcRecord {
        let mut record = ShcRecord::default();
        record.farmer_details.name = Some("Ram Lal".to_string());
        record.nutrients.insert(
            "N".to_string(),
            NutrientReading {
                value: 210.0,
                unit: "kg/ha".to_string(),
                rating: "Low".to_string(),
                normal_level: "280-560 kg/ha".to_string(),
            },
        );
        record
    }

    #[test]
    fn test_csv_table() {
        let csv = format_record(&record(), OutputFormat::Csv).unwrap();
        assert_eq!(
            csv,
            "code,value,unit,rating,normal_level\nN,210,kg/ha,Low,280-560 kg/ha\n"
        );
    }

    #[test]
    fn test_text_summary() {
        let text = format_record(&record(), OutputFormat::Text).unwrap();
        assert!(text.contains("Farmer: Ram Lal"));
        assert!(text.contains("Soil Health Card: -"));
        assert!(text.contains("normal 280-560 kg/ha"));
        assert!(!text.contains("Recommendations"));
    }

    #[test]
    fn test_json_is_record() {
        let json = format_record(&record(), OutputFormat::Json).unwrap();
        let parsed: ShcRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record());
    }
}
