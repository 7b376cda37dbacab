//! Fertilizer option and combination parsing.

use tracing::debug;

use crate::models::record::{FertilizerBlock, FertilizerCombination, FertilizerItem, RawOption};

use super::patterns::{
    COMBINATION_HEADING, CROP_VARIETY, FERTILIZER_ROW, FERTILIZER_TERMINAL_MARKERS,
    OPTION_HEADING,
};
use super::region::find_earliest;
use super::text::clean_text;

/// One "Option N" heading and the text up to the next heading.
struct OptionSegment<'a> {
    number: &'a str,
    body: &'a str,
}

fn option_segments(text: &str) -> Vec<OptionSegment<'_>> {
    let headings: Vec<_> = OPTION_HEADING.captures_iter(text).collect();

    headings
        .iter()
        .enumerate()
        .filter_map(|(i, caps)| {
            let heading = caps.get(0)?;
            let number = caps.get(1)?.as_str();
            let end = headings
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(text.len());
            Some(OptionSegment {
                number,
                body: &text[heading.end()..end],
            })
        })
        .collect()
}

/// Cut a block at the first terminal phrase.
fn until_terminal(block: &str) -> &str {
    match find_earliest(block, FERTILIZER_TERMINAL_MARKERS) {
        Some((pos, _)) => &block[..pos],
        None => block,
    }
}

/// Extract fertilizer blocks.
///
/// Each option heading followed by a "Fertilizer Combination" heading yields a
/// structured block. When no option carries a combination, the text after
/// every option heading is returned as a raw block numbered by position.
pub fn extract_fertilizer_blocks(text: &str) -> Vec<FertilizerBlock> {
    let segments = option_segments(text);

    let combinations: Vec<FertilizerBlock> = segments
        .iter()
        .filter_map(parse_combination)
        .map(FertilizerBlock::Combination)
        .collect();

    if !combinations.is_empty() {
        debug!("Parsed {} fertilizer combinations", combinations.len());
        return combinations;
    }

    let raw: Vec<FertilizerBlock> = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            FertilizerBlock::Raw(RawOption {
                option: (i + 1).to_string(),
                text: clean_text(segment.body),
            })
        })
        .collect();

    debug!("No fertilizer combinations, kept {} raw options", raw.len());
    raw
}

fn parse_combination(segment: &OptionSegment<'_>) -> Option<FertilizerCombination> {
    let heading = COMBINATION_HEADING.captures(segment.body)?;
    let heading_end = heading.get(0)?.end();

    let block = until_terminal(segment.body);
    let rows = if heading_end <= block.len() {
        &block[heading_end..]
    } else {
        ""
    };

    Some(FertilizerCombination {
        option: segment.number.to_string(),
        combination: Some(heading[1].to_string()),
        crops: parse_crops(block),
        fertilizers: parse_items(rows),
    })
}

fn parse_crops(block: &str) -> Vec<String> {
    CROP_VARIETY
        .captures_iter(block)
        .flat_map(|caps| {
            caps[1]
                .split(',')
                .map(str::trim)
                .filter(|crop| !crop.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

fn parse_items(rows: &str) -> Vec<FertilizerItem> {
    FERTILIZER_ROW
        .captures_iter(rows)
        .map(|caps| FertilizerItem {
            name: caps["name"].trim().to_string(),
            quantity: caps["qty"].trim().to_string(),
            organic_type: caps.name("org").map(|m| m.as_str().trim().to_string()),
            organic_quantity: caps.name("orgqty").map(|m| m.as_str().trim().to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(name: &str, quantity: &str) -> FertilizerItem {
        FertilizerItem {
            name: name.to_string(),
            quantity: quantity.to_string(),
            organic_type: None,
            organic_quantity: None,
        }
    }

    #[test]
    fn test_structured_options() {
        let text = "Option 1\n\
                    Fertilizer Combination-1\n\
                    Crop Variety: Maize, Wheat\n\
                    Urea 120 kg/ha FYM 5 t/ha\n\
                    DAP 60 kg/ha\n\
                    Option 2\n\
                    Fertilizer Combination – 2\n\
                    Crop Varieties: Maize\n\
                    Urea 90 kg/ha\n\
                    If you have FYM 10 kg/ha\n";
        let blocks = extract_fertilizer_blocks(text);

        assert_eq!(
            blocks,
            vec![
                FertilizerBlock::Combination(FertilizerCombination {
                    option: "1".into(),
                    combination: Some("1".into()),
                    crops: vec!["Maize".into(), "Wheat".into()],
                    fertilizers: vec![
                        FertilizerItem {
                            organic_type: Some("FYM".into()),
                            organic_quantity: Some("5 t/ha".into()),
                            ..item("Urea", "120 kg/ha")
                        },
                        item("DAP", "60 kg/ha"),
                    ],
                }),
                FertilizerBlock::Combination(FertilizerCombination {
                    option: "2".into(),
                    combination: Some("2".into()),
                    crops: vec!["Maize".into()],
                    fertilizers: vec![item("Urea", "90 kg/ha")],
                }),
            ]
        );
    }

    #[test]
    fn test_next_option_is_not_swallowed() {
        let text = "Option 1 Fertilizer Combination-1\nUrea 100 kg/ha\nOption 2 Fertilizer Combination-2\nDAP 50 kg/ha";
        let blocks = extract_fertilizer_blocks(text);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].option(), "2");
        assert_eq!(
            blocks[1].as_combination().unwrap().fertilizers,
            vec![item("DAP", "50 kg/ha")]
        );
    }

    #[test]
    fn test_option_without_combination_is_skipped() {
        let text = "Option 1\nnothing here\nOption 2\nFertilizer Combination-3\nMOP 40 kg/ha";
        let blocks = extract_fertilizer_blocks(text);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].option(), "2");
        assert_eq!(
            blocks[0].as_combination().unwrap().combination.as_deref(),
            Some("3")
        );
    }

    #[test]
    fn test_raw_fallback() {
        let text = "Header\nOption 1\n  Urea   50\n\nOption 2 DAP\n";

        assert_eq!(
            extract_fertilizer_blocks(text),
            vec![
                FertilizerBlock::Raw(RawOption {
                    option: "1".into(),
                    text: "Urea 50".into(),
                }),
                FertilizerBlock::Raw(RawOption {
                    option: "2".into(),
                    text: "DAP".into(),
                }),
            ]
        );
    }

    #[test]
    fn test_no_options() {
        assert!(extract_fertilizer_blocks("Urea 120 kg/ha").is_empty());
    }
}
