//! Advisory section parsing.

use tracing::debug;

use crate::models::record::Recommendation;

use super::patterns::{ACTION_LINE, ADVICE_END_MARKERS, ADVICE_HEADER, ADVICE_START_MARKERS};
use super::region::RegionScanner;

/// Extract classified recommendations.
///
/// Lines of the advisory section are classified one by one. If the card has
/// no usable section, every line opening with an action verb is collected
/// from the whole text instead.
pub fn extract_recommendations(text: &str) -> Vec<Recommendation> {
    let section = RegionScanner::new(ADVICE_START_MARKERS, ADVICE_END_MARKERS).scan(text);

    let recommendations: Vec<Recommendation> = section
        .as_deref()
        .map(|section| {
            section
                .lines()
                .skip(1) // heading
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.contains(ADVICE_HEADER))
                .map(classify_line)
                .collect()
        })
        .unwrap_or_default();

    if !recommendations.is_empty() {
        debug!("Classified {} advisory lines", recommendations.len());
        return recommendations;
    }

    let actions: Vec<Recommendation> = text
        .lines()
        .map(str::trim)
        .filter(|line| ACTION_LINE.is_match(line))
        .map(Recommendation::action)
        .collect();

    debug!("Advisory section empty, found {} action lines", actions.len());
    actions
}

/// Classify one trimmed advisory line.
pub fn classify_line(line: &str) -> Recommendation {
    if ACTION_LINE.is_match(line) {
        return Recommendation::action(line);
    }

    match line.split_once(':') {
        Some((kind, text)) => Recommendation::new(kind.trim(), text.trim()),
        None => Recommendation::new("General", line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_line() {
        assert_eq!(
            classify_line("Apply lime @ 2 q/ha"),
            Recommendation::action("Apply lime @ 2 q/ha")
        );
        assert_eq!(
            classify_line("Secondary Nutrients: Apply gypsum"),
            Recommendation::new("Secondary Nutrients", "Apply gypsum")
        );
        assert_eq!(
            classify_line("Time: 10:30 am"),
            Recommendation::new("Time", "10:30 am")
        );
        assert_eq!(
            classify_line("Keep records of yields"),
            Recommendation::new("General", "Keep records of yields")
        );
    }

    #[test]
    fn test_action_verb_prefix() {
        assert_eq!(
            classify_line("Applying gypsum helps"),
            Recommendation::action("Applying gypsum helps")
        );
        assert_eq!(
            classify_line("Treated seed gives better stands"),
            Recommendation::action("Treated seed gives better stands")
        );
        assert_eq!(
            classify_line("Do not apply lime: soil is neutral"),
            Recommendation::new("Do not apply lime", "soil is neutral")
        );
    }

    #[test]
    fn test_section_lines() {
        let text = "Soil Test Results\n\
                    Excess use of Fertilizer is injurious to soil health and plant growth\n\
                    \n\
                    Apply lime @ 2 q/ha before sowing\n\
                    Micronutrients: Zinc sulphate 25 kg/ha\n\
                    Grow legumes in rotation\n\
                    Please use option 1 or 2\n\
                    Use the quantity as advised\n";

        assert_eq!(
            extract_recommendations(text),
            vec![
                Recommendation::action("Apply lime @ 2 q/ha before sowing"),
                Recommendation::new("Micronutrients", "Zinc sulphate 25 kg/ha"),
                Recommendation::new("General", "Grow legumes in rotation"),
            ]
        );
    }

    #[test]
    fn test_fallback_collects_action_lines() {
        let text = "Treat seed with Trichoderma\nsome note\n  Use FYM 5 t/ha\nApply lime\nUse FYM 5 t/ha";

        assert_eq!(
            extract_recommendations(text),
            vec![
                Recommendation::action("Treat seed with Trichoderma"),
                Recommendation::action("Use FYM 5 t/ha"),
                Recommendation::action("Apply lime"),
                Recommendation::action("Use FYM 5 t/ha"),
            ]
        );
    }

    #[test]
    fn test_empty_section_uses_fallback() {
        let text = "Excess use of Fertilizer is injurious to soil health\nPlease use option 1\nAdopt drip irrigation";

        assert_eq!(
            extract_recommendations(text),
            vec![Recommendation::action("Adopt drip irrigation")]
        );
    }

    #[test]
    fn test_nothing_found() {
        assert!(extract_recommendations("plain text").is_empty());
    }
}
