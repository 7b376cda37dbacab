//! Text normalization helpers.

use super::patterns::WHITESPACE_RUN;

/// Collapse every whitespace run (newlines included) to one space and trim.
pub fn clean_text(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Normalize line endings so line-anchored patterns see `\n` only.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  DAP\t 50 kg/ha\n\n\nUrea   90 kg/ha \n"), "DAP 50 kg/ha Urea 90 kg/ha");
        assert_eq!(clean_text(" \n\t "), "");
    }

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
    }
}
