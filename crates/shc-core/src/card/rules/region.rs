//! Bounded-region scanning over OCR lines.
//!
//! A region opens at the first start marker and closes right before the first
//! end marker found after it, on the same line or a later one.

/// Scanner state while walking lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    Inside,
    Closed,
}

/// Two-state line scanner isolating one section of a card.
#[derive(Debug, Clone, Copy)]
pub struct RegionScanner<'a> {
    start_markers: &'a [&'a str],
    end_markers: &'a [&'a str],
}

impl<'a> RegionScanner<'a> {
    pub fn new(start_markers: &'a [&'a str], end_markers: &'a [&'a str]) -> Self {
        Self {
            start_markers,
            end_markers,
        }
    }

    /// Return the region text, starting with the start marker itself.
    ///
    /// `None` when no start marker occurs. A region with no end marker runs
    /// to the end of the text.
    pub fn scan(&self, text: &str) -> Option<String> {
        let mut state = ScanState::Outside;
        let mut lines: Vec<&str> = Vec::new();

        for line in text.lines() {
            match state {
                ScanState::Outside => {
                    let Some((pos, len)) = find_earliest(line, self.start_markers) else {
                        continue;
                    };
                    let opened = &line[pos..];
                    match find_earliest(&opened[len..], self.end_markers) {
                        Some((end, _)) => {
                            lines.push(&opened[..len + end]);
                            state = ScanState::Closed;
                        }
                        None => {
                            lines.push(opened);
                            state = ScanState::Inside;
                        }
                    }
                }
                ScanState::Inside => match find_earliest(line, self.end_markers) {
                    Some((end, _)) => {
                        lines.push(&line[..end]);
                        state = ScanState::Closed;
                    }
                    None => lines.push(line),
                },
                ScanState::Closed => break,
            }
        }

        match state {
            ScanState::Outside => None,
            ScanState::Inside | ScanState::Closed => Some(lines.join("\n")),
        }
    }
}

/// Earliest occurrence of any needle as `(byte offset, needle length)`.
pub fn find_earliest(haystack: &str, needles: &[&str]) -> Option<(usize, usize)> {
    needles
        .iter()
        .filter_map(|needle| haystack.find(needle).map(|pos| (pos, needle.len())))
        .min_by_key(|&(pos, _)| pos)
}
