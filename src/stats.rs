//! Text statistics for the status bar
//!
//! Single-pass counting of words, characters, and lines for the active
//! document.

// ─────────────────────────────────────────────────────────────────────────────
// TextStats
// ─────────────────────────────────────────────────────────────────────────────

/// Word, character, and line counts for a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStats {
    /// Number of words (sequences of non-whitespace characters)
    pub words: usize,
    /// Number of characters including whitespace
    pub characters: usize,
    /// Number of characters excluding whitespace
    pub characters_no_spaces: usize,
    /// Number of lines (including empty lines)
    pub lines: usize,
}

impl TextStats {
    /// Calculate all statistics in one pass over the text.
    pub fn from_text(text: &str) -> Self {
        let mut stats = Self {
            lines: 1, // A document always has at least one line
            ..Self::default()
        };

        let mut in_word = false;
        for ch in text.chars() {
            stats.characters += 1;
            if ch == '\n' {
                stats.lines += 1;
            }
            if ch.is_whitespace() {
                in_word = false;
            } else {
                stats.characters_no_spaces += 1;
                if !in_word {
                    in_word = true;
                    stats.words += 1;
                }
            }
        }
        stats
    }

    /// Format the statistics for the status bar.
    pub fn status_line(&self) -> String {
        format!(
            "Words: {} | Characters: {} | Lines: {}",
            self.words, self.characters, self.lines
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
