//! `word_list` — loading and preprocessing of the candidate word list.
//!
//! The solver never reads files itself; it receives a set of candidate words.
//! This module is the boundary that produces that set:
//!
//! - Each line of the input is one word.
//! - Lines are trimmed; empty lines are skipped.
//! - Words are normalized to lowercase.
//! - The final list is deduplicated and sorted by length first, then
//!   alphabetically, so every downstream iteration order is reproducible.
//!
//! The public API provides:
//! - `parse_from_str(...)` — works on any in-memory string.
//! - `load_from_path(...)` — convenience method to read from a file path.

use std::path::Path;

/// A processed, ready-to-use word list.
///
/// The `words` vector contains all distinct lowercase words, sorted by
/// (length, alphabetical).
#[derive(Debug, Clone)]
pub struct WordList {
    /// Example: `["cat", "dog", "acorn", ...]` (all length-3 words first).
    pub words: Vec<String>,
}

impl WordList {
    /// Parse a raw word list from an in-memory string.
    ///
    /// # Arguments
    /// * `contents` — the raw file contents; one word per line.
    ///
    /// # Returns
    /// * `WordList` — all distinct words, lowercased and sorted.
    pub fn parse_from_str(contents: &str) -> WordList {
        let mut words: Vec<String> = contents
            .lines()
            .filter_map(|raw_line| {
                let line = raw_line.trim();
                if line.is_empty() {
                    None
                } else {
                    Some(line.to_lowercase())
                }
            })
            .collect();

        // Sort by length first, then alphabetically, then drop duplicates.
        // Sorting before dedup means equal words are adjacent.
        words.sort_unstable_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        words.dedup();

        log::debug!("word list parsed: {} distinct words", words.len());

        WordList { words }
    }

    /// Read and parse a word list from a file path.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be read.
    pub fn load_from_path(path: impl AsRef<Path>) -> std::io::Result<WordList> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::parse_from_str(&contents))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Character `k` of `word`, counting characters rather than bytes.
///
/// Callers index within node-consistent domains, so `k` is in bounds for any
/// word whose length matched its slot; `None` only shows up for words that
/// never passed node consistency.
pub(crate) fn char_at(word: &str, k: usize) -> Option<char> {
    word.chars().nth(k)
}
