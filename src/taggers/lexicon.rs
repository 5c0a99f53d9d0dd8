//! Lexicon-backed reference tagger.

use regex::Regex;

use crate::entity::TokenPrediction;
use crate::{Error, Result, Tagger};

/// Tags occurrences of a fixed list of surface forms.
///
/// Matches are non-overlapping and longest-first at each position. Output
/// mimics a character-level BIOES model (the convention of Chinese BERT
/// NER models): one prediction per character, `S-` for single-character
/// matches, `B-`/`I-`.../`E-` otherwise, with character offsets.
///
/// This is a reference backend for tests and the CLI, not a recognizer:
/// it only finds what it was told about.
pub struct LexiconTagger {
    pattern: Option<Regex>,
    label: String,
}

impl LexiconTagger {
    /// Build a tagger over the given surface forms, labeled `PERSON`.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_label(names, "PERSON")
    }

    /// Build a tagger emitting the given entity type label.
    pub fn with_label<I, S>(names: I, label: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|n| !n.is_empty())
            .collect();
        names.sort();
        names.dedup();
        // Longest alternative first, so the regex engine prefers the longer
        // surface form when one is a prefix of another.
        names.sort_by_key(|n| std::cmp::Reverse(n.chars().count()));

        let pattern = if names.is_empty() {
            None
        } else {
            let alternation = names
                .iter()
                .map(|n| regex::escape(n))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&alternation).map_err(|e| Error::parse(e.to_string()))?)
        };

        Ok(Self {
            pattern,
            label: label.into(),
        })
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, text: &str) -> Result<Vec<TokenPrediction>> {
        let Some(pattern) = &self.pattern else {
            return Ok(Vec::new());
        };

        // Byte offset of each char, for byte → char offset conversion.
        let byte_to_char: std::collections::HashMap<usize, usize> = text
            .char_indices()
            .enumerate()
            .map(|(char_idx, (byte_idx, _))| (byte_idx, char_idx))
            .collect();

        let mut predictions = Vec::new();
        for m in pattern.find_iter(text) {
            let Some(&char_start) = byte_to_char.get(&m.start()) else {
                continue;
            };
            let chars: Vec<char> = m.as_str().chars().collect();
            let n = chars.len();
            for (i, c) in chars.iter().enumerate() {
                let prefix = if n == 1 {
                    "S"
                } else if i == 0 {
                    "B"
                } else if i == n - 1 {
                    "E"
                } else {
                    "I"
                };
                predictions.push(TokenPrediction::new(
                    format!("{}-{}", prefix, self.label),
                    char_start + i,
                    char_start + i + 1,
                    c.to_string(),
                )?);
            }
        }
        Ok(predictions)
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn description(&self) -> &'static str {
        "Lexicon tagger emitting char-level BIOES predictions"
    }
}
