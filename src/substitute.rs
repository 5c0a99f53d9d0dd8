//! Placeholder substitution in source text.

use crate::placeholder::PlaceholderAllocator;

/// Rewrites text by replacing every literal occurrence of each mapped
/// original entity text with its placeholder.
///
/// Replacement is textual, not offset-based: span offsets from merging
/// apply to the pre-substitution text and go stale as soon as the first
/// replacement shifts positions. Keys are ordered longest-first (ties by
/// allocation order) so a short entity that is a substring of a longer one
/// ("李" inside "李明") cannot clobber part of the longer entity's
/// already-substituted placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSubstitutor;

impl TextSubstitutor {
    /// Create a new substitutor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Replace all mapped entity texts in `text` with their placeholders.
    #[must_use]
    pub fn substitute(&self, text: &str, mapping: &PlaceholderAllocator) -> String {
        let mut keys: Vec<(usize, &str, &str)> = mapping
            .entries()
            .enumerate()
            .filter(|(_, (original, _))| !original.is_empty())
            .map(|(order, (original, placeholder))| (order, original, placeholder))
            .collect();
        keys.sort_by_key(|(order, original, _)| {
            (std::cmp::Reverse(original.chars().count()), *order)
        });

        let mut out = text.to_string();
        for (_, original, placeholder) in keys {
            if out.contains(original) {
                out = out.replace(original, placeholder);
            }
        }
        out
    }
}
