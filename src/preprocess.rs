//! Per-unit text normalization.
//!
//! Formatting concerns that run ahead of tagging. The source documents are
//! line-oriented with space-aligned fields ("陈平飞    公司员工"); the
//! normalizer rewrites the trailing field boundary as a separator and strips
//! the remaining whitespace so the tagger sees one compact string.

use serde::{Deserialize, Serialize};

/// Whitespace policy applied to each text unit before tagging.
///
/// Both steps are optional; with both disabled the unit passes through
/// unchanged. All positions are character-based, so multi-byte scripts are
/// handled correctly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitNormalizer {
    /// Rewrite the last internal space run as this separator, but only when
    /// the field after it is longer than one character. `None` disables the
    /// rewrite.
    pub field_separator: Option<char>,
    /// Strip all remaining whitespace from the unit.
    pub strip_whitespace: bool,
}

impl Default for UnitNormalizer {
    fn default() -> Self {
        Self {
            field_separator: Some(','),
            strip_whitespace: true,
        }
    }
}

impl UnitNormalizer {
    /// Create a normalizer with the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizer that leaves units untouched.
    #[must_use]
    pub fn passthrough() -> Self {
        Self {
            field_separator: None,
            strip_whitespace: false,
        }
    }

    /// Apply the policy to one unit.
    #[must_use]
    pub fn normalize(&self, unit: &str) -> String {
        let mut chars: Vec<char> = unit.chars().collect();

        if let Some(separator) = self.field_separator {
            // The last space marks the field boundary; rewrite it only when
            // the trailing field is a real field, not a stray character.
            if let Some(pos) = chars.iter().rposition(|&c| c == ' ') {
                if chars.len() - pos - 1 > 1 {
                    chars[pos] = separator;
                }
            }
        }

        if self.strip_whitespace {
            chars.retain(|c| !c.is_whitespace());
        }

        chars.into_iter().collect()
    }
}
