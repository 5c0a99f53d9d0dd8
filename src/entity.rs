//! Entity types and structures for tag merging and pseudonymization.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Entity type classification.
///
/// Standard NER types following CoNLL/OntoNotes conventions. Taggers emit
/// these as the base segment of a BIO/BIOES tag (e.g. `B-PERSON`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// Person name (PER/PERSON)
    Person,
    /// Organization name (ORG)
    Organization,
    /// Location/Place (LOC)
    Location,
    /// Date or time expression (DATE)
    Date,
    /// Other/Miscellaneous entity type
    Other(String),
}

impl EntityType {
    /// Convert to standard label string.
    #[must_use]
    pub fn as_label(&self) -> &str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::Organization => "ORG",
            EntityType::Location => "LOC",
            EntityType::Date => "DATE",
            EntityType::Other(s) => s.as_str(),
        }
    }

    /// Parse from standard label string.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.to_uppercase().as_str() {
            "PER" | "PERSON" => EntityType::Person,
            "ORG" | "ORGANIZATION" => EntityType::Organization,
            "LOC" | "LOCATION" | "GPE" => EntityType::Location,
            "DATE" | "TIME" => EntityType::Date,
            other => EntityType::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// A single token-level prediction from the external tagger.
///
/// `tag` follows the BIO/BIOES convention: a prefix (`B`, `I`, `E`, `S`)
/// joined with a hyphen to the entity type, or `O` for non-entity tokens.
/// `start`/`end` are half-open character offsets into the tagged text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPrediction {
    /// BIO/BIOES tag (e.g. `B-PERSON`, `I-PERSON`, `O`)
    pub tag: String,
    /// Start position (char offset in the tagged text)
    pub start: usize,
    /// End position (char offset, exclusive)
    pub end: usize,
    /// Surface form of this token
    pub text: String,
}

impl TokenPrediction {
    /// Create a new token prediction, validating offset sanity.
    pub fn new(
        tag: impl Into<String>,
        start: usize,
        end: usize,
        text: impl Into<String>,
    ) -> Result<Self> {
        if start > end {
            return Err(Error::invalid_input(format!(
                "token offsets reversed: start {start} > end {end}"
            )));
        }
        Ok(Self {
            tag: tag.into(),
            start,
            end,
            text: text.into(),
        })
    }
}

/// One consolidated entity mention, produced by merging adjacent token
/// predictions of the same type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Start position (char offset in the tagged text)
    pub start: usize,
    /// End position (char offset, exclusive)
    pub end: usize,
    /// Entity type classification
    pub entity_type: EntityType,
    /// Verbatim concatenation of constituent token texts, in order
    pub text: String,
}

impl EntitySpan {
    /// Create a new entity span.
    #[must_use]
    pub fn new(
        start: usize,
        end: usize,
        entity_type: EntityType,
        text: impl Into<String>,
    ) -> Self {
        Self {
            start,
            end,
            entity_type,
            text: text.into(),
        }
    }

    /// Extend this span with a continuation token.
    pub(crate) fn extend(&mut self, token: &TokenPrediction) {
        self.end = token.end;
        self.text.push_str(&token.text);
    }
}

/// Entity spans for one text unit, grouped by type.
///
/// Group order and the order of spans within a group both reflect order of
/// first discovery in the unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityGroup {
    groups: Vec<(EntityType, Vec<EntitySpan>)>,
}

impl EntityGroup {
    /// Create an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a span to its type's list, creating the list on first sight.
    pub fn push(&mut self, span: EntitySpan) {
        if let Some((_, spans)) = self
            .groups
            .iter_mut()
            .find(|(t, _)| *t == span.entity_type)
        {
            spans.push(span);
        } else {
            self.groups.push((span.entity_type.clone(), vec![span]));
        }
    }

    /// Spans of one type, in discovery order.
    #[must_use]
    pub fn spans_of(&self, entity_type: &EntityType) -> &[EntitySpan] {
        self.groups
            .iter()
            .find(|(t, _)| t == entity_type)
            .map(|(_, spans)| spans.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate groups in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityType, &[EntitySpan])> {
        self.groups.iter().map(|(t, s)| (t, s.as_slice()))
    }

    /// Iterate all spans across groups, in discovery order within each group.
    pub fn all_spans(&self) -> impl Iterator<Item = &EntitySpan> {
        self.groups.iter().flat_map(|(_, s)| s.iter())
    }

    /// Total number of spans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, s)| s.len()).sum()
    }

    /// Check if no spans were discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
