//! BIO/BIOES tag consolidation.
//!
//! Taggers emit one prediction per sub-word token. [`TagMerger`] folds those
//! into whole entity spans with an explicit state machine, tolerating the
//! malformed sequences real model output produces (orphan `I`/`E` tags,
//! unknown prefixes).

use serde::{Deserialize, Serialize};

use crate::entity::{EntityGroup, EntitySpan, EntityType, TokenPrediction};

/// Position prefix of a BIO/BIOES tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BioPrefix {
    /// `B-` begins a new multi-token entity
    Begin,
    /// `I-` continues the current entity
    Inside,
    /// `E-` ends the current entity (BIOES)
    End,
    /// `S-` is a complete single-token entity (BIOES)
    Single,
    /// `O`, or anything unrecognized
    Outside,
}

/// Split a raw tag into its prefix and base entity type.
///
/// `"B-PERSON"` → `(Begin, Some(Person))`. `"O"`, a bare prefix with no
/// type segment, and unknown prefixes all parse as `(Outside, None)` so
/// malformed tags degrade to non-entity rather than failing.
#[must_use]
pub fn parse_tag(tag: &str) -> (BioPrefix, Option<EntityType>) {
    let Some((prefix, base)) = tag.split_once('-') else {
        return (BioPrefix::Outside, None);
    };
    if base.is_empty() {
        return (BioPrefix::Outside, None);
    }
    let prefix = match prefix {
        "B" => BioPrefix::Begin,
        "I" => BioPrefix::Inside,
        "E" => BioPrefix::End,
        "S" => BioPrefix::Single,
        _ => return (BioPrefix::Outside, None),
    };
    (prefix, Some(EntityType::from_label(base)))
}

/// Merge state: either between entities or accumulating one.
#[derive(Debug, Clone, PartialEq, Eq)]
enum MergeState {
    Outside,
    Inside(EntitySpan),
}

impl MergeState {
    /// Move any in-progress span into the result.
    fn flush_into(&mut self, out: &mut EntityGroup) {
        if let MergeState::Inside(span) = std::mem::replace(self, MergeState::Outside) {
            out.push(span);
        }
    }
}

/// Consolidates per-token tagged predictions into entity spans.
///
/// Stateless across calls; all state lives for the duration of one
/// [`merge`](TagMerger::merge). Never fails: malformed input is recovered
/// per-token rather than rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagMerger;

impl TagMerger {
    /// Create a new merger.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Fold an ordered token sequence into spans grouped by entity type.
    ///
    /// Transition table, per token:
    /// - `B-T`: flush any in-progress span, start a new one.
    /// - `I-T`/`E-T` with a matching in-progress span: extend it. With no
    ///   span or a type mismatch: flush and start a new span from this
    ///   token (recovery for orphan continuation tags; the token is never
    ///   dropped).
    /// - `S-T`: emit a single-token span directly; the in-progress span is
    ///   left untouched.
    /// - `O`/unknown: flush any in-progress span (a non-entity token is
    ///   closing context, not a gap to merge across).
    #[must_use]
    pub fn merge(&self, predictions: &[TokenPrediction]) -> EntityGroup {
        let mut out = EntityGroup::new();
        let mut state = MergeState::Outside;

        for token in predictions {
            match parse_tag(&token.tag) {
                (BioPrefix::Begin, Some(entity_type)) => {
                    state.flush_into(&mut out);
                    state = MergeState::Inside(EntitySpan::new(
                        token.start,
                        token.end,
                        entity_type,
                        token.text.clone(),
                    ));
                }
                (BioPrefix::Inside | BioPrefix::End, Some(entity_type)) => match state {
                    MergeState::Inside(ref mut span) if span.entity_type == entity_type => {
                        span.extend(token);
                    }
                    _ => {
                        state.flush_into(&mut out);
                        state = MergeState::Inside(EntitySpan::new(
                            token.start,
                            token.end,
                            entity_type,
                            token.text.clone(),
                        ));
                    }
                },
                (BioPrefix::Single, Some(entity_type)) => {
                    out.push(EntitySpan::new(
                        token.start,
                        token.end,
                        entity_type,
                        token.text.clone(),
                    ));
                }
                _ => state.flush_into(&mut out),
            }
        }

        state.flush_into(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;

    fn pred(tag: &str, start: usize, end: usize, text: &str) -> TokenPrediction {
        TokenPrediction::new(tag, start, end, text).unwrap()
    }

    #[test]
    fn test_parse_tag() {
        assert_eq!(
            parse_tag("B-PERSON"),
            (BioPrefix::Begin, Some(EntityType::Person))
        );
        assert_eq!(
            parse_tag("E-ORG"),
            (BioPrefix::End, Some(EntityType::Organization))
        );
        assert_eq!(parse_tag("O"), (BioPrefix::Outside, None));
        assert_eq!(parse_tag("X-PERSON"), (BioPrefix::Outside, None));
        assert_eq!(parse_tag("B-"), (BioPrefix::Outside, None));
        assert_eq!(parse_tag(""), (BioPrefix::Outside, None));
    }

    #[test]
    fn test_merge_consecutive_tokens() {
        let merged = TagMerger::new().merge(&[
            pred("B-PERSON", 0, 1, "陈"),
            pred("I-PERSON", 1, 2, "平"),
            pred("I-PERSON", 2, 3, "飞"),
        ]);
        let persons = merged.spans_of(&EntityType::Person);
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].text, "陈平飞");
        assert_eq!(persons[0].start, 0);
        assert_eq!(persons[0].end, 3);
    }

    #[test]
    fn test_merge_two_entities_split_by_outside() {
        let merged = TagMerger::new().merge(&[
            pred("B-PERSON", 0, 1, "陈"),
            pred("I-PERSON", 1, 2, "平"),
            pred("I-PERSON", 2, 3, "飞"),
            pred("O", 3, 4, "和"),
            pred("B-PERSON", 4, 5, "叶"),
            pred("I-PERSON", 5, 6, "宏"),
            pred("I-PERSON", 6, 7, "天"),
        ]);
        let persons = merged.spans_of(&EntityType::Person);
        assert_eq!(persons.len(), 2);
        assert_eq!(persons[0].text, "陈平飞");
        assert_eq!(persons[1].text, "叶宏天");
    }

    #[test]
    fn test_orphan_inside_tag_recovers() {
        // I- with no preceding B- still yields a span, never dropped.
        let merged = TagMerger::new().merge(&[pred("I-PERSON", 0, 1, "飞")]);
        let persons = merged.spans_of(&EntityType::Person);
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].text, "飞");
    }

    #[test]
    fn test_type_mismatch_flushes_and_restarts() {
        let merged = TagMerger::new().merge(&[
            pred("B-PERSON", 0, 1, "陈"),
            pred("I-ORG", 1, 3, "公司"),
        ]);
        assert_eq!(merged.spans_of(&EntityType::Person).len(), 1);
        let orgs = merged.spans_of(&EntityType::Organization);
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].text, "公司");
    }

    #[test]
    fn test_back_to_back_begins() {
        let merged = TagMerger::new().merge(&[
            pred("B-PERSON", 0, 1, "李"),
            pred("B-PERSON", 1, 2, "王"),
        ]);
        let persons = merged.spans_of(&EntityType::Person);
        assert_eq!(persons.len(), 2);
        assert_eq!(persons[0].text, "李");
        assert_eq!(persons[1].text, "王");
    }

    #[test]
    fn test_single_tag_does_not_break_current() {
        let merged = TagMerger::new().merge(&[
            pred("B-PERSON", 0, 1, "陈"),
            pred("S-LOC", 1, 2, "粤"),
            pred("I-PERSON", 2, 3, "飞"),
        ]);
        let persons = merged.spans_of(&EntityType::Person);
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].text, "陈飞");
        assert_eq!(merged.spans_of(&EntityType::Location).len(), 1);
    }

    #[test]
    fn test_bioes_sequence() {
        let merged = TagMerger::new().merge(&[
            pred("B-PERSON", 0, 1, "陈"),
            pred("I-PERSON", 1, 2, "东"),
            pred("I-PERSON", 2, 3, "复"),
            pred("E-PERSON", 3, 4, "明"),
        ]);
        let persons = merged.spans_of(&EntityType::Person);
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].text, "陈东复明");
        assert_eq!(persons[0].end, 4);
    }

    #[test]
    fn test_unknown_prefix_treated_as_outside() {
        let merged = TagMerger::new().merge(&[
            pred("B-PERSON", 0, 1, "李"),
            pred("X-PERSON", 1, 2, "?"),
            pred("I-PERSON", 2, 3, "明"),
        ]);
        // Unknown prefix closes the span; the trailing I- recovers alone.
        let persons = merged.spans_of(&EntityType::Person);
        assert_eq!(persons.len(), 2);
        assert_eq!(persons[0].text, "李");
        assert_eq!(persons[1].text, "明");
    }

    #[test]
    fn test_empty_input() {
        let merged = TagMerger::new().merge(&[]);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_trailing_entity_flushed() {
        let merged = TagMerger::new().merge(&[
            pred("O", 0, 1, "在"),
            pred("B-PERSON", 1, 2, "宋"),
            pred("I-PERSON", 2, 3, "晶"),
        ]);
        assert_eq!(merged.spans_of(&EntityType::Person)[0].text, "宋晶");
    }
}
