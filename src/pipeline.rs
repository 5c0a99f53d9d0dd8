//! Per-document pseudonymization pipeline.
//!
//! Drives the full flow for each text unit: normalize → tag → merge →
//! allocate → substitute → accumulate. Units are processed strictly in
//! document order; the allocator is the only cross-unit state, so every
//! unit observes all prior allocations and discovery order stays equal to
//! document order.

use serde::{Deserialize, Serialize};

use crate::entity::EntityGroup;
use crate::merge::TagMerger;
use crate::placeholder::{PlaceholderAllocator, PlaceholderPolicy};
use crate::preprocess::UnitNormalizer;
use crate::substitute::TextSubstitutor;
use crate::{Result, Tagger};

/// What to do when the external tagger fails on a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaggerErrorPolicy {
    /// Surface the error and stop the run.
    #[default]
    Abort,
    /// Log, leave the unit unsubstituted, and continue.
    SkipUnit,
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Separator appended after each processed unit in the output text.
    pub unit_separator: String,
    /// Tagger failure handling.
    pub on_tagger_error: TaggerErrorPolicy,
    /// Per-unit normalization policy.
    pub normalizer: UnitNormalizer,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            unit_separator: "\n".to_string(),
            on_tagger_error: TaggerErrorPolicy::Abort,
            normalizer: UnitNormalizer::default(),
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Fully substituted text, units rejoined by the unit separator.
    pub text: String,
    /// Discovered entity groups, one per processed unit, in document order.
    pub groups: Vec<EntityGroup>,
    /// Final (original → placeholder) mapping, in allocation order.
    pub mapping: Vec<(String, String)>,
    /// Indices (in document order of non-empty units) of units left
    /// unsubstituted because the tagger failed and policy was `SkipUnit`.
    pub skipped_units: Vec<usize>,
}

/// Orchestrates normalization, tagging, merging, allocation and
/// substitution over a whole document.
///
/// The tagger is an external collaborator consumed through the [`Tagger`]
/// trait. Sequential by design: unit *N*'s substitution must observe every
/// allocation made by units *0..N*.
pub struct Pipeline<T: Tagger> {
    tagger: T,
    merger: TagMerger,
    substitutor: TextSubstitutor,
    allocator: PlaceholderAllocator,
    config: PipelineConfig,
}

impl<T: Tagger> Pipeline<T> {
    /// Create a pipeline with default config and placeholder policy.
    #[must_use]
    pub fn new(tagger: T) -> Self {
        Self::with_config(tagger, PipelineConfig::default())
    }

    /// Create a pipeline with an explicit config.
    #[must_use]
    pub fn with_config(tagger: T, config: PipelineConfig) -> Self {
        Self {
            tagger,
            merger: TagMerger::new(),
            substitutor: TextSubstitutor::new(),
            allocator: PlaceholderAllocator::default(),
            config,
        }
    }

    /// Replace the placeholder policy (resets the allocator).
    #[must_use]
    pub fn with_policy(mut self, policy: PlaceholderPolicy) -> Self {
        self.allocator = PlaceholderAllocator::new(policy);
        self
    }

    /// Seed the allocator, e.g. with a mapping deserialized from a prior
    /// run, for cross-run placeholder continuity.
    #[must_use]
    pub fn with_allocator(mut self, allocator: PlaceholderAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// Process a whole document: one unit per input line, empty units
    /// skipped after normalization.
    pub fn run(&mut self, input: &str) -> Result<PipelineReport> {
        let mut text = String::new();
        let mut groups = Vec::new();
        let mut skipped_units = Vec::new();
        let mut unit_index = 0;

        for line in input.lines() {
            let unit = self.config.normalizer.normalize(line);
            if unit.is_empty() {
                continue;
            }

            match self.process_unit(&unit) {
                Ok((substituted, group)) => {
                    text.push_str(&substituted);
                    groups.push(group);
                }
                Err(err) => match self.config.on_tagger_error {
                    TaggerErrorPolicy::Abort => return Err(err),
                    TaggerErrorPolicy::SkipUnit => {
                        log::warn!("tagger failed on unit {unit_index}, leaving it as-is: {err}");
                        text.push_str(&unit);
                        groups.push(EntityGroup::new());
                        skipped_units.push(unit_index);
                    }
                },
            }
            text.push_str(&self.config.unit_separator);
            unit_index += 1;
        }

        Ok(PipelineReport {
            text,
            groups,
            mapping: self.allocator.mapping(),
            skipped_units,
        })
    }

    /// Process one normalized unit: tag, merge, allocate, substitute.
    fn process_unit(&mut self, unit: &str) -> Result<(String, EntityGroup)> {
        let predictions = self.tagger.tag(unit)?;
        let group = self.merger.merge(&predictions);
        log::debug!(
            "unit '{unit}': {} predictions merged into {} spans",
            predictions.len(),
            group.len()
        );

        for span in group.all_spans() {
            self.allocator
                .allocate_or_get(&span.text, &span.entity_type)?;
        }

        let substituted = self.substitutor.substitute(unit, &self.allocator);
        Ok((substituted, group))
    }

    /// The allocator's current state.
    #[must_use]
    pub fn allocator(&self) -> &PlaceholderAllocator {
        &self.allocator
    }

    /// Consume the pipeline, returning the allocator for persistence.
    #[must_use]
    pub fn into_allocator(self) -> PlaceholderAllocator {
        self.allocator
    }
}
