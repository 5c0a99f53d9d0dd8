//! # redactor
//!
//! Deterministic pseudonymization driven by token-level NER output.
//!
//! - **Tag merging**: consolidates BIO/BIOES sub-word predictions into
//!   whole entity spans, recovering from the malformed sequences real
//!   taggers produce
//! - **Placeholder allocation**: one stable, human-readable placeholder
//!   per distinct entity text (`A某`, `B某`, ... `AA某`, ...) for an
//!   entire document
//! - **Substitution**: literal, longest-first replacement of every mapped
//!   occurrence
//!
//! The tagging model itself is an external collaborator: anything that
//! turns a string into an ordered sequence of [`TokenPrediction`]s can
//! drive the pipeline through the [`Tagger`] trait.
//!
//! ## Quick Start
//!
//! ```rust
//! use redactor::{LexiconTagger, Pipeline};
//!
//! let tagger = LexiconTagger::new(["陈平飞", "叶宏天"]).unwrap();
//! let mut pipeline = Pipeline::new(tagger);
//!
//! let report = pipeline
//!     .run("陈平飞    公司员工\n叶宏天   广东明日律师事务所律师\n")
//!     .unwrap();
//!
//! assert_eq!(report.text, "A某,公司员工\nB某,广东明日律师事务所律师\n");
//! ```
//!
//! ## Determinism
//!
//! Units are processed strictly in document order and the allocator is the
//! only cross-unit state, so the same document always yields the same
//! mapping. A host wanting continuity across runs serializes the
//! [`PlaceholderAllocator`] and seeds the next run with it.

#![warn(missing_docs)]

pub mod entity;
mod error;
pub mod merge;
pub mod pipeline;
pub mod placeholder;
pub mod preprocess;
pub mod sink;
pub mod substitute;
pub mod taggers;

use std::collections::HashMap;

/// An external sequence tagger.
///
/// Implementations must return predictions in left-to-right text order
/// with half-open, monotonically non-decreasing character offsets into the
/// given string. This trait is deliberately open: the real producer is an
/// external model runtime owned by the host.
pub trait Tagger: Send + Sync {
    /// Tag `text`, returning one prediction per token.
    fn tag(&self, text: &str) -> Result<Vec<TokenPrediction>>;

    /// Get the tagger name/identifier.
    fn name(&self) -> &'static str {
        "unknown"
    }

    /// Get a description of the tagger.
    fn description(&self) -> &'static str {
        "Unknown sequence tagger"
    }
}

/// A mock tagger for testing.
///
/// Returns canned predictions keyed by the exact input text, and can be
/// told to fail on specific inputs to exercise error policies.
///
/// # Example
///
/// ```rust
/// use redactor::{MockTagger, Tagger, TokenPrediction};
///
/// let mock = MockTagger::new("test-mock").with_predictions(
///     "陈平飞",
///     vec![
///         TokenPrediction::new("B-PERSON", 0, 1, "陈").unwrap(),
///         TokenPrediction::new("I-PERSON", 1, 2, "平").unwrap(),
///         TokenPrediction::new("I-PERSON", 2, 3, "飞").unwrap(),
///     ],
/// );
///
/// assert_eq!(mock.tag("陈平飞").unwrap().len(), 3);
/// assert!(mock.tag("unseen text").unwrap().is_empty());
/// ```
#[derive(Clone, Default)]
pub struct MockTagger {
    name: &'static str,
    predictions: HashMap<String, Vec<TokenPrediction>>,
    failures: Vec<String>,
}

impl MockTagger {
    /// Create a new mock tagger.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            predictions: HashMap::new(),
            failures: Vec::new(),
        }
    }

    /// Set predictions to return for an exact input text.
    #[must_use]
    pub fn with_predictions(
        mut self,
        text: impl Into<String>,
        predictions: Vec<TokenPrediction>,
    ) -> Self {
        self.predictions.insert(text.into(), predictions);
        self
    }

    /// Fail with a tagger error on an exact input text.
    #[must_use]
    pub fn with_failure(mut self, text: impl Into<String>) -> Self {
        self.failures.push(text.into());
        self
    }
}

impl Tagger for MockTagger {
    fn tag(&self, text: &str) -> Result<Vec<TokenPrediction>> {
        if self.failures.iter().any(|t| t == text) {
            return Err(Error::tagger(format!(
                "mock tagger '{}' configured to fail on this input",
                self.name
            )));
        }
        Ok(self.predictions.get(text).cloned().unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "Mock tagger for testing"
    }
}

// Re-exports
pub use entity::{EntityGroup, EntitySpan, EntityType, TokenPrediction};
pub use error::{Error, Result};
pub use merge::{parse_tag, BioPrefix, TagMerger};
pub use pipeline::{Pipeline, PipelineConfig, PipelineReport, TaggerErrorPolicy};
pub use placeholder::{letter_code, PlaceholderAllocator, PlaceholderPolicy};
pub use preprocess::UnitNormalizer;
pub use sink::{FileSink, Sink};
pub use substitute::TextSubstitutor;
pub use taggers::LexiconTagger;
