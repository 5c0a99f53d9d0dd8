//! Reference tagger implementations.
//!
//! Production hosts wire a real model runtime in through the
//! [`Tagger`](crate::Tagger) trait; the taggers here exist so the pipeline
//! is exercisable end-to-end without one.

pub mod lexicon;

pub use lexicon::LexiconTagger;
