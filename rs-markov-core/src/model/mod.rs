//! Top-level module for the trigram generation system.
//!
//! This module provides the full build-then-generate pipeline:
//! - Layered unigram/bigram/trigram counting (`TrigramModel`)
//! - One-time finalization that ranks every continuation list in place
//! - Greedy word generation with repetition avoidance (`OutputGenerator`)
//! - The internal reorderable word list the counting structure is built on

/// Stateful greedy word generation over a finalized model.
///
/// Exposes the per-step fallback chain (trigram, then bigram, then random),
/// the refresh countdown, cycle suppression, and the sampling seam used to
/// inject deterministic randomness in tests.
pub mod output_generator;

/// The trigram model: training protocol, finalization, and persistence.
pub mod trigram_model;

/// Internal singly-linked word list with constant-time splice-to-front
/// reordering.
///
/// This module is not exposed publicly.
mod word_list;
