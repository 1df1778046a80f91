//! Trigram word-sequence modeling and greedy text generation.
//!
//! This crate builds a trigram model from streams of word tokens and
//! generates new sequences that approximate the learned distribution:
//! - Layered counting: unigram, bigram, trigram
//! - A one-time finalization pass that moves the most frequent continuation
//!   of every context to the head of its list, making each greedy
//!   prediction a constant-time read
//! - A stateful generator with a trigram/bigram/random fallback chain,
//!   periodic forced random words, and short-cycle suppression
//!
//! Probabilities are never stored explicitly: list order after finalization
//! carries the ranking. Only the high-level API is exposed publicly; the
//! linked-list machinery is kept internal to ensure consistency and prevent
//! misuse.

/// Core trigram model and generation logic.
pub mod model;

/// I/O utilities (file loading, path helpers) shared by the front ends.
pub mod io;
