//! Top-level module for passphrase generation.
//!
//! This module provides:
//! - Word corpora (`WordCorpus`, `Words`)
//! - Pluggable word loading (`WordSource`)
//! - Generation policy and compliance checks (`PassphrasePolicy`)
//! - Per-call parameters (`GenerationParameters`)
//! - Cooperative cancellation (`CancellationToken`)
//! - The high-level generation interface (`Generator`)

/// High-level interface for generating passphrases.
///
/// Exposes word, digit and symbol selection, the constrained search
/// and batch generation over several threads.
pub mod generator;

/// Word corpora and the simple/extended corpus pair.
pub mod corpus;

/// Word sources: directory-backed line reader and in-memory maps.
pub mod source;

/// Immutable generation policy (symbols, word-length filter, search budget).
pub mod policy;

/// Per-call generation parameters.
pub mod generation_input;

/// Shared cancellation flag consulted by long searches.
pub mod cancel;
