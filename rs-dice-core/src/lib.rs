//! Diceware-style passphrase generation library.
//!
//! This crate builds memorable passphrases out of dictionary words:
//! - Cryptographically secure uniform sampling (`random`)
//! - Word corpora and pluggable word sources
//! - Length-constrained generation with an attempt ceiling and a deadline
//! - Deterministic post-processing (capitalization, digit and symbol suffix)
//!
//! Only the high-level API is exposed publicly. Low-level helpers
//! are kept internal.

/// Error taxonomy shared by every component.
pub mod error;

/// Randomness provider backed by the operating system CSPRNG.
pub mod random;

/// Corpora, word sources, generation policy and the generator itself.
pub mod model;

/// I/O utilities (line reading, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use error::{GenerationError, Result};
pub use model::generator::Generator;
pub use model::generation_input::GenerationParameters;
pub use model::policy::PassphrasePolicy;
