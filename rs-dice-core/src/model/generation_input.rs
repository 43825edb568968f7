use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// Input parameters of a single passphrase generation.
///
/// # Responsibilities
/// - Track the shape of the passphrase (`word_count`, `separator`)
/// - Track the accepted length window (`min_length`, `max_length`)
/// - Select the corpus (`use_extended_corpus`)
///
/// # Notes
/// - `min_length <= max_length` is not enforced: an empty window simply
///   exhausts the search budget.
/// - Lengths are counted in characters and include the digit and symbol
///   suffix.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationParameters {
	/// Number of words in the passphrase (must be > 0).
	word_count: usize,

	/// Inserted between words, never after the last one.
	pub separator: String,

	/// Maximum length of the final passphrase.
	pub max_length: usize,

	/// Minimum length of the final passphrase.
	pub min_length: usize,

	/// Draw words from the extended corpus instead of the simple one.
	pub use_extended_corpus: bool,
}

impl Default for GenerationParameters {
	fn default() -> Self {
		Self {
			word_count: 3,
			separator: " ".to_owned(),
			max_length: 64,
			min_length: 20,
			use_extended_corpus: false,
		}
	}
}

impl GenerationParameters {
	/// Creates parameters with the default values:
	/// 3 words separated by a space, between 20 and 64 characters,
	/// simple corpus.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the number of words per passphrase.
	pub fn word_count(&self) -> usize {
		self.word_count
	}

	/// Sets the number of words per passphrase.
	///
	/// # Errors
	/// Returns an error if `word_count == 0`.
	pub fn set_word_count(&mut self, word_count: usize) -> Result<()> {
		if word_count == 0 {
			return Err(GenerationError::InvalidParameters("word_count must be > 0".to_owned()));
		}
		self.word_count = word_count;
		Ok(())
	}

	/// Checks the parameters before a generation.
	///
	/// Needed after deserialization, which bypasses `set_word_count`.
	pub fn check(&self) -> Result<()> {
		if self.word_count == 0 {
			return Err(GenerationError::InvalidParameters("word_count must be > 0".to_owned()));
		}
		Ok(())
	}
}
