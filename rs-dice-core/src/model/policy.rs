use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};
use super::generation_input::GenerationParameters;

/// Symbols appended to passphrases by default.
pub const DEFAULT_SYMBOLS: [&str; 10] = ["!", "@", "#", "$", "%", "*", "/", "?", ".", ","];

/// Shortest word accepted by default; skips words like "a", "um", "etc".
pub const DEFAULT_MIN_WORD_LENGTH: usize = 4;

/// Longest word accepted by default; skips unwieldy words.
pub const DEFAULT_MAX_WORD_LENGTH: usize = 16;

/// Candidates tried before giving up on unrealistic parameters.
pub const DEFAULT_MAX_ATTEMPTS: usize = 20_000;

/// Wall-clock budget of a single generation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Immutable rules shared by every generation of a `Generator`.
///
/// `PassphrasePolicy` holds what would otherwise be process-wide constants:
/// the symbol set, the word-length filter and the search budget.
///
/// # Invariants
/// - `min_word_length <= max_word_length`
/// - `symbols` is not empty and every symbol is a single character
/// - `max_attempts > 0`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PassphrasePolicy {
	/// Minimum word length (in characters) accepted by word selection.
	min_word_length: usize,

	/// Maximum word length (in characters) accepted by word selection.
	max_word_length: usize,

	/// Symbols the final character is drawn from.
	symbols: Vec<String>,

	/// Attempt ceiling of the constrained search.
	max_attempts: usize,

	/// Deadline of the constrained search, measured from its start.
	timeout: Duration,
}

impl Default for PassphrasePolicy {
	fn default() -> Self {
		Self {
			min_word_length: DEFAULT_MIN_WORD_LENGTH,
			max_word_length: DEFAULT_MAX_WORD_LENGTH,
			symbols: DEFAULT_SYMBOLS.iter().map(|s| (*s).to_owned()).collect(),
			max_attempts: DEFAULT_MAX_ATTEMPTS,
			timeout: DEFAULT_TIMEOUT,
		}
	}
}

impl PassphrasePolicy {
	/// Creates the default policy.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn min_word_length(&self) -> usize {
		self.min_word_length
	}

	pub fn max_word_length(&self) -> usize {
		self.max_word_length
	}

	pub fn symbols(&self) -> &[String] {
		&self.symbols
	}

	pub fn max_attempts(&self) -> usize {
		self.max_attempts
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Returns `true` if `word` passes the word-length filter.
	pub fn accepts_word(&self, word: &str) -> bool {
		(self.min_word_length..=self.max_word_length).contains(&word.chars().count())
	}

	/// Sets the word-length filter.
	///
	/// # Errors
	/// Returns an error if `min > max` or `max == 0`.
	pub fn set_word_length(&mut self, min: usize, max: usize) -> Result<()> {
		if min > max || max == 0 {
			return Err(GenerationError::InvalidPolicy(format!(
				"word length range [{min}, {max}] is empty"
			)));
		}
		self.min_word_length = min;
		self.max_word_length = max;
		Ok(())
	}

	/// Replaces the symbol set.
	///
	/// # Errors
	/// Returns an error if the set is empty or a symbol is not exactly one
	/// character long.
	pub fn set_symbols<I, S>(&mut self, symbols: I) -> Result<()>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let symbols: Vec<String> = symbols.into_iter().map(Into::into).collect();
		Self::check_symbols(&symbols)?;
		self.symbols = symbols;
		Ok(())
	}

	/// Sets the attempt ceiling.
	///
	/// # Errors
	/// Returns an error if `max_attempts == 0`.
	pub fn set_max_attempts(&mut self, max_attempts: usize) -> Result<()> {
		if max_attempts == 0 {
			return Err(GenerationError::InvalidPolicy("max_attempts must be > 0".to_owned()));
		}
		self.max_attempts = max_attempts;
		Ok(())
	}

	/// Sets the deadline of a single generation.
	pub fn set_timeout(&mut self, timeout: Duration) {
		self.timeout = timeout;
	}

	/// Checks every invariant.
	///
	/// Needed after deserialization, which bypasses the setters.
	pub fn check(&self) -> Result<()> {
		if self.min_word_length > self.max_word_length || self.max_word_length == 0 {
			return Err(GenerationError::InvalidPolicy(format!(
				"word length range [{}, {}] is empty",
				self.min_word_length, self.max_word_length
			)));
		}
		if self.max_attempts == 0 {
			return Err(GenerationError::InvalidPolicy("max_attempts must be > 0".to_owned()));
		}
		Self::check_symbols(&self.symbols)
	}

	fn check_symbols(symbols: &[String]) -> Result<()> {
		if symbols.is_empty() {
			return Err(GenerationError::InvalidPolicy("symbol set is empty".to_owned()));
		}
		if let Some(symbol) = symbols.iter().find(|s| s.chars().count() != 1) {
			return Err(GenerationError::InvalidPolicy(format!(
				"symbol '{symbol}' is not a single character"
			)));
		}
		Ok(())
	}

	/// Checks whether `passphrase` complies with this policy and `params`.
	///
	/// A compliant passphrase:
	/// - has a character length within `[min_length, max_length]`
	/// - starts with a character already in uppercase form
	/// - ends with one ASCII digit followed by one symbol of the set
	///
	/// The check is pure: the same input always gets the same answer.
	pub fn validate(&self, passphrase: &str, params: &GenerationParameters) -> bool {
		let len = passphrase.chars().count();
		if len < params.min_length || len > params.max_length {
			return false;
		}

		let Some(first) = passphrase.chars().next() else {
			return false;
		};
		if !first.to_uppercase().eq(std::iter::once(first)) {
			return false;
		}

		let Some(symbol) = self.symbols.iter().find(|s| passphrase.ends_with(s.as_str())) else {
			return false;
		};
		let body = &passphrase[..passphrase.len() - symbol.len()];
		body.chars().last().is_some_and(|c| c.is_ascii_digit())
	}
}
