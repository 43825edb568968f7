use log::info;

use crate::error::{GenerationError, Result};
use super::source::WordSource;

/// An ordered collection of candidate words.
///
/// The corpus is immutable once built. Words are kept exactly as loaded
/// (mixed case, any length): the length filter is applied at selection
/// time by the generator, not here.
///
/// # Invariants
/// - `len()` always equals the number of stored words
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCorpus {
	words: Vec<String>,
}

impl WordCorpus {
	/// Creates a corpus from already loaded words.
	pub fn new(words: Vec<String>) -> Self {
		Self { words }
	}

	/// Builds a corpus from a block of text, one word per line.
	pub fn from_lines(text: &str) -> Self {
		Self::new(text.lines().map(str::to_owned).collect())
	}

	/// Number of words in the corpus.
	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	/// Returns the word at `index`, if any.
	pub fn get(&self, index: usize) -> Option<&str> {
		self.words.get(index).map(String::as_str)
	}

	/// Returns all the words, in load order.
	pub fn words(&self) -> &[String] {
		&self.words
	}

	/// Returns `true` if `word` belongs to the corpus.
	pub fn contains(&self, word: &str) -> bool {
		self.words.iter().any(|w| w == word)
	}
}

impl From<Vec<String>> for WordCorpus {
	fn from(words: Vec<String>) -> Self {
		Self::new(words)
	}
}

impl<'a> FromIterator<&'a str> for WordCorpus {
	fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
		Self::new(iter.into_iter().map(str::to_owned).collect())
	}
}

/// The simple and (optionally) extended corpora available to the generator.
///
/// The extended corpus is usually much larger; callers that never ask for
/// it can leave it unloaded.
#[derive(Debug, Clone, Default)]
pub struct Words {
	/// Everyday words, always available.
	pub simple: WordCorpus,

	/// Larger vocabulary, selected by `use_extended_corpus`.
	pub extended: Option<WordCorpus>,
}

impl Words {
	/// Creates a word set with only the simple corpus.
	pub fn new(simple: WordCorpus) -> Self {
		Self { simple, extended: None }
	}

	/// Creates a word set with both corpora.
	pub fn with_extended(simple: WordCorpus, extended: WordCorpus) -> Self {
		Self { simple, extended: Some(extended) }
	}

	/// Loads the corpora from a `WordSource`.
	///
	/// # Parameters
	/// - `source`: Where the words come from.
	/// - `simple`: Identifier of the simple corpus.
	/// - `extended`: Identifier of the extended corpus, or `None` to skip it.
	///
	/// # Errors
	/// Returns any error reported by the source.
	pub fn load<S: WordSource + ?Sized>(source: &S, simple: &str, extended: Option<&str>) -> Result<Self> {
		let simple = source.load(simple)?;
		let extended = extended.map(|id| source.load(id)).transpose()?;

		info!(
			"loaded {} simple words and {} extended words",
			simple.len(),
			extended.as_ref().map_or(0, WordCorpus::len)
		);

		Ok(Self { simple, extended })
	}

	/// Returns the corpus selected by `use_extended`.
	///
	/// # Errors
	/// `InvalidCorpus` if the extended corpus is requested but not loaded.
	pub fn select(&self, use_extended: bool) -> Result<&WordCorpus> {
		if !use_extended {
			return Ok(&self.simple);
		}
		self.extended
			.as_ref()
			.ok_or_else(|| GenerationError::InvalidCorpus("extended corpus is not loaded".to_owned()))
	}
}
