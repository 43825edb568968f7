use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{GenerationError, Result};
use crate::io;
use super::corpus::WordCorpus;

/// File extension of on-disk word lists.
const CORPUS_EXTENSION: &str = "txt";

/// Capability that turns a corpus identifier into a word corpus.
pub trait WordSource {
	/// Loads the corpus named `corpus`.
	///
	/// # Errors
	/// - `CorpusNotFound` if the identifier is unknown.
	/// - `Io` if reading the words fails.
	fn load(&self, corpus: &str) -> Result<WordCorpus>;
}

/// Word source reading `<folder>/<corpus>.txt`, one word per line.
#[derive(Debug, Clone)]
pub struct DirectoryWordSource {
	folder: PathBuf,
}

impl DirectoryWordSource {
	/// Creates a source over a directory of `.txt` word lists.
	///
	/// # Errors
	/// Returns an `Io` error of kind `NotADirectory` if the path is not a
	/// directory.
	///
	/// # Notes
	/// - `"."` and `"./"` resolve to the current working directory.
	pub fn new<P: AsRef<Path>>(folder: P) -> Result<Self> {
		let folder = io::normalize_folder(folder.as_ref());

		if !folder.is_dir() {
			return Err(GenerationError::Io(std::io::Error::new(
				std::io::ErrorKind::NotADirectory,
				format!("expected a directory, got: {}", folder.display()),
			)));
		}

		Ok(Self { folder })
	}

	/// Returns the identifiers of every corpus in the directory, sorted.
	pub fn list_corpora(&self) -> Result<Vec<String>> {
		Ok(io::list_stems(&self.folder, CORPUS_EXTENSION)?)
	}

	fn corpus_path(&self, corpus: &str) -> PathBuf {
		self.folder.join(format!("{corpus}.{CORPUS_EXTENSION}"))
	}
}

impl WordSource for DirectoryWordSource {
	fn load(&self, corpus: &str) -> Result<WordCorpus> {
		let path = self.corpus_path(corpus);
		if !path.is_file() {
			return Err(GenerationError::CorpusNotFound(corpus.to_owned()));
		}
		Ok(WordCorpus::new(io::read_file(path)?))
	}
}

/// In-memory word source, keyed by corpus identifier.
#[derive(Debug, Clone, Default)]
pub struct MemoryWordSource {
	corpora: HashMap<String, Vec<String>>,
}

impl MemoryWordSource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers (or replaces) the words of a corpus.
	pub fn insert(&mut self, corpus: &str, words: Vec<String>) {
		self.corpora.insert(corpus.to_owned(), words);
	}
}

impl WordSource for MemoryWordSource {
	fn load(&self, corpus: &str) -> Result<WordCorpus> {
		self.corpora
			.get(corpus)
			.map(|words| WordCorpus::new(words.clone()))
			.ok_or_else(|| GenerationError::CorpusNotFound(corpus.to_owned()))
	}
}
