use std::time::Duration;

use thiserror::Error;

/// Errors produced while loading corpora or generating passphrases.
///
/// A failed generation never yields a partial passphrase; the variant tells
/// the caller why nothing was produced.
#[derive(Error, Debug)]
pub enum GenerationError {
	/// Every candidate fell outside the requested length bounds.
	#[error("no candidate satisfied the length constraints after {attempts} attempts")]
	AttemptsExhausted { attempts: usize },

	/// The wall-clock deadline passed before a candidate was accepted.
	#[error("generation exceeded its deadline of {0:?}")]
	DeadlineExceeded(Duration),

	#[error("generation was cancelled")]
	Cancelled,

	/// The corpus cannot produce any word (empty, nothing passes the
	/// word-length filter, or it was never loaded).
	#[error("invalid corpus: {0}")]
	InvalidCorpus(String),

	/// The operating system entropy source failed.
	#[error("entropy source failure: {0}")]
	Entropy(String),

	#[error("random range must not be empty")]
	EmptyRange,

	#[error("invalid generation parameters: {0}")]
	InvalidParameters(String),

	#[error("invalid passphrase policy: {0}")]
	InvalidPolicy(String),

	#[error("corpus '{0}' not found")]
	CorpusNotFound(String),

	#[error("failed to read corpus: {0}")]
	Io(#[from] std::io::Error),
}

impl GenerationError {
	/// Returns `true` when the failure comes from the search budget
	/// (attempt ceiling or deadline) rather than from bad input.
	pub fn is_unsatisfiable(&self) -> bool {
		matches!(self, Self::AttemptsExhausted { .. } | Self::DeadlineExceeded(_))
	}
}

/// Convenience type for Results
pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn budget_failures_are_unsatisfiable() {
		assert!(GenerationError::AttemptsExhausted { attempts: 3 }.is_unsatisfiable());
		assert!(GenerationError::DeadlineExceeded(Duration::from_secs(1)).is_unsatisfiable());
		assert!(!GenerationError::Cancelled.is_unsatisfiable());
		assert!(!GenerationError::InvalidCorpus("empty".to_owned()).is_unsatisfiable());
		assert!(!GenerationError::Entropy("boom".to_owned()).is_unsatisfiable());
	}

	#[test]
	fn display_mentions_details() {
		let err = GenerationError::AttemptsExhausted { attempts: 20000 };
		assert_eq!(
			err.to_string(),
			"no candidate satisfied the length constraints after 20000 attempts"
		);

		let err = GenerationError::CorpusNotFound("words-simple".to_owned());
		assert_eq!(err.to_string(), "corpus 'words-simple' not found");
	}

	#[test]
	fn io_errors_convert() {
		let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
		let err: GenerationError = io.into();
		assert!(matches!(err, GenerationError::Io(_)));
	}
}
