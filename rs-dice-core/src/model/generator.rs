use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::error::{GenerationError, Result};
use crate::random::{OsRandom, RandomSource};
use super::cancel::CancellationToken;
use super::corpus::{WordCorpus, Words};
use super::generation_input::GenerationParameters;
use super::policy::PassphrasePolicy;

/// Characters appended after the words: one digit and one symbol.
const SUFFIX_LENGTH: usize = 2;

/// High-level passphrase generator.
///
/// # Responsibilities
/// - Pick words, digits and symbols uniformly through a `RandomSource`
/// - Search for a passphrase whose length fits the requested window
/// - Abort on the attempt ceiling, the deadline or a cancellation request
///
/// A `Generator` is immutable once built; all per-call state lives in the
/// call, so one instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct Generator<R = OsRandom> {
	policy: PassphrasePolicy,
	random: R,
}

impl Default for Generator<OsRandom> {
	fn default() -> Self {
		Self { policy: PassphrasePolicy::default(), random: OsRandom }
	}
}

impl Generator<OsRandom> {
	/// Creates a generator with the default policy and the OS randomness.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a generator with a custom policy and the OS randomness.
	///
	/// # Errors
	/// Returns an error if the policy breaks one of its invariants.
	pub fn with_policy(policy: PassphrasePolicy) -> Result<Self> {
		Self::with_random(policy, OsRandom)
	}
}

/// Limits shared by every draw of one generation call.
struct SearchBudget<'t> {
	started: Instant,
	timeout: Option<Duration>,
	token: Option<&'t CancellationToken>,
}

impl<'t> SearchBudget<'t> {
	fn new(timeout: Duration, token: Option<&'t CancellationToken>) -> Self {
		Self { started: Instant::now(), timeout: Some(timeout), token }
	}

	fn unbounded() -> Self {
		Self { started: Instant::now(), timeout: None, token: None }
	}

	/// Fails once the search must stop.
	fn checkpoint(&self) -> Result<()> {
		if self.token.is_some_and(CancellationToken::is_cancelled) {
			return Err(GenerationError::Cancelled);
		}
		if let Some(timeout) = self.timeout {
			if self.started.elapsed() >= timeout {
				return Err(GenerationError::DeadlineExceeded(timeout));
			}
		}
		Ok(())
	}
}

impl<R: RandomSource> Generator<R> {
	/// Creates a generator with a custom policy and randomness provider.
	///
	/// # Errors
	/// Returns an error if the policy breaks one of its invariants.
	pub fn with_random(policy: PassphrasePolicy, random: R) -> Result<Self> {
		policy.check()?;
		Ok(Self { policy, random })
	}

	/// Returns the policy used by this generator.
	pub fn policy(&self) -> &PassphrasePolicy {
		&self.policy
	}

	/// Picks a random word passing the word-length filter.
	///
	/// Indices are drawn uniformly until one lands on an acceptable word.
	///
	/// # Errors
	/// - `InvalidCorpus` if the corpus is empty or has no acceptable word.
	/// - `Entropy` if the randomness provider fails.
	pub fn pick_word<'c>(&self, corpus: &'c WordCorpus) -> Result<&'c str> {
		self.check_corpus(corpus)?;
		self.draw_word(corpus, &SearchBudget::unbounded())
	}

	/// Picks a random symbol from the policy's symbol set.
	pub fn pick_symbol(&self) -> Result<&str> {
		let symbols = self.policy.symbols();
		let index = self.random.random_int(symbols.len())?;
		symbols
			.get(index)
			.map(String::as_str)
			.ok_or_else(|| GenerationError::Entropy(format!("symbol index {index} is out of range")))
	}

	/// Picks a random decimal digit, `'0'` to `'9'`.
	pub fn pick_digit(&self) -> Result<char> {
		let digit = self.random.random_int(10)?;
		u32::try_from(digit)
			.ok()
			.and_then(|d| char::from_digit(d, 10))
			.ok_or_else(|| GenerationError::Entropy(format!("digit {digit} is out of range")))
	}

	/// Generates a passphrase.
	///
	/// # Parameters
	/// - `words`: Corpora to draw from; `params.use_extended_corpus` selects one.
	/// - `params`: Word count, separator and length window.
	///
	/// # Returns
	/// - `Ok(String)`: `word_count` words joined by the separator, first
	///   character uppercased, followed by one digit and one symbol. Its
	///   length lies within `[min_length, max_length]`.
	/// - `Err(...)`: Nothing fit the window within the policy's attempt
	///   ceiling or deadline, or the inputs are invalid.
	///
	/// # Notes
	/// - Lengths are counted in characters.
	/// - Runtime is bounded by the policy timeout.
	pub fn generate(&self, words: &Words, params: &GenerationParameters) -> Result<String> {
		self.logged(self.search(words, params, None))
	}

	/// Generates a passphrase, stopping early once `token` is cancelled.
	///
	/// See [`generate`](Self::generate). The token is checked before every
	/// attempt and every word draw.
	pub fn generate_with_cancel(
		&self,
		words: &Words,
		params: &GenerationParameters,
		token: &CancellationToken,
	) -> Result<String> {
		self.logged(self.search(words, params, Some(token)))
	}

	/// Checks whether `passphrase` complies with the policy and `params`.
	pub fn validate(&self, passphrase: &str, params: &GenerationParameters) -> bool {
		self.policy.validate(passphrase, params)
	}

	fn logged(&self, result: Result<String>) -> Result<String> {
		if let Err(err) = &result {
			debug!("passphrase generation aborted: {err}");
		}
		result
	}

	fn check_corpus(&self, corpus: &WordCorpus) -> Result<()> {
		if corpus.is_empty() {
			return Err(GenerationError::InvalidCorpus("corpus is empty".to_owned()));
		}
		if !corpus.words().iter().any(|word| self.policy.accepts_word(word)) {
			return Err(GenerationError::InvalidCorpus(format!(
				"no word between {} and {} characters",
				self.policy.min_word_length(),
				self.policy.max_word_length()
			)));
		}
		Ok(())
	}

	/// Rejection-samples the corpus; the caller has checked that an
	/// acceptable word exists.
	fn draw_word<'c>(&self, corpus: &'c WordCorpus, budget: &SearchBudget) -> Result<&'c str> {
		loop {
			budget.checkpoint()?;
			let index = self.random.random_int(corpus.len())?;
			let word = corpus
				.get(index)
				.ok_or_else(|| GenerationError::InvalidCorpus(format!("index {index} is out of range")))?;
			if self.policy.accepts_word(word) {
				return Ok(word);
			}
		}
	}

	/// Joins `word_count` random words with the separator and uppercases
	/// the first character.
	fn assemble(&self, corpus: &WordCorpus, params: &GenerationParameters, budget: &SearchBudget) -> Result<String> {
		let mut candidate = String::new();
		for i in 0..params.word_count() {
			if i > 0 {
				candidate.push_str(&params.separator);
			}
			candidate.push_str(self.draw_word(corpus, budget)?);
		}
		Ok(capitalize_first(&candidate))
	}

	fn search(&self, words: &Words, params: &GenerationParameters, token: Option<&CancellationToken>) -> Result<String> {
		params.check()?;
		let corpus = words.select(params.use_extended_corpus)?;
		self.check_corpus(corpus)?;

		let budget = SearchBudget::new(self.policy.timeout(), token);
		let window = params.min_length..=params.max_length;

		for attempt in 1..=self.policy.max_attempts() {
			budget.checkpoint()?;

			let mut candidate = self.assemble(corpus, params, &budget)?;

			// Capitalization may change the character count, so measure after it
			let projected = candidate.chars().count() + SUFFIX_LENGTH;
			if window.contains(&projected) {
				candidate.push(self.pick_digit()?);
				candidate.push_str(self.pick_symbol()?);
				return Ok(candidate);
			}

			trace!("attempt {attempt}: rejected candidate of length {projected}");
		}

		Err(GenerationError::AttemptsExhausted { attempts: self.policy.max_attempts() })
	}
}

impl<R: RandomSource + Sync> Generator<R> {
	/// Generates `count` passphrases in parallel.
	///
	/// # Behavior
	/// - Splits the work into one chunk per CPU core.
	/// - Each call is independent: one failure does not stop the others.
	/// - Results are returned in request order.
	///
	/// # Notes
	/// - Uses MPSC channels to collect results from threads.
	pub fn generate_batch(&self, words: &Words, params: &GenerationParameters, count: usize) -> Vec<Result<String>> {
		if count == 0 {
			return Vec::new();
		}

		let workers = num_cpus::get().clamp(1, count);
		let chunk_size = count.div_ceil(workers);

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			for worker in 0..workers {
				let tx = tx.clone();
				let start = worker * chunk_size;
				let end = (start + chunk_size).min(count);

				scope.spawn(move || {
					for index in start..end {
						if tx.send((index, self.generate(words, params))).is_err() {
							break;
						}
					}
				});
			}
		});
		drop(tx);

		let mut results: Vec<(usize, Result<String>)> = rx.iter().collect();
		results.sort_by_key(|(index, _)| *index);
		results.into_iter().map(|(_, result)| result).collect()
	}
}

/// Uppercases the first character and leaves the rest unchanged.
fn capitalize_first(s: &str) -> String {
	let mut chars = s.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::{HashSet, VecDeque};
	use std::sync::Mutex;

	/// Replays scripted values (modulo the range), then zeros.
	struct ScriptedRandom {
		values: Mutex<VecDeque<usize>>,
	}

	impl ScriptedRandom {
		fn new(values: &[usize]) -> Self {
			Self { values: Mutex::new(values.iter().copied().collect()) }
		}
	}

	impl RandomSource for ScriptedRandom {
		fn random_int(&self, m: usize) -> Result<usize> {
			if m == 0 {
				return Err(GenerationError::EmptyRange);
			}
			Ok(self.values.lock().unwrap().pop_front().unwrap_or(0) % m)
		}
	}

	struct BrokenRandom;

	/// Ignores the requested range.
	struct OutOfRangeRandom;

	impl RandomSource for OutOfRangeRandom {
		fn random_int(&self, m: usize) -> Result<usize> {
			Ok(m + 3)
		}
	}

	impl RandomSource for BrokenRandom {
		fn random_int(&self, _m: usize) -> Result<usize> {
			Err(GenerationError::Entropy("entropy pool unavailable".to_owned()))
		}
	}

	fn scripted(values: &[usize]) -> Generator<ScriptedRandom> {
		Generator::with_random(PassphrasePolicy::new(), ScriptedRandom::new(values)).unwrap()
	}

	fn params(word_count: usize, separator: &str, max_length: usize, min_length: usize) -> GenerationParameters {
		let mut params = GenerationParameters::new();
		params.set_word_count(word_count).unwrap();
		params.separator = separator.to_owned();
		params.max_length = max_length;
		params.min_length = min_length;
		params
	}

	/// A min-length word, a too-long word and a few regular ones.
	fn test_words() -> Words {
		let short_word = "a".repeat(4);
		let long_word = "a".repeat(17);
		Words::new(
			[short_word.as_str(), "onlinux", long_word.as_str(), "fedora", "debian", "archlinux", "qubes"]
				.into_iter()
				.collect(),
		)
	}

	#[test]
	fn pick_word_skips_filtered_words() {
		let corpus: WordCorpus = ["ab", "abcdefghijklmnopq", "fedora"].into_iter().collect();
		let generator = scripted(&[0, 1, 2]);
		assert_eq!(generator.pick_word(&corpus).unwrap(), "fedora");
	}

	#[test]
	fn pick_word_stays_in_bounds() {
		let words = test_words();
		let generator = Generator::new();

		for _ in 0..5000 {
			let word = generator.pick_word(&words.simple).unwrap();
			assert!((4..=16).contains(&word.len()), "{word}");
			assert!(words.simple.contains(word));
		}
	}

	#[test]
	fn pick_word_rejects_unusable_corpora() {
		let generator = Generator::new();

		let empty = WordCorpus::default();
		assert!(matches!(generator.pick_word(&empty), Err(GenerationError::InvalidCorpus(_))));

		let too_short: WordCorpus = ["a", "um", "etc"].into_iter().collect();
		assert!(matches!(generator.pick_word(&too_short), Err(GenerationError::InvalidCorpus(_))));
	}

	#[test]
	fn pick_word_honours_custom_thresholds() {
		let mut policy = PassphrasePolicy::new();
		policy.set_word_length(2, 3).unwrap();
		let generator = Generator::with_policy(policy).unwrap();
		let corpus: WordCorpus = ["a", "um", "etc", "fedora"].into_iter().collect();

		for _ in 0..500 {
			let word = generator.pick_word(&corpus).unwrap();
			assert!(word == "um" || word == "etc", "{word}");
		}
	}

	#[test]
	fn pick_symbol_reaches_every_symbol() {
		let generator = Generator::new();
		let mut seen = HashSet::new();
		for _ in 0..2500 {
			let symbol = generator.pick_symbol().unwrap().to_owned();
			assert!(generator.policy().symbols().contains(&symbol));
			seen.insert(symbol);
		}
		assert_eq!(seen.len(), generator.policy().symbols().len());
	}

	#[test]
	fn pick_symbol_includes_last_symbol() {
		assert_eq!(scripted(&[9]).pick_symbol().unwrap(), ",");
	}

	#[test]
	fn pick_digit_covers_zero_to_nine() {
		assert_eq!(scripted(&[9]).pick_digit().unwrap(), '9');
		assert_eq!(scripted(&[0]).pick_digit().unwrap(), '0');

		let generator = Generator::new();
		let mut seen = HashSet::new();
		for _ in 0..2500 {
			let digit = generator.pick_digit().unwrap();
			assert!(digit.is_ascii_digit());
			seen.insert(digit);
		}
		assert_eq!(seen.len(), 10);
	}

	#[test]
	fn generate_assembles_words_digit_and_symbol() {
		let words = Words::new(["fedora", "debian"].into_iter().collect());
		// word 0, word 1, digit 7, symbol 0
		let generator = scripted(&[0, 1, 7, 0]);

		let passphrase = generator.generate(&words, &params(2, "-", 64, 4)).unwrap();
		assert_eq!(passphrase, "Fedora-debian7!");
	}

	#[test]
	fn generate_retries_until_length_fits() {
		let words = Words::new(["fedora", "archlinux"].into_iter().collect());
		// "archlinux" is too long, then "fedora" fits exactly
		let generator = scripted(&[1, 0, 3, 2]);

		let passphrase = generator.generate(&words, &params(1, " ", 8, 8)).unwrap();
		assert_eq!(passphrase, "Fedora3#");
	}

	#[test]
	fn generate_measures_after_capitalization() {
		// "ß" uppercases to "SS"
		let words = Words::new(["ßeta"].into_iter().collect());
		let generator = scripted(&[]);

		let passphrase = generator.generate(&words, &params(1, " ", 7, 7)).unwrap();
		assert_eq!(passphrase, "SSeta0!");

		let err = generator.generate(&words, &params(1, " ", 6, 6)).unwrap_err();
		assert!(err.is_unsatisfiable(), "{err}");
	}

	#[test]
	fn generate_respects_bounds() {
		let words = test_words();
		let generator = Generator::new();

		let cases = [
			params(4, " ", 64, 4),
			params(4, " ", 32, 4),
			params(5, " ", 32, 4),
			params(3, " ", 64, 4),
			params(4, "2", 64, 4),
		];

		for params in &cases {
			for _ in 0..50 {
				let passphrase = generator.generate(&words, params).unwrap();
				let len = passphrase.chars().count();
				assert!(len >= params.min_length && len <= params.max_length, "{passphrase}");
				assert!(passphrase.starts_with(|c: char| c.is_uppercase()), "{passphrase}");
				assert!(generator.validate(&passphrase, params), "{passphrase}");
			}
		}
	}

	#[test]
	fn generate_fails_on_unsatisfiable_parameters() {
		let words = test_words();
		let generator = Generator::new();

		for params in [params(90, "3", 64, 4), params(90, "-", 64, 4), params(90, " ", 10, 4)] {
			let err = generator.generate(&words, &params).unwrap_err();
			assert!(err.is_unsatisfiable(), "{err}");
		}
	}

	#[test]
	fn generate_stops_at_attempt_ceiling() {
		let mut policy = PassphrasePolicy::new();
		policy.set_max_attempts(5).unwrap();
		let generator = Generator::with_policy(policy).unwrap();

		let err = generator.generate(&test_words(), &params(2, " ", 3, 1)).unwrap_err();
		assert!(matches!(err, GenerationError::AttemptsExhausted { attempts: 5 }));
	}

	#[test]
	fn generate_stops_at_deadline() {
		let mut policy = PassphrasePolicy::new();
		policy.set_timeout(Duration::ZERO);
		let generator = Generator::with_policy(policy).unwrap();

		let err = generator.generate(&test_words(), &params(3, " ", 64, 4)).unwrap_err();
		assert!(matches!(err, GenerationError::DeadlineExceeded(d) if d == Duration::ZERO));
	}

	#[test]
	fn generate_inverted_window_exhausts_budget() {
		let mut policy = PassphrasePolicy::new();
		policy.set_max_attempts(10).unwrap();
		let generator = Generator::with_policy(policy).unwrap();

		let err = generator.generate(&test_words(), &params(2, " ", 10, 50)).unwrap_err();
		assert!(err.is_unsatisfiable());
	}

	#[test]
	fn generate_honours_cancellation() {
		let token = CancellationToken::new();
		token.cancel();

		let err = Generator::new()
			.generate_with_cancel(&test_words(), &params(3, " ", 64, 4), &token)
			.unwrap_err();
		assert!(matches!(err, GenerationError::Cancelled));
	}

	#[test]
	fn generate_without_cancellation_succeeds() {
		let token = CancellationToken::new();
		let passphrase = Generator::new()
			.generate_with_cancel(&test_words(), &params(3, " ", 64, 4), &token)
			.unwrap();
		assert!(!passphrase.is_empty());
	}

	#[test]
	fn generate_propagates_entropy_failures() {
		let generator = Generator::with_random(PassphrasePolicy::new(), BrokenRandom).unwrap();
		let err = generator.generate(&test_words(), &params(3, " ", 64, 4)).unwrap_err();
		assert!(matches!(err, GenerationError::Entropy(_)));
		assert!(matches!(generator.pick_symbol(), Err(GenerationError::Entropy(_))));
		assert!(matches!(generator.pick_digit(), Err(GenerationError::Entropy(_))));
	}

	#[test]
	fn out_of_range_source_is_an_entropy_error() {
		let generator = Generator::with_random(PassphrasePolicy::new(), OutOfRangeRandom).unwrap();
		assert!(matches!(generator.pick_symbol(), Err(GenerationError::Entropy(_))));
		assert!(matches!(generator.pick_digit(), Err(GenerationError::Entropy(_))));
		assert!(matches!(
			generator.generate(&test_words(), &params(3, " ", 64, 4)),
			Err(GenerationError::InvalidCorpus(_))
		));
	}

	#[test]
	fn generate_reports_corpus_problems() {
		let generator = Generator::new();

		let mut extended = params(3, " ", 64, 4);
		extended.use_extended_corpus = true;
		assert!(matches!(
			generator.generate(&test_words(), &extended),
			Err(GenerationError::InvalidCorpus(_))
		));

		let unusable = Words::new(["a", "um"].into_iter().collect());
		assert!(matches!(
			generator.generate(&unusable, &params(3, " ", 64, 4)),
			Err(GenerationError::InvalidCorpus(_))
		));
	}

	#[test]
	fn generate_uses_extended_corpus() {
		let words = Words::with_extended(
			["fedora"].into_iter().collect(),
			["archlinux"].into_iter().collect(),
		);
		let mut params = params(2, " ", 64, 4);
		params.use_extended_corpus = true;

		let passphrase = Generator::new().generate(&words, &params).unwrap();
		assert!(passphrase.starts_with("Archlinux archlinux"), "{passphrase}");
	}

	#[test]
	fn generator_uses_injected_symbols() {
		let mut policy = PassphrasePolicy::new();
		policy.set_symbols(["+"]).unwrap();
		let generator = Generator::with_policy(policy).unwrap();

		let passphrase = generator.generate(&test_words(), &params(2, " ", 64, 4)).unwrap();
		assert!(passphrase.ends_with('+'), "{passphrase}");
		assert!(generator.validate(&passphrase, &params(2, " ", 64, 4)));
		assert!(!Generator::new().validate(&passphrase, &params(2, " ", 64, 4)));
	}

	#[test]
	fn batch_returns_requested_count() {
		let words = test_words();
		let params = params(4, " ", 64, 4);
		let generator = Generator::new();

		let results = generator.generate_batch(&words, &params, 50);
		assert_eq!(results.len(), 50);
		for result in results {
			let passphrase = result.unwrap();
			assert!(generator.validate(&passphrase, &params), "{passphrase}");
		}

		assert!(generator.generate_batch(&words, &params, 0).is_empty());
	}

	#[test]
	fn batch_keeps_failures_independent() {
		let results = Generator::new().generate_batch(&test_words(), &params(90, " ", 10, 4), 3);
		assert_eq!(results.len(), 3);
		assert!(results.iter().all(|r| matches!(r, Err(e) if e.is_unsatisfiable())));
	}

	#[test]
	fn capitalize_first_only_touches_first_character() {
		assert_eq!(capitalize_first("fedora debian"), "Fedora debian");
		assert_eq!(capitalize_first("Fedora"), "Fedora");
		assert_eq!(capitalize_first("éclair"), "Éclair");
		assert_eq!(capitalize_first(""), "");
	}
}
