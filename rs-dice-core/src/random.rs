use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::error::{GenerationError, Result};

/// Source of uniformly distributed integers.
///
/// Implementations take `&self` so a single source can be shared by
/// concurrent generation calls.
pub trait RandomSource {
	/// Returns a uniformly distributed integer in `[0, m)`.
	///
	/// # Errors
	/// - `EmptyRange` if `m == 0`.
	/// - `Entropy` if the underlying source fails.
	fn random_int(&self, m: usize) -> Result<usize>;
}

/// Randomness provider drawing from the operating system CSPRNG.
///
/// Values are rejection-sampled, so every integer of the range is equally
/// likely. Entropy failures are reported, never replaced by a fixed value.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
	fn random_int(&self, m: usize) -> Result<usize> {
		if m == 0 {
			return Err(GenerationError::EmptyRange);
		}
		let m = m as u64;
		// Draws below 2^64 mod m would favour the low residues
		let threshold = m.wrapping_neg() % m;
		loop {
			let value = OsRng
				.try_next_u64()
				.map_err(|e| GenerationError::Entropy(e.to_string()))?;
			if value >= threshold {
				return Ok((value % m) as usize);
			}
		}
	}
}
