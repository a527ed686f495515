use rand::Rng;

use serde::{Deserialize, Serialize};

use super::ngram::NGram;

/// One outgoing edge of a state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Transition {
	/// Destination n-gram.
	pub target: NGram,
	/// How many times this transition was observed.
	pub count: usize,
	/// `count` divided by the total outgoing count of the source.
	pub probability: f64,
}

/// Represents a source state of the Markov graph.
///
/// A `State` corresponds to one n-gram (`key`) and stores every observed
/// transition from it to the next n-gram, with both the raw count and the
/// normalized probability.
///
/// ## Invariants
/// - `transitions` is non-empty and in first-seen order
/// - Each count is strictly positive and `total` is their sum
/// - Probabilities sum to 1.0 within floating-point tolerance
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct State {
	/// The source n-gram.
	key: NGram,
	/// Outgoing transitions.
	transitions: Vec<Transition>,
	/// Sum of all transition counts.
	total: usize,
}

impl State {
	/// Normalizes raw destination counts into a state.
	///
	/// The total is an exact integer sum, so every probability is computed
	/// the same way regardless of how the counts were gathered.
	pub(crate) fn from_counts(key: NGram, counts: Vec<(NGram, usize)>) -> Self {
		let total: usize = counts.iter().map(|(_, count)| count).sum();
		let transitions = counts
			.into_iter()
			.map(|(target, count)| Transition {
				target,
				count,
				probability: count as f64 / total as f64,
			})
			.collect();
		Self { key, transitions, total }
	}

	pub fn key(&self) -> &NGram {
		&self.key
	}

	pub fn transitions(&self) -> &[Transition] {
		&self.transitions
	}

	pub fn total(&self) -> usize {
		self.total
	}

	/// Picks the next n-gram using weighted random sampling.
	///
	/// The probability of selecting a destination is proportional to its
	/// occurrence count. This performs:
	/// - a draw in `0..total`
	/// - a cumulative subtraction to select a bucket
	///
	/// Returns `None` if the state has no transitions.
	pub fn predict<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&NGram> {
		if self.total == 0 {
			return None;
		}

		let mut r = rng.random_range(0..self.total);
		for transition in &self.transitions {
			if r < transition.count {
				return Some(&transition.target);
			}
			r -= transition.count;
		}

		// Unreachable while `total` is the sum of the counts
		self.transitions.last().map(|transition| &transition.target)
	}
}
