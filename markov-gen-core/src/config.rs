use rand::SeedableRng;
use rand::rngs::StdRng;

use serde::{Deserialize, Serialize};

use crate::error::{MarkovError, Result};

/// Default number of n-grams in a generated chain.
pub const DEFAULT_TARGET_LENGTH: usize = 100;

/// Default cap on sampling steps for one generation run.
pub const DEFAULT_MAX_STEPS: usize = 100_000;

/// What generation does when the current state has no successor.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeadEndPolicy {
	/// End early and report the dead end with the text produced so far.
	#[default]
	Stop,
	/// Abort with `MarkovError::DeadEnd`.
	Fail,
	/// Jump to a random state and keep going as a new segment.
	Restart,
}

/// How the first state of a run is chosen.
///
/// # Variants
/// - `Random`: a uniformly random state with outgoing transitions.
/// - `Custom(String)`: text that must tokenize into exactly `n` known tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StartState {
	#[default]
	Random,
	Custom(String),
}

/// Parameters of one generation run.
///
/// # Invariants (checked by `validate`)
/// - `target_length` >= 1 (the start state counts as the first entry)
/// - `max_steps` >= 1
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationConfig {
	/// Number of n-grams to accumulate, start state included.
	pub target_length: usize,

	/// Maximum number of sampling steps before giving up.
	pub max_steps: usize,

	/// Behavior on states without outgoing transitions.
	pub dead_end: DeadEndPolicy,

	/// Seed of the random source; `None` seeds from the operating system.
	pub seed: Option<u64>,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self {
			target_length: DEFAULT_TARGET_LENGTH,
			max_steps: DEFAULT_MAX_STEPS,
			dead_end: DeadEndPolicy::default(),
			seed: None,
		}
	}
}

impl GenerationConfig {
	/// Checks the configuration before any sampling happens.
	///
	/// # Errors
	/// Returns `InvalidArgument` naming the offending field.
	pub fn validate(&self) -> Result<()> {
		if self.target_length == 0 {
			return Err(MarkovError::invalid("target_length", "must be at least 1"));
		}
		if self.max_steps == 0 {
			return Err(MarkovError::invalid("max_steps", "must be at least 1"));
		}
		Ok(())
	}

	/// Builds the random source for a run.
	///
	/// A fixed `seed` always produces the same sequence of draws.
	pub fn rng(&self) -> StdRng {
		match self.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		}
	}
}
