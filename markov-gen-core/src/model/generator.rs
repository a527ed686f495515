use log::{debug, warn};
use rand::Rng;

use super::markov_model::MarkovModel;
use super::ngram::NGram;
use super::sampler::{Sample, recombine, sample_next};
use super::vocabulary::TokenId;
use crate::config::{DeadEndPolicy, GenerationConfig, StartState};
use crate::error::{MarkovError, Result};

/// Upper bound on the chain slots reserved before sampling starts.
const PREALLOCATED_NGRAMS: usize = 1024;

/// How a generation run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
	/// The chain reached `target_length` n-grams.
	Completed,
	/// A state without successor stopped the run early.
	DeadEnd,
}

/// The n-gram chain produced by one run, and its text.
#[derive(Clone, Debug)]
pub struct Generation {
	ngrams: Vec<NGram>,
	/// Positions in `ngrams` where a new chain begins (always starts with 0).
	segment_starts: Vec<usize>,
	outcome: Outcome,
	text: String,
}

impl Generation {
	pub fn ngrams(&self) -> &[NGram] {
		&self.ngrams
	}

	pub fn outcome(&self) -> Outcome {
		self.outcome
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	/// Number of random restarts after dead ends.
	pub fn restarts(&self) -> usize {
		self.segment_starts.len().saturating_sub(1)
	}

	/// Recombined token ids of every segment, in order.
	///
	/// Each segment keeps its first n-gram whole, so a run without restarts
	/// has `n + len - 1` tokens.
	pub fn tokens(&self) -> Vec<TokenId> {
		let mut bounds = self.segment_starts.clone();
		bounds.push(self.ngrams.len());
		bounds
			.windows(2)
			.flat_map(|bound| recombine(&self.ngrams[bound[0]..bound[1]]))
			.collect()
	}
}

/// Drives generation over a trained model.
///
/// # Responsibilities
/// - Resolve the start state
/// - Sample successors until the chain holds `target_length` n-grams
/// - Apply the dead-end policy
/// - Bound the run by `max_steps`
///
/// The model is only borrowed; all state of a run lives in the call.
#[derive(Debug)]
pub struct Generator<'a> {
	model: &'a MarkovModel,
	config: GenerationConfig,
}

impl<'a> Generator<'a> {
	pub fn new(model: &'a MarkovModel, config: GenerationConfig) -> Self {
		Self { model, config }
	}

	pub fn config(&self) -> &GenerationConfig {
		&self.config
	}

	/// Generates text with the configured random source.
	pub fn generate(&self, start: &StartState) -> Result<Generation> {
		let mut rng = self.config.rng();
		self.generate_with(start, &mut rng)
	}

	/// Generates text from a start strategy with an explicit random source.
	///
	/// # Errors
	/// - `InvalidArgument` for a bad configuration or custom start
	/// - `DeadEnd` when the policy is `Fail`
	/// - `StepLimit` when `max_steps` is exhausted
	pub fn generate_with<R: Rng + ?Sized>(&self, start: &StartState, rng: &mut R) -> Result<Generation> {
		self.config.validate()?;
		let initial = match start {
			StartState::Random => self
				.model
				.graph()
				.random_state(rng)
				.cloned()
				.ok_or_else(|| MarkovError::invalid("start", "the model has no transitions to start from"))?,
			StartState::Custom(text) => self.model.parse_state(text)?,
		};
		self.generate_from(initial, rng)
	}

	/// Generates a chain starting at `initial`.
	///
	/// `initial` is the first of the `target_length` accumulated n-grams.
	pub fn generate_from<R: Rng + ?Sized>(&self, initial: NGram, rng: &mut R) -> Result<Generation> {
		self.config.validate()?;
		let graph = self.model.graph();

		let mut ngrams = Vec::with_capacity(self.config.target_length.min(PREALLOCATED_NGRAMS));
		let mut segment_starts = vec![0];
		let mut outcome = Outcome::Completed;
		let mut current = initial;
		let mut steps = 0;

		ngrams.push(current.clone());
		while ngrams.len() < self.config.target_length {
			if steps == self.config.max_steps {
				return Err(MarkovError::StepLimit { limit: self.config.max_steps });
			}
			steps += 1;

			current = match sample_next(&current, graph, rng) {
				Sample::Sampled(next) => next,
				Sample::DeadEnd => match self.config.dead_end {
					DeadEndPolicy::Stop => {
						warn!("Dead end at \"{}\" after {} n-grams", self.model.render(&current), ngrams.len());
						outcome = Outcome::DeadEnd;
						break;
					}
					DeadEndPolicy::Fail => {
						return Err(MarkovError::DeadEnd { state: self.model.render(&current) });
					}
					DeadEndPolicy::Restart => match graph.random_state(rng) {
						Some(state) => {
							debug!("Dead end at \"{}\", restarting from \"{}\"", self.model.render(&current), self.model.render(state));
							segment_starts.push(ngrams.len());
							state.clone()
						}
						None => {
							warn!("Dead end at \"{}\" and nothing to restart from", self.model.render(&current));
							outcome = Outcome::DeadEnd;
							break;
						}
					},
				},
			};
			ngrams.push(current.clone());
		}

		let mut generation = Generation { ngrams, segment_starts, outcome, text: String::new() };
		generation.text = self.model.detokenize(&generation.tokens());
		debug!("Generated {} n-grams in {} steps ({:?})", generation.ngrams.len(), steps, generation.outcome);
		Ok(generation)
	}
}
