use std::collections::HashMap;

use rand::Rng;
use rand::seq::IndexedRandom;

use serde::{Deserialize, Serialize};

use super::frequency::TransitionCounts;
use super::ngram::NGram;
use super::state::{State, Transition};

/// The Markov graph: each source n-gram maps to a probability distribution
/// over the n-grams that followed it.
///
/// # Responsibilities
/// - Normalize transition counts per source
/// - Look up a state's outgoing transitions
/// - Pick a random source to start or restart generation
///
/// # Invariants
/// - Every stored state has at least one outgoing transition
/// - N-grams that were never followed by anything are absent (terminal states)
/// - States keep the first-seen order of their sources
///
/// The graph is read-only once built. Only the ordered state list is
/// serialized; the lookup index is rebuilt on load.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(from = "Vec<State>", into = "Vec<State>")]
pub struct MarkovGraph {
	states: Vec<State>,
	index: HashMap<NGram, usize>,
}

/// Builds the graph of an n-gram sequence.
///
/// Counts each consecutive `(ngrams[i], ngrams[i + 1])` pair, then turns the
/// counts of every source into probabilities. The result depends only on the
/// input sequence.
pub fn build_graph(ngrams: &[NGram]) -> MarkovGraph {
	MarkovGraph::from_counts(TransitionCounts::from_ngrams(ngrams))
}

impl MarkovGraph {
	/// Normalizes a transition count table.
	pub fn from_counts(counts: TransitionCounts) -> Self {
		let states: Vec<State> = counts
			.into_sources()
			.map(|(source, targets)| State::from_counts(source, targets))
			.collect();
		Self::from(states)
	}

	/// The state of `ngram`, or `None` if it is terminal or unknown.
	pub fn state(&self, ngram: &NGram) -> Option<&State> {
		self.index.get(ngram).map(|&slot| &self.states[slot])
	}

	/// Outgoing transitions of `ngram`; empty for terminal states.
	pub fn transitions(&self, ngram: &NGram) -> &[Transition] {
		self.state(ngram).map(State::transitions).unwrap_or_default()
	}

	/// Probability of moving from `source` to `target`.
	pub fn probability(&self, source: &NGram, target: &NGram) -> Option<f64> {
		self.transitions(source)
			.iter()
			.find(|transition| &transition.target == target)
			.map(|transition| transition.probability)
	}

	/// Returns `true` if `ngram` has no outgoing transition.
	pub fn is_terminal(&self, ngram: &NGram) -> bool {
		!self.index.contains_key(ngram)
	}

	/// States with outgoing transitions, in first-seen order.
	pub fn states(&self) -> impl Iterator<Item = &State> {
		self.states.iter()
	}

	/// Every edge as `(source, transition)`, in first-seen order.
	pub fn edges(&self) -> impl Iterator<Item = (&NGram, &Transition)> {
		self.states
			.iter()
			.flat_map(|state| state.transitions().iter().map(move |t| (state.key(), t)))
	}

	/// Number of source states.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	pub fn edge_count(&self) -> usize {
		self.states.iter().map(|state| state.transitions().len()).sum()
	}

	/// Uniformly picks a source state that has outgoing transitions.
	///
	/// Returns `None` if the graph is empty.
	pub fn random_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&NGram> {
		self.states.choose(rng).map(State::key)
	}
}

impl From<Vec<State>> for MarkovGraph {
	fn from(states: Vec<State>) -> Self {
		let index = states
			.iter()
			.enumerate()
			.map(|(slot, state)| (state.key().clone(), slot))
			.collect();
		Self { states, index }
	}
}

impl From<MarkovGraph> for Vec<State> {
	fn from(graph: MarkovGraph) -> Self {
		graph.states
	}
}
