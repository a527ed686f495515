use rand::Rng;

use super::graph::MarkovGraph;
use super::ngram::NGram;
use super::vocabulary::TokenId;

/// Result of one sampling step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sample {
	/// The next state, drawn from the current state's distribution.
	Sampled(NGram),
	/// The current state has no outgoing transition.
	DeadEnd,
}

/// Draws the successor of `current` from `graph`.
///
/// Each destination is chosen with probability proportional to its observed
/// count. States missing from the graph are dead ends; what to do next is up
/// to the caller.
pub fn sample_next<R: Rng + ?Sized>(current: &NGram, graph: &MarkovGraph, rng: &mut R) -> Sample {
	match graph.state(current).and_then(|state| state.predict(rng)) {
		Some(next) => Sample::Sampled(next.clone()),
		None => Sample::DeadEnd,
	}
}

/// Flattens a chain of overlapping n-grams back into tokens.
///
/// Keeps every token of the first n-gram, then only the last token of each
/// following one, since consecutive states share all but one position.
/// A chain of `k` n-grams of width `n` gives `n + k - 1` tokens.
pub fn recombine(ngrams: &[NGram]) -> Vec<TokenId> {
	let Some((first, rest)) = ngrams.split_first() else {
		return Vec::new();
	};
	let mut tokens = first.tokens().to_vec();
	tokens.extend(rest.iter().filter_map(NGram::last));
	tokens
}
