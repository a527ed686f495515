use log::{debug, info};

use serde::{Deserialize, Serialize};

use super::frequency::NGramFrequency;
use super::generator::{Generation, Generator};
use super::graph::{MarkovGraph, build_graph};
use super::ngram::{NGram, extract_ngrams};
use super::tokenizer::{detokenize, tokenize};
use super::vocabulary::{TokenId, Vocabulary};
use crate::config::{GenerationConfig, StartState};
use crate::error::{MarkovError, Result};

/// A word-level n-gram Markov model trained on one corpus.
///
/// This struct owns:
/// - `n`: the number of tokens per state
/// - `vocabulary`: the interned tokens of the corpus
/// - `frequency`: how often each n-gram occurs
/// - `graph`: the normalized transitions between consecutive n-grams
///
/// The model is built once and never mutated afterwards, so a shared
/// reference can serve any number of concurrent generation runs.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MarkovModel {
	n: usize,
	vocabulary: Vocabulary,
	frequency: NGramFrequency,
	graph: MarkovGraph,
}

impl MarkovModel {
	/// Trains a model on `corpus` with states of `n` tokens.
	///
	/// # Errors
	/// Returns `InvalidArgument` if:
	/// - `n` is zero
	/// - the corpus is empty or contains no token
	/// - the corpus has fewer than `n` tokens
	pub fn train(corpus: &str, n: usize) -> Result<Self> {
		if n == 0 {
			return Err(MarkovError::invalid("n", "must be a positive integer"));
		}
		if corpus.is_empty() {
			return Err(MarkovError::invalid("corpus", "must not be empty"));
		}

		let tokens = tokenize(corpus);
		if tokens.is_empty() {
			return Err(MarkovError::invalid("corpus", "contains no word or punctuation token"));
		}
		if tokens.len() < n {
			return Err(MarkovError::invalid(
				"corpus",
				format!("has {} tokens, fewer than n = {n}", tokens.len()),
			));
		}

		let mut vocabulary = Vocabulary::new();
		let ids = vocabulary.encode(&tokens)?;
		let ngrams = extract_ngrams(&ids, n)?;
		debug!("Extracted {} {}-grams from {} tokens", ngrams.len(), n, tokens.len());

		let frequency = NGramFrequency::from_ngrams(&ngrams);
		let graph = build_graph(&ngrams);
		info!(
			"Trained {}-gram model: {} tokens, {} distinct n-grams, {} states, {} edges",
			n,
			vocabulary.len(),
			frequency.len(),
			graph.len(),
			graph.edge_count()
		);

		Ok(Self { n, vocabulary, frequency, graph })
	}

	pub fn n(&self) -> usize {
		self.n
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	pub fn frequency(&self) -> &NGramFrequency {
		&self.frequency
	}

	pub fn graph(&self) -> &MarkovGraph {
		&self.graph
	}

	/// Renders an n-gram as its tokens separated by spaces.
	pub fn render(&self, ngram: &NGram) -> String {
		self.vocabulary.render(ngram)
	}

	/// Turns token ids back into text.
	pub fn detokenize(&self, ids: &[TokenId]) -> String {
		detokenize(&self.vocabulary.decode(ids))
	}

	/// Parses text into a state of this model.
	///
	/// # Errors
	/// Returns `InvalidArgument` if the text does not tokenize into exactly
	/// `n` tokens, or uses a token absent from the corpus.
	pub fn parse_state(&self, text: &str) -> Result<NGram> {
		let tokens = tokenize(text);
		if tokens.len() != self.n {
			return Err(MarkovError::invalid(
				"start",
				format!("\"{text}\" has {} tokens, expected {}", tokens.len(), self.n),
			));
		}
		tokens
			.iter()
			.map(|token| {
				self.vocabulary
					.get(token)
					.ok_or_else(|| MarkovError::invalid("start", format!("unknown token \"{token}\"")))
			})
			.collect::<Result<Vec<_>>>()
			.map(NGram::from)
	}

	/// The `k` most frequent n-grams as text, highest first.
	pub fn most_common(&self, k: usize) -> Vec<(String, usize)> {
		self.frequency
			.most_common(k)
			.into_iter()
			.map(|(ngram, count)| (self.render(ngram), count))
			.collect()
	}

	/// Creates a generator bound to this model.
	pub fn generator(&self, config: GenerationConfig) -> Generator<'_> {
		Generator::new(self, config)
	}

	/// Runs one generation with the configured random source.
	pub fn generate(&self, start: &StartState, config: GenerationConfig) -> Result<Generation> {
		self.generator(config).generate(start)
	}
}
