use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ngram::NGram;

/// Occurrence count of every distinct n-gram of a corpus.
///
/// Entries keep first-seen order, which also breaks ties in `most_common`.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(from = "Vec<(NGram, usize)>", into = "Vec<(NGram, usize)>")]
pub struct NGramFrequency {
	entries: Vec<(NGram, usize)>,
	index: HashMap<NGram, usize>,
	total: usize,
}

impl NGramFrequency {
	/// Counts each n-gram of the sequence.
	pub fn from_ngrams(ngrams: &[NGram]) -> Self {
		let mut frequency = Self::default();
		for ngram in ngrams {
			match frequency.index.get(ngram) {
				Some(&slot) => frequency.entries[slot].1 += 1,
				None => {
					frequency.index.insert(ngram.clone(), frequency.entries.len());
					frequency.entries.push((ngram.clone(), 1));
				}
			}
			frequency.total += 1;
		}
		frequency
	}

	/// Number of times `ngram` occurs.
	pub fn count(&self, ngram: &NGram) -> usize {
		self.index.get(ngram).map_or(0, |&slot| self.entries[slot].1)
	}

	/// Total number of n-grams counted (with repetition).
	pub fn total(&self) -> usize {
		self.total
	}

	/// Number of distinct n-grams.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Distinct n-grams with their counts, in first-seen order.
	pub fn iter(&self) -> impl Iterator<Item = (&NGram, usize)> {
		self.entries.iter().map(|(ngram, count)| (ngram, *count))
	}

	/// The `k` most frequent n-grams, highest first.
	pub fn most_common(&self, k: usize) -> Vec<(&NGram, usize)> {
		let mut ranked: Vec<(&NGram, usize)> = self.iter().collect();
		// Stable sort keeps first-seen order among equal counts
		ranked.sort_by(|a, b| b.1.cmp(&a.1));
		ranked.truncate(k);
		ranked
	}

	/// Unconditional probability of each n-gram: its count over the total.
	pub fn probabilities(&self) -> Vec<(&NGram, f64)> {
		let total = self.total as f64;
		self.iter().map(|(ngram, count)| (ngram, count as f64 / total)).collect()
	}
}

impl From<Vec<(NGram, usize)>> for NGramFrequency {
	fn from(entries: Vec<(NGram, usize)>) -> Self {
		let index = entries
			.iter()
			.enumerate()
			.map(|(slot, (ngram, _))| (ngram.clone(), slot))
			.collect();
		let total = entries.iter().map(|(_, count)| count).sum();
		Self { entries, index, total }
	}
}

impl From<NGramFrequency> for Vec<(NGram, usize)> {
	fn from(frequency: NGramFrequency) -> Self {
		frequency.entries
	}
}

/// Outgoing counts of one source n-gram.
#[derive(Clone, Debug)]
struct SourceCounts {
	source: NGram,
	targets: Vec<(NGram, usize)>,
	index: HashMap<NGram, usize>,
}

impl SourceCounts {
	fn new(source: NGram) -> Self {
		Self { source, targets: Vec::new(), index: HashMap::new() }
	}

	fn increment(&mut self, target: &NGram) {
		match self.index.get(target) {
			Some(&slot) => self.targets[slot].1 += 1,
			None => {
				self.index.insert(target.clone(), self.targets.len());
				self.targets.push((target.clone(), 1));
			}
		}
	}
}

/// Two-level transition count table: source n-gram, then destination n-gram.
///
/// Built from consecutive n-gram pairs. Sources and their destinations are
/// created lazily and kept in first-seen order so that later normalization
/// visits them in a reproducible order.
///
/// # Invariants
/// - Every stored count is >= 1
/// - A source appears only if it was followed by at least one n-gram
#[derive(Clone, Debug, Default)]
pub struct TransitionCounts {
	sources: Vec<SourceCounts>,
	index: HashMap<NGram, usize>,
}

impl TransitionCounts {
	/// Counts every `(ngrams[i], ngrams[i + 1])` pair.
	pub fn from_ngrams(ngrams: &[NGram]) -> Self {
		let mut counts = Self::default();
		for pair in ngrams.windows(2) {
			counts.increment(&pair[0], &pair[1]);
		}
		counts
	}

	fn increment(&mut self, source: &NGram, target: &NGram) {
		let slot = match self.index.get(source) {
			Some(&slot) => slot,
			None => {
				self.index.insert(source.clone(), self.sources.len());
				self.sources.push(SourceCounts::new(source.clone()));
				self.sources.len() - 1
			}
		};
		self.sources[slot].increment(target);
	}

	/// Number of observed `source -> target` transitions.
	pub fn count(&self, source: &NGram, target: &NGram) -> usize {
		self.index
			.get(source)
			.map(|&slot| &self.sources[slot])
			.and_then(|counts| counts.index.get(target).map(|&t| counts.targets[t].1))
			.unwrap_or(0)
	}

	/// Total number of transitions leaving `source`.
	pub fn total(&self, source: &NGram) -> usize {
		self.index
			.get(source)
			.map_or(0, |&slot| self.sources[slot].targets.iter().map(|(_, c)| c).sum())
	}

	/// Number of sources with at least one outgoing transition.
	pub fn len(&self) -> usize {
		self.sources.len()
	}

	pub fn is_empty(&self) -> bool {
		self.sources.is_empty()
	}

	/// Consumes the table, yielding each source with its destination counts.
	pub(crate) fn into_sources(self) -> impl Iterator<Item = (NGram, Vec<(NGram, usize)>)> {
		self.sources.into_iter().map(|counts| (counts.source, counts.targets))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::ngram::extract_ngrams;
	use crate::model::vocabulary::Vocabulary;

	fn bigrams(words: &[&str]) -> Vec<NGram> {
		let mut vocabulary = Vocabulary::new();
		let ids = vocabulary.encode(words).unwrap();
		extract_ngrams(&ids, 2).unwrap()
	}

	#[test]
	fn counts_repeated_ngrams() {
		let ngrams = bigrams(&["a", "b", "a", "b", "c"]);
		let frequency = NGramFrequency::from_ngrams(&ngrams);
		assert_eq!(frequency.total(), 4);
		assert_eq!(frequency.len(), 3);
		assert_eq!(frequency.count(&ngrams[0]), 2);
		assert_eq!(frequency.count(&ngrams[1]), 1);
	}

	#[test]
	fn most_common_breaks_ties_by_first_seen() {
		// (a b) x2, (b a) x1, (b c) x1
		let ngrams = bigrams(&["a", "b", "a", "b", "c"]);
		let frequency = NGramFrequency::from_ngrams(&ngrams);
		let top = frequency.most_common(2);
		assert_eq!(top, vec![(&ngrams[0], 2), (&ngrams[1], 1)]);
		assert_eq!(frequency.most_common(10).len(), 3);
	}

	#[test]
	fn probabilities_sum_to_one() {
		let ngrams = bigrams(&["a", "b", "a", "b", "c", "a"]);
		let frequency = NGramFrequency::from_ngrams(&ngrams);
		let sum: f64 = frequency.probabilities().iter().map(|(_, p)| p).sum();
		assert!((sum - 1.0).abs() < 1e-9);
	}

	#[test]
	fn transition_counts_follow_consecutive_pairs() {
		// (a b) -> (b a) -> (a b) -> (b c)
		let ngrams = bigrams(&["a", "b", "a", "b", "c"]);
		let counts = TransitionCounts::from_ngrams(&ngrams);
		assert_eq!(counts.len(), 2);
		assert_eq!(counts.count(&ngrams[0], &ngrams[1]), 1);
		assert_eq!(counts.count(&ngrams[0], &ngrams[3]), 1);
		assert_eq!(counts.total(&ngrams[0]), 2);
		assert_eq!(counts.count(&ngrams[3], &ngrams[0]), 0);
		assert_eq!(counts.total(&ngrams[3]), 0);
	}

	#[test]
	fn single_ngram_has_no_transitions() {
		let ngrams = bigrams(&["a", "b"]);
		assert!(TransitionCounts::from_ngrams(&ngrams).is_empty());
	}
}
