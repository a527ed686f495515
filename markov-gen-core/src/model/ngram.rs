use std::fmt;

use serde::{Deserialize, Serialize};

use super::vocabulary::TokenId;
use crate::error::{MarkovError, Result};

/// An ordered window of exactly `n` tokens.
///
/// N-grams are graph nodes and map keys: equality, hashing and ordering are
/// all by value over the token ids.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NGram(Box<[TokenId]>);

impl NGram {
	pub fn tokens(&self) -> &[TokenId] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn first(&self) -> Option<TokenId> {
		self.0.first().copied()
	}

	/// The trailing token, the only one a successor adds to the text.
	pub fn last(&self) -> Option<TokenId> {
		self.0.last().copied()
	}
}

impl From<&[TokenId]> for NGram {
	fn from(tokens: &[TokenId]) -> Self {
		Self(tokens.into())
	}
}

impl From<Vec<TokenId>> for NGram {
	fn from(tokens: Vec<TokenId>) -> Self {
		Self(tokens.into_boxed_slice())
	}
}

impl fmt::Display for NGram {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "(")?;
		for (i, token) in self.0.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{token}")?;
		}
		write!(f, ")")
	}
}

/// Slides a window of width `n` over `tokens`, one token at a time.
///
/// Produces `max(0, len - n + 1)` n-grams in left-to-right order; a sequence
/// shorter than `n` yields no n-gram at all.
///
/// # Errors
/// Returns an error if `n` is zero.
pub fn extract_ngrams(tokens: &[TokenId], n: usize) -> Result<Vec<NGram>> {
	if n == 0 {
		return Err(MarkovError::invalid("n", "must be a positive integer"));
	}
	Ok(tokens.windows(n).map(NGram::from).collect())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::vocabulary::Vocabulary;

	fn ids(words: &[&str]) -> Vec<TokenId> {
		let mut vocabulary = Vocabulary::new();
		vocabulary.encode(words).unwrap()
	}

	#[test]
	fn produces_overlapping_windows() {
		let tokens = ids(&["a", "b", "c", "d"]);
		let ngrams = extract_ngrams(&tokens, 2).unwrap();
		assert_eq!(ngrams.len(), 3);
		for (i, ngram) in ngrams.iter().enumerate() {
			assert_eq!(ngram.tokens(), &tokens[i..i + 2]);
		}
	}

	#[test]
	fn window_count_matches_length_for_every_n() {
		let tokens = ids(&["the", "cat", "sat", ".", "the", "dog", "sat", "."]);
		for n in 1..=tokens.len() {
			let ngrams = extract_ngrams(&tokens, n).unwrap();
			assert_eq!(ngrams.len(), tokens.len() - n + 1);
			assert!(ngrams.iter().all(|ngram| ngram.len() == n));
		}
	}

	#[test]
	fn short_input_gives_no_ngrams() {
		let tokens = ids(&["a", "b"]);
		assert!(extract_ngrams(&tokens, 3).unwrap().is_empty());
		assert!(extract_ngrams(&[], 1).unwrap().is_empty());
	}

	#[test]
	fn zero_width_is_rejected() {
		let err = extract_ngrams(&ids(&["a"]), 0).unwrap_err();
		assert!(err.is_invalid_argument());
	}

	#[test]
	fn equality_is_by_value() {
		let tokens = ids(&["x", "y", "x", "y"]);
		let ngrams = extract_ngrams(&tokens, 2).unwrap();
		assert_eq!(ngrams[0], ngrams[2]);
		assert_ne!(ngrams[0], ngrams[1]);
	}
}
