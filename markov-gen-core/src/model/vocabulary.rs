use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ngram::NGram;
use crate::error::{MarkovError, Result};

/// Compact identifier of an interned token.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(u32);

impl TokenId {
	pub fn index(self) -> usize {
		self.0 as usize
	}
}

impl fmt::Display for TokenId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Bidirectional mapping between token strings and `TokenId`s.
///
/// Ids are assigned densely in first-seen order, so the same token stream
/// always produces the same ids.
///
/// Only the token list is serialized; the reverse index is rebuilt on load.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
	tokens: Vec<String>,
	ids: HashMap<String, TokenId>,
}

impl Vocabulary {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the id of `token`, assigning a new one if unseen.
	///
	/// # Errors
	/// Returns an error once more than `u32::MAX` distinct tokens are interned.
	pub fn intern(&mut self, token: &str) -> Result<TokenId> {
		if let Some(id) = self.ids.get(token) {
			return Ok(*id);
		}
		let id = u32::try_from(self.tokens.len())
			.map(TokenId)
			.map_err(|_| MarkovError::invalid("corpus", "too many distinct tokens"))?;
		self.tokens.push(token.to_owned());
		self.ids.insert(token.to_owned(), id);
		Ok(id)
	}

	/// Interns a whole token sequence.
	pub fn encode<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<Vec<TokenId>> {
		tokens.iter().map(|token| self.intern(token.as_ref())).collect()
	}

	/// Looks up the id of an already known token.
	pub fn get(&self, token: &str) -> Option<TokenId> {
		self.ids.get(token).copied()
	}

	/// Returns the text of a token id.
	pub fn resolve(&self, id: TokenId) -> Option<&str> {
		self.tokens.get(id.index()).map(String::as_str)
	}

	/// Resolves a sequence of ids, skipping unknown ones.
	pub fn decode(&self, ids: &[TokenId]) -> Vec<&str> {
		ids.iter().filter_map(|id| self.resolve(*id)).collect()
	}

	/// Renders an n-gram as its tokens separated by single spaces.
	pub fn render(&self, ngram: &NGram) -> String {
		self.decode(ngram.tokens()).join(" ")
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}
}

impl From<Vec<String>> for Vocabulary {
	fn from(tokens: Vec<String>) -> Self {
		let ids = tokens
			.iter()
			.enumerate()
			.map(|(index, token)| (token.clone(), TokenId(index as u32)))
			.collect();
		Self { tokens, ids }
	}
}

impl From<Vocabulary> for Vec<String> {
	fn from(vocabulary: Vocabulary) -> Self {
		vocabulary.tokens
	}
}
