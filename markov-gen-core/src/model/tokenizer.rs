use std::sync::LazyLock;

use regex::Regex;

/// A run of word characters, or a single ASCII punctuation character.
static TOKEN_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\w+|[[:punct:]]").expect("token pattern must compile"));

/// Splits `text` into word and punctuation tokens.
///
/// - One or more consecutive word characters form one token
/// - Each ASCII punctuation character is its own token
/// - Everything else (whitespace, other symbols) separates tokens
///
/// Tokens borrow from `text`.
pub fn tokenize(text: &str) -> Vec<&str> {
	TOKEN_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Returns `true` if `c` is a punctuation character that never belongs to a word.
///
/// `_` is ASCII punctuation but also a word character, so it is excluded.
pub fn is_punctuation_char(c: char) -> bool {
	c.is_ascii_punctuation() && c != '_'
}

/// Returns `true` if `token` is a single punctuation token.
pub fn is_punctuation(token: &str) -> bool {
	let mut chars = token.chars();
	matches!((chars.next(), chars.next()), (Some(c), None) if is_punctuation_char(c))
}

/// Joins tokens back into text.
///
/// Punctuation is glued to whatever precedes it. Any other token gets a single
/// space in front, unless the text is empty or already ends with whitespace or
/// punctuation.
///
/// This is an approximation: original spacing is not restored, but
/// tokenizing the result yields the same tokens in the same order.
pub fn detokenize<S: AsRef<str>>(tokens: &[S]) -> String {
	let mut text = String::new();
	for token in tokens {
		let token = token.as_ref();
		if !is_punctuation(token) {
			if let Some(last) = text.chars().next_back() {
				if !last.is_whitespace() && !is_punctuation_char(last) {
					text.push(' ');
				}
			}
		}
		text.push_str(token);
	}
	text
}
