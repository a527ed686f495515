use std::io;

use thiserror::Error;

/// Errors raised while training a model or generating from it.
#[derive(Debug, Error)]
pub enum MarkovError {
	/// A caller-supplied value violates a precondition.
	///
	/// `argument` names the offending input and `reason` the constraint.
	#[error("invalid argument `{argument}`: {reason}")]
	InvalidArgument { argument: &'static str, reason: String },

	/// Sampling reached a state without outgoing transitions
	/// while the dead-end policy asked to fail.
	#[error("dead end: state \"{state}\" has no outgoing transitions")]
	DeadEnd { state: String },

	/// Generation needed more sampling steps than allowed.
	#[error("generation exceeded the limit of {limit} steps")]
	StepLimit { limit: usize },

	#[error("io error: {0}")]
	Io(#[from] io::Error),

	#[error("persist error: {0}")]
	Persist(#[from] postcard::Error),

	#[error("export error: {0}")]
	Export(#[from] csv::Error),
}

impl MarkovError {
	pub(crate) fn invalid(argument: &'static str, reason: impl Into<String>) -> Self {
		Self::InvalidArgument { argument, reason: reason.into() }
	}

	/// Returns `true` for errors caused by bad caller input.
	pub fn is_invalid_argument(&self) -> bool {
		matches!(self, Self::InvalidArgument { .. })
	}
}

pub type Result<T> = std::result::Result<T, MarkovError>;
