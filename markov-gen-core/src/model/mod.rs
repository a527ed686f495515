//! Top-level module for the Markov chain.
//!
//! Leaves first:
//! - Text to tokens and back (`tokenizer`)
//! - Token interning (`vocabulary`)
//! - Fixed-width token windows (`ngram`)
//! - Occurrence and transition counting (`frequency`)
//! - Normalized transition graph (`graph`, `state`)
//! - Weighted sampling and recombination (`sampler`)
//! - Generation loop (`generator`)
//! - The trained model tying it together (`markov_model`)

/// Splits text into word and punctuation tokens, and joins them back.
pub mod tokenizer;

/// Interns token strings into compact `TokenId`s.
pub mod vocabulary;

/// Fixed-length token windows used as chain states.
pub mod ngram;

/// N-gram occurrence counts and the transition count table.
pub mod frequency;

/// A single source state and its normalized outgoing transitions.
pub mod state;

/// The Markov graph: source n-gram to destination probabilities.
pub mod graph;

/// Weighted next-state sampling and n-gram recombination.
pub mod sampler;

/// Iterative generation to a target length.
pub mod generator;

/// Trained model: vocabulary, n-gram frequencies and transition graph.
pub mod markov_model;
