//! N-gram Markov text generation library.
//!
//! This crate provides a word-level n-gram Markov chain including:
//! - Tokenization of raw text into words and punctuation (and back)
//! - N-gram extraction and frequency counting
//! - A normalized transition graph built from a corpus
//! - Reproducible weighted-random generation with explicit dead-end handling
//! - Collaborators for corpus loading, model caching, edge export and graph statistics
//!
//! The trained `MarkovModel` is immutable and can be shared between threads;
//! every generation run keeps its own state and random source.

/// Core model: tokens, n-grams, counting, graph and generation.
pub mod model;

/// Generation parameters (target length, step cap, dead-end policy, seed).
pub mod config;

/// Error type shared by the whole crate.
pub mod error;

/// Corpus loading and postcard model cache.
pub mod io;

/// CSV export of the graph edges.
pub mod export;

/// Structural statistics of the transition graph.
pub mod stats;

pub use config::{DeadEndPolicy, GenerationConfig, StartState};
pub use error::{MarkovError, Result};
pub use model::generator::{Generation, Generator, Outcome};
pub use model::markov_model::MarkovModel;
