use markov_gen_core::model::graph::build_graph;
use markov_gen_core::model::ngram::{NGram, extract_ngrams};
use markov_gen_core::model::sampler::{Sample, sample_next};
use markov_gen_core::model::tokenizer::{detokenize, tokenize};
use markov_gen_core::model::vocabulary::Vocabulary;
use markov_gen_core::{DeadEndPolicy, GenerationConfig, MarkovError, MarkovModel, Outcome, StartState};
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

const CORPUS: &str = "the cat sat. the dog sat.";

const LONGER: &str = "It was on a dreary night of November that I beheld the accomplishment of my toils. \
	With an anxiety that almost amounted to agony, I collected the instruments of life around me, \
	that I might infuse a spark of being into the lifeless thing that lay at my feet. \
	It was already one in the morning; the rain pattered dismally against the panes, \
	and my candle was nearly burnt out, when, by the glimmer of the half-extinguished light, \
	I saw the dull yellow eye of the creature open.";

fn bigram(model: &MarkovModel, text: &str) -> NGram {
	model.parse_state(text).unwrap()
}

#[test]
fn cat_and_dog_tokens_and_bigrams() {
	let tokens = tokenize(CORPUS);
	assert_eq!(tokens, vec!["the", "cat", "sat", ".", "the", "dog", "sat", "."]);

	let mut vocabulary = Vocabulary::new();
	let ids = vocabulary.encode(&tokens).unwrap();
	let rendered: Vec<String> = extract_ngrams(&ids, 2)
		.unwrap()
		.iter()
		.map(|ngram| vocabulary.render(ngram))
		.collect();
	assert_eq!(
		rendered,
		vec!["the cat", "cat sat", "sat .", ". the", "the dog", "dog sat", "sat ."]
	);
}

#[test]
fn cat_and_dog_graph() {
	let model = MarkovModel::train(CORPUS, 2).unwrap();
	let graph = model.graph();

	let the_cat = bigram(&model, "the cat");
	let cat_sat = bigram(&model, "cat sat");
	let sat_dot = bigram(&model, "sat .");
	let dot_the = bigram(&model, ". the");

	assert_eq!(graph.probability(&the_cat, &cat_sat), Some(1.0));
	// "sat ." is followed once by ". the" and is also the final bigram
	assert_eq!(graph.transitions(&sat_dot).len(), 1);
	assert_eq!(graph.probability(&sat_dot, &dot_the), Some(1.0));
	assert_eq!(graph.len(), 6);
	assert_eq!(graph.edge_count(), 6);

	let dog_sat = bigram(&model, "dog sat");
	assert_eq!(graph.probability(&dog_sat, &sat_dot), Some(1.0));
}

#[test]
fn final_only_state_is_terminal() {
	let model = MarkovModel::train("the cat sat. the dog sat. end", 2).unwrap();
	let last = bigram(&model, ". end");
	assert!(model.graph().is_terminal(&last));
	let mut rng = StdRng::seed_from_u64(0);
	assert_eq!(sample_next(&last, model.graph(), &mut rng), Sample::DeadEnd);
}

#[test]
fn graph_building_is_bit_identical() {
	let mut vocabulary = Vocabulary::new();
	let ids = vocabulary.encode(&tokenize(LONGER)).unwrap();
	for n in 1..=3 {
		let ngrams = extract_ngrams(&ids, n).unwrap();
		let first = build_graph(&ngrams);
		let second = build_graph(&ngrams);
		let a: Vec<(NGram, NGram, u64)> = first
			.edges()
			.map(|(s, t)| (s.clone(), t.target.clone(), t.probability.to_bits()))
			.collect();
		let b: Vec<(NGram, NGram, u64)> = second
			.edges()
			.map(|(s, t)| (s.clone(), t.target.clone(), t.probability.to_bits()))
			.collect();
		assert_eq!(a, b);
	}
}

#[test]
fn probabilities_sum_to_one() {
	for n in 1..=4 {
		let model = MarkovModel::train(LONGER, n).unwrap();
		for state in model.graph().states() {
			let sum: f64 = state.transitions().iter().map(|t| t.probability).sum();
			assert!((sum - 1.0).abs() < 1e-9, "n = {n}, sum = {sum}");
		}
	}
}

#[test]
fn seeded_generation_is_reproducible() {
	let model = MarkovModel::train(LONGER, 1).unwrap();
	let config = GenerationConfig {
		target_length: 60,
		dead_end: DeadEndPolicy::Restart,
		seed: Some(2024),
		..Default::default()
	};
	let first = model.generate(&StartState::Random, config.clone()).unwrap();
	let second = model.generate(&StartState::Random, config).unwrap();
	assert_eq!(first.ngrams(), second.ngrams());
	assert_eq!(first.text(), second.text());
}

#[test]
fn generated_chain_recombines_to_expected_length() {
	for n in 1..=3 {
		let model = MarkovModel::train(LONGER, n).unwrap();
		let config = GenerationConfig { target_length: 25, seed: Some(n as u64), ..Default::default() };
		let generation = model.generate(&StartState::Random, config).unwrap();

		for pair in generation.ngrams().windows(2) {
			assert!(model.graph().probability(&pair[0], &pair[1]).is_some());
		}
		let tokens = generation.tokens();
		assert_eq!(tokens.len(), n + generation.ngrams().len() - 1);
		if generation.outcome() == Outcome::Completed {
			assert_eq!(generation.ngrams().len(), 25);
		}
	}
}

#[test]
fn generated_text_retokenizes_to_generated_tokens() {
	let model = MarkovModel::train(LONGER, 2).unwrap();
	let config = GenerationConfig { target_length: 40, seed: Some(11), ..Default::default() };
	let generation = model.generate(&StartState::Random, config).unwrap();
	let expected = model.vocabulary().decode(&generation.tokens());
	assert_eq!(tokenize(generation.text()), expected);
}

#[test]
fn custom_start_must_match_n() {
	let model = MarkovModel::train(CORPUS, 2).unwrap();
	let config = GenerationConfig { target_length: 3, seed: Some(1), ..Default::default() };

	let generation = model.generate(&StartState::Custom("the cat".into()), config.clone()).unwrap();
	assert_eq!(generation.text(), "the cat sat.");

	let err = model.generate(&StartState::Custom("the".into()), config).unwrap_err();
	assert!(err.is_invalid_argument());
}

#[test]
fn n_larger_than_corpus_is_an_error() {
	let err = MarkovModel::train(CORPUS, 100).unwrap_err();
	assert!(err.is_invalid_argument());
	assert!(matches!(err, MarkovError::InvalidArgument { argument: "corpus", .. }));
	assert!(err.to_string().contains("fewer than n = 100"));
}

#[test]
fn detokenized_tokens_survive_retokenizing() {
	let tokens = tokenize(LONGER);
	assert_eq!(tokenize(&detokenize(&tokens)), tokens);
}
