use std::error::Error;
use std::path::PathBuf;
use std::thread;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, warn};
use reqwest::blocking::Client;

use markov_gen_core::config::DEFAULT_MAX_STEPS;
use markov_gen_core::export::export_edges;
use markov_gen_core::io::load_or_train;
use markov_gen_core::stats::GraphStats;
use markov_gen_core::{DeadEndPolicy, Generation, GenerationConfig, MarkovModel, Outcome, StartState};

use crate::fetch::{CatalogQuery, fetch_corpus};

mod fetch;

/// Train a word n-gram Markov chain on a text corpus and generate text from it.
#[derive(Parser, Debug)]
#[command(name = "markov-gen", version)]
struct Cli {
    /// Text corpus to train on (the file written by `fetch`)
    corpus: PathBuf,

    /// Number of tokens per state
    #[arg(short, long, default_value_t = 2)]
    n: usize,

    /// Always retrain, and do not write the `<corpus>.<n>.bin` cache
    #[arg(long)]
    no_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate text by walking the chain
    Generate(GenerateArgs),

    /// Show the most common n-grams and their probabilities
    Top {
        /// How many n-grams to list
        #[arg(short, default_value_t = 5)]
        k: usize,
    },

    /// Show structural statistics of the transition graph
    Stats,

    /// Write the graph edges as `source,target,probability` CSV
    Export {
        /// Output file
        output: PathBuf,
    },

    /// Download Project Gutenberg books from Gutendex into the corpus file
    Fetch {
        /// Only books whose author was alive after this year
        #[arg(long, default_value_t = 1800)]
        author_year_start: i32,

        /// Book language code
        #[arg(long, default_value = "en")]
        language: String,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Number of n-grams in the chain, start state included
    #[arg(short, long, default_value_t = 100)]
    length: usize,

    /// Start state: exactly n tokens of the corpus (random when omitted)
    #[arg(short, long)]
    start: Option<String>,

    /// Seed for reproducible output; run i uses seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Number of independent runs, spread over the available cores
    #[arg(short, long, default_value_t = 1)]
    runs: usize,

    /// What to do when a state has no successor
    #[arg(long, value_enum, default_value_t = DeadEndArg::Stop)]
    dead_end: DeadEndArg,

    /// Maximum number of sampling steps per run
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DeadEndArg {
    Stop,
    Fail,
    Restart,
}

impl From<DeadEndArg> for DeadEndPolicy {
    fn from(arg: DeadEndArg) -> Self {
        match arg {
            DeadEndArg::Stop => DeadEndPolicy::Stop,
            DeadEndArg::Fail => DeadEndPolicy::Fail,
            DeadEndArg::Restart => DeadEndPolicy::Restart,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let load = || load_or_train(&cli.corpus, cli.n, !cli.no_cache);

    match cli.command {
        Command::Generate(args) => generate(&load()?, args)?,
        Command::Top { k } => top(&load()?, k),
        Command::Stats => println!("{}", GraphStats::compute(load()?.graph())),
        Command::Export { output } => {
            let model = load()?;
            export_edges(&model, &output)?;
            info!("Wrote {} edges to {}", model.graph().edge_count(), output.display());
        }
        Command::Fetch { author_year_start, language } => {
            let query = CatalogQuery { author_year_start, language };
            fetch_corpus(&Client::new(), &query, &cli.corpus)?;
        }
    }

    Ok(())
}

fn generate(model: &MarkovModel, args: GenerateArgs) -> Result<(), Box<dyn Error>> {
    let config = GenerationConfig {
        target_length: args.length,
        max_steps: args.max_steps,
        dead_end: args.dead_end.into(),
        seed: args.seed,
    };
    config.validate()?;

    let start = match args.start {
        Some(text) => StartState::Custom(text),
        None => StartState::Random,
    };

    for (i, generation) in generate_runs(model, &start, &config, args.runs.max(1)).into_iter().enumerate() {
        let generation = generation?;
        if generation.outcome() == Outcome::DeadEnd {
            warn!("Run {} stopped at a dead end after {} n-grams", i + 1, generation.ngrams().len());
        }
        if args.runs > 1 {
            println!("--- {} ---", i + 1);
        }
        println!("{}", generation.text());
    }
    Ok(())
}

/// Runs independent generations on scoped threads sharing the read-only model.
///
/// Results keep the run order.
fn generate_runs(
    model: &MarkovModel,
    start: &StartState,
    config: &GenerationConfig,
    runs: usize,
) -> Vec<markov_gen_core::Result<Generation>> {
    let workers = num_cpus::get().clamp(1, runs);
    let indices: Vec<usize> = (0..runs).collect();
    let chunk_size = runs.div_ceil(workers);

    thread::scope(|scope| {
        let handles: Vec<_> = indices
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|&i| {
                            let run_config = GenerationConfig {
                                seed: config.seed.map(|seed| seed.wrapping_add(i as u64)),
                                ..config.clone()
                            };
                            model.generate(start, run_config)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    })
}

fn top(model: &MarkovModel, k: usize) {
    let frequency = model.frequency();
    let n = model.n();

    println!("# of {}-grams: {}", n, frequency.total());
    println!("Most common {}-grams:", n);
    for (ngram, count) in model.most_common(k) {
        println!("{ngram}: {count}");
    }

    println!("Most common {}-gram probabilities:", n);
    let mut probabilities = frequency.probabilities();
    probabilities.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (ngram, probability) in probabilities.into_iter().take(k) {
        println!("{}: {:.2}%", model.render(ngram), probability * 100.0);
    }
}
