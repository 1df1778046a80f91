use std::path::PathBuf;

use clap::Parser;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_markov_core::io::{build_output_path, read_file};
use rs_markov_core::model::output_generator::{IndexSampler, RngSampler};
use rs_markov_core::model::trigram_model::TrigramModel;

mod text;

/// Train a trigram model on text files and generate new text from it.
#[derive(Parser)]
#[command(version, about)]
struct Args {
	/// Corpus files to train on
	#[arg(required = true)]
	corpus: Vec<PathBuf>,

	/// Header lines to skip at the start of each corpus file
	#[arg(long, default_value_t = 0)]
	skip_lines: usize,

	/// Number of words to generate; generation then continues to the next
	/// period so the output ends on a full sentence
	#[arg(long, default_value_t = 2000)]
	words: usize,

	/// Maximum number of words generated before a random word is forced in.
	/// Low values break up repeated passages at the cost of coherence
	#[arg(long, default_value_t = 15)]
	refresh_limit: u32,

	/// Reuse (or write) a binary model cache next to the first corpus file
	#[arg(long)]
	cache: bool,

	/// RNG seed for reproducible output
	#[arg(long)]
	seed: Option<u64>,

	/// Output file; prints to stdout when omitted
	#[arg(long)]
	output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::init();
	let args = Args::parse();

	let cache_path = build_output_path(&args.corpus[0], "bin")?;
	let model = if args.cache && cache_path.exists() {
		info!("loading cached model from {}", cache_path.display());
		TrigramModel::load(&cache_path)?
	} else {
		let model = train(&args)?;
		if args.cache {
			model.save(&cache_path)?;
			info!("cached model at {}", cache_path.display());
		}
		model
	};
	info!("vocabulary: {} words", model.vocabulary_size());

	let generated = match args.seed {
		Some(seed) => generate(&model, &args, RngSampler(StdRng::seed_from_u64(seed)))?,
		None => generate(&model, &args, RngSampler(rand::rng()))?,
	};

	let output_text = text::assemble(&generated);
	match &args.output {
		Some(path) => std::fs::write(path, output_text + "\n")?,
		None => println!("{output_text}"),
	}
	Ok(())
}

/// Reads and tokenizes every corpus file into the model, then finalizes it.
fn train(args: &Args) -> Result<TrigramModel, Box<dyn std::error::Error>> {
	let mut model = TrigramModel::new();
	for path in &args.corpus {
		let lines = read_file(path)?;
		let content = lines
			.iter()
			.skip(args.skip_lines)
			.map(String::as_str)
			.collect::<Vec<_>>()
			.join("\n");

		let tokens = text::tokenize(&content);
		if tokens.len() < 2 {
			return Err(format!("{}: at least two word tokens are required", path.display()).into());
		}
		info!("{}: {} tokens", path.display(), tokens.len());

		model.start_input(&tokens[0], &tokens[1])?;
		for token in &tokens[2..] {
			model.consume_word(token)?;
		}
		model.end_input()?;
	}
	model.finish();
	Ok(model)
}

/// Generates the requested number of words, then keeps going (bounded)
/// until a period closes the final sentence.
fn generate<S: IndexSampler>(
	model: &TrigramModel,
	args: &Args,
	sampler: S,
) -> Result<Vec<String>, String> {
	let mut generator = model.output_generator_with(args.refresh_limit, sampler)?;
	let mut generated = Vec::with_capacity(args.words);
	for _ in 0..args.words {
		generated.push(generator.generate_word());
	}
	for _ in 0..text::MAX_SENTENCE_TAIL {
		if generated.last().is_some_and(|word| word == ".") {
			break;
		}
		generated.push(generator.generate_word());
	}
	Ok(generated)
}
