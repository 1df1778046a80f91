use std::collections::HashMap;

use rand::Rng;

use super::trigram_model::Unigram;

/// Uniform selection over a range of indices.
///
/// This is the only source of randomness in generation. Production code uses
/// [`RngSampler`]; tests substitute seeded or scripted implementations to
/// make every draw reproducible.
pub trait IndexSampler {
	/// Returns an index uniformly distributed in `0..len`.
	///
	/// `len` is never zero, and implementations must return a value below
	/// `len`.
	fn pick(&mut self, len: usize) -> usize;
}

/// Sampler backed by any `rand` RNG.
pub struct RngSampler<R: Rng>(pub R);

impl<R: Rng> IndexSampler for RngSampler<R> {
	fn pick(&mut self, len: usize) -> usize {
		self.0.random_range(0..len)
	}
}

/// Stateful greedy word generator over a finalized [`TrigramModel`].
///
/// Each [`generate_word`](Self::generate_word) call emits one word chosen by
/// the first applicable rule:
/// 1. a forced random word once the refresh countdown runs out,
/// 2. the most frequent third word for the last two words generated,
/// 3. the most frequent second word for the last word generated,
/// 4. a random word (also the very first call).
///
/// Missing data never fails a step: an unseen context simply falls through
/// trigram to bigram to random. A four-word trailing window additionally
/// detects two- and three-word output cycles and breaks them with a random
/// word.
///
/// Generation only reads the model, so any number of generators may share
/// one model; each owns nothing but its window, its countdown, and its
/// sampler.
///
/// [`TrigramModel`]: super::trigram_model::TrigramModel
pub struct OutputGenerator<'a, S: IndexSampler> {
	words: &'a HashMap<String, Unigram>,
	/// Vocabulary snapshot for uniform draws. Sorted so that a seeded
	/// sampler produces the same words run after run.
	vocabulary: Vec<&'a str>,
	sampler: S,

	/// Maximum number of words generated between forced random draws.
	refresh_limit: u32,
	/// Words remaining until the next forced random draw.
	refresh_count: i64,

	/// Fourth-to-last word (detects three-word cycles).
	prev_4: Option<String>,
	/// Third-to-last word (detects two-word cycles).
	prev_3: Option<String>,
	/// Second-to-last word (trigram context).
	prev_prev: Option<String>,
	/// Last word (bigram context).
	prev: Option<String>,
}

impl<'a, S: IndexSampler> OutputGenerator<'a, S> {
	pub(crate) fn new(
		words: &'a HashMap<String, Unigram>,
		refresh_limit: u32,
		sampler: S,
	) -> Result<Self, String> {
		if words.is_empty() {
			return Err("cannot generate from a model with an empty vocabulary".to_owned());
		}
		let mut vocabulary: Vec<&str> = words.keys().map(String::as_str).collect();
		vocabulary.sort_unstable();
		Ok(Self {
			words,
			vocabulary,
			sampler,
			refresh_limit,
			refresh_count: i64::from(refresh_limit),
			prev_4: None,
			prev_3: None,
			prev_prev: None,
			prev: None,
		})
	}

	/// Presets the two-word context window, as if `first_word` and
	/// `second_word` had just been generated. Useful to continue an existing
	/// text; words unknown to the model simply fall through to the bigram
	/// and random rules.
	pub fn seed_context(&mut self, first_word: &str, second_word: &str) {
		self.prev_prev = Some(first_word.to_owned());
		self.prev = Some(second_word.to_owned());
	}

	/// Generates the next word.
	pub fn generate_word(&mut self) -> String {
		let mut new_word = if self.refresh_count <= 0 {
			self.random_word()
		} else if self.prev_prev.is_some() {
			self.best_trigram()
		} else if self.prev.is_some() {
			self.best_bigram()
		} else {
			self.random_word()
		};

		// Break short repetition cycles with a fresh random word.
		// If (a b) -> a and (b a) -> b, the output loops a b a b ...
		// If (a b) -> c, (b c) -> a and (c a) -> b, it loops a b c a b c ...
		if (Some(new_word) == self.prev_prev.as_deref() && self.prev == self.prev_3)
			|| (Some(new_word) == self.prev_3.as_deref() && self.prev == self.prev_4)
		{
			new_word = self.random_word();
		}

		self.refresh_count -= 1;

		let output = new_word.to_owned();
		self.prev_4 = self.prev_3.take();
		self.prev_3 = self.prev_prev.take();
		self.prev_prev = self.prev.take();
		self.prev = Some(output.clone());

		output
	}

	/// Draws a word uniformly from the vocabulary and resets the refresh
	/// countdown.
	fn random_word(&mut self) -> &'a str {
		self.refresh_count = i64::from(self.refresh_limit);
		self.vocabulary[self.sampler.pick(self.vocabulary.len())]
	}

	/// Most frequent second word after the last generated word.
	///
	/// The final word of an input is counted as a unigram without followers,
	/// so a known word can still have an empty follower list; that case (and
	/// a last word the model has never seen) falls back to a random word.
	fn best_bigram(&mut self) -> &'a str {
		let words = self.words;
		let head = self
			.prev
			.as_deref()
			.and_then(|prev| words.get(prev))
			.and_then(|unigram| unigram.followers.head_word());
		match head {
			Some(word) => word,
			None => self.random_word(),
		}
	}

	/// Most frequent third word after the last two generated words.
	///
	/// The final pair of an input is counted as a bigram without
	/// continuations, and a random draw can produce a pair never observed at
	/// all; either way the bigram rule takes over, which in turn may fall
	/// back to a random word. The best trigram is used whenever one exists,
	/// the best bigram when none does, and a random word when no prediction
	/// can be made.
	fn best_trigram(&mut self) -> &'a str {
		let words = self.words;
		let head = match (self.prev_prev.as_deref(), self.prev.as_deref()) {
			(Some(prev_prev), Some(prev)) => words
				.get(prev_prev)
				.and_then(|unigram| unigram.followers.find(prev))
				.and_then(|bigram| bigram.child.as_ref())
				.and_then(|continuations| continuations.head_word()),
			_ => None,
		};
		match head {
			Some(word) => word,
			None => self.best_bigram(),
		}
	}
}
