use std::collections::HashMap;
use std::path::Path;

use rand::rngs::ThreadRng;
use serde::{Deserialize, Serialize};

use super::output_generator::{IndexSampler, OutputGenerator, RngSampler};
use super::word_list::{Slot, WordList};

/// Frequency record for a single word: how often it was observed as the
/// first word of a pair, and the list of second words seen after it.
///
/// Each entry of `followers` is a bigram record and owns its own nested
/// list of observed third words.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct Unigram {
	pub(crate) count: u64,
	pub(crate) followers: WordList,
}

/// A trigram word-sequence model.
///
/// The model is a hash table of unigrams, each owning a list of bigram
/// entries, each owning a list of trigram entries. Probabilities are never
/// materialized: after [`finish`](Self::finish), the most frequent
/// continuation of every context sits at the head of its list, so greedy
/// generation reads each prediction in constant time.
///
/// # Usage
/// 1. Build: for each input, call [`start_input`](Self::start_input) with its
///    first two words, [`consume_word`](Self::consume_word) for each further
///    word, then [`end_input`](Self::end_input). Inputs accumulate.
/// 2. Call [`finish`](Self::finish) once.
/// 3. Create any number of generators with
///    [`output_generator`](Self::output_generator); generation never mutates
///    the model, so the same model can produce many independent outputs.
///
/// # Invariants
/// - Counts only grow during training and are frozen by `finish`
/// - A word appears at most once per list (lists are keyed collections)
/// - After `finish`, every list head holds the maximum count of its list;
///   ties go to the entry created earliest
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TrigramModel {
	words: HashMap<String, Unigram>,
	/// Rolling two-word training window (second-to-last, last).
	context: Option<(String, String)>,
	finished: bool,
}

impl TrigramModel {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of distinct words observed as unigrams.
	pub fn vocabulary_size(&self) -> usize {
		self.words.len()
	}

	/// Whether [`finish`](Self::finish) has run.
	pub fn is_finished(&self) -> bool {
		self.finished
	}

	/// Begins a new input with its first two words.
	///
	/// Nothing is counted yet; counting starts with the first
	/// [`consume_word`](Self::consume_word) or at
	/// [`end_input`](Self::end_input) for a two-word input.
	///
	/// # Errors
	/// Fails if the model is already finished.
	pub fn start_input(&mut self, first_word: &str, second_word: &str) -> Result<(), String> {
		if self.finished {
			return Err("model is finished and accepts no more input".to_owned());
		}
		self.context = Some((first_word.to_owned(), second_word.to_owned()));
		Ok(())
	}

	/// Counts the trigram ending in `word`: the window's first word as a
	/// unigram, the window pair as a bigram, and all three words as a
	/// trigram. Then slides the window forward by one.
	///
	/// # Errors
	/// Fails if the model is finished or no input was started.
	pub fn consume_word(&mut self, word: &str) -> Result<(), String> {
		if self.finished {
			return Err("model is finished and accepts no more input".to_owned());
		}
		let Some((prev_prev, prev)) = self.context.take() else {
			return Err("start_input must be called before consume_word".to_owned());
		};

		let followers = Self::count_unigram(&mut self.words, &prev_prev);
		let continuations = Self::count_bigram(followers, &prev);
		Self::count_trigram(continuations, word);

		self.context = Some((prev, word.to_owned()));
		Ok(())
	}

	/// Accounts for the final two words of an input, which have no observed
	/// successor: they are counted as a bigram and each as a unigram, but no
	/// trigram continuation is recorded. Input boundaries truncate the chain
	/// rather than assert an artificial end-of-input word.
	///
	/// # Errors
	/// Fails if the model is finished or no input was started.
	pub fn end_input(&mut self) -> Result<(), String> {
		if self.finished {
			return Err("model is finished and accepts no more input".to_owned());
		}
		let Some((prev_prev, prev)) = self.context.take() else {
			return Err("start_input must be called before end_input".to_owned());
		};

		let followers = Self::count_unigram(&mut self.words, &prev_prev);
		Self::count_bigram(followers, &prev);
		Self::count_unigram(&mut self.words, &prev);
		Ok(())
	}

	/// Counts an occurrence of `word` as a unigram, creating its record on
	/// first sight, and returns its bigram list.
	fn count_unigram<'a>(words: &'a mut HashMap<String, Unigram>, word: &str) -> &'a mut WordList {
		let unigram = words.entry(word.to_owned()).or_default();
		unigram.count += 1;
		&mut unigram.followers
	}

	/// Counts an occurrence of `word` as a bigram second word and returns
	/// its trigram list, created lazily on first sight.
	fn count_bigram<'a>(followers: &'a mut WordList, word: &str) -> &'a mut WordList {
		let index = match followers.lookup(word) {
			Some(index) => index,
			None => followers.prepend(word),
		};
		let entry = followers.entry_mut(index);
		entry.count += 1;
		entry.child.get_or_insert_with(WordList::new)
	}

	/// Counts an occurrence of `word` as a trigram third word.
	fn count_trigram(continuations: &mut WordList, word: &str) {
		let index = match continuations.lookup(word) {
			Some(index) => index,
			None => continuations.prepend(word),
		};
		continuations.entry_mut(index).count += 1;
	}

	/// Ranks every bigram and trigram list so its most frequent entry sits
	/// at the head.
	///
	/// Rather than computing Count(a b c) / Count(a b) and friends, note
	/// that continuations are only ever compared within the same list, where
	/// the denominator is shared: the raw counts order identically to the
	/// probabilities. One scan per list finds the best entry and an O(1)
	/// splice promotes it, so the whole pass is linear in the number of
	/// distinct word combinations.
	///
	/// Running `finish` twice is harmless: a finished model is left
	/// untouched. Counts are frozen at that point, so a rescan could only
	/// disturb the order of tied entries (the tie-break favors whichever
	/// tied entry sits later in the scan, and the first pass moved it to
	/// the front).
	pub fn finish(&mut self) {
		if self.finished {
			return;
		}
		for unigram in self.words.values_mut() {
			let followers = &mut unigram.followers;
			let mut best = BestChoice::new();
			let mut predecessor = Slot::BeforeHead;
			let mut cursor = followers.head();
			while let Some(index) = cursor {
				best.consider(followers.entry(index).count, predecessor);
				if let Some(continuations) = followers.entry_mut(index).child.as_mut() {
					promote_best(continuations);
				}
				predecessor = Slot::At(index);
				cursor = followers.next_of(index);
			}
			followers.splice_to_front(best.predecessor);
		}
		self.finished = true;
	}

	/// Creates a generator over this model using the thread-local RNG.
	///
	/// `refresh_limit` is the maximum number of words generated before a
	/// random word is forced in.
	///
	/// # Errors
	/// Fails if the model is not finished or has an empty vocabulary.
	pub fn output_generator(
		&self,
		refresh_limit: u32,
	) -> Result<OutputGenerator<'_, RngSampler<ThreadRng>>, String> {
		self.output_generator_with(refresh_limit, RngSampler(rand::rng()))
	}

	/// Creates a generator with an explicit uniform-choice source, letting
	/// callers substitute a seeded or scripted sampler.
	///
	/// # Errors
	/// Fails if the model is not finished or has an empty vocabulary.
	pub fn output_generator_with<S: IndexSampler>(
		&self,
		refresh_limit: u32,
		sampler: S,
	) -> Result<OutputGenerator<'_, S>, String> {
		if !self.finished {
			return Err("finish must be called before creating a generator".to_owned());
		}
		OutputGenerator::new(&self.words, refresh_limit, sampler)
	}

	/// Serializes the model to a compact binary file.
	pub fn save<P: AsRef<Path>>(&self, filepath: P) -> Result<(), Box<dyn std::error::Error>> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(filepath, bytes)?;
		Ok(())
	}

	/// Loads a model previously written by [`save`](Self::save).
	pub fn load<P: AsRef<Path>>(filepath: P) -> Result<Self, Box<dyn std::error::Error>> {
		let bytes = std::fs::read(filepath)?;
		Ok(postcard::from_bytes(&bytes)?)
	}
}

/// Scan record for the best entry seen so far, paired with the slot of its
/// predecessor so the winner can be spliced to the head afterwards.
struct BestChoice {
	count: Option<u64>,
	predecessor: Option<Slot>,
}

impl BestChoice {
	fn new() -> Self {
		Self { count: None, predecessor: None }
	}

	/// `>=` lets a later entry with an equal count take over. Lists grow at
	/// the front, so the scan runs newest to oldest and ties settle on the
	/// entry created earliest.
	fn consider(&mut self, count: u64, predecessor: Slot) {
		if self.count.is_none_or(|best| count >= best) {
			self.count = Some(count);
			self.predecessor = Some(predecessor);
		}
	}
}

/// Promotes the best entry of a single list to its head.
fn promote_best(list: &mut WordList) {
	let mut best = BestChoice::new();
	for (entry, predecessor) in list.iter().zip(list.trailing_iter()) {
		best.consider(entry.count, predecessor);
	}
	list.splice_to_front(best.predecessor);
}

#[cfg(test)]
mod tests {
	use super::*;

	fn feed(model: &mut TrigramModel, tokens: &[&str]) {
		model.start_input(tokens[0], tokens[1]).unwrap();
		for token in &tokens[2..] {
			model.consume_word(token).unwrap();
		}
		model.end_input().unwrap();
	}

	/// Follower words of a unigram, head first.
	fn followers(model: &TrigramModel, word: &str) -> Vec<String> {
		model.words[word]
			.followers
			.iter()
			.map(|entry| entry.word.clone())
			.collect()
	}

	/// Trigram continuation words of a bigram, head first.
	fn continuations(model: &TrigramModel, first: &str, second: &str) -> Vec<String> {
		model.words[first]
			.followers
			.find(second)
			.and_then(|entry| entry.child.as_ref())
			.map(|list| list.iter().map(|entry| entry.word.clone()).collect())
			.unwrap_or_default()
	}

	/// Full ordering of every list, sorted by unigram word for comparison.
	fn snapshot(model: &TrigramModel) -> Vec<(String, Vec<(String, Vec<String>)>)> {
		let mut all: Vec<_> = model
			.words
			.iter()
			.map(|(word, unigram)| {
				let bigrams = unigram
					.followers
					.iter()
					.map(|entry| {
						let third_words = entry
							.child
							.as_ref()
							.map(|list| list.iter().map(|e| e.word.clone()).collect())
							.unwrap_or_default();
						(entry.word.clone(), third_words)
					})
					.collect();
				(word.clone(), bigrams)
			})
			.collect();
		all.sort();
		all
	}

	#[test]
	fn counts_unigrams_bigrams_and_trigrams() {
		let mut model = TrigramModel::new();
		feed(&mut model, &["x", "y", "z", "x", "y", "w"]);

		assert_eq!(model.words["x"].count, 2);
		assert_eq!(model.words["y"].count, 2);
		assert_eq!(model.words["z"].count, 1);
		assert_eq!(model.words["w"].count, 1);

		let x_to_y = model.words["x"].followers.find("y").unwrap();
		assert_eq!(x_to_y.count, 2);
		assert_eq!(continuations(&model, "x", "y").len(), 2);
	}

	#[test]
	fn end_input_records_the_boundary_pair_without_a_trigram() {
		let mut model = TrigramModel::new();
		feed(&mut model, &["x", "y", "z", "x", "y", "w"]);

		// (y, w) is the final pair: counted as a bigram, no continuation.
		let y_to_w = model.words["y"].followers.find("w").unwrap();
		assert_eq!(y_to_w.count, 1);
		assert!(continuations(&model, "y", "w").is_empty());
		// The final word stands alone as a unigram with no followers.
		assert!(model.words["w"].followers.head().is_none());
	}

	#[test]
	fn a_two_word_input_is_a_boundary_truncated_bigram() {
		let mut model = TrigramModel::new();
		model.start_input("a", "b").unwrap();
		model.end_input().unwrap();

		assert_eq!(model.words["a"].count, 1);
		assert_eq!(model.words["b"].count, 1);
		assert_eq!(model.words["a"].followers.find("b").unwrap().count, 1);
		assert!(continuations(&model, "a", "b").is_empty());
	}

	#[test]
	fn counts_accumulate_across_inputs() {
		let mut model = TrigramModel::new();
		feed(&mut model, &["a", "b", "c"]);
		feed(&mut model, &["a", "b", "c"]);

		assert_eq!(model.words["a"].count, 2);
		assert_eq!(model.words["a"].followers.find("b").unwrap().count, 2);
		let thirds = continuations(&model, "a", "b");
		assert_eq!(thirds, ["c"]);
	}

	#[test]
	fn finish_puts_the_maximum_count_at_every_head() {
		let mut model = TrigramModel::new();
		feed(&mut model, &["a", "b", "c", "a", "b", "d", "a", "b", "c"]);
		model.finish();

		for unigram in model.words.values() {
			let counts: Vec<u64> = unigram.followers.iter().map(|e| e.count).collect();
			if let Some(head) = counts.first() {
				assert!(counts.iter().all(|count| head >= count));
			}
			for entry in unigram.followers.iter() {
				if let Some(thirds) = entry.child.as_ref() {
					let counts: Vec<u64> = thirds.iter().map(|e| e.count).collect();
					if let Some(head) = counts.first() {
						assert!(counts.iter().all(|count| head >= count));
					}
				}
			}
		}

		// (a, b) saw c twice and d once.
		assert_eq!(continuations(&model, "a", "b")[0], "c");
	}

	#[test]
	fn ties_go_to_the_earliest_created_entry() {
		let mut model = TrigramModel::new();
		// (a, b) -> c and (a, b) -> d both counted once; c observed first.
		feed(&mut model, &["a", "b", "c"]);
		feed(&mut model, &["a", "b", "d"]);
		model.finish();

		// Before finish the newer entry d sat at the head.
		assert_eq!(continuations(&model, "a", "b"), ["c", "d"]);
	}

	#[test]
	fn worked_example_promotes_the_first_observed_continuation() {
		let mut model = TrigramModel::new();
		feed(&mut model, &["x", "y", "z", "x", "y", "w"]);
		model.finish();

		// z (count 1, observed first) and w (count 1) tie; z wins.
		assert_eq!(continuations(&model, "x", "y")[0], "z");
		// Under y, the follower z (count 1) ties with w (count 1); z is older.
		assert_eq!(followers(&model, "y")[0], "z");
	}

	#[test]
	fn finish_is_idempotent() {
		let mut model = TrigramModel::new();
		// (a, b) continues with c and d tied; tied entries are the
		// delicate case, since a rescan of a promoted list would hand the
		// head to the other tied entry.
		feed(&mut model, &["a", "b", "c", "a", "b", "d", "b", "c", "a"]);
		model.finish();
		let once = snapshot(&model);
		assert_eq!(continuations(&model, "a", "b"), ["c", "d"]);
		model.finish();
		assert_eq!(snapshot(&model), once);
		assert_eq!(continuations(&model, "a", "b"), ["c", "d"]);
	}

	#[test]
	fn training_calls_require_a_started_input() {
		let mut model = TrigramModel::new();
		assert!(model.consume_word("a").is_err());
		assert!(model.end_input().is_err());
	}

	#[test]
	fn a_finished_model_rejects_further_training() {
		let mut model = TrigramModel::new();
		feed(&mut model, &["a", "b", "c"]);
		model.finish();

		assert!(model.start_input("a", "b").is_err());
		assert!(model.consume_word("c").is_err());
		assert!(model.end_input().is_err());
	}

	#[test]
	fn generators_require_a_finished_model() {
		let mut model = TrigramModel::new();
		feed(&mut model, &["a", "b", "c"]);
		assert!(model.output_generator(10).is_err());
		model.finish();
		assert!(model.output_generator(10).is_ok());
	}

	#[test]
	fn save_and_load_round_trip() {
		let mut model = TrigramModel::new();
		feed(&mut model, &["x", "y", "z", "x", "y", "w"]);
		model.finish();

		let path = std::env::temp_dir().join(format!("rs-markov-test-{}.bin", std::process::id()));
		model.save(&path).unwrap();
		let loaded = TrigramModel::load(&path).unwrap();
		std::fs::remove_file(&path).ok();

		assert!(loaded.is_finished());
		assert_eq!(loaded.vocabulary_size(), model.vocabulary_size());
		assert_eq!(snapshot(&loaded), snapshot(&model));
	}
}
