//! Word tokenization and output assembly.
//!
//! The model treats every distinct token as an ordinary vocabulary word, so
//! the tokenizer keeps periods as standalone tokens: sentence endings are
//! learned and generated like any other word, and the assembler turns them
//! back into punctuation.

/// Characters dropped from tokens. Periods are deliberately absent so they
/// become tokens of their own.
const PUNCTUATION: &str = "!()-[]{};:`\"\\,<>/?@#$%^&*_~";

/// How many extra words may be generated past the requested count while
/// waiting for a sentence-ending period.
pub const MAX_SENTENCE_TAIL: usize = 100;

/// Splits text into lowercase word tokens with punctuation removed and each
/// period emitted as its own token.
///
/// A leading single quote is stripped unless the token is a possessive
/// (`'s`), which keeps contractions intact while dropping stray quotation
/// marks.
pub fn tokenize(content: &str) -> Vec<String> {
	let mut tokens = Vec::new();
	for raw in content.split_whitespace() {
		let mut word = String::new();
		for c in raw.chars().flat_map(char::to_lowercase) {
			if c == '.' {
				push_word(&mut tokens, std::mem::take(&mut word));
				tokens.push(".".to_owned());
			} else if !PUNCTUATION.contains(c) {
				word.push(c);
			}
		}
		push_word(&mut tokens, word);
	}
	tokens
}

fn push_word(tokens: &mut Vec<String>, word: String) {
	let word = match word.strip_prefix('\'') {
		Some(rest) if !word.starts_with("'s") => rest.to_owned(),
		_ => word,
	};
	if !word.is_empty() {
		tokens.push(word);
	}
}

/// Joins generated tokens into display text: periods attach to the
/// preceding word, sentence starts and the pronoun "i" are capitalized.
pub fn assemble(words: &[String]) -> String {
	let mut out = String::new();
	let mut capitalize_next = true;
	for word in words {
		if word == "." {
			out.push('.');
			capitalize_next = true;
			continue;
		}
		if !out.is_empty() {
			out.push(' ');
		}
		if capitalize_next || word == "i" || word.starts_with("i'") {
			out.push_str(&capitalize(word));
		} else {
			out.push_str(word);
		}
		capitalize_next = false;
	}
	out
}

fn capitalize(word: &str) -> String {
	let mut chars = word.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
		None => String::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tokenize_lowercases_and_strips_punctuation() {
		assert_eq!(tokenize("Hello, World!"), ["hello", "world"]);
	}

	#[test]
	fn tokenize_emits_periods_as_standalone_tokens() {
		assert_eq!(tokenize("One. Two words."), ["one", ".", "two", "words", "."]);
	}

	#[test]
	fn tokenize_splits_interior_periods() {
		assert_eq!(tokenize("c.h."), ["c", ".", "h", "."]);
	}

	#[test]
	fn tokenize_strips_leading_quotes_but_keeps_possessives() {
		assert_eq!(tokenize("'quoted 's"), ["quoted", "'s"]);
		assert_eq!(tokenize("don't"), ["don't"]);
	}

	#[test]
	fn tokenize_drops_empty_tokens() {
		assert_eq!(tokenize("... , !"), [".", ".", "."]);
	}

	#[test]
	fn assemble_capitalizes_sentence_starts_and_attaches_periods() {
		let words: Vec<String> = ["the", "end", ".", "a", "new", "sentence", "."]
			.iter()
			.map(|w| w.to_string())
			.collect();
		assert_eq!(assemble(&words), "The end. A new sentence.");
	}

	#[test]
	fn assemble_capitalizes_the_pronoun_i() {
		let words: Vec<String> = ["then", "i", "said", "i'll", "go", "."]
			.iter()
			.map(|w| w.to_string())
			.collect();
		assert_eq!(assemble(&words), "Then I said I'll go.");
	}
}
