use serde::{Deserialize, Serialize};

/// A splice position inside a [`WordList`]: either the phantom slot just
/// before the head, or the slot of a concrete entry.
///
/// Entries carry no backward link, so reordering is expressed in terms of the
/// position *preceding* the entry to move. The phantom variant lets a scan
/// name "the predecessor of the head" without a dedicated sentinel entry.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Slot {
	BeforeHead,
	At(usize),
}

/// A single entry of a [`WordList`].
///
/// Bigram entries own a nested list of observed third words in `child`;
/// entries at the deepest level leave it `None`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct Entry {
	pub(crate) word: String,
	pub(crate) count: u64,
	next: Option<usize>,
	pub(crate) child: Option<WordList>,
}

/// An ordered word collection backed by an index-linked arena.
///
/// # Responsibilities
/// - O(1) insertion at the front (`prepend`)
/// - Linear lookup by word (`lookup`, `find`)
/// - Forward iteration (`iter`) and a trailing iteration starting one
///   position before the head (`trailing_iter`)
/// - O(1) promotion of an entry to the head given its predecessor
///   (`splice_to_front`)
///
/// # Invariants
/// - A word appears at most once; callers look up before prepending
/// - Arena indices are stable: entries are never removed, only relinked
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct WordList {
	entries: Vec<Entry>,
	head: Option<usize>,
}

impl WordList {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn head(&self) -> Option<usize> {
		self.head
	}

	/// Word of the head entry, if any.
	pub(crate) fn head_word(&self) -> Option<&str> {
		self.head.map(|index| self.entries[index].word.as_str())
	}

	pub(crate) fn next_of(&self, index: usize) -> Option<usize> {
		self.entries[index].next
	}

	pub(crate) fn entry(&self, index: usize) -> &Entry {
		&self.entries[index]
	}

	pub(crate) fn entry_mut(&mut self, index: usize) -> &mut Entry {
		&mut self.entries[index]
	}

	/// Returns the index of the entry holding `word`, or `None`.
	///
	/// Linear scan from the head. Sorting plus binary search would not help
	/// here: bisecting a linked structure is still a linear walk.
	pub(crate) fn lookup(&self, word: &str) -> Option<usize> {
		let mut cursor = self.head;
		while let Some(index) = cursor {
			if self.entries[index].word == word {
				return Some(index);
			}
			cursor = self.entries[index].next;
		}
		None
	}

	/// Returns the entry holding `word`, or `None`.
	pub(crate) fn find(&self, word: &str) -> Option<&Entry> {
		self.lookup(word).map(|index| &self.entries[index])
	}

	/// Creates an entry for `word` with a count of zero and links it as the
	/// new head. Returns the arena index of the new entry.
	///
	/// The zero count lets callers increment unconditionally whether the
	/// entry is new or was already present.
	pub(crate) fn prepend(&mut self, word: &str) -> usize {
		let index = self.entries.len();
		self.entries.push(Entry {
			word: word.to_owned(),
			count: 0,
			next: self.head,
			child: None,
		});
		self.head = Some(index);
		index
	}

	/// Iterates over entries from head to tail.
	pub(crate) fn iter(&self) -> Iter<'_> {
		Iter { list: self, cursor: self.head }
	}

	/// Iterates over slots starting one position before the head.
	///
	/// The first item is [`Slot::BeforeHead`]; zipping with [`Self::iter`]
	/// pairs every entry with the slot of its predecessor, which is exactly
	/// what [`Self::splice_to_front`] needs.
	pub(crate) fn trailing_iter(&self) -> TrailingIter<'_> {
		TrailingIter { list: self, slot: Some(Slot::BeforeHead) }
	}

	/// Unlinks the entry following `predecessor` and relinks it as the new
	/// head. No-op if `predecessor` is `None`, names the phantom before-head
	/// slot, or has no successor.
	pub(crate) fn splice_to_front(&mut self, predecessor: Option<Slot>) {
		let Some(Slot::At(before)) = predecessor else {
			// The successor of the before-head slot is already the head.
			return;
		};
		let Some(target) = self.entries[before].next else {
			return;
		};
		if self.head == Some(target) {
			return;
		}
		self.entries[before].next = self.entries[target].next;
		self.entries[target].next = self.head;
		self.head = Some(target);
	}
}

/// Forward iterator over the entries of a [`WordList`].
pub(crate) struct Iter<'a> {
	list: &'a WordList,
	cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
	type Item = &'a Entry;

	fn next(&mut self) -> Option<Self::Item> {
		let index = self.cursor?;
		self.cursor = self.list.entries[index].next;
		Some(&self.list.entries[index])
	}
}

/// Iterator over slots, beginning at the phantom before-head position.
///
/// Yields one more item than the list has entries.
pub(crate) struct TrailingIter<'a> {
	list: &'a WordList,
	slot: Option<Slot>,
}

impl Iterator for TrailingIter<'_> {
	type Item = Slot;

	fn next(&mut self) -> Option<Self::Item> {
		let current = self.slot?;
		self.slot = match current {
			Slot::BeforeHead => self.list.head.map(Slot::At),
			Slot::At(index) => self.list.entries[index].next.map(Slot::At),
		};
		Some(current)
	}
}
