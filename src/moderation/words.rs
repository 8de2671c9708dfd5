/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The [`WordList`] type: the set of moderation words carried inside a vote extension, its wire
//! codec, and the content classifier that decides whether a message's text is flagged.
//!
//! # Wire form
//!
//! A word list travels inside a vote extension payload as a single string: tokens joined by
//! [`SEPARATOR`]. The empty string encodes the empty list, which is valid and means "no moderation
//! vote". A repeated token is a protocol violation and fails decoding — duplicate detection is the
//! one structural check a receiving validator can perform on an otherwise opaque payload, so it is
//! never silently repaired by deduplication.

use std::fmt::{self, Display, Formatter};

use std::collections::HashSet;

/// The token separator in a word list's wire form.
pub const SEPARATOR: char = '|';

/// A duplicate-free list of moderation words, in first-seen order.
///
/// Membership is what matters for classification; the order exists only so that re-encoding a list
/// is reproducible.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct WordList(Vec<String>);

impl WordList {
    /// Build a word list from an iterator of tokens, keeping the first occurrence of each token
    /// and discarding later repeats. Use this for locally-configured lists; wire payloads go
    /// through [`decode`](Self::decode), which treats repeats as a violation instead.
    pub fn from_words(words: impl IntoIterator<Item = String>) -> WordList {
        let mut seen = HashSet::new();
        let mut list = Vec::new();
        for word in words {
            if seen.insert(word.clone()) {
                list.push(word);
            }
        }
        WordList(list)
    }

    /// Decode a wire payload. Fails with [`WordListError::DuplicateWord`] if any token appears
    /// more than once.
    pub fn decode(payload: &str) -> Result<WordList, WordListError> {
        if payload.is_empty() {
            return Ok(WordList(Vec::new()));
        }

        let mut seen = HashSet::new();
        let mut list = Vec::new();
        for word in payload.split(SEPARATOR) {
            if !seen.insert(word.to_string()) {
                return Err(WordListError::DuplicateWord {
                    word: word.to_string(),
                });
            }
            list.push(word.to_string());
        }
        Ok(WordList(list))
    }

    /// Encode this list into its wire form.
    pub fn encode(&self) -> String {
        self.0.join(&SEPARATOR.to_string())
    }

    /// Whether `text` is flagged by this list.
    ///
    /// # Matching policy
    ///
    /// A word matches iff it occurs as a **substring** of `text`. In particular a word embedded in
    /// a longer run of characters ("spam" inside "spamming") matches, while a word split by
    /// whitespace ("sp am") does not.
    pub fn flags(&self, text: &str) -> bool {
        self.0.iter().any(|word| text.contains(word.as_str()))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.iter().any(|w| w == word)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn push(&mut self, word: String) {
        debug_assert!(!self.contains(&word));
        self.0.push(word);
    }
}

/// Error when decoding a word list from its wire form.
#[derive(Debug, PartialEq, Eq)]
pub enum WordListError {
    /// The payload contains the same token more than once.
    DuplicateWord { word: String },
}

impl Display for WordListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            WordListError::DuplicateWord { word } => {
                write!(f, "duplicate word in word list payload: {}", word)
            }
        }
    }
}
