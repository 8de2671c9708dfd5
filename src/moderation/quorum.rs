/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Aggregation of per-validator vote extensions into the word list the whole block agrees to
//! moderate with.
//!
//! The consensus engine collects one extension per voting validator and delivers the whole set to
//! the block's proposer. [`quorum_words`] then adopts every word that strictly more than one third
//! of the registry included. No further communication round happens: every honest replica that
//! finalizes the block applies the bans the proposer derived from this set.
//!
//! # Threshold
//!
//! A word is adopted iff its count of distinct supporting validators exceeds `floor(V / 3)`, where
//! `V` is the registry size. This is a deliberately low, one-third bar: under the usual BFT
//! assumption that up to a third of validators may be faulty or absent, it favors moderation
//! recall over precision. It is *not* a majority.

use std::collections::{HashMap, HashSet};

use crate::types::validators::ValidatorAddress;

use super::words::WordList;

/// The moderation words one validator attached to its vote for the current height. Ephemeral:
/// lives only through one height's `VerifyVoteExtension`/`PrepareProposal` cycle.
#[derive(Clone, Debug)]
pub struct ValidatorExtension {
    pub validator: ValidatorAddress,
    pub words: WordList,
}

impl ValidatorExtension {
    pub fn new(validator: ValidatorAddress, words: WordList) -> ValidatorExtension {
        ValidatorExtension { validator, words }
    }
}

/// Compute the agreed word list from the extensions collected for a height.
///
/// Words enter the result in first-seen order across `extensions`, so re-encoding the result is
/// deterministic given the same input sequence. A word supported by exactly `registry_size / 3`
/// validators (floor division) is never adopted; one more supporter always suffices.
pub fn quorum_words(extensions: &[ValidatorExtension], registry_size: usize) -> WordList {
    let threshold = registry_size / 3;

    // Count distinct supporting validators per word. A duplicated address in the input cannot
    // double-count a word.
    let mut supporters: HashMap<&str, HashSet<ValidatorAddress>> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for extension in extensions {
        for word in extension.words.iter() {
            let entry = supporters.entry(word.as_str()).or_insert_with(|| {
                first_seen.push(word.as_str());
                HashSet::new()
            });
            entry.insert(extension.validator);
        }
    }

    let mut agreed = WordList::default();
    for word in first_seen {
        if supporters[word].len() > threshold {
            agreed.push(word.to_string());
        }
    }
    agreed
}
