/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Construction and validation of block proposals.
//!
//! [`build`] runs only on the current block's proposer. It takes the raw transaction batch and the
//! [agreed word list](crate::moderation::quorum::quorum_words) and emits an ordered batch
//! satisfying the structural invariant every replica later checks:
//!
//! 1. Every [`Ban`](crate::types::transaction::Transaction::Ban) operation precedes every
//!    [`Post`](crate::types::transaction::Transaction::Post).
//! 2. A sender targeted by a ban in the batch has no post anywhere in the batch.
//!
//! [`validate`] runs on every replica (the proposer included) before it votes to finalize. It
//! re-derives the invariant from the ordered batch alone — it does not recompute the agreed word
//! list, and therefore cannot tell a justified ban from a fabricated one. A Byzantine proposer
//! could insert structurally valid bans for users it dislikes and every honest replica would
//! accept the batch. The consensus engine only delivers the collected vote extensions to the
//! proposer, so the other replicas lack the inputs to recompute the agreed list; the trust gap
//! sits with the engine's proposer selection.

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

use crate::moderation::words::WordList;
use crate::types::basic::RawTransaction;
use crate::types::transaction::{BanOperation, Transaction};

/// Partition and re-order a raw batch into synthesized bans followed by surviving posts.
///
/// Unparseable entries and client-submitted `Ban` entries are dropped silently: both already fail
/// [`check_tx`](crate::app::ForumApp::check_tx) and should not reach a proposer in the common
/// case. A sender flagged by any of its posts loses *all* of its posts in the batch and yields
/// exactly one ban, however many posts flagged it.
pub fn build(raw_batch: &[RawTransaction], agreed_words: &WordList) -> Vec<RawTransaction> {
    let mut to_ban: Vec<String> = Vec::new();
    let mut to_ban_set: HashSet<String> = HashSet::new();
    let mut posts: Vec<(String, RawTransaction)> = Vec::new();

    for raw in raw_batch {
        let message = match Transaction::parse(raw) {
            Some(Transaction::Post(message)) => message,
            // Bans are synthesized below, never forwarded from the raw batch.
            Some(Transaction::Ban(_)) | None => continue,
        };

        if agreed_words.flags(&message.text) {
            if to_ban_set.insert(message.sender.clone()) {
                to_ban.push(message.sender);
            }
        } else {
            posts.push((message.sender, raw.clone()));
        }
    }

    let mut batch: Vec<RawTransaction> = Vec::with_capacity(to_ban.len() + posts.len());
    for target in to_ban {
        let ban = Transaction::Ban(BanOperation::new(target));
        // Serializing an owned BanOperation into a Vec cannot fail.
        batch.push(ban.to_raw().unwrap());
    }
    for (sender, raw) in posts {
        if !to_ban_set.contains(&sender) {
            batch.push(raw);
        }
    }
    batch
}

/// Check that an ordered batch satisfies the ban-prefix invariant [`build`] guarantees.
///
/// The scan collects the targets of the leading run of `Ban` entries; past that boundary every
/// entry must be a well-formed `Post` whose sender is not among the collected targets.
pub fn validate(batch: &[RawTransaction]) -> Result<(), ProposalError> {
    let mut banned: HashSet<String> = HashSet::new();
    let mut in_ban_prefix = true;

    for (index, raw) in batch.iter().enumerate() {
        let transaction = Transaction::parse(raw)
            .ok_or(ProposalError::MalformedTransaction { index })?;

        match transaction {
            Transaction::Ban(ban) => {
                if !in_ban_prefix {
                    return Err(ProposalError::BanAfterBoundary { index });
                }
                banned.insert(ban.target);
            }
            Transaction::Post(message) => {
                in_ban_prefix = false;
                if banned.contains(&message.sender) {
                    return Err(ProposalError::BannedSenderPost {
                        index,
                        sender: message.sender,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Ways an ordered batch can violate the structural invariant, causing the whole batch to be
/// rejected at [`process_proposal`](crate::app::ForumApp::process_proposal).
#[derive(Debug, PartialEq, Eq)]
pub enum ProposalError {
    /// The entry at `index` does not parse as a [`Transaction`].
    MalformedTransaction { index: usize },

    /// A ban operation appears after the first post, i.e., outside the ban prefix.
    BanAfterBoundary { index: usize },

    /// A post whose sender is banned earlier in the same batch.
    BannedSenderPost { index: usize, sender: String },
}

impl Display for ProposalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ProposalError::MalformedTransaction { index } => {
                write!(f, "transaction at index {} is malformed", index)
            }
            ProposalError::BanAfterBoundary { index } => {
                write!(f, "ban operation at index {} appears after the ban prefix", index)
            }
            ProposalError::BannedSenderPost { index, sender } => {
                write!(
                    f,
                    "post at index {} is from {}, who is banned earlier in the batch",
                    index, sender
                )
            }
        }
    }
}
