/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The [`Transaction`] tagged union and the types of its two variants.
//!
//! Every entry in a block batch is decided to be either a client-submitted [`Message`] or a
//! proposer-synthesized [`BanOperation`] exactly once, at parse time. Downstream stages
//! (the [proposal validator](crate::proposal), the [state applier](crate::state::ledger)) match on
//! the parsed variant instead of re-probing raw bytes.

use borsh::{BorshDeserialize, BorshSerialize};

use super::basic::RawTransaction;

/// A parsed block-batch entry.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Transaction {
    /// A message posted by a client. The only variant clients may submit.
    Post(Message),

    /// A moderation decision synthesized by the block's proposer in
    /// [`prepare_proposal`](crate::app::ForumApp::prepare_proposal). Never client-originated:
    /// a `Ban` arriving at [`check_tx`](crate::app::ForumApp::check_tx) is rejected as malformed.
    Ban(BanOperation),
}

impl Transaction {
    /// Parse a raw batch entry. Returns `None` if the bytes do not deserialize into a
    /// `Transaction`.
    pub fn parse(raw: &RawTransaction) -> Option<Transaction> {
        Transaction::deserialize(&mut raw.bytes().as_slice()).ok()
    }

    /// Serialize this transaction into the opaque wire form carried through the engine.
    pub fn to_raw(&self) -> Result<RawTransaction, std::io::Error> {
        Ok(RawTransaction::new(self.try_to_vec()?))
    }
}

/// A chat message: who sent it, and what they said. Immutable once accepted into a block; appended
/// to the sender's message list and to the global history.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Message {
    pub sender: String,
    pub text: String,
}

impl Message {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Message {
        Message {
            sender: sender.into(),
            text: text.into(),
        }
    }
}

/// Marks a user as banned in the block that carries it. Only its effect (the banned flag on the
/// target's [`UserRecord`](crate::state::ledger::UserRecord)) outlives the block.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BanOperation {
    pub target: String,
}

impl BanOperation {
    pub fn new(target: impl Into<String>) -> BanOperation {
        BanOperation {
            target: target.into(),
        }
    }
}
