/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! "Inert" types used throughout the crate: those that are sent around and inspected, but have no
//! active behavior. These types follow the newtype pattern and the API for using them is defined in
//! this module.

use borsh::{BorshDeserialize, BorshSerialize};
use std::{
    fmt::{self, Debug, Display, Formatter},
    ops::{Add, AddAssign},
};

/// Height of a committed block in the replicated ledger. The genesis (pre-block) state sits at
/// height 0, and every committed block advances the height by exactly 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, BorshDeserialize, BorshSerialize)]
pub struct BlockHeight(u64);

impl BlockHeight {
    pub const fn new(int: u64) -> Self {
        Self(int)
    }

    pub const fn int(&self) -> u64 {
        self.0
    }

    pub fn to_le_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl Display for BlockHeight {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl AddAssign<u64> for BlockHeight {
    fn add_assign(&mut self, rhs: u64) {
        self.0.add_assign(rhs)
    }
}

impl Add<u64> for BlockHeight {
    type Output = BlockHeight;
    fn add(self, rhs: u64) -> Self::Output {
        BlockHeight::new(self.0.add(rhs))
    }
}

/// A SHA-256 digest. Used for the application's [state commitment](crate::app::ForumApp) and for
/// deriving [validator addresses](crate::types::validators::ValidatorAddress).
#[derive(Clone, Copy, PartialEq, Eq, Hash, BorshDeserialize, BorshSerialize)]
pub struct CryptoHash([u8; 32]);

impl CryptoHash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; 32] {
        self.0
    }

    /// The all-zeroes hash, used as the content hash of the genesis (height 0) state.
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }
}

impl Display for CryptoHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Debug for CryptoHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An opaque, serialized transaction as it travels through the consensus engine: the unit of a raw
/// batch handed to [`prepare_proposal`](crate::app::ForumApp::prepare_proposal) and of the ordered
/// batch handed to [`process_proposal`](crate::app::ForumApp::process_proposal) and
/// [`finalize_block`](crate::app::ForumApp::finalize_block).
#[derive(Clone, Debug, PartialEq, Eq, Hash, BorshDeserialize, BorshSerialize)]
pub struct RawTransaction(Vec<u8>);

impl RawTransaction {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> &Vec<u8> {
        &self.0
    }
}

/// Result code returned for a single transaction from
/// [`check_tx`](crate::app::ForumApp::check_tx) and, per entry, from
/// [`finalize_block`](crate::app::ForumApp::finalize_block).
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub enum TxCode {
    /// The transaction is well-formed and its sender is not banned.
    Ok,

    /// The transaction could not be parsed as a client-submitted message.
    InvalidFormat,

    /// A value related to the transaction could not be serialized.
    EncodingError,

    /// The transaction's sender has been banned.
    Banned,
}

impl Display for TxCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TxCode::Ok => write!(f, "Ok"),
            TxCode::InvalidFormat => write!(f, "InvalidFormat"),
            TxCode::EncodingError => write!(f, "EncodingError"),
            TxCode::Banned => write!(f, "Banned"),
        }
    }
}

/// The application state variables that persist across blocks: the height of the highest committed
/// block and the content hash over everything applied up to that height.
///
/// Persisted at the [`APP_STATE`](crate::state::paths::APP_STATE) key on every
/// [`commit`](crate::app::ForumApp::commit), and loaded (or zeroed) when the application starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct AppStateRecord {
    pub height: BlockHeight,
    pub content_hash: CryptoHash,
}

impl AppStateRecord {
    /// The state of a fresh replica that has not committed any block.
    pub fn genesis() -> Self {
        Self {
            height: BlockHeight::new(0),
            content_hash: CryptoHash::zero(),
        }
    }
}
