/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/
//! Read-and-write handle over the application's persistent variables, and the once-per-block
//! state applier.
//!
//! The ledger may be stored in any key-value store of the library user's own choosing, as long as
//! that KV store can provide a type that implements [`KVStore`]. All of a block's effects are
//! accumulated into a single [`LedgerWriteBatch`] by [`Ledger::execute_block`] and only reach the
//! store when [`Ledger::write`] applies the batch — until then the block is discardable, so a
//! crash between the two leaves no partial state visible on restart.
//!
//! # Variables
//!
//! |Variable|Type|Description|
//! |---|---|---|
//! |Users|name -> [`UserRecord`]|Every user ever seen, with its banned flag and message list. Never deleted.|
//! |History|[`Vec<Message>`]|The global chronological message history.|
//! |App State Record|[`AppStateRecord`]|Height and content hash of the highest committed block.|
//! |Total Messages|`u64`|Running count of messages ever accepted.|
//!
//! The location of each variable in the KV store is defined in [`paths`](super::paths).

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};

use crate::types::basic::{AppStateRecord, BlockHeight, CryptoHash, RawTransaction, TxCode};
use crate::types::transaction::{Message, Transaction};

use super::kv_store::{KVGet, KVGetError, KVSetError, KVStore, Key, WriteBatch};
use super::paths;
use super::utilities::combine;

/// The persistent record of one user: whether they are banned, and every message they have posted.
///
/// Created on the first message from (or the first ban of) a previously-unseen name. The `banned`
/// flag never reverts to `false` once set.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct UserRecord {
    pub banned: bool,
    pub messages: Vec<Message>,
}

/// Read-and-write handle over a [`KVStore`] holding the application's variables.
#[derive(Clone)]
pub struct Ledger<K: KVStore> {
    kv: K,
}

impl<K: KVStore> Ledger<K> {
    pub fn new(kv: K) -> Ledger<K> {
        Ledger { kv }
    }

    /// Get a consistent read-only view of the committed variables. Safe to call concurrently with
    /// other snapshots; this is the read path for
    /// [`check_tx`](crate::app::ForumApp::check_tx) and [`query`](crate::app::ForumApp::query).
    pub fn snapshot(&self) -> K::Snapshot<'_> {
        self.kv.snapshot()
    }

    /// Execute an accepted, ordered batch against the committed state at `prev`, producing the
    /// block's whole effect as one [`BlockEffects`] value. Nothing is written to the store.
    ///
    /// The batch must have passed [`validate`](crate::proposal::validate): an entry that fails to
    /// parse at this stage is an internal invariant violation, not a per-transaction rejection.
    pub fn execute_block(
        &self,
        batch: &[RawTransaction],
        height: BlockHeight,
        prev: &AppStateRecord,
    ) -> Result<BlockEffects<K::WriteBatch>, LedgerError> {
        let snapshot = self.kv.snapshot();

        let mut touched: HashMap<String, UserRecord> = HashMap::new();
        let mut new_messages: Vec<Message> = Vec::new();
        let mut tx_codes: Vec<TxCode> = Vec::with_capacity(batch.len());

        let mut hasher = Sha256::new();
        hasher.update(prev.content_hash.bytes());
        hasher.update(height.to_le_bytes());

        for (index, raw) in batch.iter().enumerate() {
            let transaction = Transaction::parse(raw)
                .ok_or(LedgerError::MalformedTransaction { index })?;
            hasher.update(raw.bytes());

            match transaction {
                Transaction::Ban(ban) => {
                    let record = Self::touch(&snapshot, &mut touched, &ban.target)?;
                    record.banned = true;
                }
                Transaction::Post(message) => {
                    // A post never touches the banned flag.
                    let record = Self::touch(&snapshot, &mut touched, &message.sender)?;
                    record.messages.push(message.clone());
                    new_messages.push(message);
                }
            }
            tx_codes.push(TxCode::Ok);
        }

        let state = AppStateRecord {
            height,
            content_hash: CryptoHash::new(hasher.finalize().into()),
        };

        let mut wb = LedgerWriteBatch::new();
        for (name, record) in &touched {
            wb.set_user(name, record)?;
        }
        if !new_messages.is_empty() {
            let mut history = snapshot.history()?;
            let total = snapshot.total_messages()? + new_messages.len() as u64;
            history.extend(new_messages);
            wb.set_history(&history)?;
            wb.set_total_messages(total)?;
        }
        wb.set_app_state_record(&state)?;

        Ok(BlockEffects {
            write_batch: wb.into_inner(),
            state,
            tx_codes,
        })
    }

    /// Atomically apply a block's write batch to the store.
    pub fn write(&mut self, wb: K::WriteBatch) {
        self.kv.write(wb)
    }

    fn touch<'a, S: KVGet>(
        snapshot: &S,
        touched: &'a mut HashMap<String, UserRecord>,
        name: &str,
    ) -> Result<&'a mut UserRecord, LedgerError> {
        if !touched.contains_key(name) {
            let record = snapshot.user(name)?.unwrap_or_default();
            touched.insert(name.to_string(), record);
        }
        // The entry was just inserted if it was missing.
        Ok(touched.get_mut(name).unwrap())
    }
}

/// Everything a block does to the application, staged and not yet written: the store write batch,
/// the application state after the block, and the per-transaction result codes reported back to
/// the consensus engine.
pub struct BlockEffects<W: WriteBatch> {
    pub write_batch: W,
    pub state: AppStateRecord,
    pub tx_codes: Vec<TxCode>,
}

/// Typed setters over a [`WriteBatch`], forming keys per [`paths`](super::paths) so that callers
/// never touch raw keys.
pub struct LedgerWriteBatch<W: WriteBatch>(W);

impl<W: WriteBatch> LedgerWriteBatch<W> {
    pub fn new() -> LedgerWriteBatch<W> {
        LedgerWriteBatch(W::new())
    }

    pub fn into_inner(self) -> W {
        self.0
    }

    pub fn set_user(&mut self, name: &str, record: &UserRecord) -> Result<(), LedgerError> {
        Ok(self.0.set(
            &combine(&paths::USERS, name.as_bytes()),
            &record.try_to_vec().map_err(|err| KVSetError::SerializeValueError {
                key: Key::User {
                    name: name.to_string(),
                },
                source: err,
            })?,
        ))
    }

    pub fn set_history(&mut self, history: &Vec<Message>) -> Result<(), LedgerError> {
        Ok(self.0.set(
            &paths::HISTORY,
            &history.try_to_vec().map_err(|err| KVSetError::SerializeValueError {
                key: Key::History,
                source: err,
            })?,
        ))
    }

    pub fn set_app_state_record(&mut self, record: &AppStateRecord) -> Result<(), LedgerError> {
        Ok(self.0.set(
            &paths::APP_STATE,
            &record.try_to_vec().map_err(|err| KVSetError::SerializeValueError {
                key: Key::AppStateRecord,
                source: err,
            })?,
        ))
    }

    pub fn set_total_messages(&mut self, total: u64) -> Result<(), LedgerError> {
        Ok(self.0.set(
            &paths::TOTAL_MESSAGES,
            &total.try_to_vec().map_err(|err| KVSetError::SerializeValueError {
                key: Key::TotalMessages,
                source: err,
            })?,
        ))
    }
}

/// Error when executing a block against the ledger. Any of these after a batch has been accepted
/// by [`process_proposal`](crate::app::ForumApp::process_proposal) is unrecoverable for the
/// replica.
#[derive(Debug)]
pub enum LedgerError {
    KVGetError(KVGetError),
    KVSetError(KVSetError),

    /// The entry at `index` of an already-accepted batch does not parse.
    MalformedTransaction { index: usize },
}

impl From<KVGetError> for LedgerError {
    fn from(err: KVGetError) -> Self {
        LedgerError::KVGetError(err)
    }
}

impl From<KVSetError> for LedgerError {
    fn from(err: KVSetError) -> Self {
        LedgerError::KVSetError(err)
    }
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::KVGetError(err) => write!(f, "{}", err),
            LedgerError::KVSetError(err) => write!(f, "{}", err),
            LedgerError::MalformedTransaction { index } => {
                write!(f, "transaction at index {} of an accepted batch is malformed", index)
            }
        }
    }
}
