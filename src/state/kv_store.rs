/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/
//! Defines the [`KVStore`] trait, which specifies the required interface for the key-value store
//! provided by the user.
//!
//! Given a method to obtain the value for a given key in bytes, this module also provides methods
//! to obtain the application variables stored in the key-value store, as laid out in
//! [`paths`](super::paths).

use std::fmt::Display;

use borsh::BorshDeserialize;

use crate::types::basic::AppStateRecord;
use crate::types::transaction::Message;

use super::ledger::UserRecord;
use super::paths;
use super::utilities::combine;

/// A key-value store that the application can write to atomically in batches and read from through
/// consistent snapshots. The store's own engine (persistence, transactionality of
/// [`write`](KVStore::write)) is the implementor's responsibility and assumed correct.
pub trait KVStore: KVGet + Clone + Send + 'static {
    type WriteBatch: WriteBatch;
    type Snapshot<'a>: 'a + KVGet;

    /// Atomically apply every operation in `wb`. Either all of the batch's sets and deletes become
    /// visible or, if the process crashes first, none of them do.
    fn write(&mut self, wb: Self::WriteBatch);

    fn clear(&mut self);

    fn snapshot<'b>(&'b self) -> Self::Snapshot<'_>;
}

/// A set of writes to be applied atomically through [`KVStore::write`].
pub trait WriteBatch {
    fn new() -> Self;
    fn set(&mut self, key: &[u8], value: &[u8]);
    fn delete(&mut self, key: &[u8]);
}

pub trait KVGet {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /* ↓↓↓ User records ↓↓↓ */

    fn user(&self, name: &str) -> Result<Option<UserRecord>, KVGetError> {
        let user_key = combine(&paths::USERS, name.as_bytes());
        if let Some(bytes) = self.get(&user_key) {
            Ok(Some(UserRecord::deserialize(&mut &*bytes).map_err(
                |err| KVGetError::DeserializeValueError {
                    key: Key::User {
                        name: name.to_string(),
                    },
                    source: err,
                },
            )?))
        } else {
            Ok(None)
        }
    }

    /* ↓↓↓ Global history ↓↓↓ */

    fn history(&self) -> Result<Vec<Message>, KVGetError> {
        if let Some(bytes) = self.get(&paths::HISTORY) {
            Vec::<Message>::deserialize(&mut &*bytes).map_err(|err| {
                KVGetError::DeserializeValueError {
                    key: Key::History,
                    source: err,
                }
            })
        } else {
            Ok(Vec::new())
        }
    }

    /* ↓↓↓ App state record ↓↓↓ */

    fn app_state_record(&self) -> Result<Option<AppStateRecord>, KVGetError> {
        if let Some(bytes) = self.get(&paths::APP_STATE) {
            Ok(Some(AppStateRecord::deserialize(&mut &*bytes).map_err(
                |err| KVGetError::DeserializeValueError {
                    key: Key::AppStateRecord,
                    source: err,
                },
            )?))
        } else {
            Ok(None)
        }
    }

    /* ↓↓↓ Total messages ↓↓↓ */

    fn total_messages(&self) -> Result<u64, KVGetError> {
        if let Some(bytes) = self.get(&paths::TOTAL_MESSAGES) {
            u64::deserialize(&mut &*bytes).map_err(|err| KVGetError::DeserializeValueError {
                key: Key::TotalMessages,
                source: err,
            })
        } else {
            Ok(0)
        }
    }
}

/// Error when trying to read a value corresponding to a given key from the
/// [key value store][KVStore]: the value could not be deserialized into its expected type.
#[derive(Debug)]
pub enum KVGetError {
    DeserializeValueError { key: Key, source: std::io::Error },
}

impl Display for KVGetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KVGetError::DeserializeValueError { key, source } => {
                write!(f, "failed to deserialize the value at {}: {}", key, source)
            }
        }
    }
}

/// Error when trying to write a value for a given key into a write batch: the value could not be
/// serialized.
#[derive(Debug)]
pub enum KVSetError {
    SerializeValueError { key: Key, source: std::io::Error },
}

impl Display for KVSetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KVSetError::SerializeValueError { key, source } => {
                write!(f, "failed to serialize the value for {}: {}", key, source)
            }
        }
    }
}

/// Names the application variable a [`KVGetError`] or [`KVSetError`] refers to.
#[derive(Debug)]
pub enum Key {
    User { name: String },
    History,
    AppStateRecord,
    TotalMessages,
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self {
            Key::User { name } => write!(f, "User Record for user {}", name),
            Key::History => write!(f, "Global Message History"),
            Key::AppStateRecord => write!(f, "App State Record"),
            Key::TotalMessages => write!(f, "Total Message Counter"),
        }
    }
}
