/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! [`ForumApp`], the deterministic state transition function a consensus engine drives, and the
//! request/response types of its call boundary.
//!
//! The engine invokes the block lifecycle — [`prepare_proposal`](ForumApp::prepare_proposal) (on
//! the proposer), [`process_proposal`](ForumApp::process_proposal),
//! [`finalize_block`](ForumApp::finalize_block), [`commit`](ForumApp::commit) — strictly
//! sequentially for a given height, and never overlaps two heights. These methods take
//! `&mut self`. The out-of-lifecycle paths — [`check_tx`](ForumApp::check_tx) and
//! [`query`](ForumApp::query) — take `&self` and read only store snapshots, so they are safe to
//! invoke concurrently with themselves and with each other.
//!
//! Besides being invoked through these methods, implementations are expected to be
//! *deterministic*: every replica replaying the same accepted batch at the same height must reach
//! a byte-identical state commitment.
//!
//! # Fatal errors
//!
//! A replica that cannot apply a batch its peers accepted cannot stay consistent with them by
//! skipping it. Conditions of that kind surface as [`FatalReplicaError`] values returned across
//! the call boundary; the host engine is expected to log and halt the replica rather than retry.

use std::fmt::{self, Display, Formatter};

use crate::config::Configuration;
use crate::logging;
use crate::moderation::quorum::{quorum_words, ValidatorExtension};
use crate::moderation::words::WordList;
use crate::proposal;
use crate::state::kv_store::{KVGet, KVGetError, KVStore};
use crate::state::ledger::{Ledger, LedgerError};
use crate::types::basic::{AppStateRecord, BlockHeight, CryptoHash, RawTransaction, TxCode};
use crate::types::transaction::Transaction;
use crate::types::validators::{ValidatorAddress, ValidatorRegistry, VerifyingKey};

/// The reserved [`query`](ForumApp::query) key that returns the global message history instead of
/// a single user's messages.
pub const HISTORY_QUERY_KEY: &str = "history";

/// The application half of a moderated, replicated message ledger.
///
/// Owns the [`Ledger`] over the user-provided [`KVStore`], the
/// [`ValidatorRegistry`](crate::types::validators::ValidatorRegistry), and the
/// [application state record](AppStateRecord) of the highest committed block.
pub struct ForumApp<K: KVStore> {
    configuration: Configuration,
    words: WordList,
    ledger: Ledger<K>,
    registry: ValidatorRegistry,
    state: AppStateRecord,
    pending: Option<PendingBlock<K::WriteBatch>>,
}

/// A finalized-but-uncommitted block: its staged write batch and the state it leads to. Dropped
/// without a trace if the block is never committed.
struct PendingBlock<W> {
    write_batch: W,
    state: AppStateRecord,
}

impl<K: KVStore> ForumApp<K> {
    /// Construct the application over `kv`, loading the persisted application state (or starting
    /// from the genesis state if none was ever committed), and building the validator registry
    /// from the engine-reported validator set.
    pub fn new(
        kv: K,
        configuration: Configuration,
        validators: impl IntoIterator<Item = VerifyingKey>,
    ) -> Result<ForumApp<K>, FatalReplicaError> {
        let ledger = Ledger::new(kv);
        let state = ledger
            .snapshot()
            .app_state_record()
            .map_err(LedgerError::from)?
            .unwrap_or_else(AppStateRecord::genesis);
        let words = WordList::from_words(configuration.moderation_words.clone());

        Ok(ForumApp {
            configuration,
            words,
            ledger,
            registry: ValidatorRegistry::new(validators),
            state,
            pending: None,
        })
    }

    /// The application state as of the highest committed block.
    pub fn state(&self) -> &AppStateRecord {
        &self.state
    }

    /// Rebuild the validator registry. To be called whenever the consensus engine reports a
    /// validator set change.
    pub fn refresh_validator_set(&mut self, validators: impl IntoIterator<Item = VerifyingKey>) {
        self.registry.refresh(validators);
    }

    /* ↓↓↓ Out-of-lifecycle paths ↓↓↓ */

    /// Decide whether a raw transaction may enter the mempool. Advisory spam reduction only, not
    /// a security boundary: the proposal pipeline re-filters banned senders regardless.
    ///
    /// Only well-formed [`Post`](Transaction::Post) transactions from non-banned senders are
    /// admitted. A corrupt user record surfaces as [`TxCode::EncodingError`] rather than an
    /// admission, erring on the side of keeping the transaction out.
    pub fn check_tx(&self, raw: &RawTransaction) -> TxCode {
        let code = match Transaction::parse(raw) {
            Some(Transaction::Post(message)) => {
                match self.ledger.snapshot().user(&message.sender) {
                    Ok(Some(record)) if record.banned => TxCode::Banned,
                    Ok(_) => TxCode::Ok,
                    Err(_) => TxCode::EncodingError,
                }
            }
            // Ban operations are synthesized by proposers, never accepted from clients.
            Some(Transaction::Ban(_)) | None => TxCode::InvalidFormat,
        };
        if self.configuration.log_events {
            logging::log_check_tx(code);
        }
        code
    }

    /// Serve a read-only query over the committed state. [`HISTORY_QUERY_KEY`] returns the
    /// Borsh-serialized global history; any other key is treated as a user name and returns that
    /// user's Borsh-serialized message list, empty if the name was never seen.
    pub fn query(&self, key: &str) -> Result<Vec<u8>, QueryError> {
        use borsh::BorshSerialize;

        let snapshot = self.ledger.snapshot();
        let messages = if key == HISTORY_QUERY_KEY {
            snapshot.history()?
        } else {
            snapshot.user(key)?.map(|record| record.messages).unwrap_or_default()
        };
        messages.try_to_vec().map_err(QueryError::EncodingError)
    }

    /* ↓↓↓ Vote extensions ↓↓↓ */

    /// Produce this replica's vote extension payload for the current height: its configured
    /// moderation word list in wire form.
    pub fn extend_vote(&self) -> String {
        let payload = self.words.encode();
        if self.configuration.log_events {
            logging::log_extend_vote(&payload);
        }
        payload
    }

    /// Structurally check another validator's vote extension payload. Rejects payloads with
    /// duplicate words — the only check an opaque payload admits. An extension attributed to an
    /// address outside the registry is fatal: the moderation protocol cannot reason about
    /// untrusted extension sources.
    pub fn verify_vote_extension(
        &self,
        validator: &ValidatorAddress,
        payload: &str,
    ) -> Result<ExtensionCheck, FatalReplicaError> {
        if !self.registry.contains(validator) {
            return Err(FatalReplicaError::UnknownValidator {
                validator: *validator,
            });
        }

        let check = match WordList::decode(payload) {
            Ok(_) => ExtensionCheck::Accept,
            Err(_) => ExtensionCheck::Reject,
        };
        if self.configuration.log_events {
            logging::log_verify_vote_extension(
                &validator.bytes(),
                check == ExtensionCheck::Accept,
            );
        }
        Ok(check)
    }

    /* ↓↓↓ Block lifecycle ↓↓↓ */

    /// Called on the current block's proposer: aggregate the collected extensions into the agreed
    /// word list and build the ordered batch, bans first.
    pub fn prepare_proposal(
        &self,
        raw_batch: &[RawTransaction],
        extensions: &[ValidatorExtension],
    ) -> Result<Vec<RawTransaction>, FatalReplicaError> {
        for extension in extensions {
            if !self.registry.contains(&extension.validator) {
                return Err(FatalReplicaError::UnknownValidator {
                    validator: extension.validator,
                });
            }
        }

        let agreed_words = quorum_words(extensions, self.registry.len());
        let batch = proposal::build(raw_batch, &agreed_words);

        if self.configuration.log_events {
            let bans = batch
                .iter()
                .take_while(|raw| matches!(Transaction::parse(raw), Some(Transaction::Ban(_))))
                .count();
            logging::log_prepare_proposal(raw_batch.len(), bans, batch.len());
        }
        Ok(batch)
    }

    /// Called on every replica before it votes to finalize: check the candidate batch against the
    /// structural invariant. Rejection is never fatal; the batch is simply not finalized.
    pub fn process_proposal(&self, batch: &[RawTransaction]) -> ProposalCheck {
        let check = match proposal::validate(batch) {
            Ok(()) => ProposalCheck::Accept,
            Err(err) => {
                log::warn!("rejecting proposed batch: {}", err);
                ProposalCheck::Reject
            }
        };
        if self.configuration.log_events {
            logging::log_process_proposal(batch.len(), check == ProposalCheck::Accept);
        }
        check
    }

    /// Execute an accepted batch at `height`, staging its effects without writing them. The new
    /// state commitment is returned for the engine to compare across replicas; the store is only
    /// touched by the subsequent [`commit`](Self::commit). Calling `finalize_block` again before
    /// committing discards the previously staged block.
    ///
    /// `height` must be exactly one above the highest committed height.
    pub fn finalize_block(
        &mut self,
        batch: &[RawTransaction],
        height: BlockHeight,
    ) -> Result<FinalizeBlockResponse, FatalReplicaError> {
        let expected = self.state.height + 1;
        if height != expected {
            return Err(FatalReplicaError::HeightMismatch { expected, height });
        }

        let effects = self.ledger.execute_block(batch, height, &self.state)?;
        let response = FinalizeBlockResponse {
            tx_codes: effects.tx_codes,
            state_commitment: effects.state.content_hash,
        };
        if self.configuration.log_events {
            logging::log_finalize_block(&effects.state, batch.len());
        }
        self.pending = Some(PendingBlock {
            write_batch: effects.write_batch,
            state: effects.state,
        });
        Ok(response)
    }

    /// Durably apply the block staged by [`finalize_block`](Self::finalize_block) and publish the
    /// new application state. Committing with nothing staged is fatal.
    pub fn commit(&mut self) -> Result<AppStateRecord, FatalReplicaError> {
        let pending = self.pending.take().ok_or(FatalReplicaError::NothingStaged)?;
        self.ledger.write(pending.write_batch);
        self.state = pending.state;
        if self.configuration.log_events {
            logging::log_commit(&self.state);
        }
        Ok(self.state)
    }
}

/// Whether a vote extension payload passed the structural duplicate-freedom check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtensionCheck {
    Accept,
    Reject,
}

/// Whether a candidate ordered batch satisfies the structural invariant and may be voted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProposalCheck {
    Accept,
    Reject,
}

/// What [`finalize_block`](ForumApp::finalize_block) reports back to the engine: one result code
/// per batch entry, and the state commitment the block leads to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalizeBlockResponse {
    pub tx_codes: Vec<TxCode>,
    pub state_commitment: CryptoHash,
}

/// Conditions under which the replica cannot continue participating without desynchronizing from
/// its peers. The host engine should halt the replica on any of these; none of them is a
/// per-transaction rejection.
#[derive(Debug)]
pub enum FatalReplicaError {
    /// A vote extension was attributed to a validator outside the registry.
    UnknownValidator { validator: ValidatorAddress },

    /// The engine asked to finalize a block at a height other than the next one.
    HeightMismatch {
        expected: BlockHeight,
        height: BlockHeight,
    },

    /// [`commit`](ForumApp::commit) was called with no finalized block staged.
    NothingStaged,

    /// The ledger failed while executing an already-accepted batch.
    Ledger(LedgerError),
}

impl From<LedgerError> for FatalReplicaError {
    fn from(err: LedgerError) -> Self {
        FatalReplicaError::Ledger(err)
    }
}

impl Display for FatalReplicaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FatalReplicaError::UnknownValidator { validator } => {
                write!(
                    f,
                    "vote extension from a validator outside the registry: {:?}",
                    validator.bytes()
                )
            }
            FatalReplicaError::HeightMismatch { expected, height } => {
                write!(
                    f,
                    "asked to finalize height {} but the next height is {}",
                    height, expected
                )
            }
            FatalReplicaError::NothingStaged => {
                write!(f, "commit called with no finalized block staged")
            }
            FatalReplicaError::Ledger(err) => write!(f, "{}", err),
        }
    }
}

/// Error when serving a [`query`](ForumApp::query). Maps to the
/// [`EncodingError`](TxCode::EncodingError) result code at the engine binding.
#[derive(Debug)]
pub enum QueryError {
    /// A stored value could not be deserialized.
    KVGetError(KVGetError),

    /// The response could not be serialized.
    EncodingError(std::io::Error),
}

impl From<KVGetError> for QueryError {
    fn from(err: KVGetError) -> Self {
        QueryError::KVGetError(err)
    }
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::KVGetError(err) => write!(f, "{}", err),
            QueryError::EncodingError(err) => {
                write!(f, "failed to serialize the query response: {}", err)
            }
        }
    }
}
