/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Functions that log out the engine-boundary events of the application.
//!
//! The logs defined in this module are printed if the user enabled them via the
//! [configuration](crate::config::Configuration).
//!
//! The application logs using the [log](https://docs.rs/log/latest/log/) crate. To get these
//! messages printed onto a terminal or to a file, set up a
//! [logging implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
//!
//! ## Log message format
//!
//! Log messages are CSVs (Comma Separated Values) with at least two values. The first two values
//! are always:
//! 1. The name of the event in PascalCase (defined in this module as constants).
//! 2. The time the event was emitted (as number of seconds since the Unix Epoch).
//!
//! The rest of the values differ depending on the kind of event. For example, the following
//! snippet is how a committed block is printed:
//!
//! ```text
//! Commit, 1701329264, 3, fNGCJyk
//! ```
//!
//! In the snippet, the third value is the committed height and the fourth is the first seven
//! characters of the Base64 encoding of the new state commitment.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use std::time::SystemTime;

use crate::types::basic::{AppStateRecord, TxCode};

// Names of each event in PascalCase for printing:
pub const CHECK_TX: &str = "CheckTx";
pub const EXTEND_VOTE: &str = "ExtendVote";
pub const VERIFY_VOTE_EXTENSION: &str = "VerifyVoteExtension";
pub const PREPARE_PROPOSAL: &str = "PrepareProposal";
pub const PROCESS_PROPOSAL: &str = "ProcessProposal";
pub const FINALIZE_BLOCK: &str = "FinalizeBlock";
pub const COMMIT: &str = "Commit";

pub(crate) fn log_check_tx(code: TxCode) {
    log::debug!("{}, {}, {}", CHECK_TX, secs_since_unix_epoch(), code)
}

pub(crate) fn log_extend_vote(payload: &str) {
    log::info!("{}, {}, {}", EXTEND_VOTE, secs_since_unix_epoch(), payload)
}

pub(crate) fn log_verify_vote_extension(validator: &[u8], accepted: bool) {
    log::info!(
        "{}, {}, {}, {}",
        VERIFY_VOTE_EXTENSION,
        secs_since_unix_epoch(),
        first_seven_base64_chars(validator),
        accepted
    )
}

pub(crate) fn log_prepare_proposal(raw_len: usize, bans: usize, batch_len: usize) {
    log::info!(
        "{}, {}, {}, {}, {}",
        PREPARE_PROPOSAL,
        secs_since_unix_epoch(),
        raw_len,
        bans,
        batch_len
    )
}

pub(crate) fn log_process_proposal(batch_len: usize, accepted: bool) {
    log::info!(
        "{}, {}, {}, {}",
        PROCESS_PROPOSAL,
        secs_since_unix_epoch(),
        batch_len,
        accepted
    )
}

pub(crate) fn log_finalize_block(state: &AppStateRecord, batch_len: usize) {
    log::info!(
        "{}, {}, {}, {}, {}",
        FINALIZE_BLOCK,
        secs_since_unix_epoch(),
        state.height,
        batch_len,
        first_seven_base64_chars(&state.content_hash.bytes())
    )
}

pub(crate) fn log_commit(state: &AppStateRecord) {
    log::info!(
        "{}, {}, {}, {}",
        COMMIT,
        secs_since_unix_epoch(),
        state.height,
        first_seven_base64_chars(&state.content_hash.bytes())
    )
}

/// Get a more readable representation of a bytesequence by base64-encoding it and taking the first
/// 7 characters.
fn first_seven_base64_chars(bytes: &[u8]) -> String {
    let encoded = STANDARD_NO_PAD.encode(bytes);
    if encoded.len() > 7 {
        encoded[0..7].to_string()
    } else {
        encoded
    }
}

fn secs_since_unix_epoch() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}
