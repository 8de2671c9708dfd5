/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! A deterministic, content-moderated replicated message ledger, designed to sit underneath a
//! Byzantine-fault-tolerant consensus engine.
//!
//! The engine owns transaction ordering, block production, vote transport and validator set
//! management; this crate owns what the engine cannot: applying ordered batches identically on
//! every replica, and the moderation side protocol that turns independently-observed "banned
//! word" votes into one agreed decision about who gets banned in which block — without any extra
//! communication round.
//!
//! The pieces, leaves first:
//! - [`moderation::words`] — the word-list wire codec and the content classifier;
//! - [`moderation::quorum`] — aggregation of per-validator vote extensions past a one-third
//!   threshold;
//! - [`proposal`] — construction of ordered batches (bans first) on the proposer, and structural
//!   validation of candidate batches on every replica;
//! - [`state`] — the pluggable key-value store interface and the once-per-block atomic state
//!   applier;
//! - [`app`] — [`ForumApp`](app::ForumApp), the engine-facing surface tying it all together.

pub mod app;

pub mod config;

pub mod logging;

pub mod moderation;

pub mod proposal;

pub mod state;

pub mod types;
