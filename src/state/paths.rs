/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/
//! Byte-prefixes that specify where each application variable is stored in the user-provided
//! key-value store.
//!
//! Every variable is stored as a **Borsh-serialized value** at a key formed from the constants
//! below. "Single values" (the global history, the app state record, the total message counter)
//! live directly at their one-byte constant key. The user mapping stores each
//! [`UserRecord`](super::ledger::UserRecord) at [`USERS`] concatenated with the UTF-8 bytes of the
//! user's name, using [`combine`](super::utilities::combine).

pub const USERS: [u8; 1] = [0];
pub const HISTORY: [u8; 1] = [1];
pub const APP_STATE: [u8; 1] = [2];
pub const TOTAL_MESSAGES: [u8; 1] = [3];
