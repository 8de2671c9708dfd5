//! The persistent state of a replica.

pub mod kv_store;
pub mod ledger;
pub mod paths;
pub mod utilities;
