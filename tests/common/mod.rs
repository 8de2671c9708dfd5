//! Helpers shared between the integration tests.

// Not every test binary uses every helper.
#![allow(dead_code)]

pub(crate) mod logging;

pub(crate) mod mem_db;

use ed25519_dalek::SigningKey;
use forum_app::config::Configuration;
use forum_app::types::basic::RawTransaction;
use forum_app::types::transaction::{BanOperation, Message, Transaction};
use forum_app::types::validators::{ValidatorAddress, VerifyingKey};
use rand_core::OsRng;

/// A raw, wire-form post from `sender` with the given `text`.
pub(crate) fn post(sender: &str, text: &str) -> RawTransaction {
    Transaction::Post(Message::new(sender, text)).to_raw().unwrap()
}

/// A raw, wire-form ban operation targeting `target`, as a proposer would synthesize it.
pub(crate) fn ban(target: &str) -> RawTransaction {
    Transaction::Ban(BanOperation::new(target)).to_raw().unwrap()
}

/// A raw transaction that does not parse as a [`Transaction`].
pub(crate) fn garbage() -> RawTransaction {
    RawTransaction::new(vec![0xff, 0xff, 0xff, 0xff])
}

/// Generate `n` fresh validator keys.
pub(crate) fn keygen(n: usize) -> Vec<VerifyingKey> {
    let mut csprg = OsRng {};
    (0..n)
        .map(|_| SigningKey::generate(&mut csprg).verifying_key())
        .collect()
}

/// The addresses of the given validator keys.
pub(crate) fn addresses(keys: &[VerifyingKey]) -> Vec<ValidatorAddress> {
    keys.iter().map(ValidatorAddress::of).collect()
}

/// A configuration voting to moderate with the given words, with event logging enabled.
pub(crate) fn configuration(words: &[&str]) -> Configuration {
    Configuration::builder()
        .moderation_words(words.iter().map(|w| w.to_string()).collect())
        .log_events(true)
        .build()
}
