/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Definitions for the [`ValidatorAddress`] and [`ValidatorRegistry`] types and their associated
//! methods.
//!
//! The registry is constructed explicitly at startup from the validator set the consensus engine
//! reports, and rebuilt through [`ValidatorRegistry::refresh`] whenever the engine reports a
//! validator set change. It is the application's only source of truth for which addresses may
//! stand behind a vote extension: an extension attributed to an address outside the registry is
//! [fatal](crate::app::FatalReplicaError::UnknownValidator), because the moderation protocol
//! cannot reason about untrusted extension sources.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

pub use ed25519_dalek::VerifyingKey;

/// Internal type used for serializing and deserializing values of type [`VerifyingKey`].
pub type VerifyingKeyBytes = [u8; 32];

/// The address under which a validator's votes and vote extensions are attributed: the first 20
/// bytes of the SHA-256 digest of its Ed25519 verifying key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ValidatorAddress([u8; 20]);

impl ValidatorAddress {
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; 20] {
        self.0
    }

    /// Derive the address of the validator holding `key`.
    pub fn of(key: &VerifyingKey) -> ValidatorAddress {
        let digest = Sha256::digest(key.to_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        ValidatorAddress(bytes)
    }
}

/// Identities of the validators currently participating in consensus, keyed by address.
#[derive(Clone)]
pub struct ValidatorRegistry {
    keys: HashMap<ValidatorAddress, VerifyingKey>,
}

impl ValidatorRegistry {
    /// Build a registry from the current validator set.
    pub fn new(validators: impl IntoIterator<Item = VerifyingKey>) -> ValidatorRegistry {
        let keys = validators
            .into_iter()
            .map(|key| (ValidatorAddress::of(&key), key))
            .collect();
        ValidatorRegistry { keys }
    }

    /// Replace the registry's contents with the given validator set. Called when the consensus
    /// engine reports that the validator set has changed.
    pub fn refresh(&mut self, validators: impl IntoIterator<Item = VerifyingKey>) {
        self.keys = validators
            .into_iter()
            .map(|key| (ValidatorAddress::of(&key), key))
            .collect();
    }

    /// Get the verifying key registered under `address`, if any.
    pub fn get(&self, address: &ValidatorAddress) -> Option<&VerifyingKey> {
        self.keys.get(address)
    }

    pub fn contains(&self, address: &ValidatorAddress) -> bool {
        self.keys.contains_key(address)
    }

    /// The number of validators in the registry. This is the `V` against which the
    /// [aggregation threshold](crate::moderation::quorum::quorum_words) is computed.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
