// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Master Key Set
//!
//! This module provides the root-of-trust key collection loaded at
//! bootstrap. The whole keyring lifecycle depends on it: the symmetric
//! encryption key protects the persisted keyring's confidentiality, the
//! signature key (or pair) protects its integrity.
//!
//! ## Completeness
//!
//! A master key set is usable only when it holds
//!
//! - exactly one `symmetric_encryption_key`, and
//! - either one `asymmetric_signature_key_pair`, or both the
//!   `asymmetric_signature_secret_key` and
//!   `asymmetric_signature_public_key` halves.
//!
//! Anything less is a fatal startup error ([`MissingMasterKey`]); anything
//! more (both a pair and loose halves) is tolerated, the loose halves win
//! on access so that pre-split deployments keep working.
//!
//! [`MissingMasterKey`]: crate::error::SecretsManagerError::MissingMasterKey

use crate::error::SecretsManagerError;
use crate::value_objects::{Key, KeyType};

/// Validated root-of-trust key collection.
///
/// Immutable after construction; accessors hand out shared references only.
#[derive(Debug, Clone)]
pub struct MasterKeys {
    encryption: Key,
    signature_key_pair: Option<Key>,
    signature_secret_key: Option<Key>,
    signature_public_key: Option<Key>,
}

impl MasterKeys {
    /// Classifies and validates a set of loaded keys.
    ///
    /// Keys with types outside the master set (authentication keys, loose
    /// hex material) are rejected; duplicates of a slot are rejected as
    /// well since a second encryption key would make decryption ambiguous.
    pub fn from_keys(keys: Vec<Key>) -> Result<Self, SecretsManagerError> {
        let mut encryption: Option<Key> = None;
        let mut signature_key_pair: Option<Key> = None;
        let mut signature_secret_key: Option<Key> = None;
        let mut signature_public_key: Option<Key> = None;

        for key in keys {
            let slot = match key.key_type() {
                KeyType::SymmetricEncryptionKey => &mut encryption,
                KeyType::AsymmetricSignatureKeyPair => &mut signature_key_pair,
                KeyType::AsymmetricSignatureSecretKey => &mut signature_secret_key,
                KeyType::AsymmetricSignaturePublicKey => &mut signature_public_key,
                other => {
                    return Err(SecretsManagerError::missing_master_key(format!(
                        "key of type '{}' has no master slot",
                        other
                    )));
                }
            };
            if slot.is_some() {
                return Err(SecretsManagerError::missing_master_key(format!(
                    "duplicate master key of type '{}'",
                    key.key_type()
                )));
            }
            *slot = Some(key);
        }

        let encryption = encryption.ok_or_else(|| {
            SecretsManagerError::missing_master_key("no symmetric encryption key in master set")
        })?;

        let has_pair = signature_key_pair.is_some();
        let has_halves = signature_secret_key.is_some() && signature_public_key.is_some();
        if !has_pair && !has_halves {
            return Err(SecretsManagerError::missing_master_key(
                "master set needs a signature key pair or both signature halves",
            ));
        }

        Ok(Self {
            encryption,
            signature_key_pair,
            signature_secret_key,
            signature_public_key,
        })
    }

    /// The keyring confidentiality key.
    pub fn encryption_key(&self) -> &Key {
        &self.encryption
    }

    pub fn signature_key_pair(&self) -> Option<&Key> {
        self.signature_key_pair.as_ref()
    }

    /// The loose secret signature half, when one was loaded.
    pub fn signature_secret_key(&self) -> Option<&Key> {
        self.signature_secret_key.as_ref()
    }

    /// The loose public signature half, when one was loaded.
    pub fn signature_public_key(&self) -> Option<&Key> {
        self.signature_public_key.as_ref()
    }

    pub fn has_signature_key_pair(&self) -> bool {
        self.signature_key_pair.is_some()
    }
}
