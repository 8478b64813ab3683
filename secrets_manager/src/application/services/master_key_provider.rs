// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Master Key Provider
//!
//! Bootstrap loader for the root-of-trust keys. The provider pulls every
//! name in the default master set through a [`KeyStorage`], ignores entries
//! that fail to resolve, validates completeness, and resolves the signature
//! halves up front — splitting a key pair when the deployment stores one
//! instead of loose halves.
//!
//! ## Access Model
//!
//! The provider is immutable after construction and hands keys only to the
//! key manager that constructed it: the accessors are crate-private, so
//! nothing outside this crate can pull master material out of a provider
//! instance. No runtime token scheme is needed for that guarantee; the
//! module system provides it.

use tracing::{debug, warn};

use secrets_manager_domain::{Key, KeyFactory, KeyStorage, MasterKeys, SecretsManagerError};

/// Names resolved against key storage at bootstrap.
pub const MASTER_KEY_NAMES: [&str; 4] = [
    "encryption",
    "signature_key_pair",
    "signature_secret_key",
    "signature_public_key",
];

/// Immutable holder of the bootstrap-loaded master keys.
#[derive(Debug)]
pub struct MasterKeyProvider {
    master_keys: MasterKeys,
    signature_secret: Key,
    signature_public: Key,
}

impl MasterKeyProvider {
    /// Loads and validates the master set.
    ///
    /// Entries that import as absent are skipped silently; entries that
    /// import but fail to resolve are logged and skipped, so a stale
    /// variable cannot brick the bootstrap as long as the set stays
    /// complete. An incomplete set is a fatal `MissingMasterKey`.
    pub fn load(storage: &dyn KeyStorage, factory: &dyn KeyFactory) -> Result<Self, SecretsManagerError> {
        let mut keys = Vec::new();
        for name in MASTER_KEY_NAMES {
            let raw = match storage.import(name)? {
                Some(raw) => raw,
                None => continue,
            };
            match storage.resolve(&raw) {
                Ok(key) => {
                    debug!(name, key_type = %key.key_type(), "master key resolved");
                    keys.push(key);
                }
                Err(e) => {
                    warn!(name, error = %e, "ignoring unresolvable master key entry");
                }
            }
        }

        let master_keys = MasterKeys::from_keys(keys)?;
        let (signature_public, signature_secret) = Self::resolve_signature_halves(&master_keys, factory)?;

        Ok(Self {
            master_keys,
            signature_secret,
            signature_public,
        })
    }

    /// Resolves the signing halves, accepting a pair or loose halves.
    fn resolve_signature_halves(
        master_keys: &MasterKeys,
        factory: &dyn KeyFactory,
    ) -> Result<(Key, Key), SecretsManagerError> {
        if let (Some(secret), Some(public)) =
            (master_keys.signature_secret_key(), master_keys.signature_public_key())
        {
            return Ok((public.clone(), secret.clone()));
        }
        let pair = master_keys.signature_key_pair().ok_or_else(|| {
            SecretsManagerError::missing_master_key("no signature pair and no loose signature halves")
        })?;
        factory.split_key_pair(pair)
    }

    /// The keyring confidentiality key.
    pub(crate) fn encryption_key(&self) -> &Key {
        self.master_keys.encryption_key()
    }

    /// The resolved signing half (loose key, or the pair's secret side).
    pub(crate) fn signature_secret_key(&self) -> &Key {
        &self.signature_secret
    }

    /// The resolved verifying half (loose key, or the pair's public side).
    pub(crate) fn signature_public_key(&self) -> &Key {
        &self.signature_public
    }

    pub fn has_signature_key_pair(&self) -> bool {
        self.master_keys.has_signature_key_pair()
    }
}
