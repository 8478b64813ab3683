// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Factory Port
//!
//! This module defines the domain's key production capability. The factory
//! is the only component allowed to move key material between its opaque
//! [`Key`] form and the raw bytes an engine primitive consumes; everything
//! else in the system handles keys as sealed values.
//!
//! ## Generation vs Derivation
//!
//! [`generate`](KeyFactory::generate) inspects the supplied
//! [`KeyConfig`]: when all four derivation fields (password, salt,
//! security level, algorithm id) are present the key is derived
//! deterministically from the password, otherwise fresh random material is
//! drawn. Determinism matters for operators who re-derive master keys from
//! a passphrase instead of storing them.
//!
//! ## Pair Splitting
//!
//! A generated key pair stores both halves in one record. Splitting yields
//! the sibling `public_key`/`secret_key` keys named by the type taxonomy,
//! each carrying only its own half of the material.

use zeroize::Zeroizing;

use crate::error::SecretsManagerError;
use crate::value_objects::{Key, KeyConfig, KeyType};

/// Key production and engine-form conversion capability.
pub trait KeyFactory: Send + Sync {
    /// Produces a key per the configuration.
    ///
    /// Errors with `UnsupportedKeyType` when the adapter cannot produce the
    /// requested type and `GenerationFailed` when randomness or derivation
    /// fails.
    fn generate(&self, config: &KeyConfig) -> Result<Key, SecretsManagerError>;

    /// Splits a key pair into its `(public, secret)` sibling keys.
    ///
    /// Errors with `NotAKeyPair` for any non-pair input.
    fn split_key_pair(&self, pair: &Key) -> Result<(Key, Key), SecretsManagerError>;

    /// Decodes a key's material into the raw form an engine primitive
    /// consumes. The returned buffer zeroes itself on drop.
    fn to_engine_form(&self, key: &Key) -> Result<Zeroizing<Vec<u8>>, SecretsManagerError>;

    /// Rebuilds a key from raw engine material.
    fn from_engine_form(
        &self,
        raw: &[u8],
        key_type: KeyType,
        adapter: &str,
        version: &str,
    ) -> Result<Key, SecretsManagerError>;
}
