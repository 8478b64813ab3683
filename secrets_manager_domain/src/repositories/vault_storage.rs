// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Vault Storage Port
//!
//! Persistence boundary for envelope-encrypted secrets. Secrets are
//! addressed exclusively by their [`SecretLookupKey`]; a backend never sees
//! a user's logical key name.
//!
//! Backends are shared-immutable: every method takes `&self`, and an
//! adapter that needs interior state (caches, connection pools) must
//! synchronize internally. Chain and cache decorators compose over this
//! same contract.

use crate::entities::Secret;
use crate::error::SecretsManagerError;
use crate::value_objects::SecretLookupKey;

/// Secret persistence capability for one vault.
pub trait VaultStorage: Send + Sync {
    /// Fetches a secret by its lookup identifier.
    ///
    /// A missing secret fails with `SecretNotFound`.
    fn get_secret(&self, lookup: &SecretLookupKey) -> Result<Secret, SecretsManagerError>;

    /// Stores a secret, replacing any record under the same identifier.
    fn put_secret(&self, secret: &Secret) -> Result<(), SecretsManagerError>;

    /// Deletes a fetched secret.
    fn delete_secret(&self, secret: &Secret) -> Result<(), SecretsManagerError>;

    /// Deletes whatever record sits under the identifier.
    fn delete_secret_by_key(&self, lookup: &SecretLookupKey) -> Result<(), SecretsManagerError>;

    /// Drops the whole vault's stored secrets.
    fn delete_vault(&self) -> Result<(), SecretsManagerError>;
}
