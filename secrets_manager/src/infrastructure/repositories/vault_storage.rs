// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Vault Storage Adapters
//!
//! Concrete secret persistence behind the domain's `VaultStorage` port.
//!
//! - [`FileVaultStorage`] — one JSON record per secret under a vault
//!   directory, named by the secret's lookup identifier. The identifier is
//!   base64-url, so it is filesystem-safe by construction.
//! - [`InMemoryVaultStorage`] — a synchronized map, used as the test
//!   backend and as the inner store behind cache decorators.
//!
//! Deleting an absent secret is idempotent; only lookups distinguish
//! missing records, reporting `SecretNotFound`.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use secrets_manager_domain::{Secret, SecretLookupKey, SecretsManagerError, VaultStorage};

/// One JSON file per secret under the vault directory.
#[derive(Debug)]
pub struct FileVaultStorage {
    root: PathBuf,
}

impl FileVaultStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn secret_path(&self, lookup: &SecretLookupKey) -> PathBuf {
        self.root.join(format!("{}.json", lookup))
    }
}

impl VaultStorage for FileVaultStorage {
    fn get_secret(&self, lookup: &SecretLookupKey) -> Result<Secret, SecretsManagerError> {
        let path = self.secret_path(lookup);
        let contents = match fs::read(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SecretsManagerError::SecretNotFound(format!(
                    "no secret under '{}'",
                    lookup
                )));
            }
            Err(e) => {
                return Err(SecretsManagerError::storage_unavailable(format!(
                    "cannot read secret '{}': {}",
                    path.display(),
                    e
                )));
            }
        };
        Ok(serde_json::from_slice(&contents)?)
    }

    fn put_secret(&self, secret: &Secret) -> Result<(), SecretsManagerError> {
        fs::create_dir_all(&self.root).map_err(|e| {
            SecretsManagerError::storage_unavailable(format!(
                "cannot create vault directory '{}': {}",
                self.root.display(),
                e
            ))
        })?;
        let path = self.secret_path(secret.unique_id());
        let contents = serde_json::to_vec_pretty(secret)?;
        fs::write(&path, contents).map_err(|e| {
            SecretsManagerError::storage_unavailable(format!("cannot write secret '{}': {}", path.display(), e))
        })
    }

    fn delete_secret(&self, secret: &Secret) -> Result<(), SecretsManagerError> {
        self.delete_secret_by_key(secret.unique_id())
    }

    fn delete_secret_by_key(&self, lookup: &SecretLookupKey) -> Result<(), SecretsManagerError> {
        match fs::remove_file(self.secret_path(lookup)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SecretsManagerError::storage_unavailable(format!(
                "cannot delete secret '{}': {}",
                lookup, e
            ))),
        }
    }

    fn delete_vault(&self) -> Result<(), SecretsManagerError> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SecretsManagerError::storage_unavailable(format!(
                "cannot delete vault '{}': {}",
                self.root.display(),
                e
            ))),
        }
    }
}

/// Synchronized in-memory secret map.
#[derive(Debug, Default)]
pub struct InMemoryVaultStorage {
    secrets: Mutex<HashMap<String, Secret>>,
}

impl InMemoryVaultStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored secrets, for assertions in tests and decorators.
    pub fn len(&self) -> usize {
        self.secrets.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VaultStorage for InMemoryVaultStorage {
    fn get_secret(&self, lookup: &SecretLookupKey) -> Result<Secret, SecretsManagerError> {
        let secrets = self
            .secrets
            .lock()
            .map_err(|_| SecretsManagerError::storage_unavailable("secret map poisoned"))?;
        secrets
            .get(lookup.as_str())
            .cloned()
            .ok_or_else(|| SecretsManagerError::SecretNotFound(format!("no secret under '{}'", lookup)))
    }

    fn put_secret(&self, secret: &Secret) -> Result<(), SecretsManagerError> {
        let mut secrets = self
            .secrets
            .lock()
            .map_err(|_| SecretsManagerError::storage_unavailable("secret map poisoned"))?;
        secrets.insert(secret.unique_id().as_str().to_string(), secret.clone());
        Ok(())
    }

    fn delete_secret(&self, secret: &Secret) -> Result<(), SecretsManagerError> {
        self.delete_secret_by_key(secret.unique_id())
    }

    fn delete_secret_by_key(&self, lookup: &SecretLookupKey) -> Result<(), SecretsManagerError> {
        let mut secrets = self
            .secrets
            .lock()
            .map_err(|_| SecretsManagerError::storage_unavailable("secret map poisoned"))?;
        secrets.remove(lookup.as_str());
        Ok(())
    }

    fn delete_vault(&self) -> Result<(), SecretsManagerError> {
        let mut secrets = self
            .secrets
            .lock()
            .map_err(|_| SecretsManagerError::storage_unavailable("secret map poisoned"))?;
        secrets.clear();
        Ok(())
    }
}
