// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Secret Manager
//!
//! Envelope encryption of user secrets over one vault, plus the short-hash
//! lookup scheme that hides logical secret names from the backing store.
//!
//! ## Two-Tier Envelope
//!
//! Every secret is protected by two keys:
//!
//! - the vault-scoped **KMS key**, stored on the keyring under `kms_key`,
//!   which only ever encrypts data-key records;
//! - a fresh per-secret **data encryption key (DEK)** that encrypts the
//!   MAC-prefixed payload.
//!
//! Rotating the KMS key therefore re-wraps data keys without touching the
//! bulk payloads of untouched secrets, and no two secrets share a payload
//! key.
//!
//! ## Lookup Identifiers
//!
//! A secret's storage address is
//! `base64url(shorthash(vault ∥ name, cache_key_l) ∥ shorthash(vault ∥ name, cache_key_r))`
//! where the two halves are the vault's raw cache key split at the engine's
//! short-hash key length. The address is deterministic, non-reversible,
//! and collision-free for practical purposes, so the store learns nothing
//! about logical names.
//!
//! ## Scope
//!
//! A manager instance is bound to one vault and one session authentication
//! key at construction; the vault name participates in every lookup
//! identifier, so records of different vaults never collide even in a
//! shared backend.

use std::sync::Arc;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use serde::{Deserialize, Serialize};

use secrets_manager_domain::{
    Key, KeyConfig, KeyType, Secret, SecretLookupKey, SecretValue, SecretsManagerError, VaultStorage,
};

use crate::application::services::key_manager::KeyManager;

/// Keyring name of the vault's KMS key.
pub const KMS_KEY_NAME: &str = "kms_key";

/// Keyring name of the vault's cache key.
pub const CACHE_KEY_NAME: &str = "cache_key";

/// Vault metadata names of the split cache-key halves.
pub const CACHE_KEY_LEFT: &str = "cache_key_l";
pub const CACHE_KEY_RIGHT: &str = "cache_key_r";

/// On-wire form of a wrapped data encryption key.
#[derive(Serialize, Deserialize)]
struct DataKeyRecord {
    hex: String,
    #[serde(rename = "type")]
    key_type: KeyType,
    adapter: String,
    version: String,
}

/// Envelope encryption service over one vault.
pub struct SecretManager {
    key_manager: KeyManager,
    storage: Arc<dyn VaultStorage>,
    auth_key: Key,
    vault: String,
}

impl SecretManager {
    pub fn new(
        key_manager: KeyManager,
        storage: Arc<dyn VaultStorage>,
        auth_key: Key,
        vault: impl Into<String>,
    ) -> Self {
        Self {
            key_manager,
            storage,
            auth_key,
            vault: vault.into(),
        }
    }

    pub fn vault(&self) -> &str {
        &self.vault
    }

    /// The underlying key manager, for keyring-level operations.
    pub fn key_manager(&self) -> &KeyManager {
        &self.key_manager
    }

    pub fn key_manager_mut(&mut self) -> &mut KeyManager {
        &mut self.key_manager
    }

    /// Initializes the vault's envelope keys and persists the keyring.
    ///
    /// Generates the KMS key and the cache key, splits the raw cache key
    /// into its two short-hash halves stored as vault metadata, and saves
    /// the keyring.
    pub fn new_vault(&mut self) -> Result<(), SecretsManagerError> {
        self.key_manager.unlock_keyring(&self.auth_key)?;

        self.key_manager.new_key(
            &self.vault,
            KMS_KEY_NAME,
            &KeyConfig::new(KeyType::SymmetricEncryptionKey),
        )?;
        let cache_key = self.key_manager.new_key(
            &self.vault,
            CACHE_KEY_NAME,
            &KeyConfig::new(KeyType::SymmetricAuthenticationKey),
        )?;

        let raw = self.key_manager.factory().to_engine_form(&cache_key)?;
        let half = self.key_manager.engine().shorthash_key_len();
        if raw.len() < 2 * half {
            return Err(SecretsManagerError::GenerationFailed(format!(
                "cache key material is {} bytes, need {} for both short-hash halves",
                raw.len(),
                2 * half
            )));
        }
        self.key_manager
            .add_metadata(&self.vault, CACHE_KEY_LEFT, raw[..half].to_vec())?;
        self.key_manager
            .add_metadata(&self.vault, CACHE_KEY_RIGHT, raw[half..2 * half].to_vec())?;

        self.key_manager.save_keyring(&self.auth_key)?;
        debug!(vault = %self.vault, "vault initialized");
        Ok(())
    }

    /// Builds the storage address of a logical secret name.
    pub fn lookup_key(&self, name: &str) -> Result<SecretLookupKey, SecretsManagerError> {
        let left = self
            .key_manager
            .get_metadata(&self.vault, CACHE_KEY_LEFT)?
            .ok_or_else(|| self.uninitialized())?;
        let right = self
            .key_manager
            .get_metadata(&self.vault, CACHE_KEY_RIGHT)?
            .ok_or_else(|| self.uninitialized())?;

        let message = [self.vault.as_bytes(), name.as_bytes()].concat();
        let engine = self.key_manager.engine();
        let left_hash = engine.shorthash(&message, &left)?;
        let right_hash = engine.shorthash(&message, &right)?;
        Ok(SecretLookupKey::from_halves(&left_hash, &right_hash))
    }

    /// Seals and stores a secret under its logical name.
    pub fn set(&mut self, name: &str, value: &SecretValue) -> Result<(), SecretsManagerError> {
        let lookup = self.lookup_key(name)?;
        let kms_key = self.kms_key()?;
        let secret = self.seal(lookup, value, &kms_key)?;
        self.storage.put_secret(&secret)?;
        debug!(vault = %self.vault, "secret stored");
        Ok(())
    }

    /// Fetches and opens a secret by its logical name.
    pub fn get(&self, name: &str) -> Result<SecretValue, SecretsManagerError> {
        let lookup = self.lookup_key(name)?;
        let secret = self.storage.get_secret(&lookup)?;
        if !secret.is_encrypted() {
            return SecretValue::from_bytes(secret.value());
        }
        let kms_key = self.kms_key()?;
        self.open(&secret, &kms_key)
    }

    /// Deletes a secret by its logical name.
    pub fn delete(&mut self, name: &str) -> Result<(), SecretsManagerError> {
        let lookup = self.lookup_key(name)?;
        let secret = self.storage.get_secret(&lookup)?;
        self.storage.delete_secret(&secret)
    }

    /// Drops the vault's stored secrets and its keyring entry.
    pub fn delete_vault(&mut self) -> Result<(), SecretsManagerError> {
        self.storage.delete_vault()?;
        self.key_manager.unlock_keyring(&self.auth_key)?;
        let vault = self.vault.clone();
        self.key_manager.flush_vault(&vault)?;
        self.key_manager.save_keyring(&self.auth_key)
    }

    /// Rotates the vault's KMS key and re-wraps the named secrets.
    ///
    /// Secrets missing from the store are skipped; any other failure
    /// restores the keyring to its pre-rotation snapshot and reports
    /// `RotationFailed`. Surviving secrets keep decrypting under whichever
    /// state the operation left durable.
    pub fn rotate_secrets(&mut self, names: &[&str]) -> Result<bool, SecretsManagerError> {
        let snapshot = self
            .key_manager
            .keyring_snapshot()
            .ok_or_else(|| SecretsManagerError::KeyringNotFound("no keyring in memory".to_string()))?;
        let old_kms = self.kms_key()?;

        self.key_manager.rotate_keys(&self.vault, None)?;
        let new_kms = self.kms_key()?;

        for name in names {
            let lookup = match self.lookup_key(name) {
                Ok(lookup) => lookup,
                Err(e) => return self.rotation_rollback(snapshot, e),
            };
            let secret = match self.storage.get_secret(&lookup) {
                Ok(secret) => secret,
                Err(SecretsManagerError::SecretNotFound(_)) => {
                    debug!(vault = %self.vault, "skipping absent secret during rotation");
                    continue;
                }
                Err(e) => return self.rotation_rollback(snapshot, e),
            };
            let value = match self.open(&secret, &old_kms) {
                Ok(value) => value,
                Err(e) => return self.rotation_rollback(snapshot, e),
            };
            let resealed = match self.seal(lookup, &value, &new_kms) {
                Ok(resealed) => resealed,
                Err(e) => return self.rotation_rollback(snapshot, e),
            };
            if let Err(e) = self.storage.put_secret(&resealed) {
                return self.rotation_rollback(snapshot, e);
            }
        }

        if let Err(e) = self.key_manager.save_keyring(&self.auth_key) {
            return self.rotation_rollback(snapshot, e);
        }
        debug!(vault = %self.vault, rotated = names.len(), "secrets rotated");
        Ok(true)
    }

    /// Seals a value into an envelope-encrypted record.
    fn seal(
        &self,
        lookup: SecretLookupKey,
        value: &SecretValue,
        kms_key: &Key,
    ) -> Result<Secret, SecretsManagerError> {
        let engine = self.key_manager.engine();
        let factory = self.key_manager.factory();

        let payload = Zeroizing::new(value.to_bytes()?);
        let mac = engine.authenticate(&payload, &self.auth_key)?;
        let mut authed = Zeroizing::new(Vec::with_capacity(mac.len() + payload.len()));
        authed.extend_from_slice(&mac);
        authed.extend_from_slice(&payload);

        let dek = factory.generate(&KeyConfig::new(KeyType::SymmetricEncryptionKey))?;
        let record = DataKeyRecord {
            hex: dek.material().expose().to_string(),
            key_type: dek.key_type(),
            adapter: dek.adapter().to_string(),
            version: dek.version().to_string(),
        };
        let record_bytes = Zeroizing::new(serde_json::to_vec(&record)?);

        let encrypted_data_key = engine.encrypt(&record_bytes, kms_key, None)?;
        let encrypted_value = engine.encrypt(&authed, &dek, None)?;
        Ok(Secret::sealed(lookup, encrypted_data_key, encrypted_value))
    }

    /// Opens an envelope-encrypted record back into its value.
    fn open(&self, secret: &Secret, kms_key: &Key) -> Result<SecretValue, SecretsManagerError> {
        if !secret.is_encrypted() {
            return SecretValue::from_bytes(secret.value());
        }
        let engine = self.key_manager.engine();
        let factory = self.key_manager.factory();

        let record_bytes = engine.decrypt(secret.encrypted_data_key(), kms_key, None)?;
        let record: DataKeyRecord = serde_json::from_slice(&record_bytes)?;
        let raw = Zeroizing::new(hex::decode(&record.hex).map_err(|e| {
            SecretsManagerError::serialization_failed(format!("data key record is not hex: {}", e))
        })?);
        let dek = factory.from_engine_form(&raw, record.key_type, &record.adapter, &record.version)?;

        let authed = engine.decrypt(secret.value(), &dek, None)?;
        let mac_len = engine.mac_len();
        if authed.len() < mac_len {
            return Err(SecretsManagerError::SecretVerificationFailed(
                "payload shorter than its MAC prefix".to_string(),
            ));
        }
        let (mac, payload) = authed.split_at(mac_len);
        if !engine.verify(payload, &self.auth_key, mac)? {
            warn!(vault = %self.vault, "secret MAC rejected");
            return Err(SecretsManagerError::SecretVerificationFailed(
                "payload MAC does not verify under the session key".to_string(),
            ));
        }
        SecretValue::from_bytes(payload)
    }

    fn kms_key(&self) -> Result<Key, SecretsManagerError> {
        self.key_manager
            .get_key(&self.vault, KMS_KEY_NAME)?
            .ok_or_else(|| self.uninitialized())
    }

    fn uninitialized(&self) -> SecretsManagerError {
        SecretsManagerError::KeyringNotFound(format!(
            "vault '{}' is not initialized on the keyring",
            self.vault
        ))
    }

    fn rotation_rollback(
        &mut self,
        snapshot: secrets_manager_domain::Keyring,
        cause: SecretsManagerError,
    ) -> Result<bool, SecretsManagerError> {
        warn!(vault = %self.vault, error = %cause, "secret rotation failed, restoring keyring snapshot");
        self.key_manager.restore_keyring(snapshot);
        Err(SecretsManagerError::rotation_failed(format!(
            "rotating vault '{}': {}",
            self.vault, cause
        )))
    }
}
