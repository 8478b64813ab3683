// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Manager
//!
//! Orchestrates the keyring lifecycle over the engine, the key factory,
//! the master key provider, and the codec: creation, locking, persistence,
//! loading, vault/key CRUD, and rotation.
//!
//! ## Lifecycle Ordering
//!
//! Exactly one keyring lives in a manager at a time. `load_keyring` and
//! `new_keyring` refuse to replace one already in memory
//! (`KeyringAlreadyLoaded`); every vault or key access before one is in
//! memory fails with `KeyringNotFound`. Saving must follow any mutation
//! that should persist — nothing writes through automatically.
//!
//! ## Session Keys
//!
//! Every gate on the keyring works through the MAC of the keyring's
//! `unique_id` under the caller's authentication key. The manager never
//! stores that key; callers present it per operation.
//!
//! ## Rotation
//!
//! `rotate_keys` regenerates named keys in place, type and adapter
//! preserved, from a snapshot taken before the loop: any failure rolls
//! every already-rotated entry back before reporting `RotationFailed`.
//!
//! The manager is intentionally not thread-safe; share it behind one
//! exclusive guard or not at all.

use std::sync::Arc;
use tracing::{debug, warn};

use secrets_manager_domain::services::request_validator;
use secrets_manager_domain::{
    EncryptionEngine, Key, KeyConfig, KeyFactory, Keyring, KeyType, SecretsManagerError,
};

use crate::application::services::master_key_provider::MasterKeyProvider;
use crate::infrastructure::services::keyring_codec::KeyringCodec;

/// Key names rotated when the caller does not name any.
pub const DEFAULT_ROTATION_KEYS: [&str; 1] = ["kms_key"];

/// Keyring lifecycle and vault/key CRUD orchestrator.
pub struct KeyManager {
    engine: Arc<dyn EncryptionEngine>,
    factory: Arc<dyn KeyFactory>,
    provider: MasterKeyProvider,
    codec: KeyringCodec,
    keyring: Option<Keyring>,
}

impl KeyManager {
    pub fn new(
        engine: Arc<dyn EncryptionEngine>,
        factory: Arc<dyn KeyFactory>,
        provider: MasterKeyProvider,
        codec: KeyringCodec,
    ) -> Self {
        Self {
            engine,
            factory,
            provider,
            codec,
            keyring: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.keyring.is_some()
    }

    /// Identity of the in-memory keyring, if one is loaded.
    pub fn keyring_id(&self) -> Option<&str> {
        self.keyring.as_ref().map(Keyring::unique_id)
    }

    /// Creates a fresh keyring authorized for exactly one session key.
    ///
    /// When no key is supplied a new symmetric authentication key is
    /// generated; either way the session key is returned to the caller,
    /// who must keep it to operate the keyring.
    pub fn new_keyring(&mut self, auth_key: Option<Key>) -> Result<Key, SecretsManagerError> {
        if self.keyring.is_some() {
            return Err(SecretsManagerError::KeyringAlreadyLoaded(
                "a keyring is already in memory".to_string(),
            ));
        }
        let auth_key = match auth_key {
            Some(key) => {
                request_validator::ensure_authentication_key(&key)?;
                key
            }
            None => self
                .factory
                .generate(&KeyConfig::new(KeyType::SymmetricAuthenticationKey))?,
        };

        let mut keyring = Keyring::new();
        let mac = self.engine.authenticate(keyring.unique_id().as_bytes(), &auth_key)?;
        keyring.add_auth(mac);
        debug!(unique_id_len = keyring.unique_id().len(), "new keyring created");
        self.keyring = Some(keyring);
        Ok(auth_key)
    }

    /// Loads the persisted keyring and unlocks it for this session.
    pub fn load_keyring(&mut self, auth_key: &Key) -> Result<(), SecretsManagerError> {
        if self.keyring.is_some() {
            return Err(SecretsManagerError::KeyringAlreadyLoaded(
                "a keyring is already in memory".to_string(),
            ));
        }
        let mut keyring = self.codec.load(
            auth_key,
            self.provider.encryption_key(),
            self.provider.signature_public_key(),
        )?;
        let mac = self.engine.authenticate(keyring.unique_id().as_bytes(), auth_key)?;
        keyring.unlock(&mac)?;
        self.keyring = Some(keyring);
        Ok(())
    }

    /// Persists the keyring, restoring its pre-save lock state afterwards.
    pub fn save_keyring(&mut self, auth_key: &Key) -> Result<(), SecretsManagerError> {
        let keyring = self
            .keyring
            .as_mut()
            .ok_or_else(|| SecretsManagerError::KeyringNotFound("no keyring in memory to save".to_string()))?;
        let was_locked = keyring.is_locked();

        self.codec.save(
            keyring,
            auth_key,
            self.provider.encryption_key(),
            self.provider.signature_secret_key(),
        )?;

        if !was_locked {
            let mac = self.engine.authenticate(keyring.unique_id().as_bytes(), auth_key)?;
            keyring.unlock(&mac)?;
        }
        Ok(())
    }

    pub fn lock_keyring(&mut self, auth_key: &Key) -> Result<(), SecretsManagerError> {
        let mac = self.session_mac(auth_key)?;
        self.keyring_mut()?.lock(&mac)
    }

    pub fn unlock_keyring(&mut self, auth_key: &Key) -> Result<(), SecretsManagerError> {
        let mac = self.session_mac(auth_key)?;
        self.keyring_mut()?.unlock(&mac)
    }

    /// Adds a key under `(vault, name)`; silent no-op while locked.
    pub fn add_key(&mut self, vault: &str, name: &str, key: Key) -> Result<(), SecretsManagerError> {
        self.keyring_mut()?.add_key(vault, name, key);
        Ok(())
    }

    /// Looks up a key; `None` while locked or when absent.
    pub fn get_key(&self, vault: &str, name: &str) -> Result<Option<Key>, SecretsManagerError> {
        Ok(self.keyring_ref()?.get_key(vault, name).cloned())
    }

    /// Generates a key from the config and stores it on the keyring.
    ///
    /// The generated key is returned even when the keyring is locked and
    /// the store was a no-op, mirroring the silent-mutation invariant.
    pub fn new_key(&mut self, vault: &str, name: &str, config: &KeyConfig) -> Result<Key, SecretsManagerError> {
        let key = self.factory.generate(config)?;
        self.keyring_mut()?.add_key(vault, name, key.clone());
        Ok(key)
    }

    /// Stores a metadata value; silent no-op while locked.
    pub fn add_metadata(&mut self, vault: &str, name: &str, value: Vec<u8>) -> Result<(), SecretsManagerError> {
        self.keyring_mut()?.add_metadata(vault, name, value);
        Ok(())
    }

    /// Looks up a metadata value; `None` while locked or when absent.
    pub fn get_metadata(&self, vault: &str, name: &str) -> Result<Option<Vec<u8>>, SecretsManagerError> {
        Ok(self.keyring_ref()?.get_metadata(vault, name).map(<[u8]>::to_vec))
    }

    /// Removes a vault and everything in it; silent no-op while locked.
    pub fn flush_vault(&mut self, vault: &str) -> Result<(), SecretsManagerError> {
        self.keyring_mut()?.flush_vault(vault);
        Ok(())
    }

    /// Regenerates the named keys (default: the vault's KMS key) in place.
    ///
    /// Each replacement preserves the old key's type and version; the
    /// adapter stays the factory's own. On any failure every
    /// already-rotated entry is restored from the pre-loop snapshot and
    /// the operation reports `RotationFailed`.
    pub fn rotate_keys(&mut self, vault: &str, names: Option<&[&str]>) -> Result<bool, SecretsManagerError> {
        let keyring = self
            .keyring
            .as_mut()
            .ok_or_else(|| SecretsManagerError::KeyringNotFound("no keyring in memory".to_string()))?;
        if keyring.is_locked() {
            return Err(SecretsManagerError::rotation_failed("keyring is locked"));
        }

        let names: Vec<&str> = match names {
            Some(names) => names.to_vec(),
            None => DEFAULT_ROTATION_KEYS.to_vec(),
        };
        let snapshot: Vec<(String, Option<Key>)> = names
            .iter()
            .map(|name| (name.to_string(), keyring.get_key(vault, name).cloned()))
            .collect();

        for name in &names {
            let old = match keyring.get_key(vault, name) {
                Some(key) => key.clone(),
                None => {
                    Self::restore_entries(keyring, vault, &snapshot);
                    return Err(SecretsManagerError::rotation_failed(format!(
                        "key '{}' is absent from vault '{}'",
                        name, vault
                    )));
                }
            };
            let config = KeyConfig::new(old.key_type()).with_version(old.version().to_string());
            match self.factory.generate(&config) {
                Ok(fresh) => keyring.add_key(vault, name, fresh),
                Err(e) => {
                    warn!(vault, name, error = %e, "key rotation failed, rolling back");
                    Self::restore_entries(keyring, vault, &snapshot);
                    return Err(SecretsManagerError::rotation_failed(format!(
                        "regenerating '{}' in vault '{}': {}",
                        name, vault, e
                    )));
                }
            }
        }
        debug!(vault, rotated = names.len(), "keys rotated");
        Ok(true)
    }

    fn restore_entries(keyring: &mut Keyring, vault: &str, snapshot: &[(String, Option<Key>)]) {
        for (name, entry) in snapshot {
            match entry {
                Some(key) => keyring.add_key(vault, name, key.clone()),
                None => keyring.remove_key(vault, name),
            }
        }
    }

    fn session_mac(&self, auth_key: &Key) -> Result<Vec<u8>, SecretsManagerError> {
        let keyring = self.keyring_ref()?;
        self.engine.authenticate(keyring.unique_id().as_bytes(), auth_key)
    }

    fn keyring_ref(&self) -> Result<&Keyring, SecretsManagerError> {
        self.keyring
            .as_ref()
            .ok_or_else(|| SecretsManagerError::KeyringNotFound("no keyring in memory".to_string()))
    }

    fn keyring_mut(&mut self) -> Result<&mut Keyring, SecretsManagerError> {
        self.keyring
            .as_mut()
            .ok_or_else(|| SecretsManagerError::KeyringNotFound("no keyring in memory".to_string()))
    }

    /// Deep copy of the in-memory keyring for rotation rollback.
    pub(crate) fn keyring_snapshot(&self) -> Option<Keyring> {
        self.keyring.clone()
    }

    /// Restores a snapshot taken before a failed multi-step operation.
    pub(crate) fn restore_keyring(&mut self, snapshot: Keyring) {
        self.keyring = Some(snapshot);
    }

    pub(crate) fn engine(&self) -> &Arc<dyn EncryptionEngine> {
        &self.engine
    }

    pub(crate) fn factory(&self) -> &Arc<dyn KeyFactory> {
        &self.factory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::engine::RustCryptoEngine;
    use crate::infrastructure::adapters::key_factory::RustCryptoKeyFactory;
    use crate::infrastructure::repositories::key_storage::FileKeyStorage;
    use crate::infrastructure::services::keyring_codec::KeyringPaths;
    use secrets_manager_domain::KeyStorage;
    use tempfile::TempDir;

    fn manager_in(dir: &TempDir) -> KeyManager {
        let engine: Arc<dyn EncryptionEngine> = Arc::new(RustCryptoEngine::new());
        let factory: Arc<dyn KeyFactory> = Arc::new(RustCryptoKeyFactory::new());

        let storage = FileKeyStorage::new(dir.path().join("master"));
        let encryption = factory
            .generate(&KeyConfig::new(KeyType::SymmetricEncryptionKey))
            .unwrap();
        storage.save("encryption", &encryption).unwrap();
        let pair = factory
            .generate(&KeyConfig::new(KeyType::AsymmetricSignatureKeyPair))
            .unwrap();
        storage.save("signature_key_pair", &pair).unwrap();

        let provider = MasterKeyProvider::load(&storage, factory.as_ref()).unwrap();
        let codec = KeyringCodec::new(Arc::clone(&engine), KeyringPaths::for_name(dir.path(), "primary"));
        KeyManager::new(engine, factory, provider, codec)
    }

    /// Tests keyring creation.
    ///
    /// Validates that:
    /// - The new keyring has a 64-character identity and one MAC
    /// - The returned session key is an authentication key
    /// - A second creation is refused while one is in memory
    #[test]
    fn test_new_keyring() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_in(&dir);

        let auth = manager.new_keyring(None).unwrap();
        assert_eq!(auth.key_type(), KeyType::SymmetricAuthenticationKey);
        assert_eq!(manager.keyring_id().unwrap().len(), 64);

        let err = manager.new_keyring(None).unwrap_err();
        assert!(matches!(err, SecretsManagerError::KeyringAlreadyLoaded(_)));
    }

    /// Tests that a supplied non-authentication key is rejected.
    #[test]
    fn test_new_keyring_rejects_wrong_key_type() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_in(&dir);
        let wrong = RustCryptoKeyFactory::new()
            .generate(&KeyConfig::new(KeyType::SymmetricEncryptionKey))
            .unwrap();
        let err = manager.new_keyring(Some(wrong)).unwrap_err();
        assert!(matches!(err, SecretsManagerError::InvalidAuthenticationKey(_)));
    }

    /// Tests save and load through fresh managers.
    ///
    /// Validates that:
    /// - Keys and metadata survive persistence
    /// - load into a non-empty manager is KeyringAlreadyLoaded
    /// - Operations without a keyring report KeyringNotFound
    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_in(&dir);

        assert!(matches!(
            manager.get_key("my_secrets", "encryption_key").unwrap_err(),
            SecretsManagerError::KeyringNotFound(_)
        ));

        let auth = manager.new_keyring(None).unwrap();
        let key = Key::new("90".repeat(32), KeyType::SymmetricEncryptionKey, "rust_crypto", "1").unwrap();
        manager.add_key("my_secrets", "encryption_key", key.clone()).unwrap();
        manager
            .add_metadata("my_secrets", "access_pin", b"12345".to_vec())
            .unwrap();
        manager.save_keyring(&auth).unwrap();

        // The save restored the unlocked state for continued use.
        assert_eq!(manager.get_key("my_secrets", "encryption_key").unwrap(), Some(key.clone()));

        let mut fresh = manager_in(&dir);
        fresh.load_keyring(&auth).unwrap();
        assert_eq!(fresh.get_key("my_secrets", "encryption_key").unwrap(), Some(key));
        assert_eq!(
            fresh.get_metadata("my_secrets", "access_pin").unwrap(),
            Some(b"12345".to_vec())
        );

        let err = fresh.load_keyring(&auth).unwrap_err();
        assert!(matches!(err, SecretsManagerError::KeyringAlreadyLoaded(_)));
    }

    /// Tests the locked-write behavior through the manager surface.
    #[test]
    fn test_locked_manager_mutations() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_in(&dir);
        let auth = manager.new_keyring(None).unwrap();
        let key = Key::new("ab".repeat(32), KeyType::SymmetricEncryptionKey, "rust_crypto", "1").unwrap();

        manager.lock_keyring(&auth).unwrap();
        manager.add_key("my_secrets", "public_key", key.clone()).unwrap();
        assert_eq!(manager.get_key("my_secrets", "public_key").unwrap(), None);

        manager.unlock_keyring(&auth).unwrap();
        manager.add_key("my_secrets", "public_key", key.clone()).unwrap();
        assert_eq!(manager.get_key("my_secrets", "public_key").unwrap(), Some(key));
    }

    /// Tests key rotation and its rollback.
    ///
    /// Validates that:
    /// - Rotation replaces material but preserves type and version
    /// - Rotating an absent key rolls back and reports RotationFailed
    /// - Rotation on a locked keyring is refused
    #[test]
    fn test_rotate_keys() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_in(&dir);
        let auth = manager.new_keyring(None).unwrap();

        let kms = manager
            .new_key("classified", "kms_key", &KeyConfig::new(KeyType::SymmetricEncryptionKey))
            .unwrap();
        assert!(manager.rotate_keys("classified", None).unwrap());
        let rotated = manager.get_key("classified", "kms_key").unwrap().unwrap();
        assert_eq!(rotated.key_type(), kms.key_type());
        assert_ne!(rotated, kms);

        let before = manager.get_key("classified", "kms_key").unwrap();
        let err = manager
            .rotate_keys("classified", Some(&["kms_key", "missing_key"]))
            .unwrap_err();
        assert!(matches!(err, SecretsManagerError::RotationFailed(_)));
        assert_eq!(manager.get_key("classified", "kms_key").unwrap(), before);

        manager.lock_keyring(&auth).unwrap();
        let err = manager.rotate_keys("classified", None).unwrap_err();
        assert!(matches!(err, SecretsManagerError::RotationFailed(_)));
    }
}
