//! Shared fixture for the end-to-end tests: a full stack (engine, factory,
//! master key storage, provider, codec, key manager) rooted in one
//! temporary directory, so fresh managers over the same directory see the
//! same master keys and keyring artifacts.

#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;

use secrets_manager::application::services::{KeyManager, MasterKeyProvider, SecretManager};
use secrets_manager::domain::{
    EncryptionEngine, Key, KeyConfig, KeyFactory, KeyStorage, KeyType, SecretsManagerError, VaultStorage,
};
use secrets_manager::infrastructure::adapters::{RustCryptoEngine, RustCryptoKeyFactory};
use secrets_manager::infrastructure::repositories::FileKeyStorage;
use secrets_manager::infrastructure::services::{KeyringCodec, KeyringPaths};

pub fn engine() -> Arc<dyn EncryptionEngine> {
    Arc::new(RustCryptoEngine::new())
}

pub fn factory() -> Arc<dyn KeyFactory> {
    Arc::new(RustCryptoKeyFactory::new())
}

/// Seeds the master key set (encryption key + signature pair) once per
/// directory; repeat calls overwrite with fresh keys, so call it once.
pub fn seed_master_keys(dir: &TempDir) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let factory = factory();
    let storage = FileKeyStorage::new(dir.path().join("master"));
    let encryption = factory
        .generate(&KeyConfig::new(KeyType::SymmetricEncryptionKey))
        .expect("generate master encryption key");
    storage.save("encryption", &encryption).expect("save master encryption key");
    let pair = factory
        .generate(&KeyConfig::new(KeyType::AsymmetricSignatureKeyPair))
        .expect("generate master signature pair");
    storage.save("signature_key_pair", &pair).expect("save master signature pair");
}

/// Builds a key manager over the directory's master keys and keyring
/// artifacts. Every call yields an independent manager with an empty
/// in-memory state, as a fresh process would.
pub fn key_manager(dir: &TempDir) -> KeyManager {
    let engine = engine();
    let factory = factory();
    let storage = FileKeyStorage::new(dir.path().join("master"));
    let provider = MasterKeyProvider::load(&storage, factory.as_ref()).expect("load master keys");
    let codec = KeyringCodec::new(Arc::clone(&engine), KeyringPaths::for_name(dir.path(), "primary"));
    KeyManager::new(engine, factory, provider, codec)
}

/// A fresh secret manager over the directory, bound to `vault` and
/// the supplied session key, with its keyring loaded from disk.
pub fn loaded_secret_manager(
    dir: &TempDir,
    vault: &str,
    auth_key: &Key,
    storage: Arc<dyn VaultStorage>,
) -> Result<SecretManager, SecretsManagerError> {
    let mut manager = key_manager(dir);
    manager.load_keyring(auth_key)?;
    Ok(SecretManager::new(manager, storage, auth_key.clone(), vault))
}

pub fn generate_auth_key() -> Key {
    factory()
        .generate(&KeyConfig::new(KeyType::SymmetricAuthenticationKey))
        .expect("generate authentication key")
}
