//! # Secret Envelope End-to-End Tests
//!
//! Full-stack scenarios over envelope encryption: sealing and opening
//! across fresh managers, lookup-identifier properties, KMS rotation, and
//! rotation rollback under storage failure.

mod common;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use secrets_manager::application::services::SecretManager;
use secrets_manager::domain::{
    Secret, SecretLookupKey, SecretValue, SecretsManagerError, VaultStorage,
};
use secrets_manager::infrastructure::repositories::{FileVaultStorage, InMemoryVaultStorage};

fn stack(vault: &str) -> (TempDir, SecretManager, secrets_manager::domain::Key, Arc<dyn VaultStorage>) {
    let dir = TempDir::new().unwrap();
    common::seed_master_keys(&dir);

    let mut key_manager = common::key_manager(&dir);
    let auth = key_manager.new_keyring(None).unwrap();
    let storage: Arc<dyn VaultStorage> = Arc::new(FileVaultStorage::new(dir.path().join(vault)));
    let manager = SecretManager::new(key_manager, Arc::clone(&storage), auth.clone(), vault);
    (dir, manager, auth, storage)
}

/// Envelope soundness across processes: a value sealed by one manager
/// opens in a fresh manager loaded with the same session key, and the
/// stored record never contains the plaintext.
#[test]
fn secret_round_trip_across_managers() {
    let (dir, mut manager, auth, storage) = stack("classified");
    manager.new_vault().unwrap();
    manager.set("api_key", &SecretValue::from("secret_value")).unwrap();

    let lookup = manager.lookup_key("api_key").unwrap();
    let stored = storage.get_secret(&lookup).unwrap();
    assert!(stored.is_encrypted());
    assert!(!stored
        .value()
        .windows(b"secret_value".len())
        .any(|w| w == b"secret_value"));

    let fresh = common::loaded_secret_manager(&dir, "classified", &auth, storage).unwrap();
    assert_eq!(fresh.get("api_key").unwrap(), SecretValue::from("secret_value"));
}

/// Structured values survive the envelope unchanged.
#[test]
fn structured_values_round_trip() {
    let (_dir, mut manager, _auth, _storage) = stack("classified");
    manager.new_vault().unwrap();

    let value = SecretValue::Array(vec![
        SecretValue::from("primary"),
        SecretValue::Bytes(vec![0, 128, 255]),
        SecretValue::Null,
    ]);
    manager.set("connection", &value).unwrap();
    assert_eq!(manager.get("connection").unwrap(), value);
}

/// Lookup identifiers are stable and collision-free: a thousand distinct
/// logical names yield a thousand distinct identifiers, and repeated
/// construction is deterministic.
#[test]
fn lookup_identifiers_are_distinct_and_stable() {
    let (_dir, mut manager, _auth, _storage) = stack("classified");
    manager.new_vault().unwrap();

    let mut seen = HashSet::new();
    for i in 0..1000 {
        let name = format!("secret_{}_{}", i, i * 31 % 997);
        let id = manager.lookup_key(&name).unwrap();
        assert_eq!(manager.lookup_key(&name).unwrap(), id);
        assert!(seen.insert(id.as_str().to_string()), "collision at '{}'", name);
    }
}

/// The vault name participates in the identifier, so equal logical names
/// in different vaults land on different records.
#[test]
fn lookup_identifiers_differ_across_vaults() {
    let dir = TempDir::new().unwrap();
    common::seed_master_keys(&dir);

    let mut key_manager = common::key_manager(&dir);
    let auth = key_manager.new_keyring(None).unwrap();
    let storage: Arc<dyn VaultStorage> = Arc::new(InMemoryVaultStorage::new());
    let mut first = SecretManager::new(key_manager, Arc::clone(&storage), auth.clone(), "alpha");
    first.new_vault().unwrap();
    let id_alpha = first.lookup_key("api_key").unwrap();

    let mut second = common::loaded_secret_manager(&dir, "beta", &auth, storage).unwrap();
    second.new_vault().unwrap();
    let id_beta = second.lookup_key("api_key").unwrap();

    assert_ne!(id_alpha, id_beta);
}

/// KMS rotation keeps the secret readable while invalidating the old
/// wrapped data key.
#[test]
fn rotation_reseals_under_new_kms() {
    let (dir, mut manager, auth, storage) = stack("classified");
    manager.new_vault().unwrap();
    manager.set("api_key", &SecretValue::from("secret_value")).unwrap();

    let lookup = manager.lookup_key("api_key").unwrap();
    let before = storage.get_secret(&lookup).unwrap();

    assert!(manager.rotate_secrets(&["api_key"]).unwrap());
    assert_eq!(manager.get("api_key").unwrap(), SecretValue::from("secret_value"));

    let after = storage.get_secret(&lookup).unwrap();
    assert_ne!(before.encrypted_data_key(), after.encrypted_data_key());

    // A fresh manager sees the rotated keyring from disk and still reads
    // the secret.
    let fresh = common::loaded_secret_manager(&dir, "classified", &auth, storage).unwrap();
    assert_eq!(fresh.get("api_key").unwrap(), SecretValue::from("secret_value"));
}

/// Vault storage double that starts failing writes after a given number
/// of successful puts.
struct FailingPuts {
    inner: InMemoryVaultStorage,
    allowed_puts: AtomicUsize,
}

impl FailingPuts {
    fn new(allowed_puts: usize) -> Self {
        Self {
            inner: InMemoryVaultStorage::new(),
            allowed_puts: AtomicUsize::new(allowed_puts),
        }
    }
}

impl VaultStorage for FailingPuts {
    fn get_secret(&self, lookup: &SecretLookupKey) -> Result<Secret, SecretsManagerError> {
        self.inner.get_secret(lookup)
    }

    fn put_secret(&self, secret: &Secret) -> Result<(), SecretsManagerError> {
        if self.allowed_puts.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_err() {
            return Err(SecretsManagerError::storage_unavailable("simulated backend outage"));
        }
        self.inner.put_secret(secret)
    }

    fn delete_secret(&self, secret: &Secret) -> Result<(), SecretsManagerError> {
        self.inner.delete_secret(secret)
    }

    fn delete_secret_by_key(&self, lookup: &SecretLookupKey) -> Result<(), SecretsManagerError> {
        self.inner.delete_secret_by_key(lookup)
    }

    fn delete_vault(&self) -> Result<(), SecretsManagerError> {
        self.inner.delete_vault()
    }
}

/// Rotation atomicity: when the backend fails mid-rotation, the keyring
/// reverts to its snapshot and the surviving record still decrypts under
/// the pre-rotation state.
#[test]
fn rotation_failure_rolls_back_keyring() {
    let dir = TempDir::new().unwrap();
    common::seed_master_keys(&dir);

    let mut key_manager = common::key_manager(&dir);
    let auth = key_manager.new_keyring(None).unwrap();
    // One allowed put: the initial store succeeds, the rotation re-put
    // fails.
    let storage = Arc::new(FailingPuts::new(1));
    let mut manager = SecretManager::new(key_manager, storage, auth, "classified");

    manager.new_vault().unwrap();
    manager.set("api_key", &SecretValue::from("secret_value")).unwrap();

    let err = manager.rotate_secrets(&["api_key"]).unwrap_err();
    assert!(matches!(err, SecretsManagerError::RotationFailed(_)));

    // The snapshot restore left the old KMS key in place, so the stored
    // record still opens.
    assert_eq!(manager.get("api_key").unwrap(), SecretValue::from("secret_value"));
}

/// Absent secrets are skipped during rotation instead of failing it.
#[test]
fn rotation_skips_missing_secrets() {
    let (_dir, mut manager, _auth, _storage) = stack("classified");
    manager.new_vault().unwrap();
    manager.set("api_key", &SecretValue::from("v1")).unwrap();

    assert!(manager.rotate_secrets(&["api_key", "never_written"]).unwrap());
    assert_eq!(manager.get("api_key").unwrap(), SecretValue::from("v1"));
}

/// Deleting the vault drops stored secrets and the keyring entry.
#[test]
fn delete_vault_clears_storage_and_keyring() {
    let (dir, mut manager, auth, storage) = stack("classified");
    manager.new_vault().unwrap();
    manager.set("api_key", &SecretValue::from("v")).unwrap();

    manager.delete_vault().unwrap();
    assert!(manager.lookup_key("api_key").is_err());

    let fresh = common::loaded_secret_manager(&dir, "classified", &auth, storage).unwrap();
    assert!(fresh.lookup_key("api_key").is_err());
}
