// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Keyring Entity
//!
//! This module provides the central entity of the secrets manager: an
//! in-memory map of vaults to keys and metadata, gated by a MAC-authorized
//! lock state.
//!
//! ## State Machine
//!
//! ```text
//!             new()               unlock(mac ∈ authorized)
//!    ∅  ─────────────▶ Unlocked ◀───────────────── Locked
//!                         │        lock(mac ∈ authorized)     ▲
//!                         └────────────────────────────────────┘
//! ```
//!
//! A keyring starts Unlocked. Transitions in either direction require a MAC
//! present in the authorized set; an unauthorized MAC fails with
//! [`UnauthorizedMac`]. Locking a locked keyring (or unlocking an unlocked
//! one) with an authorized MAC is a no-op.
//!
//! ## Invariants
//!
//! - **I1** — while Locked, every mutation is a silent no-op and every read
//!   returns empty/None. The silence is deliberate: serialized (hence
//!   locked) keyrings round-trip through code paths that blindly replay
//!   mutations, and those must not throw.
//! - **I2** — `lock`/`unlock` require an authorized MAC.
//! - **I3** — `unique_id` never changes after construction.
//! - **I4** — a keyring created through the key manager starts Unlocked
//!   with exactly one authorized MAC.
//!
//! ## Authorized MACs
//!
//! The authorized set holds MACs computed over `unique_id` with the
//! authentication keys permitted to operate the keyring. Membership checks
//! are constant-time scans so that a mismatching MAC costs the same as a
//! matching one.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use subtle::ConstantTimeEq;

use crate::error::SecretsManagerError;
use crate::services::hex_bytes_serde;
use crate::value_objects::Key;

/// Length in characters of a keyring's hex unique identifier.
pub const UNIQUE_ID_LEN: usize = 64;

/// One vault's keys and metadata.
///
/// The on-wire JSON form inlines the key records next to a reserved
/// `metadata` field, so `metadata` is not a usable key name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultEntry {
    #[serde(flatten)]
    keys: HashMap<String, Key>,
    #[serde(with = "hex_bytes_serde", default)]
    metadata: HashMap<String, Vec<u8>>,
}

impl VaultEntry {
    pub fn keys(&self) -> &HashMap<String, Key> {
        &self.keys
    }

    pub fn metadata(&self) -> &HashMap<String, Vec<u8>> {
        &self.metadata
    }
}

/// In-memory vault⇒key map with MAC-gated lock state.
#[derive(Debug, Clone)]
pub struct Keyring {
    unique_id: String,
    vaults: HashMap<String, VaultEntry>,
    authorized_macs: Vec<Vec<u8>>,
    locked: bool,
}

impl Keyring {
    /// Creates an empty, unlocked keyring with a fresh random identity.
    pub fn new() -> Self {
        let mut id_bytes = [0u8; UNIQUE_ID_LEN / 2];
        rand::rng().fill_bytes(&mut id_bytes);
        Self {
            unique_id: hex::encode(id_bytes),
            vaults: HashMap::new(),
            authorized_macs: Vec::new(),
            locked: false,
        }
    }

    /// Rehydrates a deserialized keyring in the Locked state.
    ///
    /// Used by the codec after decrypting a persisted keyring; the caller
    /// must unlock with an authorized MAC before any read or write lands.
    pub fn with_secured_data(
        unique_id: String,
        vaults: HashMap<String, VaultEntry>,
        authorized_macs: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            unique_id,
            vaults,
            authorized_macs,
            locked: true,
        }
    }

    /// The identity fixed at creation; survives serialization.
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Constant-time membership test against the authorized MAC set.
    pub fn is_authorized(&self, mac: &[u8]) -> bool {
        let mut found = subtle::Choice::from(0u8);
        for stored in &self.authorized_macs {
            found |= stored.as_slice().ct_eq(mac);
        }
        found.into()
    }

    /// Locks the keyring.
    ///
    /// Idempotent for an authorized MAC; fails with `UnauthorizedMac`
    /// otherwise.
    pub fn lock(&mut self, mac: &[u8]) -> Result<(), SecretsManagerError> {
        if !self.is_authorized(mac) {
            return Err(SecretsManagerError::unauthorized_mac(
                "lock requires an authorized authentication key",
            ));
        }
        self.locked = true;
        Ok(())
    }

    /// Unlocks the keyring.
    ///
    /// Idempotent for an authorized MAC; fails with `UnauthorizedMac`
    /// otherwise.
    pub fn unlock(&mut self, mac: &[u8]) -> Result<(), SecretsManagerError> {
        if !self.is_authorized(mac) {
            return Err(SecretsManagerError::unauthorized_mac(
                "unlock requires an authorized authentication key",
            ));
        }
        self.locked = false;
        Ok(())
    }

    /// Adds a key under `(vault, name)`, creating the vault if needed.
    ///
    /// Silent no-op while Locked.
    pub fn add_key(&mut self, vault: &str, name: &str, key: Key) {
        if self.locked {
            return;
        }
        self.vaults
            .entry(vault.to_string())
            .or_default()
            .keys
            .insert(name.to_string(), key);
    }

    /// Looks up a key. Returns `None` while Locked or when absent.
    pub fn get_key(&self, vault: &str, name: &str) -> Option<&Key> {
        if self.locked {
            return None;
        }
        self.vaults.get(vault)?.keys.get(name)
    }

    /// All keys of a vault. Empty while Locked or when the vault is absent.
    pub fn get_keys(&self, vault: &str) -> Vec<(&str, &Key)> {
        if self.locked {
            return Vec::new();
        }
        self.vaults
            .get(vault)
            .map(|entry| entry.keys.iter().map(|(n, k)| (n.as_str(), k)).collect())
            .unwrap_or_default()
    }

    /// Removes a key. Silent no-op while Locked.
    pub fn remove_key(&mut self, vault: &str, name: &str) {
        if self.locked {
            return;
        }
        if let Some(entry) = self.vaults.get_mut(vault) {
            entry.keys.remove(name);
        }
    }

    /// Stores a metadata value under `(vault, name)`. Silent no-op while
    /// Locked.
    pub fn add_metadata(&mut self, vault: &str, name: &str, value: Vec<u8>) {
        if self.locked {
            return;
        }
        self.vaults
            .entry(vault.to_string())
            .or_default()
            .metadata
            .insert(name.to_string(), value);
    }

    /// Looks up a metadata value. `None` while Locked or when absent.
    pub fn get_metadata(&self, vault: &str, name: &str) -> Option<&[u8]> {
        if self.locked {
            return None;
        }
        self.vaults.get(vault)?.metadata.get(name).map(|v| v.as_slice())
    }

    /// Clears all keys of a vault, keeping its metadata. Silent no-op while
    /// Locked.
    pub fn flush_keys(&mut self, vault: &str) {
        if self.locked {
            return;
        }
        if let Some(entry) = self.vaults.get_mut(vault) {
            entry.keys.clear();
        }
    }

    /// Removes a vault entirely. Silent no-op while Locked.
    pub fn flush_vault(&mut self, vault: &str) {
        if self.locked {
            return;
        }
        self.vaults.remove(vault);
    }

    /// Clears the authorized MAC set. Silent no-op while Locked.
    ///
    /// After flushing, the caller must add a MAC before the next lock, or
    /// the keyring can never be locked again.
    pub fn flush_auth(&mut self) {
        if self.locked {
            return;
        }
        self.authorized_macs.clear();
    }

    /// Authorizes a MAC. Silent no-op while Locked; duplicates are ignored.
    pub fn add_auth(&mut self, mac: Vec<u8>) {
        if self.locked {
            return;
        }
        if !self.is_authorized(&mac) {
            self.authorized_macs.push(mac);
        }
    }

    /// Number of authorized MACs.
    pub fn authorized_mac_count(&self) -> usize {
        self.authorized_macs.len()
    }

    /// The serializable parts, independent of lock state.
    ///
    /// Only the codec consumes this; the lock gate does not apply because
    /// persistence always operates on a locked keyring.
    pub fn secured_parts(&self) -> (&str, &HashMap<String, VaultEntry>, &[Vec<u8>]) {
        (&self.unique_id, &self.vaults, &self.authorized_macs)
    }
}

impl Default for Keyring {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::KeyType;

    fn test_key() -> Key {
        Key::new("ab".repeat(32), KeyType::SymmetricEncryptionKey, "rust_crypto", "1").unwrap()
    }

    fn authorized_keyring() -> (Keyring, Vec<u8>) {
        let mut keyring = Keyring::new();
        let mac = vec![0x5au8; 64];
        keyring.add_auth(mac.clone());
        (keyring, mac)
    }

    /// Tests construction invariants.
    ///
    /// Validates that:
    /// - A fresh keyring is unlocked with a 64-character identity
    /// - Identities are unique across constructions
    #[test]
    fn test_new_keyring() {
        let a = Keyring::new();
        let b = Keyring::new();
        assert!(!a.is_locked());
        assert_eq!(a.unique_id().len(), UNIQUE_ID_LEN);
        assert_ne!(a.unique_id(), b.unique_id());
    }

    /// Tests MAC authorization on lock and unlock.
    ///
    /// Validates that:
    /// - An authorized MAC drives both transitions
    /// - Any other MAC fails with UnauthorizedMac and leaves state intact
    #[test]
    fn test_mac_authorization() {
        let (mut keyring, mac) = authorized_keyring();

        let err = keyring.lock(&[0u8; 64]).unwrap_err();
        assert!(matches!(err, SecretsManagerError::UnauthorizedMac(_)));
        assert!(!keyring.is_locked());

        keyring.lock(&mac).unwrap();
        assert!(keyring.is_locked());

        let err = keyring.unlock(&[0u8; 64]).unwrap_err();
        assert!(matches!(err, SecretsManagerError::UnauthorizedMac(_)));
        assert!(keyring.is_locked());

        keyring.unlock(&mac).unwrap();
        assert!(!keyring.is_locked());
    }

    /// Tests lock/unlock idempotence with an authorized MAC.
    #[test]
    fn test_lock_idempotence() {
        let (mut keyring, mac) = authorized_keyring();
        keyring.unlock(&mac).unwrap();
        assert!(!keyring.is_locked());
        keyring.lock(&mac).unwrap();
        keyring.lock(&mac).unwrap();
        assert!(keyring.is_locked());
    }

    /// Tests the locked-write invariant.
    ///
    /// Validates that:
    /// - Every mutation on a locked keyring is a silent no-op
    /// - Every read on a locked keyring returns empty/None
    /// - The state after unlocking equals the state before locking
    #[test]
    fn test_locked_writes_are_noops() {
        let (mut keyring, mac) = authorized_keyring();
        keyring.add_key("my_secrets", "encryption_key", test_key());
        keyring.add_metadata("my_secrets", "access_pin", b"12345".to_vec());
        keyring.lock(&mac).unwrap();

        keyring.add_key("my_secrets", "public_key", test_key());
        keyring.add_metadata("my_secrets", "other", b"x".to_vec());
        keyring.remove_key("my_secrets", "encryption_key");
        keyring.flush_keys("my_secrets");
        keyring.flush_vault("my_secrets");
        keyring.flush_auth();
        keyring.add_auth(vec![1u8; 64]);

        assert!(keyring.get_key("my_secrets", "encryption_key").is_none());
        assert!(keyring.get_keys("my_secrets").is_empty());
        assert!(keyring.get_metadata("my_secrets", "access_pin").is_none());

        keyring.unlock(&mac).unwrap();
        assert!(keyring.get_key("my_secrets", "encryption_key").is_some());
        assert!(keyring.get_key("my_secrets", "public_key").is_none());
        assert_eq!(keyring.get_metadata("my_secrets", "access_pin"), Some(&b"12345"[..]));
        assert_eq!(keyring.authorized_mac_count(), 1);
    }

    /// Tests vault CRUD while unlocked.
    #[test]
    fn test_vault_operations() {
        let (mut keyring, _mac) = authorized_keyring();
        keyring.add_key("vault_a", "k1", test_key());
        keyring.add_key("vault_a", "k2", test_key());
        keyring.add_key("vault_b", "k1", test_key());

        assert_eq!(keyring.get_keys("vault_a").len(), 2);
        keyring.remove_key("vault_a", "k1");
        assert_eq!(keyring.get_keys("vault_a").len(), 1);

        keyring.flush_keys("vault_b");
        assert!(keyring.get_keys("vault_b").is_empty());

        keyring.flush_vault("vault_a");
        assert!(keyring.get_key("vault_a", "k2").is_none());
    }

    /// Tests rehydration through with_secured_data.
    ///
    /// Validates that:
    /// - The rehydrated keyring is Locked
    /// - The identity and MAC set are preserved
    /// - Unlocking with the preserved MAC exposes the vault contents
    #[test]
    fn test_with_secured_data() {
        let (mut original, mac) = authorized_keyring();
        original.add_key("my_secrets", "encryption_key", test_key());

        let (unique_id, vaults, macs) = original.secured_parts();
        let mut rehydrated = Keyring::with_secured_data(
            unique_id.to_string(),
            vaults.clone(),
            macs.to_vec(),
        );

        assert!(rehydrated.is_locked());
        assert_eq!(rehydrated.unique_id(), original.unique_id());
        assert!(rehydrated.get_key("my_secrets", "encryption_key").is_none());

        rehydrated.unlock(&mac).unwrap();
        assert_eq!(
            rehydrated.get_key("my_secrets", "encryption_key"),
            original.get_key("my_secrets", "encryption_key")
        );
    }

    /// Tests that duplicate MACs are not double-registered.
    #[test]
    fn test_add_auth_dedupes() {
        let (mut keyring, mac) = authorized_keyring();
        keyring.add_auth(mac.clone());
        keyring.add_auth(mac);
        assert_eq!(keyring.authorized_mac_count(), 1);
    }
}
