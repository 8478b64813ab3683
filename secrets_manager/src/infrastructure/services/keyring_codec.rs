// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Keyring Codec
//!
//! This module implements the keyring persistence protocol. Two artifacts
//! are written per keyring: the AEAD ciphertext file `<name>.keyring` and
//! the sidecar `<name>.checksum` holding the 88-byte encoded checksum
//! followed by the 88-byte encoded signature.
//!
//! ## Save — authenticated-encrypt-then-sign
//!
//! 1. Lock the keyring: authenticate its `unique_id` with the session key,
//!    require the MAC in the authorized set.
//! 2. Serialize the locked keyring to the canonical JSON form
//!    `{locked, uniqueId, vault, macs}`.
//! 3. Encrypt the serialization under the master encryption key.
//! 4. Write the ciphertext file.
//! 5. Stream the *written file* through the checksum and signature
//!    operations.
//! 6. Write the sidecar.
//!
//! Encrypt-then-sign, because the signature then also attests that this
//! exact ciphertext came from the signing key's holder, while the inner
//! AEAD already covers confidentiality.
//!
//! ## Load — verify-then-decrypt-then-authorize
//!
//! 1. Read and split the sidecar; the 88+88 byte count is authoritative.
//! 2. Stream the ciphertext file through the checksum; compare against the
//!    stored half in constant time. The cheap digest runs before the
//!    asymmetric verification so corrupt files short-circuit early.
//! 3. Verify the Ed25519 signature over the same stream.
//! 4. Decrypt and parse the keyring; rehydrate it Locked.
//! 5. Authenticate the `unique_id` with the session key and require the
//!    MAC verified *and* present in the keyring's authorized set.
//!
//! A ciphertext without its sidecar (the crash window between protocol
//! steps 4 and 6) is refused as an integrity failure, never loaded
//! silently.
//!
//! File streams opened for digesting are scoped to their single operation
//! and closed on every exit path.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use secrets_manager_domain::{
    Checksum, EncryptionEngine, Key, Keyring, SecretsManagerError, VaultEntry,
};

/// Locations of a keyring's two on-disk artifacts.
#[derive(Debug, Clone)]
pub struct KeyringPaths {
    keyring: PathBuf,
    checksum: PathBuf,
}

impl KeyringPaths {
    pub fn new(keyring: impl Into<PathBuf>, checksum: impl Into<PathBuf>) -> Self {
        Self {
            keyring: keyring.into(),
            checksum: checksum.into(),
        }
    }

    /// Conventional `<dir>/<name>.keyring` + `<dir>/<name>.checksum` pair.
    pub fn for_name(dir: impl AsRef<Path>, name: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            keyring: dir.join(format!("{}.keyring", name)),
            checksum: dir.join(format!("{}.checksum", name)),
        }
    }

    pub fn keyring_path(&self) -> &Path {
        &self.keyring
    }

    pub fn checksum_path(&self) -> &Path {
        &self.checksum
    }
}

/// Canonical plaintext form of a persisted keyring.
///
/// The `locked` field is a marker, not state: the loader forces Locked
/// regardless of its value.
#[derive(Serialize, Deserialize)]
struct SerializedKeyring {
    locked: bool,
    #[serde(rename = "uniqueId")]
    unique_id: String,
    vault: HashMap<String, VaultEntry>,
    macs: Vec<String>,
}

/// Serializer/encryptor for keyring persistence.
pub struct KeyringCodec {
    engine: Arc<dyn EncryptionEngine>,
    paths: KeyringPaths,
}

impl KeyringCodec {
    pub fn new(engine: Arc<dyn EncryptionEngine>, paths: KeyringPaths) -> Self {
        Self { engine, paths }
    }

    pub fn paths(&self) -> &KeyringPaths {
        &self.paths
    }

    /// Persists a keyring, locking it first.
    ///
    /// On return the keyring is Locked; callers that keep working with it
    /// unlock it again with the same session key.
    pub fn save(
        &self,
        keyring: &mut Keyring,
        auth_key: &Key,
        encryption_key: &Key,
        signing_key: &Key,
    ) -> Result<(), SecretsManagerError> {
        let mac = self.engine.authenticate(keyring.unique_id().as_bytes(), auth_key)?;
        if !keyring.is_authorized(&mac) {
            return Err(SecretsManagerError::unauthorized_mac(
                "save requires a session key authorized on the keyring",
            ));
        }
        keyring.lock(&mac)?;
        debug!(path = %self.paths.keyring.display(), "keyring locked for persistence");

        let serialized = Zeroizing::new(self.serialize(keyring)?);
        let ciphertext = self.engine.encrypt(&serialized, encryption_key, None)?;
        fs::write(&self.paths.keyring, &ciphertext).map_err(|e| {
            SecretsManagerError::storage_unavailable(format!(
                "cannot write keyring '{}': {}",
                self.paths.keyring.display(),
                e
            ))
        })?;

        // Digest what actually landed on disk, not the in-memory buffer.
        let checksum_raw = {
            let mut stream = self.open_keyring_stream()?;
            self.engine.checksum(&mut stream, None)?
        };
        let signature_raw = {
            let mut stream = self.open_keyring_stream()?;
            self.engine.sign(&mut stream, signing_key)?
        };

        let sidecar = Checksum::new(
            URL_SAFE.encode(checksum_raw).into_bytes(),
            URL_SAFE.encode(signature_raw).into_bytes(),
        )?;
        fs::write(&self.paths.checksum, sidecar.to_sidecar_bytes()).map_err(|e| {
            SecretsManagerError::storage_unavailable(format!(
                "cannot write checksum sidecar '{}': {}",
                self.paths.checksum.display(),
                e
            ))
        })?;
        debug!(path = %self.paths.checksum.display(), "keyring artifacts written");
        Ok(())
    }

    /// Loads, verifies, and authorizes a persisted keyring.
    ///
    /// The returned keyring is Locked; the session MAC has been checked
    /// against its authorized set.
    pub fn load(
        &self,
        auth_key: &Key,
        encryption_key: &Key,
        verifying_key: &Key,
    ) -> Result<Keyring, SecretsManagerError> {
        let stored = self.read_sidecar()?;

        let computed = {
            let mut stream = self.open_keyring_stream()?;
            self.engine.checksum(&mut stream, None)?
        };
        if !stored.checksum_matches(URL_SAFE.encode(computed).as_bytes()) {
            warn!(path = %self.paths.keyring.display(), "keyring checksum mismatch");
            return Err(SecretsManagerError::integrity_check_failed(
                "keyring checksum does not match its sidecar",
            ));
        }

        let signature_raw = URL_SAFE.decode(stored.signature()).map_err(|_| {
            SecretsManagerError::integrity_check_failed("sidecar signature is not base64-url")
        })?;
        let signature_ok = {
            let mut stream = self.open_keyring_stream()?;
            self.engine.verify_signature(&mut stream, verifying_key, &signature_raw)?
        };
        if !signature_ok {
            warn!(path = %self.paths.keyring.display(), "keyring signature rejected");
            return Err(SecretsManagerError::integrity_check_failed(
                "keyring signature rejected by the master public key",
            ));
        }

        let ciphertext = fs::read(&self.paths.keyring).map_err(|e| {
            SecretsManagerError::storage_unavailable(format!(
                "cannot read keyring '{}': {}",
                self.paths.keyring.display(),
                e
            ))
        })?;
        let plaintext = self.engine.decrypt(&ciphertext, encryption_key, None)?;
        let keyring = Self::deserialize(&plaintext)?;

        let mac = self.engine.authenticate(keyring.unique_id().as_bytes(), auth_key)?;
        let verified = self.engine.verify(keyring.unique_id().as_bytes(), auth_key, &mac)?;
        if !(verified && keyring.is_authorized(&mac)) {
            return Err(SecretsManagerError::UnauthorizedKeyring(
                "session key is not authorized on the loaded keyring".to_string(),
            ));
        }
        debug!(unique_id_len = keyring.unique_id().len(), "keyring loaded and authorized");
        Ok(keyring)
    }

    fn serialize(&self, keyring: &Keyring) -> Result<Vec<u8>, SecretsManagerError> {
        let (unique_id, vaults, macs) = keyring.secured_parts();
        let document = SerializedKeyring {
            locked: true,
            unique_id: unique_id.to_string(),
            vault: vaults.clone(),
            macs: macs.iter().map(|mac| URL_SAFE.encode(mac)).collect(),
        };
        Ok(serde_json::to_vec_pretty(&document)?)
    }

    fn deserialize(plaintext: &[u8]) -> Result<Keyring, SecretsManagerError> {
        let document: SerializedKeyring = serde_json::from_slice(plaintext)?;
        let macs = document
            .macs
            .iter()
            .map(|mac| {
                URL_SAFE.decode(mac).map_err(|e| {
                    SecretsManagerError::serialization_failed(format!("authorized MAC is not base64-url: {}", e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Keyring::with_secured_data(document.unique_id, document.vault, macs))
    }

    fn open_keyring_stream(&self) -> Result<File, SecretsManagerError> {
        File::open(&self.paths.keyring).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SecretsManagerError::KeyringNotFound(format!(
                "no keyring at '{}'",
                self.paths.keyring.display()
            )),
            _ => SecretsManagerError::storage_unavailable(format!(
                "cannot open keyring '{}': {}",
                self.paths.keyring.display(),
                e
            )),
        })
    }

    fn read_sidecar(&self) -> Result<Checksum, SecretsManagerError> {
        match fs::read(&self.paths.checksum) {
            Ok(bytes) => Checksum::from_sidecar_bytes(&bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if self.paths.keyring.exists() {
                    // The crash window of an interrupted save: ciphertext
                    // landed, sidecar did not. Refuse to load it.
                    Err(SecretsManagerError::integrity_check_failed(
                        "keyring exists without its checksum sidecar",
                    ))
                } else {
                    Err(SecretsManagerError::KeyringNotFound(format!(
                        "no keyring at '{}'",
                        self.paths.keyring.display()
                    )))
                }
            }
            Err(e) => Err(SecretsManagerError::storage_unavailable(format!(
                "cannot read checksum sidecar '{}': {}",
                self.paths.checksum.display(),
                e
            ))),
        }
    }
}
