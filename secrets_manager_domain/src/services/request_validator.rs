// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Request Validator
//!
//! Free-standing key/operation compatibility checks, consulted before
//! dispatching into an [`EncryptionEngine`](crate::services::EncryptionEngine).
//! Keeping the checks out of the engine implementations means every adapter
//! enforces the same gate and the error text stays uniform.

use crate::error::SecretsManagerError;
use crate::value_objects::{Key, KeyType};

/// Requires a symmetric encryption key (AEAD operations).
pub fn ensure_symmetric_encryption_key(key: &Key) -> Result<(), SecretsManagerError> {
    if key.key_type() == KeyType::SymmetricEncryptionKey {
        Ok(())
    } else {
        Err(SecretsManagerError::invalid_key_type(format!(
            "operation requires a symmetric encryption key, got '{}'",
            key.key_type()
        )))
    }
}

/// Requires a symmetric authentication key (MAC operations).
pub fn ensure_authentication_key(key: &Key) -> Result<(), SecretsManagerError> {
    if key.key_type().is_authentication() {
        Ok(())
    } else {
        Err(SecretsManagerError::InvalidAuthenticationKey(format!(
            "operation requires a symmetric authentication key, got '{}'",
            key.key_type()
        )))
    }
}

/// Requires signing material: a signature secret key or a full pair.
pub fn ensure_signature_secret_key(key: &Key) -> Result<(), SecretsManagerError> {
    match key.key_type() {
        KeyType::AsymmetricSignatureSecretKey | KeyType::AsymmetricSignatureKeyPair => Ok(()),
        other => Err(SecretsManagerError::invalid_key_type(format!(
            "signing requires a signature secret key or key pair, got '{}'",
            other
        ))),
    }
}

/// Requires verification material: a signature public key or a full pair.
pub fn ensure_signature_public_key(key: &Key) -> Result<(), SecretsManagerError> {
    match key.key_type() {
        KeyType::AsymmetricSignaturePublicKey | KeyType::AsymmetricSignatureKeyPair => Ok(()),
        other => Err(SecretsManagerError::invalid_key_type(format!(
            "signature verification requires a signature public key or key pair, got '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_of(key_type: KeyType, len: usize) -> Key {
        Key::new("ef".repeat(len), key_type, "rust_crypto", "1").unwrap()
    }

    /// Tests the per-operation key gates.
    ///
    /// Validates that:
    /// - Each gate admits exactly its own key types
    /// - Key pairs are accepted wherever either half would be
    #[test]
    fn test_gates() {
        let enc = key_of(KeyType::SymmetricEncryptionKey, 32);
        let auth = key_of(KeyType::SymmetricAuthenticationKey, 32);
        let sig_pair = key_of(KeyType::AsymmetricSignatureKeyPair, 64);
        let sig_sec = key_of(KeyType::AsymmetricSignatureSecretKey, 32);
        let sig_pub = key_of(KeyType::AsymmetricSignaturePublicKey, 32);

        assert!(ensure_symmetric_encryption_key(&enc).is_ok());
        assert!(ensure_symmetric_encryption_key(&auth).is_err());

        assert!(ensure_authentication_key(&auth).is_ok());
        assert!(ensure_authentication_key(&enc).is_err());

        assert!(ensure_signature_secret_key(&sig_sec).is_ok());
        assert!(ensure_signature_secret_key(&sig_pair).is_ok());
        assert!(ensure_signature_secret_key(&sig_pub).is_err());

        assert!(ensure_signature_public_key(&sig_pub).is_ok());
        assert!(ensure_signature_public_key(&sig_pair).is_ok());
        assert!(ensure_signature_public_key(&sig_sec).is_err());
    }
}
