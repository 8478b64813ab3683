// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Encryption Engine Implementation
//!
//! This module is part of the Infrastructure layer, providing the concrete
//! implementation of the domain's `EncryptionEngine` port.
//!
//! ## Primitive Suite
//!
//! One coherent suite backs the whole capability set:
//!
//! - **AEAD**: XChaCha20-Poly1305 with a random 24-byte nonce packed in
//!   front of each ciphertext. The extended nonce makes random generation
//!   per call safe without counter state.
//! - **MAC**: keyed BLAKE2b-512, 64-byte output.
//! - **Checksum**: BLAKE2b-512 (keyed when an authentication key is
//!   supplied), 64-byte output.
//! - **Signature**: Ed25519 over the full stream contents, 64-byte output.
//! - **Short-hash**: keyed BLAKE2b with 8-byte output and a 16-byte key,
//!   used for secret lookup identifiers.
//!
//! ## Key Material Layout
//!
//! - Symmetric keys: 32 bytes.
//! - Signature secret keys: the 32-byte Ed25519 seed.
//! - Signature public keys: the 32-byte verifying key.
//! - Signature key pairs: 64 bytes, seed followed by verifying key.
//!
//! ## Error Handling
//!
//! Every operation validates the key type through the domain's request
//! validator before touching material, so a mismatched key fails with a
//! configuration error instead of a primitive error. An AEAD tag mismatch
//! during decryption is fatal and surfaces as `DecryptionFailed`.

use blake2::digest::consts::U8;
use blake2::digest::{KeyInit, Mac};
use blake2::{Blake2b512, Blake2bMac, Blake2bMac512, Digest};
use chacha20poly1305::aead::{Aead, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::RngCore;
use std::io::Read;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use secrets_manager_domain::services::request_validator;
use secrets_manager_domain::{EncryptionEngine, Key, SecretsManagerError};

/// Adapter name stamped into every key this engine produces.
pub const ADAPTER_NAME: &str = "rust_crypto";

/// Byte length of symmetric key material.
pub const SYMMETRIC_KEY_LEN: usize = 32;

/// Byte length of an Ed25519 seed or verifying key.
pub const SIGNATURE_HALF_LEN: usize = 32;

/// Byte length of a packed signature key pair (seed ∥ verifying key).
pub const SIGNATURE_PAIR_LEN: usize = 2 * SIGNATURE_HALF_LEN;

/// Byte length of the XChaCha20 nonce packed in front of each ciphertext.
const NONCE_LEN: usize = 24;

/// Byte length of BLAKE2b-512 MAC and checksum outputs.
const MAC_LEN: usize = 64;

/// Short-hash output and key-half lengths.
const SHORTHASH_LEN: usize = 8;
const SHORTHASH_KEY_LEN: usize = 16;

/// Read granularity for stream digests.
const STREAM_CHUNK: usize = 8192;

type ShortHashMac = Blake2bMac<U8>;

/// Concrete engine over the XChaCha20-Poly1305 / BLAKE2b / Ed25519 suite.
#[derive(Debug, Default, Clone)]
pub struct RustCryptoEngine;

impl RustCryptoEngine {
    pub fn new() -> Self {
        Self
    }

    /// Decodes and length-checks a key's material.
    fn key_bytes(key: &Key, expected: usize, op: &str) -> Result<Zeroizing<Vec<u8>>, SecretsManagerError> {
        let bytes = Zeroizing::new(hex::decode(key.material().expose()).map_err(|e| {
            SecretsManagerError::invalid_key_type(format!("{}: key material is not hex: {}", op, e))
        })?);
        if bytes.len() != expected {
            return Err(SecretsManagerError::invalid_key_type(format!(
                "{}: key material is {} bytes, expected {}",
                op,
                bytes.len(),
                expected
            )));
        }
        Ok(bytes)
    }

    /// Extracts the Ed25519 seed from a secret key or key pair.
    fn signing_seed(key: &Key) -> Result<[u8; SIGNATURE_HALF_LEN], SecretsManagerError> {
        let bytes = Zeroizing::new(hex::decode(key.material().expose()).map_err(|e| {
            SecretsManagerError::SignatureFailed(format!("signing key material is not hex: {}", e))
        })?);
        let seed: &[u8] = match bytes.len() {
            SIGNATURE_HALF_LEN => &bytes,
            SIGNATURE_PAIR_LEN => &bytes[..SIGNATURE_HALF_LEN],
            other => {
                return Err(SecretsManagerError::SignatureFailed(format!(
                    "signing key material is {} bytes, expected {} or {}",
                    other, SIGNATURE_HALF_LEN, SIGNATURE_PAIR_LEN
                )));
            }
        };
        let mut out = [0u8; SIGNATURE_HALF_LEN];
        out.copy_from_slice(seed);
        Ok(out)
    }

    /// Extracts the Ed25519 verifying key from a public key or key pair.
    fn verifying_key(key: &Key) -> Result<VerifyingKey, SecretsManagerError> {
        let bytes = hex::decode(key.material().expose()).map_err(|e| {
            SecretsManagerError::SignatureFailed(format!("public key material is not hex: {}", e))
        })?;
        let public: &[u8] = match bytes.len() {
            SIGNATURE_HALF_LEN => &bytes,
            SIGNATURE_PAIR_LEN => &bytes[SIGNATURE_HALF_LEN..],
            other => {
                return Err(SecretsManagerError::SignatureFailed(format!(
                    "public key material is {} bytes, expected {} or {}",
                    other, SIGNATURE_HALF_LEN, SIGNATURE_PAIR_LEN
                )));
            }
        };
        let mut raw = [0u8; SIGNATURE_HALF_LEN];
        raw.copy_from_slice(public);
        VerifyingKey::from_bytes(&raw)
            .map_err(|e| SecretsManagerError::SignatureFailed(format!("invalid verifying key: {}", e)))
    }

    fn aead(key: &Key, op: &str) -> Result<XChaCha20Poly1305, SecretsManagerError> {
        let bytes = Self::key_bytes(key, SYMMETRIC_KEY_LEN, op)?;
        XChaCha20Poly1305::new_from_slice(&bytes)
            .map_err(|e| SecretsManagerError::encryption_failed(format!("{}: {}", op, e)))
    }

    fn read_all(reader: &mut dyn Read) -> Result<Vec<u8>, SecretsManagerError> {
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .map_err(|e| SecretsManagerError::StorageUnavailable(format!("stream read failed: {}", e)))?;
        Ok(buffer)
    }
}

impl EncryptionEngine for RustCryptoEngine {
    fn adapter_name(&self) -> &'static str {
        ADAPTER_NAME
    }

    fn encrypt(&self, message: &[u8], key: &Key, aad: Option<&[u8]>) -> Result<Vec<u8>, SecretsManagerError> {
        request_validator::ensure_symmetric_encryption_key(key)?;
        let cipher = Self::aead(key, "encrypt")?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = XNonce::from_slice(&nonce_bytes);

        let payload = Payload {
            msg: message,
            aad: aad.unwrap_or(&[]),
        };
        let ciphertext = cipher
            .encrypt(nonce, payload)
            .map_err(|_| SecretsManagerError::encryption_failed("AEAD encryption failed"))?;

        // Pack the nonce in front so decryption is self-contained.
        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn decrypt(
        &self,
        ciphertext: &[u8],
        key: &Key,
        aad: Option<&[u8]>,
    ) -> Result<Zeroizing<Vec<u8>>, SecretsManagerError> {
        request_validator::ensure_symmetric_encryption_key(key)?;
        if ciphertext.len() < NONCE_LEN {
            return Err(SecretsManagerError::decryption_failed(
                "ciphertext shorter than packed nonce",
            ));
        }
        let cipher = Self::aead(key, "decrypt")?;

        let (nonce_bytes, body) = ciphertext.split_at(NONCE_LEN);
        let nonce = XNonce::from_slice(nonce_bytes);
        let payload = Payload {
            msg: body,
            aad: aad.unwrap_or(&[]),
        };
        let plaintext = cipher
            .decrypt(nonce, payload)
            .map_err(|_| SecretsManagerError::decryption_failed("AEAD authentication tag mismatch"))?;
        Ok(Zeroizing::new(plaintext))
    }

    fn authenticate(&self, message: &[u8], key: &Key) -> Result<Vec<u8>, SecretsManagerError> {
        request_validator::ensure_authentication_key(key)?;
        let key_bytes = Self::key_bytes(key, SYMMETRIC_KEY_LEN, "authenticate")?;
        let mut mac = <Blake2bMac512 as KeyInit>::new_from_slice(&key_bytes)
            .map_err(|e| SecretsManagerError::AuthenticationFailed(format!("MAC key rejected: {}", e)))?;
        mac.update(message);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn verify(&self, message: &[u8], key: &Key, mac: &[u8]) -> Result<bool, SecretsManagerError> {
        let computed = self.authenticate(message, key)?;
        Ok(computed.as_slice().ct_eq(mac).into())
    }

    fn sign(&self, reader: &mut dyn Read, secret_key: &Key) -> Result<Vec<u8>, SecretsManagerError> {
        request_validator::ensure_signature_secret_key(secret_key)?;
        let message = Self::read_all(reader)?;
        let seed = Self::signing_seed(secret_key)?;
        let signing_key = SigningKey::from_bytes(&seed);
        let signature: Signature = signing_key.sign(&message);
        Ok(signature.to_bytes().to_vec())
    }

    fn verify_signature(
        &self,
        reader: &mut dyn Read,
        public_key: &Key,
        signature: &[u8],
    ) -> Result<bool, SecretsManagerError> {
        request_validator::ensure_signature_public_key(public_key)?;
        let message = Self::read_all(reader)?;
        let verifying_key = Self::verifying_key(public_key)?;
        let signature = match Signature::from_slice(signature) {
            Ok(sig) => sig,
            // A malformed signature can never verify; it is not an error path
            // that should abort the caller's integrity pipeline.
            Err(_) => return Ok(false),
        };
        Ok(verifying_key.verify(&message, &signature).is_ok())
    }

    fn checksum(&self, reader: &mut dyn Read, key: Option<&Key>) -> Result<Vec<u8>, SecretsManagerError> {
        let mut buffer = [0u8; STREAM_CHUNK];
        match key {
            Some(key) => {
                request_validator::ensure_authentication_key(key)?;
                let key_bytes = Self::key_bytes(key, SYMMETRIC_KEY_LEN, "checksum")?;
                let mut mac = <Blake2bMac512 as KeyInit>::new_from_slice(&key_bytes)
                    .map_err(|e| SecretsManagerError::ChecksumFailed(format!("digest key rejected: {}", e)))?;
                loop {
                    let read = reader
                        .read(&mut buffer)
                        .map_err(|e| SecretsManagerError::ChecksumFailed(format!("stream read failed: {}", e)))?;
                    if read == 0 {
                        break;
                    }
                    mac.update(&buffer[..read]);
                }
                Ok(mac.finalize().into_bytes().to_vec())
            }
            None => {
                let mut digest = Blake2b512::new();
                loop {
                    let read = reader
                        .read(&mut buffer)
                        .map_err(|e| SecretsManagerError::ChecksumFailed(format!("stream read failed: {}", e)))?;
                    if read == 0 {
                        break;
                    }
                    digest.update(&buffer[..read]);
                }
                Ok(digest.finalize().to_vec())
            }
        }
    }

    fn shorthash(&self, message: &[u8], key_half: &[u8]) -> Result<Vec<u8>, SecretsManagerError> {
        if key_half.len() != SHORTHASH_KEY_LEN {
            return Err(SecretsManagerError::AuthenticationFailed(format!(
                "short-hash key half is {} bytes, expected {}",
                key_half.len(),
                SHORTHASH_KEY_LEN
            )));
        }
        let mut mac = <ShortHashMac as KeyInit>::new_from_slice(key_half)
            .map_err(|e| SecretsManagerError::AuthenticationFailed(format!("short-hash key rejected: {}", e)))?;
        mac.update(message);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn mac_len(&self) -> usize {
        MAC_LEN
    }

    fn shorthash_len(&self) -> usize {
        SHORTHASH_LEN
    }

    fn shorthash_key_len(&self) -> usize {
        SHORTHASH_KEY_LEN
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use secrets_manager_domain::KeyType;

    proptest! {
        /// The AEAD round-trip holds for arbitrary messages and
        /// associated data.
        #[test]
        fn prop_encrypt_decrypt_round_trip(
            message in proptest::collection::vec(any::<u8>(), 0..2048),
            aad in proptest::option::of(proptest::collection::vec(any::<u8>(), 0..64)),
        ) {
            let engine = RustCryptoEngine::new();
            let key = Key::new(
                hex::encode([9u8; SYMMETRIC_KEY_LEN]),
                KeyType::SymmetricEncryptionKey,
                ADAPTER_NAME,
                "1",
            )
            .unwrap();

            let ciphertext = engine.encrypt(&message, &key, aad.as_deref()).unwrap();
            let plaintext = engine.decrypt(&ciphertext, &key, aad.as_deref()).unwrap();
            prop_assert_eq!(&plaintext[..], &message[..]);
        }

        /// MAC verification accepts exactly the genuine (message, MAC)
        /// pairing.
        #[test]
        fn prop_verify_matches_authenticate(
            message in proptest::collection::vec(any::<u8>(), 0..512),
            other in proptest::collection::vec(any::<u8>(), 0..512),
        ) {
            let engine = RustCryptoEngine::new();
            let key = Key::new(
                hex::encode([7u8; SYMMETRIC_KEY_LEN]),
                KeyType::SymmetricAuthenticationKey,
                ADAPTER_NAME,
                "1",
            )
            .unwrap();

            let mac = engine.authenticate(&message, &key).unwrap();
            prop_assert!(engine.verify(&message, &key, &mac).unwrap());
            if other != message {
                prop_assert!(!engine.verify(&other, &key, &mac).unwrap());
            }
        }
    }
}
