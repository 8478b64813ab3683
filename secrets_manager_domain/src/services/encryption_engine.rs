// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Encryption Engine Port
//!
//! This module defines the polymorphic cryptographic capability consumed by
//! the keyring codec, key manager, and secret manager. The domain never
//! links a primitive: implementations live in the infrastructure layer and
//! are injected as trait objects.
//!
//! ## Capability Set
//!
//! | Op | Input | Output |
//! |----|-------|--------|
//! | `encrypt` | plaintext, symmetric encryption key | ciphertext (nonce packed) |
//! | `decrypt` | ciphertext, same key | zeroizing plaintext |
//! | `authenticate` | message, authentication key | MAC bytes |
//! | `verify` | message, authentication key, MAC | bool (constant-time) |
//! | `sign` | byte stream, signature secret key | raw signature |
//! | `verify_signature` | byte stream, public key, signature | bool |
//! | `checksum` | byte stream, optional authentication key | raw digest |
//! | `shorthash` | message, short key half | short digest |
//!
//! ## On-Wire Constants
//!
//! The keyring format depends on fixed primitive output sizes, surfaced
//! through the size accessors: the MAC length (`mac_len`), the raw
//! signature and checksum lengths (64 bytes each, 88 once
//! base64-url-encoded), and the short-hash input key and output lengths.
//! Callers obtain these from the engine instead of hard-coding them.
//!
//! ## Error Semantics
//!
//! `decrypt` treats an authentication-tag mismatch as fatal
//! (`DecryptionFailed`). `verify` and `verify_signature` return `Ok(false)`
//! on mismatch and reserve errors for unusable inputs, so a failure can
//! never read as a false positive.

use std::io::Read;
use zeroize::Zeroizing;

use crate::error::SecretsManagerError;
use crate::value_objects::Key;

/// Raw byte length of signature and checksum outputs.
pub const SIGNATURE_RAW_LEN: usize = 64;
pub const CHECKSUM_RAW_LEN: usize = 64;

/// Polymorphic cryptographic capability.
///
/// Implementations are stateless and shared-immutable; every method takes
/// `&self` and may be called from any thread.
pub trait EncryptionEngine: Send + Sync {
    /// Name stamped into the `adapter` field of keys this engine produces.
    fn adapter_name(&self) -> &'static str;

    /// AEAD-encrypts a message under a symmetric encryption key.
    ///
    /// The per-call nonce is packed into the returned ciphertext.
    fn encrypt(&self, message: &[u8], key: &Key, aad: Option<&[u8]>) -> Result<Vec<u8>, SecretsManagerError>;

    /// AEAD-decrypts a ciphertext produced by [`encrypt`](Self::encrypt).
    fn decrypt(
        &self,
        ciphertext: &[u8],
        key: &Key,
        aad: Option<&[u8]>,
    ) -> Result<Zeroizing<Vec<u8>>, SecretsManagerError>;

    /// Computes a MAC over a message with an authentication key.
    fn authenticate(&self, message: &[u8], key: &Key) -> Result<Vec<u8>, SecretsManagerError>;

    /// Verifies a MAC in constant time.
    fn verify(&self, message: &[u8], key: &Key, mac: &[u8]) -> Result<bool, SecretsManagerError>;

    /// Signs the full contents of a byte stream.
    fn sign(&self, reader: &mut dyn Read, secret_key: &Key) -> Result<Vec<u8>, SecretsManagerError>;

    /// Verifies a stream signature against a public key.
    fn verify_signature(
        &self,
        reader: &mut dyn Read,
        public_key: &Key,
        signature: &[u8],
    ) -> Result<bool, SecretsManagerError>;

    /// Digests the full contents of a byte stream, keyed when an
    /// authentication key is supplied.
    fn checksum(&self, reader: &mut dyn Read, key: Option<&Key>) -> Result<Vec<u8>, SecretsManagerError>;

    /// Computes a short keyed hash for lookup-identifier construction.
    ///
    /// `key_half` must be exactly [`shorthash_key_len`](Self::shorthash_key_len)
    /// bytes.
    fn shorthash(&self, message: &[u8], key_half: &[u8]) -> Result<Vec<u8>, SecretsManagerError>;

    /// Byte length of MACs produced by [`authenticate`](Self::authenticate).
    fn mac_len(&self) -> usize;

    /// Byte length of short-hash outputs.
    fn shorthash_len(&self) -> usize;

    /// Byte length of one short-hash key half.
    fn shorthash_key_len(&self) -> usize;
}
