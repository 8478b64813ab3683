// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Checksum Value Object
//!
//! This module provides the sidecar artifact written next to every persisted
//! keyring: a checksum over the ciphertext file plus a signature by the
//! master signing key.
//!
//! ## On-Disk Form
//!
//! Both halves are base64-url-safe encodings of 64-byte cryptographic
//! outputs, giving exactly 88 bytes each. The sidecar file is their
//! concatenation, 176 bytes total; the byte count is authoritative and
//! anything else is rejected as [`InvalidChecksumFormat`].
//!
//! ## Equality
//!
//! Comparison is constant-time over both halves. The loader relies on this
//! when matching a freshly computed checksum against the stored one.
//!
//! [`InvalidChecksumFormat`]: crate::error::SecretsManagerError::InvalidChecksumFormat

use std::fmt;
use subtle::ConstantTimeEq;

use crate::error::SecretsManagerError;

/// Length in bytes of one base64-url-safe-encoded 64-byte output.
pub const ENCODED_HALF_LEN: usize = 88;

/// Length in bytes of the on-disk sidecar: checksum followed by signature.
pub const SIDECAR_LEN: usize = 2 * ENCODED_HALF_LEN;

/// Sidecar pair of encoded checksum and signature.
#[derive(Clone)]
pub struct Checksum {
    checksum: Vec<u8>,
    signature: Vec<u8>,
}

impl Checksum {
    /// Builds the pair from its two encoded halves.
    ///
    /// Each half must be exactly [`ENCODED_HALF_LEN`] bytes.
    pub fn new(checksum: Vec<u8>, signature: Vec<u8>) -> Result<Self, SecretsManagerError> {
        if checksum.len() != ENCODED_HALF_LEN {
            return Err(SecretsManagerError::InvalidChecksumFormat(format!(
                "checksum half is {} bytes, expected {}",
                checksum.len(),
                ENCODED_HALF_LEN
            )));
        }
        if signature.len() != ENCODED_HALF_LEN {
            return Err(SecretsManagerError::InvalidChecksumFormat(format!(
                "signature half is {} bytes, expected {}",
                signature.len(),
                ENCODED_HALF_LEN
            )));
        }
        Ok(Self { checksum, signature })
    }

    /// Splits a raw sidecar read from disk.
    ///
    /// The input must be exactly [`SIDECAR_LEN`] bytes; a truncated or
    /// padded sidecar is an integrity failure at the format level.
    pub fn from_sidecar_bytes(bytes: &[u8]) -> Result<Self, SecretsManagerError> {
        if bytes.len() != SIDECAR_LEN {
            return Err(SecretsManagerError::InvalidChecksumFormat(format!(
                "sidecar is {} bytes, expected {}",
                bytes.len(),
                SIDECAR_LEN
            )));
        }
        let (checksum, signature) = bytes.split_at(ENCODED_HALF_LEN);
        Self::new(checksum.to_vec(), signature.to_vec())
    }

    /// The concatenated on-disk form.
    pub fn to_sidecar_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SIDECAR_LEN);
        out.extend_from_slice(&self.checksum);
        out.extend_from_slice(&self.signature);
        out
    }

    /// The encoded checksum half.
    pub fn checksum(&self) -> &[u8] {
        &self.checksum
    }

    /// The encoded signature half.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Constant-time comparison of the checksum half against an encoded
    /// candidate.
    pub fn checksum_matches(&self, candidate: &[u8]) -> bool {
        self.checksum.ct_eq(candidate).into()
    }
}

impl PartialEq for Checksum {
    fn eq(&self, other: &Self) -> bool {
        let c: bool = self.checksum.ct_eq(&other.checksum).into();
        let s: bool = self.signature.ct_eq(&other.signature).into();
        c && s
    }
}

impl Eq for Checksum {}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checksum")
            .field("checksum", &String::from_utf8_lossy(&self.checksum))
            .field("signature", &String::from_utf8_lossy(&self.signature))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded_half(fill: u8) -> Vec<u8> {
        vec![fill; ENCODED_HALF_LEN]
    }

    /// Tests sidecar round-trip.
    ///
    /// Validates that:
    /// - A 176-byte sidecar splits into its two halves
    /// - Re-serialization restores the identical byte sequence
    #[test]
    fn test_sidecar_round_trip() {
        let mut sidecar = encoded_half(b'A');
        sidecar.extend_from_slice(&encoded_half(b'B'));

        let parsed = Checksum::from_sidecar_bytes(&sidecar).unwrap();
        assert_eq!(parsed.checksum(), &encoded_half(b'A')[..]);
        assert_eq!(parsed.signature(), &encoded_half(b'B')[..]);
        assert_eq!(parsed.to_sidecar_bytes(), sidecar);
    }

    /// Tests that wrong-length sidecars are rejected.
    ///
    /// Validates that:
    /// - Truncated, extended, and empty inputs all fail
    /// - The failure is InvalidChecksumFormat, not a panic
    #[test]
    fn test_bad_lengths_rejected() {
        for len in [0, 1, ENCODED_HALF_LEN, SIDECAR_LEN - 1, SIDECAR_LEN + 1] {
            let err = Checksum::from_sidecar_bytes(&vec![b'x'; len]).unwrap_err();
            assert!(matches!(err, SecretsManagerError::InvalidChecksumFormat(_)));
        }
        assert!(Checksum::new(vec![b'x'; 10], encoded_half(b'y')).is_err());
    }

    /// Tests equality semantics.
    #[test]
    fn test_equality() {
        let a = Checksum::new(encoded_half(b'A'), encoded_half(b'B')).unwrap();
        let b = Checksum::new(encoded_half(b'A'), encoded_half(b'B')).unwrap();
        let c = Checksum::new(encoded_half(b'A'), encoded_half(b'C')).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.checksum_matches(&encoded_half(b'A')));
        assert!(!a.checksum_matches(&encoded_half(b'Z')));
    }
}
