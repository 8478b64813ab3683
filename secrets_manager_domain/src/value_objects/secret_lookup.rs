// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Secret Lookup Identifier
//!
//! This module provides the short-hash lookup identifier (SHM) under which a
//! secret is stored. The identifier hides the user's logical key from the
//! backing store: it is built from two keyed short-hashes of
//! `vault_name ∥ logical_key`, each keyed with one half of the vault's cache
//! key, concatenated and base64-url encoded.
//!
//! The identifier is deterministic for a fixed cache key and collides only
//! with negligible probability for distinct `(vault, key)` inputs, which
//! makes it a stable, non-reversible storage address.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-reversible storage address of a secret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretLookupKey(String);

impl SecretLookupKey {
    /// Builds the identifier from the two keyed short-hash halves.
    pub fn from_halves(left: &[u8], right: &[u8]) -> Self {
        let mut raw = Vec::with_capacity(left.len() + right.len());
        raw.extend_from_slice(left);
        raw.extend_from_slice(right);
        Self(URL_SAFE.encode(raw))
    }

    /// Rewraps an identifier read back from storage.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretLookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests identifier construction.
    ///
    /// Validates that:
    /// - The encoding is deterministic for fixed halves
    /// - Different halves produce different identifiers
    /// - The encoding is URL-safe (no '+' or '/')
    #[test]
    fn test_from_halves() {
        let a = SecretLookupKey::from_halves(&[1, 2, 3, 4, 5, 6, 7, 8], &[9, 10, 11, 12, 13, 14, 15, 16]);
        let b = SecretLookupKey::from_halves(&[1, 2, 3, 4, 5, 6, 7, 8], &[9, 10, 11, 12, 13, 14, 15, 16]);
        let c = SecretLookupKey::from_halves(&[8, 7, 6, 5, 4, 3, 2, 1], &[9, 10, 11, 12, 13, 14, 15, 16]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.as_str().contains('+'));
        assert!(!a.as_str().contains('/'));
    }

    /// Tests the storage round-trip through the encoded form.
    #[test]
    fn test_encoded_round_trip() {
        let id = SecretLookupKey::from_halves(&[0xff; 8], &[0x00; 8]);
        let back = SecretLookupKey::from_encoded(id.as_str());
        assert_eq!(id, back);
    }
}
