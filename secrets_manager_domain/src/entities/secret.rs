// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Secret Entity
//!
//! This module provides the envelope-encrypted record stored in a vault
//! backend, plus the tagged value type user payloads are expressed in.
//!
//! ## Envelope Layout
//!
//! An encrypted secret carries two ciphertexts: the data encryption key
//! wrapped under the vault's KMS key (`encrypted_data_key`), and the
//! MAC-prefixed payload encrypted under that data key (`value`). The record
//! itself never sees plaintext; sealing and opening happen in the secret
//! manager.
//!
//! ## Immutability
//!
//! Secrets are immutable; every `with_*` returns a modified copy. The
//! on-wire JSON form is `{uniqueId, key, value, encrypted, metadata}` with
//! `key` and `value` base64-encoded.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::SecretsManagerError;
use crate::services::base64_bytes_serde;
use crate::value_objects::SecretLookupKey;

/// Tagged payload type for user secrets.
///
/// Callers with richer types serialize to `Bytes` themselves; everything
/// else round-trips through this variant set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretValue {
    String(String),
    Bytes(Vec<u8>),
    Map(HashMap<String, SecretValue>),
    Array(Vec<SecretValue>),
    Null,
}

impl SecretValue {
    /// Serializes the value to its canonical JSON byte form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SecretsManagerError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parses a value back from its canonical JSON byte form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SecretsManagerError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SecretValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for SecretValue {
    fn from(s: &str) -> Self {
        SecretValue::String(s.to_string())
    }
}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue::String(s)
    }
}

impl From<Vec<u8>> for SecretValue {
    fn from(b: Vec<u8>) -> Self {
        SecretValue::Bytes(b)
    }
}

/// Envelope-encrypted record addressed by its lookup identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    #[serde(rename = "uniqueId")]
    unique_id: SecretLookupKey,
    #[serde(rename = "key", with = "base64_bytes_serde")]
    encrypted_data_key: Vec<u8>,
    #[serde(with = "base64_bytes_serde")]
    value: Vec<u8>,
    encrypted: bool,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl Secret {
    /// Creates an encrypted record from its two ciphertexts.
    pub fn sealed(unique_id: SecretLookupKey, encrypted_data_key: Vec<u8>, ciphertext: Vec<u8>) -> Self {
        Self {
            unique_id,
            encrypted_data_key,
            value: ciphertext,
            encrypted: true,
            metadata: HashMap::new(),
        }
    }

    /// Creates a plaintext record carrying a serialized [`SecretValue`].
    ///
    /// Plaintext records exist for backends that are themselves trusted;
    /// `get` returns their value without touching the envelope keys.
    pub fn plain(unique_id: SecretLookupKey, value: &SecretValue) -> Result<Self, SecretsManagerError> {
        Ok(Self {
            unique_id,
            encrypted_data_key: Vec::new(),
            value: value.to_bytes()?,
            encrypted: false,
            metadata: HashMap::new(),
        })
    }

    pub fn unique_id(&self) -> &SecretLookupKey {
        &self.unique_id
    }

    /// The DEK record wrapped under the vault's KMS key.
    pub fn encrypted_data_key(&self) -> &[u8] {
        &self.encrypted_data_key
    }

    /// Ciphertext when encrypted, serialized value otherwise.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// Returns a copy with a different payload.
    pub fn with_value(&self, value: Vec<u8>) -> Self {
        let mut copy = self.clone();
        copy.value = value;
        copy
    }

    /// Returns a copy with a different wrapped data key.
    pub fn with_encrypted_data_key(&self, encrypted_data_key: Vec<u8>) -> Self {
        let mut copy = self.clone();
        copy.encrypted_data_key = encrypted_data_key;
        copy
    }

    /// Returns a copy with one metadata entry added or replaced.
    pub fn with_metadata_entry(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.metadata.insert(name.into(), value.into());
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup() -> SecretLookupKey {
        SecretLookupKey::from_halves(&[1u8; 8], &[2u8; 8])
    }

    /// Tests the tagged value round-trip for every variant.
    ///
    /// Validates that:
    /// - Each variant survives the byte round-trip
    /// - Nested maps and arrays are preserved
    #[test]
    fn test_secret_value_round_trip() {
        let mut map = HashMap::new();
        map.insert("user".to_string(), SecretValue::from("admin"));
        map.insert("attempts".to_string(), SecretValue::Bytes(vec![0, 255]));

        let values = [
            SecretValue::from("secret_value"),
            SecretValue::Bytes(vec![1, 2, 3]),
            SecretValue::Map(map),
            SecretValue::Array(vec![SecretValue::Null, SecretValue::from("x")]),
            SecretValue::Null,
        ];
        for value in values {
            let bytes = value.to_bytes().unwrap();
            assert_eq!(SecretValue::from_bytes(&bytes).unwrap(), value);
        }
    }

    /// Tests the sealed record shape and wither immutability.
    ///
    /// Validates that:
    /// - Sealed records report encrypted=true
    /// - Withers return modified copies, leaving the original intact
    #[test]
    fn test_sealed_record_and_withers() {
        let secret = Secret::sealed(lookup(), vec![9u8; 48], vec![7u8; 80]);
        assert!(secret.is_encrypted());

        let rewrapped = secret.with_encrypted_data_key(vec![1u8; 48]);
        assert_eq!(secret.encrypted_data_key(), &[9u8; 48][..]);
        assert_eq!(rewrapped.encrypted_data_key(), &[1u8; 48][..]);

        let tagged = secret.with_metadata_entry("origin", "import");
        assert!(secret.metadata().is_empty());
        assert_eq!(tagged.metadata().get("origin").map(String::as_str), Some("import"));
    }

    /// Tests the on-wire JSON form.
    ///
    /// Validates that:
    /// - Field names match uniqueId/key/value/encrypted/metadata
    /// - key and value are base64 strings
    /// - Deserialization restores an equal record
    #[test]
    fn test_on_wire_form() {
        let secret = Secret::sealed(lookup(), vec![0xAA; 3], vec![0xBB; 3]);
        let json = serde_json::to_value(&secret).unwrap();
        assert!(json.get("uniqueId").is_some());
        assert_eq!(json["key"], "qqqq");
        assert_eq!(json["encrypted"], true);

        let back: Secret = serde_json::from_value(json).unwrap();
        assert_eq!(back, secret);
    }

    /// Tests plaintext records.
    #[test]
    fn test_plain_record() {
        let value = SecretValue::from("visible");
        let secret = Secret::plain(lookup(), &value).unwrap();
        assert!(!secret.is_encrypted());
        assert!(secret.encrypted_data_key().is_empty());
        assert_eq!(SecretValue::from_bytes(secret.value()).unwrap(), value);
    }
}
