// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Value Object
//!
//! This module provides the immutable bearer of cryptographic key material.
//! A [`Key`] couples hex-encoded material with the [`KeyType`] that gates its
//! use, the name of the engine adapter that produced it, and a format version
//! string.
//!
//! ## Overview
//!
//! - **Opaque material**: the material is only exposed as a hex string
//!   through a sensitive wrapper type; raw bytes leave the key exclusively
//!   via the key factory's engine-scoped conversion
//! - **Secure memory**: material is zeroed when the key is dropped
//! - **Value equality**: two keys are equal when all four fields match;
//!   material comparison is constant-time
//! - **Serialization**: the on-wire JSON form is
//!   `{"hex": ..., "type": ..., "adapter": ..., "version": ...}`
//!
//! ## Ownership
//!
//! Keys are created by the key factory or by deserialization and are
//! shared read-only afterwards. All mutating "changes" produce new keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::SecretsManagerError;
use crate::value_objects::KeyType;

/// Default on-wire format version for newly minted keys.
pub const DEFAULT_KEY_VERSION: &str = "1";

/// Sensitive hex string wrapper.
///
/// Holds hex-encoded key material, zeroes it on drop, and redacts it from
/// `Debug` output. Comparison is constant-time over the encoded bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexMaterial(String);

impl HexMaterial {
    /// Wraps an already hex-encoded string.
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Exposes the hex-encoded material.
    ///
    /// Callers must not persist the returned slice beyond the lifetime of
    /// the key that owns it.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Length of the hex encoding in characters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for HexMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HexMaterial(<redacted>)")
    }
}

impl PartialEq for HexMaterial {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Eq for HexMaterial {}

/// Immutable bearer of hex key material plus (type, adapter, version).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    #[serde(rename = "hex")]
    material: HexMaterial,
    #[serde(rename = "type")]
    key_type: KeyType,
    adapter: String,
    version: String,
}

impl Key {
    /// Creates a key from hex-encoded material.
    ///
    /// The material must be a valid hex encoding; anything else is rejected
    /// with [`SecretsManagerError::InvalidKeyType`]'s configuration sibling,
    /// `GenerationFailed`, since malformed material can only come from a
    /// broken producer.
    pub fn new(
        material: impl Into<String>,
        key_type: KeyType,
        adapter: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, SecretsManagerError> {
        let material = material.into();
        if material.is_empty() || hex::decode(&material).is_err() {
            return Err(SecretsManagerError::GenerationFailed(
                "key material is not valid hex".to_string(),
            ));
        }
        Ok(Self {
            material: HexMaterial::new(material),
            key_type,
            adapter: adapter.into(),
            version: version.into(),
        })
    }

    /// Creates a key from a type named by its string form.
    ///
    /// Fails with [`SecretsManagerError::InvalidKeyType`] when the string
    /// names no known type.
    pub fn with_type_str(
        material: impl Into<String>,
        key_type: &str,
        adapter: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, SecretsManagerError> {
        let key_type: KeyType = key_type.parse()?;
        Self::new(material, key_type, adapter, version)
    }

    /// The hex-encoded material, as a sensitive string.
    pub fn material(&self) -> &HexMaterial {
        &self.material
    }

    /// The key's purpose.
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Name of the engine adapter that produced this key.
    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    /// On-wire format version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Byte length of the decoded material.
    pub fn material_len(&self) -> usize {
        self.material.len() / 2
    }
}
