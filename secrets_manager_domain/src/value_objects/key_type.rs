// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Type Value Object
//!
//! This module provides the closed taxonomy of key purposes used throughout
//! the secrets manager. Every [`Key`](crate::value_objects::Key) carries a
//! `KeyType`, and every polymorphic operation (encrypt, authenticate, sign)
//! is gated on the type's predicates before dispatch.
//!
//! ## Overview
//!
//! The taxonomy is the product of three axes:
//!
//! - **Scheme**: symmetric or asymmetric
//! - **Purpose**: encryption, authentication, or signature
//! - **Form**: whole key, public half, secret half, or key pair
//!
//! plus three encoding-only forms (`hex`, `raw`, `unknown`) used when key
//! material travels without an assigned purpose.
//!
//! ## String Forms
//!
//! Each variant has a canonical snake_case string form used in every on-wire
//! record (`symmetric_encryption_key`, `asymmetric_signature_key_pair`, ...).
//! Parsing an unknown string fails with
//! [`SecretsManagerError::InvalidKeyType`].
//!
//! ## Pair Splitting
//!
//! Key-pair variants know their sibling halves: `key_pair` maps to
//! `public_key` and `secret_key` within the same scheme and purpose. The
//! [`KeyFactory`](crate::services::KeyFactory) relies on this when splitting
//! a generated pair into storable halves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SecretsManagerError;

/// Closed enumeration of key purposes.
///
/// The variants gate which engine operations accept a key: AEAD operations
/// require `SymmetricEncryptionKey`, MAC operations require
/// `SymmetricAuthenticationKey`, signing requires the secret signature forms
/// and verification the public ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    SymmetricEncryptionKey,
    SymmetricAuthenticationKey,
    AsymmetricEncryptionKeyPair,
    AsymmetricEncryptionPublicKey,
    AsymmetricEncryptionSecretKey,
    AsymmetricSignatureKeyPair,
    AsymmetricSignaturePublicKey,
    AsymmetricSignatureSecretKey,
    /// Hex-encoded material without an assigned purpose
    Hex,
    /// Raw binary material without an assigned purpose
    Raw,
    /// Material whose purpose could not be determined
    Unknown,
}

impl KeyType {
    /// All variants, in canonical order.
    pub const ALL: [KeyType; 11] = [
        KeyType::SymmetricEncryptionKey,
        KeyType::SymmetricAuthenticationKey,
        KeyType::AsymmetricEncryptionKeyPair,
        KeyType::AsymmetricEncryptionPublicKey,
        KeyType::AsymmetricEncryptionSecretKey,
        KeyType::AsymmetricSignatureKeyPair,
        KeyType::AsymmetricSignaturePublicKey,
        KeyType::AsymmetricSignatureSecretKey,
        KeyType::Hex,
        KeyType::Raw,
        KeyType::Unknown,
    ];

    /// Returns the canonical snake_case string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::SymmetricEncryptionKey => "symmetric_encryption_key",
            KeyType::SymmetricAuthenticationKey => "symmetric_authentication_key",
            KeyType::AsymmetricEncryptionKeyPair => "asymmetric_encryption_key_pair",
            KeyType::AsymmetricEncryptionPublicKey => "asymmetric_encryption_public_key",
            KeyType::AsymmetricEncryptionSecretKey => "asymmetric_encryption_secret_key",
            KeyType::AsymmetricSignatureKeyPair => "asymmetric_signature_key_pair",
            KeyType::AsymmetricSignaturePublicKey => "asymmetric_signature_public_key",
            KeyType::AsymmetricSignatureSecretKey => "asymmetric_signature_secret_key",
            KeyType::Hex => "hex",
            KeyType::Raw => "raw",
            KeyType::Unknown => "unknown",
        }
    }

    /// Checks whether this is a symmetric key type.
    pub fn is_symmetric(&self) -> bool {
        matches!(
            self,
            KeyType::SymmetricEncryptionKey | KeyType::SymmetricAuthenticationKey
        )
    }

    /// Checks whether this is an asymmetric key type.
    pub fn is_asymmetric(&self) -> bool {
        matches!(
            self,
            KeyType::AsymmetricEncryptionKeyPair
                | KeyType::AsymmetricEncryptionPublicKey
                | KeyType::AsymmetricEncryptionSecretKey
                | KeyType::AsymmetricSignatureKeyPair
                | KeyType::AsymmetricSignaturePublicKey
                | KeyType::AsymmetricSignatureSecretKey
        )
    }

    /// Checks whether this is a key-pair type.
    pub fn is_key_pair(&self) -> bool {
        matches!(
            self,
            KeyType::AsymmetricEncryptionKeyPair | KeyType::AsymmetricSignatureKeyPair
        )
    }

    /// Checks whether this is the public half of an asymmetric pair.
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            KeyType::AsymmetricEncryptionPublicKey | KeyType::AsymmetricSignaturePublicKey
        )
    }

    /// Checks whether this is the secret half of an asymmetric pair.
    pub fn is_secret(&self) -> bool {
        matches!(
            self,
            KeyType::AsymmetricEncryptionSecretKey | KeyType::AsymmetricSignatureSecretKey
        )
    }

    /// Checks whether this key type serves message authentication.
    pub fn is_authentication(&self) -> bool {
        matches!(self, KeyType::SymmetricAuthenticationKey)
    }

    /// Checks whether this key type serves encryption.
    pub fn is_encryption(&self) -> bool {
        matches!(
            self,
            KeyType::SymmetricEncryptionKey
                | KeyType::AsymmetricEncryptionKeyPair
                | KeyType::AsymmetricEncryptionPublicKey
                | KeyType::AsymmetricEncryptionSecretKey
        )
    }

    /// Checks whether this key type serves signatures.
    pub fn is_signature(&self) -> bool {
        matches!(
            self,
            KeyType::AsymmetricSignatureKeyPair
                | KeyType::AsymmetricSignaturePublicKey
                | KeyType::AsymmetricSignatureSecretKey
        )
    }

    /// For a key-pair type, the sibling public-half type.
    pub fn public_half(&self) -> Option<KeyType> {
        match self {
            KeyType::AsymmetricEncryptionKeyPair => Some(KeyType::AsymmetricEncryptionPublicKey),
            KeyType::AsymmetricSignatureKeyPair => Some(KeyType::AsymmetricSignaturePublicKey),
            _ => None,
        }
    }

    /// For a key-pair type, the sibling secret-half type.
    pub fn secret_half(&self) -> Option<KeyType> {
        match self {
            KeyType::AsymmetricEncryptionKeyPair => Some(KeyType::AsymmetricEncryptionSecretKey),
            KeyType::AsymmetricSignatureKeyPair => Some(KeyType::AsymmetricSignatureSecretKey),
            _ => None,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = SecretsManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "symmetric_encryption_key" => Ok(KeyType::SymmetricEncryptionKey),
            "symmetric_authentication_key" => Ok(KeyType::SymmetricAuthenticationKey),
            "asymmetric_encryption_key_pair" => Ok(KeyType::AsymmetricEncryptionKeyPair),
            "asymmetric_encryption_public_key" => Ok(KeyType::AsymmetricEncryptionPublicKey),
            "asymmetric_encryption_secret_key" => Ok(KeyType::AsymmetricEncryptionSecretKey),
            "asymmetric_signature_key_pair" => Ok(KeyType::AsymmetricSignatureKeyPair),
            "asymmetric_signature_public_key" => Ok(KeyType::AsymmetricSignaturePublicKey),
            "asymmetric_signature_secret_key" => Ok(KeyType::AsymmetricSignatureSecretKey),
            "hex" => Ok(KeyType::Hex),
            "raw" => Ok(KeyType::Raw),
            "unknown" => Ok(KeyType::Unknown),
            other => Err(SecretsManagerError::invalid_key_type(format!(
                "no key type named '{}'",
                other
            ))),
        }
    }
}
