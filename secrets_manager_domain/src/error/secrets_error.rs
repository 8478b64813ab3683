// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! This module provides the hierarchical error system for the secrets-manager
//! domain. Every fallible operation in the keyring core reports through a
//! single enum so callers can match on failure categories without chasing
//! per-module error types.
//!
//! ## Error Categories
//!
//! The error system organizes failures into logical categories:
//!
//! #### Configuration Errors
//! - **MissingMasterKey**: the master key set is incomplete at bootstrap
//! - **InvalidKeyType**: a key type string has no matching variant
//! - **UnsupportedKeyType**: the operation cannot service the given key type
//!
//! #### Authentication Errors
//! - **UnauthorizedMac**: a lock/unlock MAC is not in the authorized set
//! - **InvalidAuthenticationKey**: the supplied key cannot authenticate
//! - **UnauthorizedKeyring**: a loaded keyring rejected the session key
//! - **KeyringAlreadyLoaded** / **KeyringNotFound**: lifecycle ordering
//!   violations on the key manager
//!
//! #### Integrity Errors
//! - **InvalidChecksumFormat**: the checksum sidecar is not 88+88 bytes
//! - **IntegrityCheckFailed**: checksum or signature verification rejected
//!   the keyring artifacts
//! - **SecretVerificationFailed**: a secret's MAC prefix did not verify
//!
//! #### Cryptographic Errors
//! - **EncryptionFailed** / **DecryptionFailed**: AEAD operation failures
//!   (an authentication tag mismatch during decryption is fatal)
//! - **AuthenticationFailed** / **SignatureFailed** / **ChecksumFailed**:
//!   MAC, signature, and digest failures
//! - **GenerationFailed** / **NotAKeyPair**: key factory failures
//!
//! #### Storage Errors
//! - **StorageUnavailable**: a backend could not be reached or written
//! - **SerializationFailed**: an on-wire form could not be produced/parsed
//! - **SecretNotFound**: lookup by identifier found nothing
//! - **UnableToLoadKey**: master key material was present but unresolvable
//!
//! #### Rotation Errors
//! - **RotationFailed**: key or secret rotation aborted (after rollback)
//!
//! ## Propagation Policy
//!
//! Engine failures bubble up unchanged. The key manager and secret manager
//! wrap engine errors with operation-level context (operation name plus
//! keyring or vault scope) but never swallow them, with two documented
//! exceptions: keyring mutations while locked are silent no-ops, and
//! `SecretNotFound` during secret rotation is skipped.

use thiserror::Error;

/// Domain-specific errors for the secrets-manager system.
///
/// Each variant carries a descriptive message with enough context to act on
/// the failure. Variants map one-to-one onto the category taxonomy described
/// in the module documentation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretsManagerError {
    #[error("Missing master key: {0}")]
    MissingMasterKey(String),

    #[error("Invalid key type: {0}")]
    InvalidKeyType(String),

    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("Unauthorized MAC: {0}")]
    UnauthorizedMac(String),

    #[error("Invalid authentication key: {0}")]
    InvalidAuthenticationKey(String),

    #[error("Unauthorized keyring: {0}")]
    UnauthorizedKeyring(String),

    #[error("Keyring already loaded: {0}")]
    KeyringAlreadyLoaded(String),

    #[error("Keyring not found: {0}")]
    KeyringNotFound(String),

    #[error("Unable to load key: {0}")]
    UnableToLoadKey(String),

    #[error("Invalid checksum format: {0}")]
    InvalidChecksumFormat(String),

    #[error("Integrity check failed: {0}")]
    IntegrityCheckFailed(String),

    #[error("Secret verification failed: {0}")]
    SecretVerificationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Signature failed: {0}")]
    SignatureFailed(String),

    #[error("Checksum failed: {0}")]
    ChecksumFailed(String),

    #[error("Key generation failed: {0}")]
    GenerationFailed(String),

    #[error("Not a key pair: {0}")]
    NotAKeyPair(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    #[error("Rotation failed: {0}")]
    RotationFailed(String),
}

impl SecretsManagerError {
    /// Creates a new missing-master-key error
    pub fn missing_master_key(msg: impl Into<String>) -> Self {
        Self::MissingMasterKey(msg.into())
    }

    /// Creates a new invalid-key-type error
    pub fn invalid_key_type(msg: impl Into<String>) -> Self {
        Self::InvalidKeyType(msg.into())
    }

    /// Creates a new unsupported-key-type error
    pub fn unsupported_key_type(msg: impl Into<String>) -> Self {
        Self::UnsupportedKeyType(msg.into())
    }

    /// Creates a new unauthorized-MAC error
    pub fn unauthorized_mac(msg: impl Into<String>) -> Self {
        Self::UnauthorizedMac(msg.into())
    }

    /// Creates a new encryption error
    pub fn encryption_failed(msg: impl Into<String>) -> Self {
        Self::EncryptionFailed(msg.into())
    }

    /// Creates a new decryption error
    pub fn decryption_failed(msg: impl Into<String>) -> Self {
        Self::DecryptionFailed(msg.into())
    }

    /// Creates a new integrity-check error
    pub fn integrity_check_failed(msg: impl Into<String>) -> Self {
        Self::IntegrityCheckFailed(msg.into())
    }

    /// Creates a new storage error
    pub fn storage_unavailable(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    /// Creates a new serialization error
    pub fn serialization_failed(msg: impl Into<String>) -> Self {
        Self::SerializationFailed(msg.into())
    }

    /// Creates a new rotation error
    pub fn rotation_failed(msg: impl Into<String>) -> Self {
        Self::RotationFailed(msg.into())
    }

    /// Checks if the error is a security-related error
    pub fn is_security_error(&self) -> bool {
        matches!(
            self,
            SecretsManagerError::UnauthorizedMac(_)
                | SecretsManagerError::InvalidAuthenticationKey(_)
                | SecretsManagerError::UnauthorizedKeyring(_)
                | SecretsManagerError::IntegrityCheckFailed(_)
                | SecretsManagerError::SecretVerificationFailed(_)
                | SecretsManagerError::InvalidChecksumFormat(_)
        )
    }

    /// Checks if the error is recoverable by retrying the operation
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SecretsManagerError::StorageUnavailable(_))
    }

    /// Gets the error category
    pub fn category(&self) -> &'static str {
        match self {
            SecretsManagerError::MissingMasterKey(_) => "configuration",
            SecretsManagerError::InvalidKeyType(_) => "configuration",
            SecretsManagerError::UnsupportedKeyType(_) => "configuration",
            SecretsManagerError::UnauthorizedMac(_) => "authentication",
            SecretsManagerError::InvalidAuthenticationKey(_) => "authentication",
            SecretsManagerError::UnauthorizedKeyring(_) => "authentication",
            SecretsManagerError::KeyringAlreadyLoaded(_) => "authentication",
            SecretsManagerError::KeyringNotFound(_) => "authentication",
            SecretsManagerError::UnableToLoadKey(_) => "storage",
            SecretsManagerError::InvalidChecksumFormat(_) => "integrity",
            SecretsManagerError::IntegrityCheckFailed(_) => "integrity",
            SecretsManagerError::SecretVerificationFailed(_) => "integrity",
            SecretsManagerError::EncryptionFailed(_) => "cryptographic",
            SecretsManagerError::DecryptionFailed(_) => "cryptographic",
            SecretsManagerError::AuthenticationFailed(_) => "cryptographic",
            SecretsManagerError::SignatureFailed(_) => "cryptographic",
            SecretsManagerError::ChecksumFailed(_) => "cryptographic",
            SecretsManagerError::GenerationFailed(_) => "cryptographic",
            SecretsManagerError::NotAKeyPair(_) => "cryptographic",
            SecretsManagerError::StorageUnavailable(_) => "storage",
            SecretsManagerError::SerializationFailed(_) => "storage",
            SecretsManagerError::SecretNotFound(_) => "storage",
            SecretsManagerError::RotationFailed(_) => "rotation",
        }
    }
}

// Implement conversion from standard library errors
impl From<std::io::Error> for SecretsManagerError {
    fn from(err: std::io::Error) -> Self {
        SecretsManagerError::StorageUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for SecretsManagerError {
    fn from(err: serde_json::Error) -> Self {
        SecretsManagerError::SerializationFailed(err.to_string())
    }
}
