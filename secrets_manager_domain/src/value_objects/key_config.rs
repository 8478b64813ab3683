// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Configuration Value Object
//!
//! This module provides the configuration that drives key generation and
//! derivation in the key factory. A [`KeyConfig`] names the wanted
//! [`KeyType`] and optionally carries the four derivation inputs; when all
//! four are present the factory derives the key deterministically from the
//! password, otherwise it generates fresh random material.
//!
//! ## Configuration Parameters
//!
//! - **Key Type**: the purpose of the key to produce
//! - **Password / Salt**: secret input and diversifier for derivation
//! - **Security Level**: cost preset for the memory-hard derivation function
//! - **Algorithm Id**: names the derivation function the factory must use
//! - **Version**: on-wire format version stamped on the produced key
//!
//! The struct is immutable; all setters are builder-style withers returning
//! a new configuration.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::value_objects::KeyType;

/// Cost preset for memory-hard key derivation.
///
/// The concrete parameter values are an engine concern; the domain only
/// names the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityLevel {
    /// Suitable for interactive logins; fast, modest memory
    Interactive,
    /// Balanced preset for server-side workloads
    Moderate,
    /// Maximum resistance for long-lived master secrets
    Sensitive,
}

impl std::fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityLevel::Interactive => write!(f, "interactive"),
            SecurityLevel::Moderate => write!(f, "moderate"),
            SecurityLevel::Sensitive => write!(f, "sensitive"),
        }
    }
}

/// Configuration for deriving or generating a [`Key`](crate::value_objects::Key).
#[derive(Debug, Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyConfig {
    #[zeroize(skip)]
    key_type: KeyType,
    password: Option<String>,
    salt: Option<Vec<u8>>,
    #[zeroize(skip)]
    security_level: Option<SecurityLevel>,
    #[zeroize(skip)]
    algorithm_id: Option<String>,
    #[zeroize(skip)]
    version: Option<String>,
}

impl KeyConfig {
    /// Creates a configuration that generates a random key of the type.
    pub fn new(key_type: KeyType) -> Self {
        Self {
            key_type,
            password: None,
            salt: None,
            security_level: None,
            algorithm_id: None,
            version: None,
        }
    }

    /// Sets the derivation password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the derivation salt.
    pub fn with_salt(mut self, salt: Vec<u8>) -> Self {
        self.salt = Some(salt);
        self
    }

    /// Sets the derivation cost preset.
    pub fn with_security_level(mut self, level: SecurityLevel) -> Self {
        self.security_level = Some(level);
        self
    }

    /// Names the derivation function.
    pub fn with_algorithm_id(mut self, id: impl Into<String>) -> Self {
        self.algorithm_id = Some(id.into());
        self
    }

    /// Sets the on-wire version stamped on the produced key.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn salt(&self) -> Option<&[u8]> {
        self.salt.as_deref()
    }

    pub fn security_level(&self) -> Option<SecurityLevel> {
        self.security_level
    }

    pub fn algorithm_id(&self) -> Option<&str> {
        self.algorithm_id.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// True when every derivation field is present and the factory must
    /// derive deterministically instead of generating at random.
    pub fn is_derivable(&self) -> bool {
        self.password.is_some()
            && self.salt.is_some()
            && self.security_level.is_some()
            && self.algorithm_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests the generation/derivation discriminator.
    ///
    /// Validates that:
    /// - A bare config is not derivable
    /// - Only the presence of all four derivation fields makes it derivable
    #[test]
    fn test_is_derivable() {
        let base = KeyConfig::new(KeyType::SymmetricEncryptionKey);
        assert!(!base.is_derivable());

        let partial = KeyConfig::new(KeyType::SymmetricEncryptionKey)
            .with_password("correct horse battery staple")
            .with_salt(vec![7u8; 16]);
        assert!(!partial.is_derivable());

        let full = partial
            .clone()
            .with_security_level(SecurityLevel::Interactive)
            .with_algorithm_id("argon2id");
        assert!(full.is_derivable());
    }

    /// Tests that withers leave the original untouched and stack.
    #[test]
    fn test_withers() {
        let config = KeyConfig::new(KeyType::SymmetricAuthenticationKey)
            .with_version("2")
            .with_security_level(SecurityLevel::Sensitive);
        assert_eq!(config.key_type(), KeyType::SymmetricAuthenticationKey);
        assert_eq!(config.version(), Some("2"));
        assert_eq!(config.security_level(), Some(SecurityLevel::Sensitive));
        assert_eq!(config.password(), None);
    }
}
