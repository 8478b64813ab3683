// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Factory Implementation
//!
//! Concrete implementation of the domain's `KeyFactory` port for the
//! rust_crypto engine suite.
//!
//! ## Generation
//!
//! Random material comes from the thread-local CSPRNG. Deterministic
//! derivation uses Argon2id with cost parameters selected by the config's
//! [`SecurityLevel`]; the derived 32 bytes serve directly as symmetric
//! material, or as the Ed25519 seed for signature keys.
//!
//! ## Supported Types
//!
//! Symmetric encryption/authentication keys and the signature family
//! (secret key, key pair). Asymmetric *encryption* pairs belong to sealing
//! workflows outside the keyring contract and are reported as unsupported
//! by this adapter, as is generating a lone public key — public halves only
//! come out of [`split_key_pair`](RustCryptoKeyFactory::split_key_pair).

use argon2::{Algorithm, Argon2, Params, Version};
use ed25519_dalek::SigningKey;
use rand::RngCore;
use zeroize::Zeroizing;

use secrets_manager_domain::{
    Key, KeyConfig, KeyFactory, KeyType, SecretsManagerError, SecurityLevel, DEFAULT_KEY_VERSION,
};

use crate::infrastructure::adapters::engine::{
    ADAPTER_NAME, SIGNATURE_HALF_LEN, SIGNATURE_PAIR_LEN, SYMMETRIC_KEY_LEN,
};

/// Derivation function identifier accepted in a [`KeyConfig`].
pub const ALGORITHM_ARGON2ID: &str = "argon2id";

/// Argon2id cost presets per security level, (memory KiB, passes, lanes).
fn argon2_costs(level: SecurityLevel) -> (u32, u32, u32) {
    match level {
        SecurityLevel::Interactive => (65_536, 2, 1),
        SecurityLevel::Moderate => (262_144, 3, 1),
        SecurityLevel::Sensitive => (1_048_576, 4, 1),
    }
}

/// Key producer for the rust_crypto suite.
#[derive(Debug, Default, Clone)]
pub struct RustCryptoKeyFactory;

impl RustCryptoKeyFactory {
    pub fn new() -> Self {
        Self
    }

    fn random_bytes(len: usize) -> Zeroizing<Vec<u8>> {
        let mut bytes = Zeroizing::new(vec![0u8; len]);
        rand::rng().fill_bytes(&mut bytes);
        bytes
    }

    /// Derives `len` bytes from the config's password via Argon2id.
    fn derive_bytes(config: &KeyConfig, len: usize) -> Result<Zeroizing<Vec<u8>>, SecretsManagerError> {
        let algorithm_id = config.algorithm_id().unwrap_or_default();
        if algorithm_id != ALGORITHM_ARGON2ID {
            return Err(SecretsManagerError::unsupported_key_type(format!(
                "derivation function '{}' is not available, use '{}'",
                algorithm_id, ALGORITHM_ARGON2ID
            )));
        }
        let level = config
            .security_level()
            .ok_or_else(|| SecretsManagerError::GenerationFailed("derivation without security level".into()))?;
        let password = config
            .password()
            .ok_or_else(|| SecretsManagerError::GenerationFailed("derivation without password".into()))?;
        let salt = config
            .salt()
            .ok_or_else(|| SecretsManagerError::GenerationFailed("derivation without salt".into()))?;

        let (memory, passes, lanes) = argon2_costs(level);
        let params = Params::new(memory, passes, lanes, Some(len))
            .map_err(|e| SecretsManagerError::GenerationFailed(format!("argon2 parameters rejected: {}", e)))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut out = Zeroizing::new(vec![0u8; len]);
        argon2
            .hash_password_into(password.as_bytes(), salt, &mut out)
            .map_err(|e| SecretsManagerError::GenerationFailed(format!("argon2 derivation failed: {}", e)))?;
        Ok(out)
    }

    /// Produces seed material: derived when the config carries the full
    /// derivation field set, random otherwise.
    fn material(config: &KeyConfig, len: usize) -> Result<Zeroizing<Vec<u8>>, SecretsManagerError> {
        if config.is_derivable() {
            Self::derive_bytes(config, len)
        } else {
            Ok(Self::random_bytes(len))
        }
    }

    fn build(raw: &[u8], key_type: KeyType, version: &str) -> Result<Key, SecretsManagerError> {
        Key::new(hex::encode(raw), key_type, ADAPTER_NAME, version)
    }
}

impl KeyFactory for RustCryptoKeyFactory {
    fn generate(&self, config: &KeyConfig) -> Result<Key, SecretsManagerError> {
        let version = config.version().unwrap_or(DEFAULT_KEY_VERSION);
        match config.key_type() {
            KeyType::SymmetricEncryptionKey | KeyType::SymmetricAuthenticationKey => {
                let material = Self::material(config, SYMMETRIC_KEY_LEN)?;
                Self::build(&material, config.key_type(), version)
            }
            KeyType::AsymmetricSignatureSecretKey => {
                let seed = Self::material(config, SIGNATURE_HALF_LEN)?;
                Self::build(&seed, config.key_type(), version)
            }
            KeyType::AsymmetricSignatureKeyPair => {
                let seed = Self::material(config, SIGNATURE_HALF_LEN)?;
                let mut seed_array = [0u8; SIGNATURE_HALF_LEN];
                seed_array.copy_from_slice(&seed);
                let signing = SigningKey::from_bytes(&seed_array);

                let mut packed = Zeroizing::new(Vec::with_capacity(SIGNATURE_PAIR_LEN));
                packed.extend_from_slice(&seed);
                packed.extend_from_slice(&signing.verifying_key().to_bytes());
                Self::build(&packed, config.key_type(), version)
            }
            other => Err(SecretsManagerError::unsupported_key_type(format!(
                "adapter '{}' cannot generate keys of type '{}'",
                ADAPTER_NAME, other
            ))),
        }
    }

    fn split_key_pair(&self, pair: &Key) -> Result<(Key, Key), SecretsManagerError> {
        let public_type = pair
            .key_type()
            .public_half()
            .ok_or_else(|| SecretsManagerError::NotAKeyPair(format!("'{}' has no halves", pair.key_type())))?;
        let secret_type = pair
            .key_type()
            .secret_half()
            .ok_or_else(|| SecretsManagerError::NotAKeyPair(format!("'{}' has no halves", pair.key_type())))?;

        let raw = self.to_engine_form(pair)?;
        if raw.len() != SIGNATURE_PAIR_LEN {
            return Err(SecretsManagerError::NotAKeyPair(format!(
                "pair material is {} bytes, expected {}",
                raw.len(),
                SIGNATURE_PAIR_LEN
            )));
        }
        let (secret_raw, public_raw) = raw.split_at(SIGNATURE_HALF_LEN);

        let public = Self::build(public_raw, public_type, pair.version())?;
        let secret = Self::build(secret_raw, secret_type, pair.version())?;
        Ok((public, secret))
    }

    fn to_engine_form(&self, key: &Key) -> Result<Zeroizing<Vec<u8>>, SecretsManagerError> {
        Ok(Zeroizing::new(hex::decode(key.material().expose()).map_err(
            |e| SecretsManagerError::GenerationFailed(format!("key material is not hex: {}", e)),
        )?))
    }

    fn from_engine_form(
        &self,
        raw: &[u8],
        key_type: KeyType,
        adapter: &str,
        version: &str,
    ) -> Result<Key, SecretsManagerError> {
        Key::new(hex::encode(raw), key_type, adapter, version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> RustCryptoKeyFactory {
        RustCryptoKeyFactory::new()
    }

    /// Tests random generation of supported types.
    ///
    /// Validates that:
    /// - Symmetric keys carry 32 bytes of material
    /// - Signature pairs carry 64 bytes and the adapter name
    /// - Two generations never collide
    #[test]
    fn test_generate_random() {
        let factory = factory();

        let a = factory.generate(&KeyConfig::new(KeyType::SymmetricEncryptionKey)).unwrap();
        let b = factory.generate(&KeyConfig::new(KeyType::SymmetricEncryptionKey)).unwrap();
        assert_eq!(a.material_len(), SYMMETRIC_KEY_LEN);
        assert_eq!(a.adapter(), ADAPTER_NAME);
        assert_ne!(a, b);

        let pair = factory
            .generate(&KeyConfig::new(KeyType::AsymmetricSignatureKeyPair))
            .unwrap();
        assert_eq!(pair.material_len(), SIGNATURE_PAIR_LEN);
    }

    /// Tests deterministic derivation.
    ///
    /// Validates that:
    /// - The same password, salt, and level reproduce the same key
    /// - A different salt produces a different key
    /// - A foreign derivation function id is rejected
    #[test]
    fn test_generate_derived() {
        let factory = factory();
        let config = KeyConfig::new(KeyType::SymmetricEncryptionKey)
            .with_password("correct horse battery staple")
            .with_salt(vec![42u8; 16])
            .with_security_level(SecurityLevel::Interactive)
            .with_algorithm_id(ALGORITHM_ARGON2ID);

        let a = factory.generate(&config).unwrap();
        let b = factory.generate(&config).unwrap();
        assert_eq!(a, b);

        let other_salt = config.clone().with_salt(vec![43u8; 16]);
        assert_ne!(a, factory.generate(&other_salt).unwrap());

        let bad_kdf = config.with_algorithm_id("pbkdf2");
        assert!(matches!(
            factory.generate(&bad_kdf).unwrap_err(),
            SecretsManagerError::UnsupportedKeyType(_)
        ));
    }

    /// Tests that unsupported types are refused.
    #[test]
    fn test_generate_unsupported() {
        let factory = factory();
        for key_type in [
            KeyType::AsymmetricEncryptionKeyPair,
            KeyType::AsymmetricSignaturePublicKey,
            KeyType::Hex,
            KeyType::Raw,
            KeyType::Unknown,
        ] {
            let err = factory.generate(&KeyConfig::new(key_type)).unwrap_err();
            assert!(matches!(err, SecretsManagerError::UnsupportedKeyType(_)));
        }
    }

    /// Tests pair splitting.
    ///
    /// Validates that:
    /// - The halves carry the sibling types and 32 bytes each
    /// - The packed pair material is the concatenation of the halves
    /// - Splitting a non-pair fails with NotAKeyPair
    #[test]
    fn test_split_key_pair() {
        let factory = factory();
        let pair = factory
            .generate(&KeyConfig::new(KeyType::AsymmetricSignatureKeyPair))
            .unwrap();
        let (public, secret) = factory.split_key_pair(&pair).unwrap();

        assert_eq!(public.key_type(), KeyType::AsymmetricSignaturePublicKey);
        assert_eq!(secret.key_type(), KeyType::AsymmetricSignatureSecretKey);
        assert_eq!(public.material_len(), SIGNATURE_HALF_LEN);
        assert_eq!(secret.material_len(), SIGNATURE_HALF_LEN);
        assert_eq!(
            format!("{}{}", secret.material().expose(), public.material().expose()),
            pair.material().expose()
        );

        let not_pair = factory.generate(&KeyConfig::new(KeyType::SymmetricEncryptionKey)).unwrap();
        assert!(matches!(
            factory.split_key_pair(&not_pair).unwrap_err(),
            SecretsManagerError::NotAKeyPair(_)
        ));
    }

    /// Tests the engine-form round-trip.
    #[test]
    fn test_engine_form_round_trip() {
        let factory = factory();
        let key = factory.generate(&KeyConfig::new(KeyType::SymmetricAuthenticationKey)).unwrap();
        let raw = factory.to_engine_form(&key).unwrap();
        let back = factory
            .from_engine_form(&raw, key.key_type(), key.adapter(), key.version())
            .unwrap();
        assert_eq!(back, key);
    }
}
