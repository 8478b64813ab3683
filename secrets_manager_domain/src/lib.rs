// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Secrets Manager Domain
//!
//! The domain layer of the secrets manager: the key taxonomy, the keyring
//! entity with its MAC-gated lock state, the master key set, and the ports
//! (encryption engine, key factory, key and vault storage) the
//! infrastructure layer implements. It is completely independent of
//! external concerns: no file system, no concrete cryptography, no
//! logging.
//!
//! ## Module Structure
//!
//! - [`value_objects`] — immutable values: [`KeyType`], [`Key`],
//!   [`KeyConfig`], [`Checksum`], [`SecretLookupKey`]
//! - [`entities`] — identity-bearing objects: [`Keyring`], [`MasterKeys`],
//!   [`Secret`]
//! - [`services`] — stateless capabilities: [`EncryptionEngine`],
//!   [`KeyFactory`], the request validator, serde helpers
//! - [`repositories`] — persistence ports: [`KeyStorage`], [`VaultStorage`]
//! - [`error`] — the hierarchical [`SecretsManagerError`]
//!
//! ## Business Rules and Invariants
//!
//! ### Keyring Rules
//! - A locked keyring silently ignores every mutation and reads as empty
//! - Lock-state transitions require a MAC from the authorized set
//! - The keyring identity never changes after creation
//!
//! ### Master Key Rules
//! - The master set must hold one symmetric encryption key and signature
//!   material (a pair, or both halves) before any keyring operation
//!
//! ### Key Material Rules
//! - Key material is exposed as hex through a sensitive wrapper only
//! - Raw bytes exist solely inside the key factory's engine conversion
//! - Sensitive buffers zero themselves on drop

pub mod entities;
pub mod error;
pub mod repositories;
pub mod services;
pub mod value_objects;

// Re-export commonly used types for convenient access
// These exports provide a clean API surface for consumers of the domain layer
pub use entities::{Keyring, MasterKeys, Secret, SecretValue, VaultEntry, UNIQUE_ID_LEN};
pub use error::SecretsManagerError;
pub use repositories::{KeyStorage, VaultStorage};
pub use services::{EncryptionEngine, KeyFactory};
pub use value_objects::{
    Checksum, HexMaterial, Key, KeyConfig, KeyType, SecretLookupKey, SecurityLevel, DEFAULT_KEY_VERSION,
};
