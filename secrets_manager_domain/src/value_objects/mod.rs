// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Value Objects
//!
//! Immutable, identity-free domain values. Two value objects with equal
//! attributes are equal; all of them validate their invariants at
//! construction and offer side-effect-free operations only.
//!
//! - [`KeyType`] — closed taxonomy of key purposes with classification
//!   predicates
//! - [`Key`] / [`HexMaterial`] — opaque bearer of sensitive hex material
//! - [`KeyConfig`] / [`SecurityLevel`] — generation and derivation settings
//! - [`Checksum`] — the 88+88-byte keyring sidecar pair
//! - [`SecretLookupKey`] — the short-hash storage address of a secret

pub mod checksum;
pub mod key;
pub mod key_config;
pub mod key_type;
pub mod secret_lookup;

pub use checksum::{Checksum, ENCODED_HALF_LEN, SIDECAR_LEN};
pub use key::{HexMaterial, Key, DEFAULT_KEY_VERSION};
pub use key_config::{KeyConfig, SecurityLevel};
pub use key_type::KeyType;
pub use secret_lookup::SecretLookupKey;
