// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Secrets Manager
//!
//! Keyring-backed secrets management: long-lived cryptographic keys are
//! organized into a signed-and-encrypted keyring, and the keyring protects
//! user secrets through two-tier envelope encryption with short-hash
//! lookup identifiers hiding secret names at rest.
//!
//! ## Layers
//!
//! - [`application`] — the orchestration services: [`MasterKeyProvider`]
//!   loads the root-of-trust keys at bootstrap, [`KeyManager`] drives the
//!   keyring lifecycle, [`SecretManager`] seals and opens secrets.
//! - [`infrastructure`] — the concrete ports: the
//!   [`RustCryptoEngine`](infrastructure::adapters::RustCryptoEngine)
//!   cryptographic suite, key and vault storage adapters, and the
//!   [`KeyringCodec`](infrastructure::services::KeyringCodec) persistence
//!   protocol.
//!
//! Domain types (keys, the keyring, secrets, errors) come from the
//! `secrets-manager-domain` crate and are re-exported where they appear in
//! this crate's public surface.
//!
//! ## Wiring
//!
//! A deployment assembles the stack bottom-up: engine and factory, a key
//! storage holding the master keys, the provider, the codec pointed at the
//! keyring artifacts, the key manager, and finally one secret manager per
//! vault. All services are synchronous and single-owner; wrap the whole
//! manager in one exclusion guard if it must cross threads.

pub mod application;
pub mod infrastructure;

pub use application::services::{KeyManager, MasterKeyProvider, SecretManager};
pub use secrets_manager_domain as domain;
