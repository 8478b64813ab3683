// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Entities
//!
//! Domain objects with identity and lifecycle. The [`Keyring`] is the
//! central one: it owns the vault⇒key map and the MAC-gated lock state.
//! [`MasterKeys`] is the validated root-of-trust set; [`Secret`] is the
//! envelope-encrypted record addressed by its lookup identifier.

pub mod keyring;
pub mod master_keys;
pub mod secret;

pub use keyring::{Keyring, VaultEntry, UNIQUE_ID_LEN};
pub use master_keys::MasterKeys;
pub use secret::{Secret, SecretValue};
