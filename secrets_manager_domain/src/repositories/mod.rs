// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Repository Ports
//!
//! Persistence abstractions the domain depends on without knowing the
//! storage technology: [`KeyStorage`] for master keys, [`VaultStorage`]
//! for envelope-encrypted secrets.

pub mod key_storage;
pub mod vault_storage;

pub use key_storage::KeyStorage;
pub use vault_storage::VaultStorage;
