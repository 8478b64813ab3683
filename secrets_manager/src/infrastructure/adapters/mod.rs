// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Cryptographic adapters implementing the domain's engine and factory
//! ports over the XChaCha20-Poly1305 / BLAKE2b / Ed25519 / Argon2id suite.

pub mod engine;
pub mod key_factory;

pub use engine::{RustCryptoEngine, ADAPTER_NAME};
pub use key_factory::{RustCryptoKeyFactory, ALGORITHM_ARGON2ID};
