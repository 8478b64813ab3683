// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Services
//!
//! Stateless capabilities that operate on domain objects without belonging
//! to any single one of them.
//!
//! The cryptographic ports ([`EncryptionEngine`], [`KeyFactory`]) are
//! defined here and implemented in the infrastructure layer; the request
//! validator guards key/operation compatibility before dispatch; the serde
//! helper modules encode byte-valued fields for the JSON wire forms.
//!
//! All core service traits are synchronous. The keyring protocol is a
//! strict sequence of sub-steps, and any asynchrony belongs to the
//! infrastructure adapters that wrap it.

pub mod base64_bytes_serde;
pub mod encryption_engine;
pub mod hex_bytes_serde;
pub mod key_factory;
pub mod request_validator;

pub use encryption_engine::{EncryptionEngine, CHECKSUM_RAW_LEN, SIGNATURE_RAW_LEN};
pub use key_factory::KeyFactory;
