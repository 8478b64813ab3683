// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Serde helper for binary fields carried as base64 strings in JSON.
//!
//! Secret records ship their encrypted data key and ciphertext as base64
//! text so the on-wire document stays valid JSON:
//!
//! ```ignore
//! #[serde(with = "base64_bytes_serde")]
//! key: Vec<u8>,
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::Deserialize;

pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&STANDARD.encode(bytes))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = String::deserialize(deserializer)?;
    STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| DeError::custom(format!("field is not base64: {}", e)))
}
