// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Serde helpers for byte maps carried inside JSON documents.
//!
//! Vault metadata is a `map<string, bytes>` whose values are not guaranteed
//! to be UTF-8 (the cache-key halves are raw key material), so the on-wire
//! JSON form hex-encodes every value. This module plugs into serde field
//! attributes the same way a custom date-time codec would:
//!
//! ```ignore
//! #[serde(with = "hex_bytes_serde")]
//! metadata: HashMap<String, Vec<u8>>,
//! ```

use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub fn serialize<S>(map: &HashMap<String, Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let encoded: HashMap<&str, String> = map.iter().map(|(k, v)| (k.as_str(), hex::encode(v))).collect();
    encoded.serialize(serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<HashMap<String, Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded: HashMap<String, String> = HashMap::deserialize(deserializer)?;
    encoded
        .into_iter()
        .map(|(k, v)| {
            hex::decode(&v)
                .map(|bytes| (k, bytes))
                .map_err(|e| DeError::custom(format!("metadata value is not hex: {}", e)))
        })
        .collect()
}
