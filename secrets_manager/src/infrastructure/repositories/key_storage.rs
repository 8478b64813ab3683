// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Storage Adapters
//!
//! Concrete master-key persistence behind the domain's `KeyStorage` port.
//! Two formats are supported:
//!
//! - [`EnvFileKeyStorage`] — a dotenv-style file with one upper-cased
//!   variable per key whose value is the JSON record
//!   `{"hex","type","adapter","version"}`. The format keeps master keys
//!   deployable through the same tooling that manages other environment
//!   configuration.
//! - [`FileKeyStorage`] — one text file per key holding four LF-separated
//!   lines: hex, type, adapter, version. A trailing newline is tolerated.
//!
//! Both adapters implement the same import/resolve/save contract:
//! `import` returning `None` means the name is absent, while `resolve`
//! failing on present material reports `UnableToLoadKey`.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use secrets_manager_domain::{Key, KeyStorage, SecretsManagerError};

/// Dotenv-style storage: `NAME={"hex":...,"type":...,...}` per line.
#[derive(Debug, Clone)]
pub struct EnvFileKeyStorage {
    path: PathBuf,
}

impl EnvFileKeyStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_lines(&self) -> Result<Vec<String>, SecretsManagerError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(SecretsManagerError::storage_unavailable(format!(
                "cannot read env file '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }
}

impl KeyStorage for EnvFileKeyStorage {
    fn import(&self, name: &str) -> Result<Option<String>, SecretsManagerError> {
        let variable = name.to_uppercase();
        for line in self.read_lines()? {
            if let Some((key, value)) = line.split_once('=') {
                if key.trim() == variable {
                    return Ok(Some(value.trim().to_string()));
                }
            }
        }
        Ok(None)
    }

    fn resolve(&self, raw: &str) -> Result<Key, SecretsManagerError> {
        serde_json::from_str(raw)
            .map_err(|e| SecretsManagerError::UnableToLoadKey(format!("env value is not a key record: {}", e)))
    }

    fn save(&self, name: &str, key: &Key) -> Result<(), SecretsManagerError> {
        let variable = name.to_uppercase();
        let record = serde_json::to_string(key)?;

        let mut lines = self.read_lines()?;
        lines.retain(|line| {
            line.split_once('=')
                .map(|(existing, _)| existing.trim() != variable)
                .unwrap_or(true)
        });
        lines.push(format!("{}={}", variable, record));

        let mut contents = lines.join("\n");
        contents.push('\n');
        fs::write(&self.path, contents).map_err(|e| {
            SecretsManagerError::storage_unavailable(format!(
                "cannot write env file '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// One four-line text file per key under a base directory.
#[derive(Debug, Clone)]
pub struct FileKeyStorage {
    dir: PathBuf,
}

impl FileKeyStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl KeyStorage for FileKeyStorage {
    fn import(&self, name: &str) -> Result<Option<String>, SecretsManagerError> {
        match fs::read_to_string(self.key_path(name)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SecretsManagerError::storage_unavailable(format!(
                "cannot read key file '{}': {}",
                self.key_path(name).display(),
                e
            ))),
        }
    }

    fn resolve(&self, raw: &str) -> Result<Key, SecretsManagerError> {
        let mut lines = raw.lines();
        let hex = lines.next();
        let key_type = lines.next();
        let adapter = lines.next();
        let version = lines.next();
        // Tolerate one trailing newline, nothing more.
        let trailing = lines.next();
        match (hex, key_type, adapter, version) {
            (Some(hex), Some(key_type), Some(adapter), Some(version))
                if trailing.is_none_or(str::is_empty) =>
            {
                Key::with_type_str(hex.trim(), key_type.trim(), adapter.trim(), version.trim())
                    .map_err(|e| SecretsManagerError::UnableToLoadKey(format!("key file rejected: {}", e)))
            }
            _ => Err(SecretsManagerError::UnableToLoadKey(
                "key file must hold exactly four lines: hex, type, adapter, version".to_string(),
            )),
        }
    }

    fn save(&self, name: &str, key: &Key) -> Result<(), SecretsManagerError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            SecretsManagerError::storage_unavailable(format!(
                "cannot create key directory '{}': {}",
                self.dir.display(),
                e
            ))
        })?;
        let contents = format!(
            "{}\n{}\n{}\n{}\n",
            key.material().expose(),
            key.key_type(),
            key.adapter(),
            key.version()
        );
        fs::write(self.key_path(name), contents).map_err(|e| {
            SecretsManagerError::storage_unavailable(format!(
                "cannot write key file '{}': {}",
                self.key_path(name).display(),
                e
            ))
        })
    }
}
