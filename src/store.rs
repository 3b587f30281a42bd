// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Key/value persistence for the ledger.
//!
//! The ledger only needs to read and write whole JSON values under string
//! keys. [`MemoryStore`] keeps them in a map; [`JsonFileStore`] keeps one
//! `<key>.json` file per key in a directory.

use crate::error::StoreError;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Reads and writes named JSON values.
pub trait PersistenceStore {
    /// Returns `None` when nothing was stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Replaces the value under `key`.
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

impl<S: PersistenceStore + ?Sized> PersistenceStore for &S {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// Directory of JSON files, one per key.
///
/// Writes go to a temporary file that is then renamed over the target, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_error(key: &str, error: io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        message: error.to_string(),
    }
}

fn serialization_error(key: &str, error: serde_json::Error) -> StoreError {
    StoreError::Serialization {
        key: key.to_string(),
        message: error.to_string(),
    }
}

impl PersistenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let contents = match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(key, e)),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| serialization_error(key, e))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(key, e))?;
        let contents = serde_json::to_vec_pretty(&value).map_err(|e| serialization_error(key, e))?;

        let target = self.path_for(key);
        let staging = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&staging, contents).map_err(|e| io_error(key, e))?;
        fs::rename(&staging, &target).map_err(|e| io_error(key, e))?;
        Ok(())
    }
}
