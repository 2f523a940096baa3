//! Read-only credential store.
//!
//! [`CredentialStore`] is the lookup capability the token service depends on.
//! The shipped implementation is an in-memory map loaded once at startup from
//! a JSON file of `{"username": .., "password_hash": ..}` records, where
//! `password_hash` is an Argon2id PHC string.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::password::{hash_password, is_valid_phc};

/// A stored user credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub username: String,
    pub password_hash: String,
}

impl CredentialRecord {
    /// Build a record for `username`, hashing `password` with a fresh salt.
    pub fn hashed(
        username: impl Into<String>,
        password: &str,
    ) -> Result<Self, argon2::password_hash::Error> {
        Ok(Self {
            username: username.into(),
            password_hash: hash_password(password)?,
        })
    }
}

/// Lookup of credential records by username.
pub trait CredentialStore: Send + Sync {
    fn lookup(&self, username: &str) -> Option<CredentialRecord>;
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialStoreError {
    #[error("Failed to read credentials file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse credentials file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate username in credential store: {0}")]
    DuplicateUsername(String),

    #[error("Password hash for {0} is not a valid PHC string")]
    InvalidHash(String),
}

/// Credential store backed by a map that never changes after construction.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    records: HashMap<String, CredentialRecord>,
}

impl InMemoryCredentialStore {
    /// Build a store from records, rejecting duplicate usernames and
    /// malformed password hashes.
    pub fn from_records(
        records: impl IntoIterator<Item = CredentialRecord>,
    ) -> Result<Self, CredentialStoreError> {
        let mut map = HashMap::new();
        for record in records {
            if !is_valid_phc(&record.password_hash) {
                return Err(CredentialStoreError::InvalidHash(record.username));
            }
            if map.contains_key(&record.username) {
                return Err(CredentialStoreError::DuplicateUsername(record.username));
            }
            map.insert(record.username.clone(), record);
        }
        Ok(Self { records: map })
    }

    /// Load records from a JSON array file.
    pub fn from_file(path: &Path) -> Result<Self, CredentialStoreError> {
        let display = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|source| CredentialStoreError::Io {
            path: display.clone(),
            source,
        })?;
        let records: Vec<CredentialRecord> =
            serde_json::from_slice(&bytes).map_err(|source| CredentialStoreError::Parse {
                path: display,
                source,
            })?;
        Self::from_records(records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn lookup(&self, username: &str) -> Option<CredentialRecord> {
        self.records.get(username).cloned()
    }
}
