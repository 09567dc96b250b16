use anyhow::Context;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use super::UserReader;
use crate::interpreter::{ReadParams, User};

/// Errors surfaced by [`UserDirectory`] lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No user is registered under the requested id.
    #[error("user {0} not found")]
    UnknownUser(i64),
}

/// In-memory `id -> User` table.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<i64, User>,
}

impl UserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from users. Later duplicates replace earlier ones.
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut directory = Self::new();
        for user in users {
            directory.insert(user);
        }
        directory
    }

    /// Parse a JSON array of users.
    pub fn from_json_str(source: &str) -> serde_json::Result<Self> {
        let users: Vec<User> = serde_json::from_str(source)?;
        Ok(Self::from_users(users))
    }

    /// Load a JSON array of users from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read user directory: {:?}", path))?;
        let directory = Self::from_json_str(&source)
            .with_context(|| format!("Failed to parse user directory: {:?}", path))?;
        tracing::debug!(users = directory.len(), "loaded user directory");
        Ok(directory)
    }

    /// Register or replace a user, returning the previous entry.
    pub fn insert(&mut self, user: User) -> Option<User> {
        self.users.insert(user.id, user)
    }

    /// Look up a user by id.
    pub fn get(&self, id: i64) -> Option<&User> {
        self.users.get(&id)
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserReader for UserDirectory {
    type Error = LookupError;

    fn read(&self, params: &ReadParams) -> Result<User, LookupError> {
        self.get(params.id)
            .cloned()
            .ok_or(LookupError::UnknownUser(params.id))
    }
}
