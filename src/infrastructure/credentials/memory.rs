#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;

use anyhow::Result;
use dashmap::DashMap;

use crate::domain::models::CredentialStore;
use crate::domain::models::CREDENTIAL_KEY;

/// Keeps the token for the lifetime of the process only.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: DashMap<String, String>,
}

impl MemoryCredentialStore {
    pub fn with_token(token: &str) -> MemoryCredentialStore {
        let store = MemoryCredentialStore::default();
        store
            .entries
            .insert(CREDENTIAL_KEY.to_string(), token.to_string());
        return store;
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        return self
            .entries
            .get(CREDENTIAL_KEY)
            .map(|token| return token.to_string());
    }

    fn set(&self, token: &str) -> Result<()> {
        self.entries
            .insert(CREDENTIAL_KEY.to_string(), token.to_string());
        return Ok(());
    }

    fn clear(&self) -> Result<()> {
        self.entries.remove(CREDENTIAL_KEY);
        return Ok(());
    }
}
