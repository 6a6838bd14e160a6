use std::sync::Arc;

use anyhow::Result;

/// Fixed name the bearer token is stored under.
pub const CREDENTIAL_KEY: &str = "auth_token";

pub type CredentialStoreBox = Arc<dyn CredentialStore + Send + Sync>;

/// Holds the single live bearer token. Written on login or registration,
/// erased on logout or whenever the backend answers 401.
pub trait CredentialStore {
    fn get(&self) -> Option<String>;

    fn set(&self, token: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;
}
