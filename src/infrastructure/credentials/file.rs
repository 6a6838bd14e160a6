#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use anyhow::Result;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::CredentialStore;
use crate::domain::models::JsonMap;
use crate::domain::models::CREDENTIAL_KEY;

/// Persists the token as `{"auth_token": "..."}` so it survives between
/// commands. Other keys already present in the file are preserved.
pub struct FileCredentialStore {
    pub file_path: PathBuf,
}

impl Default for FileCredentialStore {
    fn default() -> FileCredentialStore {
        return FileCredentialStore::new(PathBuf::from(Config::get(ConfigKey::CredentialFile)));
    }
}

impl FileCredentialStore {
    pub fn new(file_path: PathBuf) -> FileCredentialStore {
        return FileCredentialStore { file_path };
    }

    fn read_entries(&self) -> JsonMap {
        let contents = match fs::read_to_string(&self.file_path) {
            Ok(contents) => contents,
            Err(_) => return JsonMap::new(),
        };

        return match serde_json::from_str::<JsonMap>(&contents) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(
                    error = ?err,
                    path = ?self.file_path,
                    "Ignoring unreadable credential file"
                );
                JsonMap::new()
            }
        };
    }

    /// Writes through a temp file in the same directory and renames it over
    /// the target, so a reader never sees a partial file. The token file is
    /// readable by the owner only.
    fn write_entries(&self, entries: &JsonMap) -> Result<()> {
        let dir = match self.file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let mut tmp_file = NamedTempFile::new_in(&dir)?;
        tmp_file.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
        tmp_file.as_file().sync_all()?;
        #[cfg(unix)]
        fs::set_permissions(tmp_file.path(), fs::Permissions::from_mode(0o600))?;

        tmp_file.persist(&self.file_path)?;
        return Ok(());
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<String> {
        return self
            .read_entries()
            .get(CREDENTIAL_KEY)
            .and_then(Value::as_str)
            .filter(|token| return !token.is_empty())
            .map(|token| return token.to_string());
    }

    fn set(&self, token: &str) -> Result<()> {
        let mut entries = self.read_entries();
        entries.insert(
            CREDENTIAL_KEY.to_string(),
            Value::String(token.to_string()),
        );
        return self.write_entries(&entries);
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.read_entries();
        if entries.remove(CREDENTIAL_KEY).is_none() {
            return Ok(());
        }
        return self.write_entries(&entries);
    }
}
