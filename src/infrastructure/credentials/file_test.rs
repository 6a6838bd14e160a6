use std::fs;

use anyhow::Result;
use tempfile::TempDir;

use super::FileCredentialStore;
use crate::domain::models::CredentialStore;

#[test]
fn it_reads_nothing_without_a_file() -> Result<()> {
    let tmp_dir = TempDir::new()?;
    let store = FileCredentialStore::new(tmp_dir.path().join("credentials.json"));

    assert_eq!(store.get(), None);
    store.clear()?;
    assert!(!store.file_path.exists());
    return Ok(());
}

#[test]
fn it_persists_tokens_across_instances() -> Result<()> {
    let tmp_dir = TempDir::new()?;
    let file_path = tmp_dir.path().join("nested/credentials.json");

    FileCredentialStore::new(file_path.clone()).set("token123")?;
    let store = FileCredentialStore::new(file_path.clone());
    assert_eq!(store.get(), Some("token123".to_string()));

    let contents: serde_json::Value = serde_json::from_str(&fs::read_to_string(&file_path)?)?;
    assert_eq!(contents["auth_token"], "token123");
    return Ok(());
}

#[test]
fn it_clears_only_the_token() -> Result<()> {
    let tmp_dir = TempDir::new()?;
    let file_path = tmp_dir.path().join("credentials.json");
    fs::write(&file_path, r#"{"auth_token": "abc", "theme": "dark"}"#)?;

    let store = FileCredentialStore::new(file_path.clone());
    store.clear()?;
    assert_eq!(store.get(), None);

    let contents: serde_json::Value = serde_json::from_str(&fs::read_to_string(&file_path)?)?;
    assert_eq!(contents["theme"], "dark");
    assert!(contents.get("auth_token").is_none());
    return Ok(());
}

#[test]
fn it_ignores_corrupt_files() -> Result<()> {
    let tmp_dir = TempDir::new()?;
    let file_path = tmp_dir.path().join("credentials.json");
    fs::write(&file_path, "not json")?;

    let store = FileCredentialStore::new(file_path);
    assert_eq!(store.get(), None);

    store.set("fresh")?;
    assert_eq!(store.get(), Some("fresh".to_string()));
    return Ok(());
}

#[test]
fn it_replaces_the_file_without_leaving_temp_files() -> Result<()> {
    let tmp_dir = TempDir::new()?;
    let file_path = tmp_dir.path().join("credentials.json");

    let store = FileCredentialStore::new(file_path.clone());
    store.set("first")?;
    store.set("second")?;
    store.clear()?;
    store.set("third")?;

    let names = fs::read_dir(tmp_dir.path())?
        .map(|entry| return Ok(entry?.file_name().to_string_lossy().to_string()))
        .collect::<Result<Vec<String>>>()?;
    assert_eq!(names, vec!["credentials.json".to_string()]);
    assert_eq!(store.get(), Some("third".to_string()));
    return Ok(());
}

#[cfg(unix)]
#[test]
fn it_restricts_the_file_to_its_owner() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let tmp_dir = TempDir::new()?;
    let file_path = tmp_dir.path().join("credentials.json");
    fs::write(&file_path, "{}")?;
    fs::set_permissions(&file_path, fs::Permissions::from_mode(0o644))?;

    FileCredentialStore::new(file_path.clone()).set("secret")?;

    let mode = fs::metadata(&file_path)?.permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
    return Ok(());
}
