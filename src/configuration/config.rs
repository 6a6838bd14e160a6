#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ApiUrl,
    ConfigFile,
    CredentialFile,
    RequestTimeout,
    RetryAttempts,
    RetryDelay,
}

impl ConfigKey {
    fn is_numeric(&self) -> bool {
        return matches!(
            self,
            ConfigKey::RequestTimeout | ConfigKey::RetryAttempts | ConfigKey::RetryDelay
        );
    }

    fn description(&self) -> &'static str {
        match self {
            ConfigKey::ApiUrl => return "Base URL of the Shotsmith API.",
            ConfigKey::ConfigFile => return "Path to configuration file.",
            ConfigKey::CredentialFile => {
                return "File the login token is stored in between commands."
            }
            ConfigKey::RequestTimeout => {
                return "Time to wait in milliseconds before a request times out."
            }
            ConfigKey::RetryAttempts => {
                return "Maximum attempts for read-only requests that fail with a server or network error."
            }
            ConfigKey::RetryDelay => {
                return "Delay in milliseconds before the first retry. Doubles on each attempt."
            }
        }
    }
}

fn shotsmith_dir() -> path::PathBuf {
    #[cfg(not(target_os = "macos"))]
    let base = dirs::config_dir();
    #[cfg(target_os = "macos")]
    let base = env::var("HOME")
        .ok()
        .map(|home| return path::PathBuf::from(home).join(".config"));

    return base
        .unwrap_or_else(|| return path::PathBuf::from("."))
        .join("shotsmith");
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return Config::default(key);
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn get_u64(key: ConfigKey) -> Result<u64> {
        let val = Config::get(key);
        if let Ok(num) = val.parse::<u64>() {
            return Ok(num);
        }

        bail!(format!("Config value for '{key}' must be a whole number, got '{val}'"))
    }

    pub fn get_duration(key: ConfigKey) -> Result<Duration> {
        return Ok(Duration::from_millis(Config::get_u64(key)?));
    }

    pub fn default(key: ConfigKey) -> String {
        if key == ConfigKey::ApiUrl {
            if let Ok(url) = env::var("SHOTSMITH_API_URL") {
                if !url.is_empty() {
                    return url;
                }
            }
        }

        let res = match key {
            ConfigKey::ApiUrl => DEFAULT_API_URL.to_string(),
            ConfigKey::RequestTimeout => "30000".to_string(),
            ConfigKey::RetryAttempts => "3".to_string(),
            ConfigKey::RetryDelay => "1000".to_string(),

            // Special
            ConfigKey::ConfigFile => shotsmith_dir()
                .join("config.toml")
                .to_string_lossy()
                .to_string(),
            ConfigKey::CredentialFile => shotsmith_dir()
                .join("credentials.json")
                .to_string_lossy()
                .to_string(),
        };

        return res;
    }

    /// Resolves every key from defaults, then the TOML config file, then CLI
    /// flags and their environment variables.
    pub async fn load(clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            Config::apply_toml(&toml_str)?;
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    if key.is_numeric() && val.parse::<u64>().is_err() {
                        bail!(format!("--{key} must be a whole number, got '{val}'"));
                    }
                    Config::set(key, val)
                }
            }
        }

        tracing::debug!(
            api_url = Config::get(ConfigKey::ApiUrl),
            credential_file = Config::get(ConfigKey::CredentialFile),
            request_timeout = Config::get(ConfigKey::RequestTimeout),
            retry_attempts = Config::get(ConfigKey::RetryAttempts),
            retry_delay = Config::get(ConfigKey::RetryDelay),
            "config"
        );

        return Ok(());
    }

    fn apply_toml(toml_str: &str) -> Result<()> {
        let doc = toml_str.parse::<toml_edit::Document>()?;

        for key in ConfigKey::iter() {
            if key == ConfigKey::ConfigFile {
                continue;
            }

            if let Some(val) = doc.get(&key.to_string()) {
                if let Some(val_int) = val.as_integer() {
                    if !key.is_numeric() || val_int < 0 {
                        bail!(format!(
                            "config.toml has an invalid value for key '{key}': {val_int}"
                        ));
                    }
                    Config::set(key, &val_int.to_string());
                } else if let Some(val_str) = val.as_str() {
                    if val_str.is_empty() {
                        continue;
                    }
                    if key.is_numeric() && val_str.parse::<u64>().is_err() {
                        bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nExpected a whole number"));
                    }
                    Config::set(key, val_str);
                } else {
                    bail!(format!("config.toml has an invalid value for key '{key}'"));
                }
            }
        }

        return Ok(());
    }

    pub fn serialize_default() -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let description = key.description();
                let val = Config::default(key);
                let line = if key.is_numeric() {
                    format!("{key} = {val}")
                } else {
                    format!("{key} = \"{val}\"")
                };

                return Some(format!("# {description}\n{line}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
