use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const HOME_OVERRIDE_VAR: &str = "SHAREFILE_HOME";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Base of the backend REST API (default: http://localhost:8080/api)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// URL the client page is served from; share links are minted against it
    #[serde(default = "default_page_url")]
    pub page_url: String,

    /// Hash prefix that selects the download view (default: /file)
    #[serde(default = "default_share_hash_prefix")]
    pub share_hash_prefix: String,

    /// Expiry sent with every upload, in days
    #[serde(default = "default_expiry_days")]
    pub default_expiry_days: u32,

    /// tracing filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Per-request timeout in seconds, 0 leaves it to the network stack
    #[serde(default)]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_page_url() -> String {
    "http://localhost:5173/".to_string()
}

fn default_share_hash_prefix() -> String {
    "/file".to_string()
}

fn default_expiry_days() -> u32 {
    7
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(HOME_OVERRIDE_VAR) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME not set")?;
    Ok(PathBuf::from(home).join(".sharefile"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

impl Config {
    /// Load config from ~/.sharefile/config.toml, returning defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Save config to ~/.sharefile/config.toml
    pub fn save(&self) -> Result<PathBuf> {
        let path = config_path()?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Apply a `config set` style assignment.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_base_url" | "api" => {
                self.api_base_url = value.trim_end_matches('/').to_string();
            }
            "page_url" | "page" => {
                url::Url::parse(value).with_context(|| format!("invalid page_url: {value}"))?;
                self.page_url = value.to_string();
            }
            "share_hash_prefix" | "prefix" => {
                if !value.starts_with('/') || value.len() < 2 {
                    bail!("invalid share_hash_prefix: must start with '/', e.g. /file");
                }
                self.share_hash_prefix = value.trim_end_matches('/').to_string();
            }
            "default_expiry_days" | "expiry" => {
                let days: u32 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid expiry: must be a positive number of days"))?;
                if days == 0 {
                    bail!("invalid expiry: must be a positive number of days");
                }
                self.default_expiry_days = days;
            }
            "log_level" => {
                self.log_level = value.to_string();
            }
            "request_timeout_secs" | "timeout" => {
                self.request_timeout_secs = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid timeout: must be whole seconds"))?;
            }
            _ => bail!("unknown config key: {key}"),
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            page_url: default_page_url(),
            share_hash_prefix: default_share_hash_prefix(),
            default_expiry_days: default_expiry_days(),
            log_level: default_log_level(),
            request_timeout_secs: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{EnvGuard, env_lock};
    use tempfile::TempDir;

    #[test]
    fn config_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.share_hash_prefix, "/file");
        assert_eq!(config.default_expiry_days, 7);
        assert_eq!(config.request_timeout_secs, 0);
    }

    #[test]
    fn config_partial_parse() {
        let content = "api_base_url = \"https://share.example.com/api\"\n";
        let config: Config = toml::from_str(content).unwrap();
        assert_eq!(config.api_base_url, "https://share.example.com/api");
        assert_eq!(config.page_url, "http://localhost:5173/");
        assert_eq!(config.default_expiry_days, 7);
    }

    #[test]
    fn config_save_and_load_under_override_dir() {
        let _lock = env_lock();
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("nested");
        let _guard = EnvGuard::set(HOME_OVERRIDE_VAR, home.to_str().unwrap());

        assert_eq!(Config::load().unwrap(), Config::default());

        let mut config = Config::default();
        config.set("expiry", "3").unwrap();
        config.set("page", "https://files.example.com/app/").unwrap();
        let path = config.save().unwrap();
        assert_eq!(path, home.join("config.toml"));

        let loaded = Config::load().unwrap();
        assert_eq!(loaded.default_expiry_days, 3);
        assert_eq!(loaded.page_url, "https://files.example.com/app/");
    }

    #[test]
    fn config_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("expiry", "0").is_err());
        assert!(config.set("expiry", "soon").is_err());
        assert!(config.set("prefix", "file").is_err());
        assert!(config.set("page", "not a url").is_err());
        assert!(config.set("color", "blue").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn config_set_trims_trailing_slashes() {
        let mut config = Config::default();
        config.set("api", "https://example.com/api/").unwrap();
        config.set("prefix", "/share/").unwrap();
        assert_eq!(config.api_base_url, "https://example.com/api");
        assert_eq!(config.share_hash_prefix, "/share");
    }
}
