use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Header carrying `Bearer <token>` on private calls.
    #[serde(default = "default_bearer_header")]
    pub bearer_header: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4040".into(),
            bearer_header: default_bearer_header(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    #[serde(default = "default_storage_file")]
    pub file_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from(".crm"), file_name: default_storage_file() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_contacts_ttl")]
    pub contacts_ttl_secs: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { contacts_ttl_secs: default_contacts_ttl(), max_entries: default_max_entries() }
    }
}

fn default_bearer_header() -> String { "Authorization".into() }
fn default_storage_file() -> String { "storage.json".into() }
fn default_contacts_ttl() -> u64 { 300 }
fn default_max_entries() -> u64 { 16 }

/// Load from `CONFIG_PATH` (default `crm.toml`), then overlay the process
/// environment. A missing file is not an error; defaults apply.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "crm.toml".to_string());
    let mut cfg = load_optional(Path::new(&path))?;
    cfg.apply_env_with(|key| std::env::var(key).ok())?;
    Ok(cfg)
}

pub fn load_optional(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    load_from_file(path)
}

pub fn load_from_file(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("cannot read {}: {e}", path.display()))?;
    from_toml_str(&content)
}

pub fn from_toml_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Same as [`AppConfig::load_and_validate`] with an explicit file path.
    pub fn load_from_path_and_validate(path: &Path) -> Result<Self> {
        let mut cfg = load_optional(path)?;
        cfg.apply_env_with(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay values from an environment lookup. Variable names mirror the
    /// browser build's `PUBLIC_API_URL` / `PUBLIC_BEARER` pair.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("API_URL") {
            self.api.base_url = url;
        }
        if let Some(header) = lookup("API_BEARER_HEADER") {
            self.api.bearer_header = header;
        }
        if let Some(dir) = lookup("CRM_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("CRM_REQUEST_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| anyhow!("CRM_REQUEST_TIMEOUT_SECS must be a whole number of seconds"))?;
            self.api.request_timeout_secs = Some(secs);
        }
        if let Some(raw) = lookup("CRM_CONTACTS_TTL_SECS") {
            self.cache.contacts_ttl_secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| anyhow!("CRM_CONTACTS_TTL_SECS must be a whole number of seconds"))?;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.api.normalize()?;
        self.storage.validate()?;
        Ok(())
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.file_name)
    }
}

impl ApiConfig {
    fn normalize(&mut self) -> Result<()> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(anyhow!("api.base_url is empty; set it in the config file or API_URL"));
        }
        let lower = trimmed.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("api.base_url must start with http:// or https://"));
        }
        self.base_url = trimmed.to_string();

        let header = self.bearer_header.trim();
        if header.is_empty() || !header.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_') {
            return Err(anyhow!("api.bearer_header must be a non-empty HTTP header name"));
        }
        self.bearer_header = header.to_string();

        if self.request_timeout_secs == Some(0) {
            self.request_timeout_secs = None;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        if self.file_name.trim().is_empty() || self.file_name.contains('/') {
            return Err(anyhow!("storage.file_name must be a plain file name"));
        }
        Ok(())
    }
}

impl CacheConfig {
    pub fn contacts_ttl(&self) -> Duration {
        Duration::from_secs(self.contacts_ttl_secs)
    }
}
