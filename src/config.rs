use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapter::DEFAULT_TIMEOUT_MS;

const FALLBACK_ENDPOINT: &str = "http://localhost:5000/api/otimizar";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Absolute URL, or a path served by `local_base_url`.
    #[serde(default = "default_service_url")]
    pub url: String,
    #[serde(default = "default_local_base_url")]
    pub local_base_url: String,
    /// Per-call deadline; values above 8000 are capped by the adapter.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub service_url: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/care-allocation/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(url) = overrides.service_url {
            self.service.url = url;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.service.timeout_ms = timeout_ms;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn default_template() -> String {
        let template = r#"[service]
url = "/api/otimizar"
local_base_url = "http://localhost:5000"
timeout_ms = 8000
user_agent = "care-allocation/0.1"

[server]
host = "127.0.0.1"
port = 3002
"#;
        template.to_string()
    }
}

impl ServiceConfig {
    /// A path is served by the local optimizer; anything else is used as is.
    pub fn resolved_endpoint(&self) -> String {
        let url = self.url.trim();
        if url.is_empty() {
            return FALLBACK_ENDPOINT.to_string();
        }
        if url.starts_with('/') {
            return format!("{}{url}", self.local_base_url.trim_end_matches('/'));
        }
        url.to_string()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: default_service_url(),
            local_base_url: default_local_base_url(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_service_url() -> String {
    "/api/otimizar".to_string()
}

fn default_local_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_user_agent() -> String {
    format!("care-allocation/{}", env!("CARGO_PKG_VERSION"))
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3002
}
