use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_paylens_home;

/// Environment variable that overrides `[backend].base_url`.
pub const API_URL_ENV: &str = "PAYLENS_API_URL";

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/analyze-statement";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub relay: RelaySection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendSection {
    /// Base URL of the statement parser service; the relay appends `/analyze-statement`
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySection {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: paylens_client::client::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_upload_bytes: paylens_client::relay::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_paylens_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    println!("Set [backend].base_url (or {API_URL_ENV}) before running `paylens relay`.");
    Ok(())
}

/// Backend base URL: environment first, then the config file. Neither set is
/// an error; there is no built-in default.
pub fn resolve_backend_url(env: Option<String>, cfg: &Config) -> Result<String> {
    let from_env = env.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let from_file = cfg
        .backend
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    match from_env.or(from_file) {
        Some(url) => Ok(url),
        None => bail!(
            "backend URL is not configured: set {API_URL_ENV} or [backend].base_url in ~/.paylens/config.toml"
        ),
    }
}
