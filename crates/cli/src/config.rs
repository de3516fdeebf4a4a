use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tally_parser::ParserConfig;
use tally_protocol::Dictionary;
use tally_report::ReportSettings;

/// Inline dictionary JSON
pub const DICTIONARY_ENV: &str = "TALLY_DICTIONARY";
/// Path to a dictionary JSON file
pub const DICTIONARY_FILE_ENV: &str = "TALLY_DICTIONARY_FILE";
/// Port to listen on (all interfaces) when `--bind` is not given
pub const PORT_ENV: &str = "PORT";

pub const DEFAULT_BIND: &str = "127.0.0.1:4000";
pub const DEFAULT_EARLY_FIELD: &str = "early";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Process configuration read from the optional `--config` TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub parser: ParserConfig,
    pub report: ReportSettings,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Multipart field name marking uploads for the early filter
    pub early_field: String,

    /// Request body limit for uploads
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            early_field: DEFAULT_EARLY_FIELD.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("invalid config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Config file when given, defaults otherwise
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.parser.validate()?;
        self.report.validate()?;
        if self.server.early_field.trim().is_empty() {
            bail!("server.early_field must not be empty");
        }
        if self.server.max_upload_bytes == 0 {
            bail!("server.max_upload_bytes must be positive");
        }
        Ok(())
    }
}

/// Load the dictionary: explicit path, then `TALLY_DICTIONARY_FILE`, then
/// inline JSON in `TALLY_DICTIONARY`.
pub fn resolve_dictionary(path: Option<&Path>) -> Result<Dictionary> {
    if let Some(path) = path {
        return Dictionary::load(path);
    }
    if let Some(path) = env_non_empty(DICTIONARY_FILE_ENV) {
        return Dictionary::load(&PathBuf::from(path));
    }
    if let Some(raw) = env_non_empty(DICTIONARY_ENV) {
        return Dictionary::from_json_str(&raw)
            .with_context(|| format!("invalid dictionary in ${DICTIONARY_ENV}"));
    }
    bail!(
        "no dictionary configured: pass --dictionary <file>, or set ${DICTIONARY_FILE_ENV} or ${DICTIONARY_ENV}"
    )
}

/// Listen address: `--bind`, then `0.0.0.0:$PORT`, then the loopback default
pub fn resolve_bind(flag: Option<&str>) -> String {
    bind_from(flag, env_non_empty(PORT_ENV).as_deref())
}

fn bind_from(flag: Option<&str>, port: Option<&str>) -> String {
    match (flag, port) {
        (Some(bind), _) => bind.to_string(),
        (None, Some(port)) => format!("0.0.0.0:{port}"),
        (None, None) => DEFAULT_BIND.to_string(),
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
