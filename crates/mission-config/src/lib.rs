use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON5 parse error: {0}")]
    Json5(#[from] json5::Error),
    #[error("Config directory not found")]
    NoDirFound,
}

const DEFAULT_PASSWORD: &str = "mission-control";

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Basic auth user name.
    #[serde(default = "default_username")]
    pub username: String,
    /// Basic auth password.
    #[serde(default = "default_password")]
    pub password: String,
}

fn default_port() -> u16 {
    3004
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            username: default_username(),
            password: default_password(),
        }
    }
}

/// Where documents live on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Agent runtime home holding `cron/` and `agents/`. Defaults to `~/.openclaw`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openclaw_dir: Option<PathBuf>,
    /// Application data directory (tasks, settings). Also served at `/data`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Static assets served at `/`.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            openclaw_dir: None,
            data_dir: default_data_dir(),
            public_dir: default_public_dir(),
        }
    }
}

/// Top-level mission control configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissionConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

impl MissionConfig {
    /// Resolved agent runtime home.
    pub fn openclaw_dir(&self) -> PathBuf {
        self.paths.openclaw_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/root"))
                .join(".openclaw")
        })
    }

    /// `<openclaw>/cron/jobs.json`
    pub fn cron_jobs_path(&self) -> PathBuf {
        self.openclaw_dir().join("cron").join("jobs.json")
    }

    /// `<openclaw>/agents`
    pub fn sessions_root(&self) -> PathBuf {
        self.openclaw_dir().join("agents")
    }

    /// `<data>/tasks.json`
    pub fn tasks_path(&self) -> PathBuf {
        self.paths.data_dir.join("tasks.json")
    }

    /// `<data>/settings.json`
    pub fn settings_path(&self) -> PathBuf {
        self.paths.data_dir.join("settings.json")
    }

    pub fn uses_default_password(&self) -> bool {
        self.gateway.password == DEFAULT_PASSWORD
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("PORT") {
            match port.trim().parse() {
                Ok(port) => self.gateway.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT value: {port}"),
            }
        }
        if let Some(host) = lookup("HOST") {
            self.gateway.host = host;
        }
        if let Some(user) = lookup("MISSION_CONTROL_USER") {
            self.gateway.username = user;
        }
        if let Some(password) = lookup("MISSION_CONTROL_PASSWORD") {
            self.gateway.password = password;
        }
        if let Some(dir) = lookup("OPENCLAW_HOME") {
            self.paths.openclaw_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup("MISSION_CONTROL_DATA_DIR") {
            self.paths.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("MISSION_CONTROL_PUBLIC_DIR") {
            self.paths.public_dir = PathBuf::from(dir);
        }
    }
}

/// Resolve the config directory (~/.mission-control/).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|h| h.join(".mission-control"))
        .ok_or(ConfigError::NoDirFound)
}

/// Resolve the config file path (~/.mission-control/config.json5).
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.json5"))
}

/// Load configuration from `path_override` or the default path, then apply
/// `.env` and environment overrides.
pub fn load_config(path_override: Option<&Path>) -> Result<MissionConfig, ConfigError> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let mut config = match path_override {
        Some(path) => load_config_from(path)?,
        None => match config_file_path() {
            Ok(path) => load_config_from(&path)?,
            Err(e) => {
                tracing::debug!("{e}, using defaults");
                MissionConfig::default()
            }
        },
    };
    config.apply_env();
    Ok(config)
}

/// Load configuration from a specific path, falling back to defaults if not found.
pub fn load_config_from(path: &Path) -> Result<MissionConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("Config file not found at {}, using defaults", path.display());
        return Ok(MissionConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: MissionConfig = json5::from_str(&content)?;
    Ok(config)
}
