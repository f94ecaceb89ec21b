use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub collaborators: CollaboratorsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 3002, worker_threads: Some(4) }
    }
}

/// Endpoints of the collaborator services this service talks to.
/// The competence authority confirms foreign ids; the learner service
/// reports submission usage and popularity rankings.
#[derive(Debug, Clone, Deserialize)]
pub struct CollaboratorsConfig {
    pub competence_url: String,
    pub learner_url: String,
    #[serde(default = "default_verify_timeout")]
    pub verify_timeout_secs: u64,
}

impl Default for CollaboratorsConfig {
    fn default() -> Self {
        Self {
            competence_url: "http://localhost:3001".into(),
            learner_url: "http://localhost:3003".into(),
            verify_timeout_secs: default_verify_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_briefs_file")]
    pub briefs_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir(), briefs_file: default_briefs_file() }
    }
}

fn default_verify_timeout() -> u64 { 5 }
fn default_data_dir() -> String { "data".into() }
fn default_briefs_file() -> String { "data/briefs.json".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load from `CONFIG_PATH`/`config.toml`, fall back to defaults when the
    /// file is absent, then apply env overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env()?;
        self.collaborators.normalize_from_env();
        self.collaborators.validate()?;
        self.storage.normalize_from_env();
        Ok(())
    }
}

impl ServerConfig {
    fn normalize_from_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            self.port = port
                .parse()
                .map_err(|_| anyhow!("SERVER_PORT must be a valid port number"))?;
        }
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 {
                self.worker_threads = Some(4);
            }
        }
        Ok(())
    }
}

impl CollaboratorsConfig {
    fn normalize_from_env(&mut self) {
        if let Ok(url) = std::env::var("COMPETENCE_SERVICE_URL") {
            self.competence_url = url;
        }
        if let Ok(url) = std::env::var("LEARNER_SERVICE_URL") {
            self.learner_url = url;
        }
        if let Ok(secs) = std::env::var("VERIFY_TIMEOUT_SECS") {
            if let Ok(v) = secs.parse::<u64>() {
                self.verify_timeout_secs = v;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("collaborators.competence_url", &self.competence_url),
            ("collaborators.learner_url", &self.learner_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow!("{} must start with http:// or https://", name));
            }
        }
        if self.verify_timeout_secs == 0 || self.verify_timeout_secs > 60 {
            return Err(anyhow!("collaborators.verify_timeout_secs must be in 1..=60"));
        }
        Ok(())
    }
}

impl StorageConfig {
    fn normalize_from_env(&mut self) {
        if let Ok(path) = std::env::var("BRIEFS_DATA_PATH") {
            self.briefs_file = path;
        }
        if self.data_dir.trim().is_empty() {
            self.data_dir = default_data_dir();
        }
    }
}
