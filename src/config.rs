use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
}

/// Storage locations and logging
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Directory holding one private folder per caller.
    pub storage_root: PathBuf,
    /// SQLite file for the job queue and event log.
    pub db_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default = "default_http_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default)]
    pub authless: bool,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            api_key_env: default_http_api_key_env(),
            allowed_origins: Vec::new(),
            authless: false,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Which job executor backend receives dispatched jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorBackend {
    /// Local SQLite job queue consumed by external workers
    #[default]
    Queue,
    /// Remote task broker reached over HTTP
    Remote,
}

/// Job executor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default)]
    pub backend: ExecutorBackend,
    #[serde(default)]
    pub remote_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            backend: ExecutorBackend::default(),
            remote_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_http_api_key_env() -> String {
    "NETGATE_API_KEY".to_string()
}

fn default_max_upload_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in NETGATE_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("NETGATE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        Self::from_toml(&config_str)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("Failed to parse config.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.storage_root().is_file() {
            anyhow::bail!(
                "storage_root must be a directory, not a file: {}",
                self.storage_root().display()
            );
        }

        if self.http_server.port == 0 {
            anyhow::bail!("http_server.port must be greater than 0");
        }

        if self.http_server.max_upload_bytes == 0 {
            anyhow::bail!("http_server.max_upload_bytes must be greater than 0");
        }

        if self.executor.timeout_secs == 0 {
            anyhow::bail!("executor.timeout_secs must be greater than 0");
        }

        if self.executor.backend == ExecutorBackend::Remote {
            let raw = self
                .executor
                .remote_url
                .as_deref()
                .context("executor.remote_url is required when executor.backend = \"remote\"")?;
            url::Url::parse(raw)
                .with_context(|| format!("executor.remote_url is not a valid URL: {}", raw))?;
        }

        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.gateway.db_path
    }

    /// Root directory under which caller folders are created
    pub fn storage_root(&self) -> &Path {
        &self.gateway.storage_root
    }

    /// host:port the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http_server.host, self.http_server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize tests that mutate NETGATE_CONFIG so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    const MINIMAL: &str = r#"
[gateway]
storage_root = "./uploads"
db_path = "./netgate.db"
"#;

    #[test]
    fn test_minimal_config_defaults() {
        let config = Config::from_toml(MINIMAL).unwrap();
        assert_eq!(config.gateway.log_level, "info");
        assert_eq!(config.http_server.port, 8080);
        assert_eq!(config.http_server.api_key_env, "NETGATE_API_KEY");
        assert!(!config.http_server.authless);
        assert_eq!(config.executor.backend, ExecutorBackend::Queue);
        assert_eq!(config.executor.timeout_secs, 30);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_remote_backend_requires_url() {
        let text = format!("{}\n[executor]\nbackend = \"remote\"\n", MINIMAL);
        let err = Config::from_toml(&text).unwrap_err();
        assert!(err.to_string().contains("remote_url"));
    }

    #[test]
    fn test_remote_backend_rejects_bad_url() {
        let text = format!(
            "{}\n[executor]\nbackend = \"remote\"\nremote_url = \"not a url\"\n",
            MINIMAL
        );
        assert!(Config::from_toml(&text).is_err());
    }

    #[test]
    fn test_remote_backend_with_url() {
        let text = format!(
            "{}\n[executor]\nbackend = \"remote\"\nremote_url = \"http://broker.local:5555/api\"\n",
            MINIMAL
        );
        let config = Config::from_toml(&text).unwrap();
        assert_eq!(config.executor.backend, ExecutorBackend::Remote);
    }

    #[test]
    fn test_zero_port_rejected() {
        let text = format!("{}\n[http_server]\nport = 0\n", MINIMAL);
        let err = Config::from_toml(&text).unwrap_err();
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn test_storage_root_must_not_be_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("not-a-dir");
        fs::write(&file, "x").unwrap();
        let text = format!(
            "[gateway]\nstorage_root = {:?}\ndb_path = \"./netgate.db\"\n",
            file.to_string_lossy()
        );
        assert!(Config::from_toml(&text).is_err());
    }

    #[test]
    fn test_config_load_from_env_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("netgate.toml");
        fs::write(&config_path, MINIMAL).unwrap();

        let original = std::env::var("NETGATE_CONFIG").ok();
        std::env::set_var("NETGATE_CONFIG", &config_path);
        let config = Config::load();
        std::env::remove_var("NETGATE_CONFIG");
        if let Some(v) = original {
            std::env::set_var("NETGATE_CONFIG", v);
        }

        let config = config.unwrap();
        assert_eq!(config.db_path(), Path::new("./netgate.db"));
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let original = std::env::var("NETGATE_CONFIG").ok();
        std::env::set_var("NETGATE_CONFIG", "nonexistent.toml");
        let config = Config::load();
        assert!(config.is_err());
        std::env::remove_var("NETGATE_CONFIG");
        if let Some(v) = original {
            std::env::set_var("NETGATE_CONFIG", v);
        }
    }
}
