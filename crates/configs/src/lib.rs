use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub image_store: ImageStoreConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
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
        Self { host: "127.0.0.1".into(), port: 4000, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

/// Credentials and placement for the hosted image service.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageStoreConfig {
    #[serde(default)]
    pub cloud_name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default = "default_folder")]
    pub folder: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for ImageStoreConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: default_folder(),
            api_base: default_api_base(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    #[serde(default = "default_uploads_dir")]
    pub dir: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self { dir: default_uploads_dir(), max_bytes: default_max_upload_bytes() }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_folder() -> String { "food-items".into() }
fn default_api_base() -> String { "https://api.cloudinary.com".into() }
fn default_uploads_dir() -> String { "uploads".into() }
fn default_max_upload_bytes() -> usize { 10 * 1024 * 1024 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl DatabaseConfig {
    /// Pool defaults without a URL; the URL comes from `DATABASE_URL` during normalization.
    pub fn with_defaults() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

impl AppConfig {
    /// Load from `CONFIG_PATH` (default `config.toml`), see `load_and_validate_from`.
    pub fn load_and_validate() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_and_validate_from(&path)
    }

    /// Load from the TOML file if it exists, otherwise from the environment only.
    /// An unreadable or malformed file is an error.
    pub fn load_and_validate_from(path: &str) -> Result<Self> {
        let mut cfg = match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => Self::from_env(),
            Err(e) => return Err(e.context(format!("failed to load config file {path}"))),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Build a config from defaults; every section is filled from env vars in `normalize_and_validate`.
    pub fn from_env() -> Self {
        let mut cfg = Self { database: DatabaseConfig::with_defaults(), ..Self::default() };
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            cfg.server.worker_threads = Some(w);
        }
        if std::env::var("LOG_FORMAT").map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(false) {
            cfg.logging.format = LogFormat::Json;
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.image_store.normalize_from_env();
        self.image_store.validate()?;
        self.auth.normalize_from_env();
        self.auth.validate()?;
        self.uploads.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl ImageStoreConfig {
    pub fn normalize_from_env(&mut self) {
        fill_from_env(&mut self.cloud_name, "CLOUD_NAME");
        fill_from_env(&mut self.api_key, "API_KEY");
        fill_from_env(&mut self.api_secret, "API_SECRET");
        if self.folder.trim().is_empty() {
            self.folder = default_folder();
        }
        self.api_base = self.api_base.trim_end_matches('/').to_string();
        if self.api_base.is_empty() {
            self.api_base = default_api_base();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cloud_name.trim().is_empty()
            || self.api_key.trim().is_empty()
            || self.api_secret.trim().is_empty()
        {
            return Err(anyhow!("image_store credentials missing; set cloud_name/api_key/api_secret or CLOUD_NAME/API_KEY/API_SECRET"));
        }
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(anyhow!("image_store.api_base must start with http(s)"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        fill_from_env(&mut self.jwt_secret, "JWT_SECRET");
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!("auth.jwt_secret is empty; set it in config.toml or JWT_SECRET"));
        }
        Ok(())
    }
}

impl UploadsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dir.trim().is_empty() {
            return Err(anyhow!("uploads.dir must not be empty"));
        }
        if self.max_bytes == 0 {
            return Err(anyhow!("uploads.max_bytes must be positive"));
        }
        Ok(())
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

fn fill_from_env(slot: &mut String, var: &str) {
    if slot.trim().is_empty() {
        if let Ok(v) = std::env::var(var) {
            *slot = v;
        }
    }
}
