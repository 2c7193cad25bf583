use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: None }
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 5000 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    /// Schema qualifier for `SERVICECOVERAGES`; applied as the PostgreSQL search path.
    #[serde(default)]
    pub schema: Option<String>,
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
    /// Run a non-destructive `CREATE TABLE IF NOT EXISTS` at startup.
    #[serde(default)]
    pub create_table_on_startup: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            schema: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            create_table_on_startup: false,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// The single shared secret accepted in the `API_TOKEN` header.
    #[serde(default)]
    pub api_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self { Self { format: default_log_format() } }
}

fn default_log_format() -> String { "compact".into() }

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`) when present, overlay the process
    /// environment and validate. A missing file falls back to defaults.
    pub fn load_and_validate() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            AppConfig::default()
        };
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay values from an environment lookup; the lookup is injected so tests
    /// do not have to mutate the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").or_else(|| lookup("DB2_URI")) {
            self.database.url = url;
        }
        if let Some(schema) = lookup("TABLE_SCHEMA") {
            self.database.schema = Some(schema);
        }
        if let Some(token) = lookup("API_TOKEN") {
            self.auth.api_token = token;
        }
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT")
            .or_else(|| lookup("SERVER_PORT"))
            .and_then(|p| p.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.log.format = format;
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 server
        self.server.normalize()?;
        self.database.normalize();
        self.database.validate()?;
        self.auth.validate()?;
        self.log.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }
}

impl DatabaseConfig {
    fn normalize(&mut self) {
        self.url = self.url.trim().to_string();
        // 空字符串视为未配置 schema
        if self.schema.as_deref().map(str::trim).is_some_and(str::is_empty) {
            self.schema = None;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://")
            || lower.starts_with("postgres://")
            || lower.starts_with("sqlite:"))
        {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
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

impl AuthConfig {
    pub fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(anyhow!("auth.api_token is empty; set it in config.toml or API_TOKEN"));
        }
        Ok(())
    }
}

impl LogConfig {
    fn validate(&self) -> Result<()> {
        match self.format.to_ascii_lowercase().as_str() {
            "compact" | "json" => Ok(()),
            other => Err(anyhow!("log.format must be `compact` or `json`, got `{other}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parses_full_file() {
        let cfg = parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            worker_threads = 2

            [database]
            url = "postgres://u:p@localhost/cov"
            schema = "COVERAGE"
            create_table_on_startup = true

            [auth]
            api_token = "s3cret"

            [log]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.worker_threads, Some(2));
        assert_eq!(cfg.database.schema.as_deref(), Some("COVERAGE"));
        assert!(cfg.database.create_table_on_startup);
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.auth.api_token, "s3cret");
        assert_eq!(cfg.log.format, "json");
    }

    #[test]
    fn defaults_listen_on_port_5000() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.log.format, "compact");
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = parse("[server]\nport = 8080\n").unwrap();
        cfg.apply_env_overrides(env(&[
            ("DB2_URI", "sqlite::memory:"),
            ("API_TOKEN", "tok"),
            ("PORT", "9000"),
            ("TABLE_SCHEMA", "SALES"),
        ]));
        assert_eq!(cfg.database.url, "sqlite::memory:");
        assert_eq!(cfg.auth.api_token, "tok");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.database.schema.as_deref(), Some("SALES"));
        cfg.normalize_and_validate().unwrap();
    }

    #[test]
    fn database_url_takes_precedence_over_db2_uri() {
        let mut cfg = AppConfig::default();
        cfg.apply_env_overrides(env(&[
            ("DATABASE_URL", "postgres://a/b"),
            ("DB2_URI", "sqlite::memory:"),
        ]));
        assert_eq!(cfg.database.url, "postgres://a/b");
    }

    #[test]
    fn rejects_missing_token() {
        let mut cfg = AppConfig::default();
        cfg.apply_env_overrides(env(&[("DATABASE_URL", "sqlite::memory:")]));
        let err = cfg.normalize_and_validate().unwrap_err();
        assert!(err.to_string().contains("api_token"));
    }

    #[test]
    fn rejects_unsupported_database_url() {
        let mut cfg = AppConfig::default();
        cfg.apply_env_overrides(env(&[("DATABASE_URL", "mysql://x"), ("API_TOKEN", "t")]));
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn blank_schema_is_dropped() {
        let mut cfg = AppConfig::default();
        cfg.apply_env_overrides(env(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("API_TOKEN", "t"),
            ("TABLE_SCHEMA", "  "),
        ]));
        cfg.normalize_and_validate().unwrap();
        assert!(cfg.database.schema.is_none());
    }

    #[test]
    fn rejects_unknown_log_format() {
        let mut cfg = AppConfig::default();
        cfg.apply_env_overrides(env(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("API_TOKEN", "t"),
            ("LOG_FORMAT", "xml"),
        ]));
        assert!(cfg.normalize_and_validate().is_err());
    }
}
