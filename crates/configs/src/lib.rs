use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: String,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: default_env(),
            log_level: None,
            run_migrations: true,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_write_timeout")]
    pub write_timeout_ms: u64,
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            read_timeout_ms: default_read_timeout(),
            write_timeout_ms: default_write_timeout(),
            idle_timeout_ms: default_idle_timeout_ms(),
            worker_threads: None,
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration { Duration::from_millis(self.read_timeout_ms) }
    pub fn write_timeout(&self) -> Duration { Duration::from_millis(self.write_timeout_ms) }
    pub fn idle_timeout(&self) -> Duration { Duration::from_millis(self.idle_timeout_ms) }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
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
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_db_idle_timeout(),
            sqlx_logging: false,
        }
    }
}

fn default_env() -> String { "dev".into() }
fn default_true() -> bool { true }
fn default_read_timeout() -> u64 { 5_000 }
fn default_write_timeout() -> u64 { 10_000 }
fn default_idle_timeout_ms() -> u64 { 60_000 }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 30 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_db_idle_timeout() -> u64 { 600 }

/// Load the optional TOML file pointed to by `CONFIG_PATH` (default `config.toml`).
/// A missing file yields the built-in defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        return Ok(AppConfig::default());
    }
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// `.env` -> TOML file -> process environment, then validation.
    pub fn load_and_validate() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut cfg = load_default()?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Override fields from environment variables resolved through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("ENV") {
            self.env = v.trim().to_string();
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.log_level = Some(v);
        }
        if let Some(v) = get("RUN_MIGRATIONS") {
            self.run_migrations = !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off");
        }
        if let Some(v) = get("HTTP_HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("HTTP_PORT") {
            self.server.port = v
                .trim()
                .parse::<u16>()
                .map_err(|_| anyhow!("invalid HTTP_PORT: {v}"))?;
        }
        // 超时配置解析失败时保留默认值
        if let Some(d) = get("HTTP_READ_TIMEOUT").and_then(|v| parse_duration(&v)) {
            self.server.read_timeout_ms = millis(d);
        }
        if let Some(d) = get("HTTP_WRITE_TIMEOUT").and_then(|v| parse_duration(&v)) {
            self.server.write_timeout_ms = millis(d);
        }
        if let Some(d) = get("HTTP_IDLE_TIMEOUT").and_then(|v| parse_duration(&v)) {
            self.server.idle_timeout_ms = millis(d);
        }
        if let Some(w) = get("TOKIO_WORKER_THREADS").and_then(|v| v.trim().parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(v) = get("DB_URL").or_else(|| get("DATABASE_URL")) {
            self.database.url = v;
        }
        if let Some(n) = get("DB_MAX_CONNECTIONS").and_then(|v| v.trim().parse::<u32>().ok()) {
            self.database.max_connections = n;
        }
        if let Some(n) = get("DB_MIN_CONNECTIONS").and_then(|v| v.trim().parse::<u32>().ok()) {
            self.database.min_connections = n;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        if self.env.trim().is_empty() {
            self.env = default_env();
        }
        self.server.normalize()?;
        self.database.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "0.0.0.0".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port 必须在 1..=65535 范围内 (HTTP_PORT is required)"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        if self.read_timeout_ms == 0 || self.write_timeout_ms == 0 || self.idle_timeout_ms == 0 {
            return Err(anyhow!("server 超时配置必须为正数 (timeouts must be positive)"));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("DB_URL is required; 请在 config.toml 或环境变量 DB_URL/DATABASE_URL 中提供"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url 必须以 postgresql:// 或 postgres:// 开头"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections 必须 >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections 必须 >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database 超时配置必须为正整数秒"));
        }
        Ok(())
    }
}

/// Parse `250ms`, `5s`, `1m`, `2h` or a bare number of seconds.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let s = raw.trim();
    let (digits, unit_ms) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1_000)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60_000)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3_600_000)
    } else {
        (s, 1_000)
    };
    let value = digits.trim().parse::<u64>().ok()?;
    value.checked_mul(unit_ms).map(Duration::from_millis)
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.env, "dev");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.read_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.server.write_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.server.idle_timeout(), Duration::from_secs(60));
        assert!(cfg.log_level.is_none());
        assert!(cfg.run_migrations);
    }

    #[test]
    fn run_migrations_can_be_disabled() -> Result<()> {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[("RUN_MIGRATIONS", "false")]))?;
        assert!(!cfg.run_migrations);
        Ok(())
    }

    #[test]
    fn env_overrides_are_applied() -> Result<()> {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[
            ("ENV", "prod"),
            ("HTTP_PORT", "9090"),
            ("HTTP_READ_TIMEOUT", "250ms"),
            ("HTTP_WRITE_TIMEOUT", "2m"),
            ("DB_URL", "postgres://u:p@localhost:5432/subs"),
            ("LOG_LEVEL", "warn"),
        ]))?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.env, "prod");
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.read_timeout(), Duration::from_millis(250));
        assert_eq!(cfg.server.write_timeout(), Duration::from_secs(120));
        assert_eq!(cfg.log_level.as_deref(), Some("warn"));
        assert_eq!(cfg.database.url, "postgres://u:p@localhost:5432/subs");
        Ok(())
    }

    #[test]
    fn database_url_falls_back_to_database_url_var() -> Result<()> {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[("DATABASE_URL", "postgresql://localhost/subs")]))?;
        assert_eq!(cfg.database.url, "postgresql://localhost/subs");
        Ok(())
    }

    #[test]
    fn missing_database_url_is_rejected() {
        let mut cfg = AppConfig::default();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        let mut cfg = AppConfig::default();
        assert!(cfg.apply_env(env_of(&[("HTTP_PORT", "eighty")])).is_err());
    }

    #[test]
    fn zero_port_is_rejected() -> Result<()> {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[("HTTP_PORT", "0"), ("DB_URL", "postgres://localhost/subs")]))?;
        assert!(cfg.normalize_and_validate().is_err());
        Ok(())
    }

    #[test]
    fn unparseable_timeout_keeps_default() -> Result<()> {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[("HTTP_IDLE_TIMEOUT", "soon")]))?;
        assert_eq!(cfg.server.idle_timeout(), Duration::from_secs(60));
        Ok(())
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("100ms"), Some(Duration::from_millis(100)));
        assert_eq!(parse_duration("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_duration("abc"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn toml_sections_deserialize() -> Result<()> {
        let cfg: AppConfig = toml::from_str(
            r#"
            env = "staging"
            [server]
            host = "127.0.0.1"
            port = 8081
            [database]
            url = "postgres://localhost/subs"
            max_connections = 5
            "#,
        )?;
        assert_eq!(cfg.env, "staging");
        assert_eq!(cfg.server.bind_addr(), "127.0.0.1:8081");
        assert_eq!(cfg.server.write_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.database.max_connections, 5);
        assert_eq!(cfg.database.min_connections, 1);
        Ok(())
    }
}
