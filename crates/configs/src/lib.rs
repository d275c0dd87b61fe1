use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: None, body_limit_mb: default_body_limit_mb() }
    }
}

/// Where snapshots are written.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotBackendKind {
    Memory,
    #[default]
    File,
    Http,
}

impl FromStr for SnapshotBackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "http" => Ok(Self::Http),
            other => Err(anyhow!("unknown snapshot backend '{}' (memory|file|http)", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default)]
    pub backend: SnapshotBackendKind,
    #[serde(default = "default_snapshot_path")]
    pub path: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_true")]
    pub write_through: bool,
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            backend: SnapshotBackendKind::default(),
            path: default_snapshot_path(),
            url: None,
            token: None,
            request_timeout_secs: default_request_timeout(),
            interval_secs: default_interval(),
            write_through: true,
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    pub dir: String,
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
}

impl Default for UploadsConfig {
    fn default() -> Self { Self { dir: "uploads".into(), public_prefix: default_public_prefix() } }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self { Self { jwt_secret: DEV_JWT_SECRET.into(), token_ttl_hours: default_token_ttl() } }
}

impl AuthConfig {
    /// True while tokens are signed with the built-in development secret.
    pub fn uses_dev_secret(&self) -> bool { self.jwt_secret == DEV_JWT_SECRET }
}

pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

fn default_body_limit_mb() -> usize { 10 }
fn default_snapshot_path() -> String { "data/snapshot.json".into() }
fn default_request_timeout() -> u64 { 15 }
fn default_interval() -> u64 { 30 }
fn default_true() -> bool { true }
fn default_shutdown_timeout() -> u64 { 10 }
fn default_public_prefix() -> String { "/uploads".into() }
fn default_token_ttl() -> i64 { 12 }

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// File (if present) -> environment overrides -> validation.
    /// A missing config file means defaults; a malformed one is an error.
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = if Path::new(&path).exists() {
            load_from_file(&path).with_context(|| format!("failed to parse {}", path))?
        } else {
            AppConfig::default()
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Apply overrides from a variable lookup (the process env in production).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SERVER_HOST") { self.server.host = v; }
        if let Some(v) = lookup("SERVER_PORT") {
            self.server.port = v.parse().map_err(|_| anyhow!("SERVER_PORT must be a port number, got '{}'", v))?;
        }
        if let Some(v) = lookup("TOKIO_WORKER_THREADS") { self.server.worker_threads = v.parse().ok(); }
        if let Some(v) = lookup("SNAPSHOT_BACKEND") { self.snapshot.backend = v.parse()?; }
        if let Some(v) = lookup("SNAPSHOT_PATH") { self.snapshot.path = v; }
        if let Some(v) = lookup("SNAPSHOT_URL") { self.snapshot.url = Some(v); }
        if let Some(v) = lookup("SNAPSHOT_TOKEN") { self.snapshot.token = Some(v); }
        if let Some(v) = lookup("SNAPSHOT_INTERVAL_SECS") {
            self.snapshot.interval_secs = v.parse().map_err(|_| anyhow!("SNAPSHOT_INTERVAL_SECS must be an integer, got '{}'", v))?;
        }
        if let Some(v) = lookup("SNAPSHOT_WRITE_THROUGH") {
            self.snapshot.write_through = matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(v) = lookup("UPLOADS_DIR") { self.uploads.dir = v; }
        if let Some(v) = lookup("JWT_SECRET") { self.auth.jwt_secret = v; }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.snapshot.validate()?;
        self.uploads.normalize()?;
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(anyhow!("auth.jwt_secret must not be empty"));
        }
        if self.auth.token_ttl_hours <= 0 {
            return Err(anyhow!("auth.token_ttl_hours must be positive"));
        }
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
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        if self.body_limit_mb == 0 {
            return Err(anyhow!("server.body_limit_mb must be >= 1"));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    pub fn body_limit_bytes(&self) -> usize { self.body_limit_mb * 1024 * 1024 }
}

impl SnapshotConfig {
    pub fn validate(&self) -> Result<()> {
        match self.backend {
            SnapshotBackendKind::Http => {
                let url = self.url.as_deref().unwrap_or("").trim();
                if url.is_empty() {
                    return Err(anyhow!("snapshot.url is required for the http backend (config.toml or SNAPSHOT_URL)"));
                }
                let lower = url.to_ascii_lowercase();
                if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                    return Err(anyhow!("snapshot.url must start with http:// or https://"));
                }
            }
            SnapshotBackendKind::File => {
                if self.path.trim().is_empty() {
                    return Err(anyhow!("snapshot.path is required for the file backend"));
                }
            }
            SnapshotBackendKind::Memory => {}
        }
        if self.interval_secs == 0 {
            return Err(anyhow!("snapshot.interval_secs must be >= 1"));
        }
        if self.request_timeout_secs == 0 || self.shutdown_timeout_secs == 0 {
            return Err(anyhow!("snapshot timeouts must be positive seconds"));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration { Duration::from_secs(self.interval_secs) }

    pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }

    pub fn shutdown_timeout(&self) -> Duration { Duration::from_secs(self.shutdown_timeout_secs) }
}

impl UploadsConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.dir.trim().is_empty() {
            return Err(anyhow!("uploads.dir must not be empty"));
        }
        let prefix = self.public_prefix.trim().trim_end_matches('/');
        self.public_prefix = if prefix.starts_with('/') { prefix.to_string() } else { format!("/{}", prefix) };
        if self.public_prefix == "/" {
            return Err(anyhow!("uploads.public_prefix must not be the site root"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let mut cfg = AppConfig::default();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.snapshot.backend, SnapshotBackendKind::File);
        assert!(cfg.snapshot.write_through);
        assert_eq!(cfg.snapshot.interval(), Duration::from_secs(30));
        assert_eq!(cfg.server.body_limit_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn toml_sections_parse() {
        let raw = r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [snapshot]
            backend = "http"
            url = "https://blobs.example.com/portal/snapshot.json"
            interval_secs = 10
            write_through = false

            [uploads]
            dir = "/var/lib/portal/uploads"
            public_prefix = "files/"
        "#;
        let mut cfg: AppConfig = toml::from_str(raw).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.snapshot.backend, SnapshotBackendKind::Http);
        assert!(!cfg.snapshot.write_through);
        assert_eq!(cfg.uploads.public_prefix, "/files");
        assert_eq!(cfg.auth.jwt_secret, DEV_JWT_SECRET);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[
            ("SERVER_PORT", "7070"),
            ("SNAPSHOT_BACKEND", "memory"),
            ("SNAPSHOT_WRITE_THROUGH", "off"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 7070);
        assert_eq!(cfg.snapshot.backend, SnapshotBackendKind::Memory);
        assert!(!cfg.snapshot.write_through);
        assert_eq!(cfg.auth.jwt_secret, "s3cret");
        assert!(!cfg.auth.uses_dev_secret());
    }

    #[test]
    fn default_secret_is_flagged() {
        let cfg = AppConfig::default();
        assert!(cfg.auth.uses_dev_secret());
    }

    #[test]
    fn http_backend_without_url_fails_loudly() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[("SNAPSHOT_BACKEND", "http")])).unwrap();
        let err = cfg.normalize_and_validate().unwrap_err();
        assert!(err.to_string().contains("snapshot.url"));
    }

    #[test]
    fn bad_values_rejected() {
        let mut cfg = AppConfig::default();
        assert!(cfg.apply_env(env(&[("SERVER_PORT", "http")])).is_err());
        assert!(cfg.apply_env(env(&[("SNAPSHOT_BACKEND", "mongo")])).is_err());
        cfg.snapshot.interval_secs = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }
}
