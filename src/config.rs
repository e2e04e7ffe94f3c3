//! Server configuration.
//!
//! Values come from an optional YAML file and are then overridden by the
//! `LISTEN` and `LOOPS` environment variables.

use std::path::Path;

use anyhow::{Context, bail};
use serde::Deserialize;
use url::Url;

/// Env var naming the YAML config file.
pub const CONFIG_ENV: &str = "SPINDLE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "spindle.yaml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// `tcp://host:port` or plain `host:port`
    pub listen: String,
    /// Number of event loops
    pub loops: usize,
    /// Size of the per-read scratch buffer in bytes
    pub read_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
            loops: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            read_buffer_size: 4096,
        }
    }
}

impl Config {
    /// Loads the config file (if any) and applies environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Self::default(),
        };

        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(text).context("failed to parse YAML config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Applies `LISTEN` and `LOOPS` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(listen) = lookup("LISTEN") {
            self.server.listen = listen;
        }
        if let Some(loops) = lookup("LOOPS") {
            self.server.loops = loops
                .trim()
                .parse()
                .with_context(|| format!("LOOPS must be a positive integer, got {loops:?}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.loops == 0 {
            bail!("server.loops must be at least 1");
        }
        if self.server.read_buffer_size == 0 {
            bail!("server.read_buffer_size must be at least 1");
        }
        self.server.listen_addr()?;
        Ok(())
    }
}

impl ServerConfig {
    /// Normalises `listen` into a `host:port` string suitable for binding.
    pub fn listen_addr(&self) -> anyhow::Result<String> {
        let raw = if self.listen.contains("://") {
            self.listen.clone()
        } else {
            format!("tcp://{}", self.listen)
        };

        let url = Url::parse(&raw)
            .with_context(|| format!("invalid listen address {:?}", self.listen))?;
        if url.scheme() != "tcp" {
            bail!("unsupported listen scheme {:?}", url.scheme());
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .with_context(|| format!("listen address {:?} has no host", self.listen))?;
        let port = url
            .port()
            .with_context(|| format!("listen address {:?} has no port", self.listen))?;

        Ok(format!("{host}:{port}"))
    }
}
