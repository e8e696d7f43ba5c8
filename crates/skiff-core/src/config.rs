//! Configuration system for Skiff.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $SKIFF_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/skiff/config.toml
//!   3. ~/.config/skiff/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::wire::DEFAULT_CHUNK_SIZE;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkiffConfig {
    pub identity: IdentityConfig,
    pub protocol: ProtocolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Application id. Constant per deployment; every msg_id is prefixed
    /// with it.
    pub app_id: String,
    /// Session id handed out by the transport's handshake. Empty until a
    /// handshake has run.
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Split threshold in bytes. Payloads above this are chunked.
    /// Must be positive.
    pub chunk_size: usize,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for SkiffConfig {
    fn default() -> Self {
        Self {
            identity: IdentityConfig::default(),
            protocol: ProtocolConfig::default(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            app_id: "com.skiff".to_string(),
            session_id: String::new(),
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_or_tmp().join(".config"))
        .join("skiff")
}

fn home_or_tmp() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
    #[error("protocol.chunk_size must be positive")]
    InvalidChunkSize,
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl SkiffConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            SkiffConfig::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("SKIFF_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&SkiffConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text)
                .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Reject values the protocol cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize);
        }
        Ok(())
    }

    /// Apply SKIFF_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SKIFF_IDENTITY__APP_ID") {
            self.identity.app_id = v;
        }
        if let Ok(v) = std::env::var("SKIFF_IDENTITY__SESSION_ID") {
            self.identity.session_id = v;
        }
        if let Ok(v) = std::env::var("SKIFF_PROTOCOL__CHUNK_SIZE") {
            if let Ok(n) = v.parse() {
                self.protocol.chunk_size = n;
            }
        }
    }
}
