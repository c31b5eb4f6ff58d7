use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{RedChatError, Result};
use crate::providers::snowflake::MAX_NODE_ID;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    pub password: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            password: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SnowflakeConfig {
    pub node_id: i64,
}

impl Default for SnowflakeConfig {
    fn default() -> Self {
        Self { node_id: 1 }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub snowflake: SnowflakeConfig,
    pub log: LogConfig,
    pub request_timeout_ms: u64,
    pub max_page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            redis: RedisConfig::default(),
            snowflake: SnowflakeConfig::default(),
            log: LogConfig::default(),
            request_timeout_ms: 5_000,
            max_page_size: 100,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| RedChatError::Config(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| RedChatError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0..=MAX_NODE_ID).contains(&self.snowflake.node_id) {
            return Err(RedChatError::Config(format!(
                "snowflake.node_id must be within 0..={MAX_NODE_ID}"
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(RedChatError::Config(
                "request_timeout_ms must be positive".to_string(),
            ));
        }
        if self.max_page_size == 0 {
            return Err(RedChatError::Config(
                "max_page_size must be positive".to_string(),
            ));
        }
        if self.redis.url.trim().is_empty() {
            return Err(RedChatError::Config("redis.url is required".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
