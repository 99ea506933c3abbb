use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use validator::Validate;

use crate::domain::RoomConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duplicate room id: {0}")]
    DuplicateRoom(String),

    #[error("room id {0:?} must only contain lowercase letters, digits and underscores")]
    InvalidRoomId(String),

    #[error("invalid room {id}: {source}")]
    InvalidRoom {
        id: String,
        #[source]
        source: validator::ValidationErrors,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub rooms: Vec<RoomConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 { 10 }

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateConfig {
    /// Capacity of the state change channel
    pub event_buffer: usize,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self { event_buffer: 1024 }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("MRT__").split("__"));
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for room in &self.rooms {
            room.validate().map_err(|source| ConfigError::InvalidRoom {
                id: room.id.clone(),
                source,
            })?;
            if !room.has_valid_id() {
                return Err(ConfigError::InvalidRoomId(room.id.clone()));
            }
            if !seen.insert(room.id.as_str()) {
                return Err(ConfigError::DuplicateRoom(room.id.clone()));
            }
        }
        Ok(())
    }

    pub fn room(&self, id: &str) -> Option<&RoomConfig> {
        self.rooms.iter().find(|r| r.id == id)
    }
}
