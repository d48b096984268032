use crate::model::guild::GuildOrder;
use anyhow::{Context, Result};
use key_map::KeyMap;
use serde::Deserialize;
use std::{collections::HashMap, time::Duration};

pub mod key_map;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base: String,
    pub gateway_url: String,
    pub cdn_base: String,
    pub history_limit: u8,
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "https://discord.com/api/v10".to_string(),
            gateway_url: "wss://gateway.discord.gg/?v=10&encoding=json".to_string(),
            cdn_base: "https://cdn.discordapp.com".to_string(),
            history_limit: 50,
            connect_timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 15,
        }
    }
}

impl ImageConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GuildConfig {
    pub order: GuildOrder,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct RawConfig {
    #[serde(default)]
    pub keys: HashMap<String, String>,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub images: ImageConfig,

    #[serde(default)]
    pub guilds: GuildConfig,
}

impl TryFrom<&str> for RawConfig {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        let config = toml::from_str(value)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub client: ClientConfig,
    pub images: ImageConfig,
    pub guilds: GuildConfig,
    pub key_map: KeyMap,
}

impl TryFrom<RawConfig> for Config {
    type Error = anyhow::Error;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let key_map = KeyMap::try_from(raw.keys).context("Parsing key map")?;
        Ok(Self {
            client: raw.client,
            images: raw.images,
            guilds: raw.guilds,
            key_map,
        })
    }
}

impl Config {
    /// # Errors
    /// If the string isn't valid TOML, or if it names unknown commands, keys,
    /// or guild orderings.
    pub fn read_from_string(file: &str) -> Result<Self> {
        let raw = RawConfig::try_from(file).context("Parsing config file")?;
        Self::try_from(raw)
    }
}
