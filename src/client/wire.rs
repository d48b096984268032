//! Payload shapes as the service sends them, and their conversion into
//! `model` types.

use crate::model::{
    channel::{Channel, ChannelKind},
    guild::Guild,
    ids::{ChannelId, GuildId, MessageId, UserId},
    message::{Author, Message},
};
use serde::{Deserialize, Serialize};

pub mod op {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
    pub const GUILD_SUBSCRIBE: u8 = 14;
}

// GUILDS | GUILD_MESSAGES | DIRECT_MESSAGES | MESSAGE_CONTENT
const INTENTS: u64 = (1 << 0) | (1 << 9) | (1 << 12) | (1 << 15);

#[derive(Debug, Deserialize)]
pub struct WireGuild {
    id: GuildId,
    name: String,
    #[serde(default)]
    icon: Option<String>,
}

impl WireGuild {
    pub fn into_guild(self, cdn: &str) -> Guild {
        let Self { id, name, icon } = self;
        let icon_url = icon.map(|hash| format!("{cdn}/icons/{id}/{hash}.png?size=64"));
        Guild::new(id, name, icon_url)
    }
}

#[derive(Debug, Deserialize)]
pub struct WireChannel {
    id: ChannelId,
    #[serde(default)]
    guild_id: Option<GuildId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type")]
    kind: u8,
}

impl WireChannel {
    pub fn into_channel(self, requested_guild: GuildId) -> Channel {
        Channel::new(
            self.id,
            self.guild_id.unwrap_or(requested_guild),
            self.name.unwrap_or_default(),
            ChannelKind::from(self.kind),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct WireUser {
    id: UserId,
    username: String,
    #[serde(default)]
    global_name: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
}

impl WireUser {
    fn into_author(self, cdn: &str) -> Author {
        let Self {
            id,
            username,
            global_name,
            avatar,
        } = self;
        Author {
            id,
            name: global_name.unwrap_or(username),
            avatar_url: avatar.map(|hash| format!("{cdn}/avatars/{id}/{hash}.png?size=64")),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireMessage {
    id: MessageId,
    channel_id: ChannelId,
    author: WireUser,
    #[serde(default)]
    content: String,
}

impl WireMessage {
    pub fn into_message(self, cdn: &str) -> Message {
        Message {
            id: self.id,
            channel: self.channel_id,
            author: self.author.into_author(cdn),
            body: self.content,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: serde_json::Value,
    #[serde(default)]
    pub s: Option<u64>,
    #[serde(default)]
    pub t: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Hello {
    pub heartbeat_interval: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct Ready {
    #[serde(default)]
    user_settings: Option<UserSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct UserSettings {
    #[serde(default)]
    guild_positions: Vec<GuildId>,
}

impl Ready {
    pub fn guild_positions(self) -> Vec<GuildId> {
        self.user_settings
            .map(|settings| settings.guild_positions)
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct Outbound<T> {
    pub op: u8,
    pub d: T,
}

#[derive(Debug, Serialize)]
pub struct Identify<'a> {
    token: &'a str,
    intents: u64,
    properties: IdentifyProperties,
}

#[derive(Debug, Serialize)]
struct IdentifyProperties {
    os: &'static str,
    browser: &'static str,
    device: &'static str,
}

impl<'a> Identify<'a> {
    pub const fn new(token: &'a str) -> Self {
        Self {
            token,
            intents: INTENTS,
            properties: IdentifyProperties {
                os: std::env::consts::OS,
                browser: env!("CARGO_PKG_NAME"),
                device: env!("CARGO_PKG_NAME"),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GuildSubscribe {
    guild_id: GuildId,
    typing: bool,
    activities: bool,
    threads: bool,
}

impl GuildSubscribe {
    pub const fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            typing: true,
            activities: true,
            threads: true,
        }
    }
}
