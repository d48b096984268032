use super::wire::{WireChannel, WireGuild, WireMessage};
use crate::{
    config::ClientConfig,
    error::{Error, Result},
    model::{
        channel::Channel,
        guild::Guild,
        ids::{ChannelId, GuildId},
        message::Message,
    },
};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// The service only hands out this many messages per request.
const MAX_HISTORY: u8 = 100;

#[derive(Clone)]
pub struct Rest {
    http: reqwest::Client,
    token: String,
    api_base: String,
    cdn_base: String,
    history_limit: u8,
}

impl std::fmt::Debug for Rest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rest")
            .field("api_base", &self.api_base)
            .field("cdn_base", &self.cdn_base)
            .field("history_limit", &self.history_limit)
            .finish_non_exhaustive()
    }
}

impl Rest {
    pub fn new(token: String, config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            token,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            cdn_base: config.cdn_base.trim_end_matches('/').to_string(),
            history_limit: config.history_limit.clamp(1, MAX_HISTORY),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{path}", self.api_base);
        tracing::debug!("GET {url}");

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, &self.token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }

    pub async fn guilds(&self) -> Result<Vec<Guild>> {
        let guilds: Vec<WireGuild> = self.get("/users/@me/guilds", &[]).await?;
        Ok(guilds
            .into_iter()
            .map(|guild| guild.into_guild(&self.cdn_base))
            .collect())
    }

    pub async fn channels(&self, guild: GuildId) -> Result<Vec<Channel>> {
        let channels: Vec<WireChannel> = self.get(&format!("/guilds/{guild}/channels"), &[]).await?;
        Ok(channels
            .into_iter()
            .map(|channel| channel.into_channel(guild))
            .collect())
    }

    /// Newest-first, as the service returns it.
    pub async fn message_history(&self, channel: ChannelId) -> Result<Vec<Message>> {
        let messages: Vec<WireMessage> = self
            .get(
                &format!("/channels/{channel}/messages"),
                &[("limit", self.history_limit.to_string())],
            )
            .await?;
        Ok(messages
            .into_iter()
            .map(|message| message.into_message(&self.cdn_base))
            .collect())
    }
}
