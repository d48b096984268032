use super::{gateway::Gateway, rest::Rest, ChatClient, GatewayEvent};
use crate::{
    config::ClientConfig,
    error::Result,
    model::{
        channel::Channel,
        guild::Guild,
        ids::{ChannelId, GuildId},
        message::Message,
    },
};
use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// How many live events may pile up for a slow subscriber before it starts
/// missing them.
const EVENT_BUFFER: usize = 256;

#[derive(Debug)]
pub struct DiscordClient {
    rest: Rest,
    gateway: Gateway,
    events: broadcast::Sender<GatewayEvent>,
    guild_positions: Vec<GuildId>,
}

impl DiscordClient {
    /// Opens a gateway session and waits for it to be ready.
    ///
    /// # Errors
    /// If the credential is rejected, the gateway can't be reached, or the
    /// session doesn't become ready within the configured timeout.
    pub async fn connect(
        token: String,
        config: &ClientConfig,
        shutdown: &CancellationToken,
    ) -> Result<Self> {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let rest = Rest::new(token.clone(), config)?;

        let (gateway, guild_positions) = Gateway::connect(
            &config.gateway_url,
            &token,
            config.cdn_base.trim_end_matches('/').to_string(),
            events.clone(),
            shutdown.child_token(),
            config.connect_timeout(),
        )
        .await?;

        Ok(Self {
            rest,
            gateway,
            events,
            guild_positions,
        })
    }
}

#[async_trait]
impl ChatClient for DiscordClient {
    async fn guilds(&self) -> Result<Vec<Guild>> {
        self.rest.guilds().await
    }

    fn guild_positions(&self) -> Vec<GuildId> {
        self.guild_positions.clone()
    }

    async fn channels(&self, guild: GuildId) -> Result<Vec<Channel>> {
        self.rest.channels(guild).await
    }

    async fn message_history(&self, channel: ChannelId) -> Result<Vec<Message>> {
        self.rest.message_history(channel).await
    }

    async fn subscribe_presence(&self, guild: GuildId) -> Result<()> {
        self.gateway.subscribe_guild(guild)
    }

    fn events(&self) -> broadcast::Receiver<GatewayEvent> {
        self.events.subscribe()
    }

    async fn close(&self) {
        self.gateway.close();
    }
}
