use crate::{
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

pub mod discord;
mod gateway;
mod rest;
mod wire;

/// Things the remote service pushes at us without being asked.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Ready { guild_positions: Vec<GuildId> },
    MessageCreated { channel: ChannelId, message: Message },
    Closed(String),
}

/// The slice of the remote service that the rest of the app needs. Every
/// method may be called from any task; none of them touch view state.
#[async_trait]
pub trait ChatClient: Send + Sync + std::fmt::Debug {
    async fn guilds(&self) -> Result<Vec<Guild>>;

    /// The user's preferred guild ordering, if the service reported one.
    fn guild_positions(&self) -> Vec<GuildId>;

    async fn channels(&self, guild: GuildId) -> Result<Vec<Channel>>;

    /// Recent history for `channel`. Implementations may return it
    /// newest-first.
    async fn message_history(&self, channel: ChannelId) -> Result<Vec<Message>>;

    async fn subscribe_presence(&self, guild: GuildId) -> Result<()>;

    /// A fresh receiver on the live event stream.
    fn events(&self) -> broadcast::Receiver<GatewayEvent>;

    async fn close(&self);
}
