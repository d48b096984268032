use super::ids::{ChannelId, MessageId, UserId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub id: UserId,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Also the creation order within a channel
    pub id: MessageId,
    pub channel: ChannelId,
    pub author: Author,
    pub body: String,
}
