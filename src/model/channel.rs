use super::ids::{ChannelId, GuildId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Voice,
    Category,
    Announcement,
    Stage,
    Forum,
    Other(u8),
}

impl From<u8> for ChannelKind {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Text,
            2 => Self::Voice,
            4 => Self::Category,
            5 => Self::Announcement,
            13 => Self::Stage,
            15 => Self::Forum,
            other => Self::Other(other),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,

    /// The zero ID for channels that don't belong to a guild
    pub guild: GuildId,

    pub name: String,
    pub kind: ChannelKind,
}

impl Channel {
    #[must_use]
    pub const fn new(id: ChannelId, guild: GuildId, name: String, kind: ChannelKind) -> Self {
        Self {
            id,
            guild,
            name,
            kind,
        }
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        self.kind == ChannelKind::Text
    }
}
