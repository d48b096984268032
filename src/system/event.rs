use crate::{
    model::{
        channel::Channel,
        guild::Guild,
        ids::{ChannelId, GuildId},
        message::Message,
    },
    view::{bitmap::Bitmap, Region, WidgetId},
};

/// Identifies one asynchronous list load. A load's completion is only applied
/// if it is still the pending load for its level when it arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadId(pub u64);

#[derive(Debug, Clone, strum_macros::Display)]
pub enum Event {
    /// Emitted every event loop iteration to give components (eg. the status
    /// bar) an opportunity to expire time-based state
    Tick,

    FocusChanged,
    CursorMoved(Region),

    ErrorOccurred(String),
    InfoPosted(String),
    StatusMessageCleared,

    /// The view reports that the row at `index` in `region` was activated
    RowActivated {
        region: Region,
        index: usize,
    },

    GuildsLoaded(Vec<Guild>),
    GuildsFailed(String),
    GuildActivated(Guild),
    ChannelActivated(Channel),

    ChannelsLoaded {
        load: LoadId,
        guild: GuildId,
        channels: Vec<Channel>,
    },
    ChannelsFailed {
        load: LoadId,
        guild: GuildId,
        error: String,
    },

    MessagesLoaded {
        load: LoadId,
        channel: ChannelId,
        history: Vec<Message>,
    },
    MessagesFailed {
        load: LoadId,
        channel: ChannelId,
        error: String,
    },

    MessageCreated {
        channel: ChannelId,
        message: Message,
    },

    ImageLoaded {
        widget: WidgetId,
        bitmap: Bitmap,
    },

    GatewayClosed(String),
}
