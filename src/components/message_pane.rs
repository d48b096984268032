use super::list_store::ListStore;
use crate::{
    model::{ids::ChannelId, message::Message},
    utils::image_fetcher::ImageFetcher,
    view::{markup, Content, Region, Row, View},
};

/// The history of one channel plus whatever arrives live after it.
#[derive(Debug)]
pub struct MessagePane {
    channel: ChannelId,
    store: ListStore<Message>,
}

impl MessagePane {
    /// Replaces the message region with `history`, oldest first. History that
    /// arrives newest-first is reversed.
    pub fn build(
        view: &mut dyn View,
        images: &ImageFetcher,
        channel: ChannelId,
        mut history: Vec<Message>,
    ) -> Self {
        view.replace_content(Region::Messages, Content::List);

        let newest_first = history
            .first()
            .zip(history.last())
            .is_some_and(|(first, last)| first.id > last.id);
        if newest_first {
            history.reverse();
        }

        let mut pane = Self {
            channel,
            store: ListStore::default(),
        };
        for message in history {
            pane.append(view, images, message);
        }
        pane
    }

    /// Adds one row at the end. A message by the same author as the one
    /// right before it gets a compact row.
    pub fn append(
        &mut self,
        view: &mut dyn View,
        images: &ImageFetcher,
        message: Message,
    ) -> Option<usize> {
        let compact = self
            .store
            .last()
            .is_some_and(|previous| previous.author.id == message.author.id);

        let row = if compact {
            Row::CompactMessage {
                body: message.body.clone(),
            }
        } else {
            Row::FullMessage {
                author: markup::bold(&message.author.name),
                body: message.body.clone(),
            }
        };

        let handle = view.append_row(Region::Messages, row)?;
        if let (Some(url), Some(avatar)) = (&message.author.avatar_url, handle.image) {
            images.fetch_for(view, url, avatar);
        }
        Some(self.store.append(message, handle))
    }

    #[must_use]
    pub const fn channel(&self) -> ChannelId {
        self.channel
    }

    #[must_use]
    pub const fn store(&self) -> &ListStore<Message> {
        &self.store
    }
}
