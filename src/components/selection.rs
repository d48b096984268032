use super::{
    list_pane::{ChannelPane, GuildPane},
    live_router,
    message_pane::MessagePane,
    Component,
};
use crate::{
    client::ChatClient,
    model::{
        channel::Channel,
        guild::{Guild, GuildOrder},
        ids::{ChannelId, GuildId},
    },
    system::{
        command::{Command, CommandCategory, CommandGroup},
        event::{Event, LoadId},
        mailbox::Poster,
        message::{AppAction, Message},
        signal::SignalQueue,
    },
    utils::image_fetcher::ImageFetcher,
    view::{Content, Region, View},
};
use std::{cell::RefCell, rc::Rc, sync::Arc};
use tokio_util::sync::CancellationToken;

/// The last selection whose load succeeded. A failed or pending load leaves
/// the phase alone, so `ChannelSelected` can outlive its message pane: after
/// a failed history load the region shows a notice and no pane is bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    GuildSelected(GuildId),
    ChannelSelected {
        guild: GuildId,
        channel: ChannelId,
    },
}

/// A load whose result hasn't been applied yet. Its result is only applied
/// if it is still pending when the result arrives.
#[derive(Debug)]
struct PendingLoad<T> {
    id: LoadId,
    target: T,
    cancel: CancellationToken,
}

impl<T> Drop for PendingLoad<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Drives guild -> channel -> message selection. Owns the active panes, and
/// starts and supersedes the loads that fill them.
pub struct SelectionController {
    view: Rc<RefCell<dyn View>>,
    client: Arc<dyn ChatClient>,
    images: ImageFetcher,
    poster: Poster,
    shutdown: CancellationToken,
    guild_order: GuildOrder,

    phase: Phase,
    next_load: u64,
    channel_load: Option<PendingLoad<Guild>>,
    message_load: Option<PendingLoad<Channel>>,

    guild_pane: Option<GuildPane>,
    channel_pane: Option<ChannelPane>,
    message_pane: Option<MessagePane>,
}

impl std::fmt::Debug for SelectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionController")
            .field("phase", &self.phase)
            .field("channel_load", &self.channel_load)
            .field("message_load", &self.message_load)
            .finish_non_exhaustive()
    }
}

impl SelectionController {
    pub fn new(
        view: Rc<RefCell<dyn View>>,
        client: Arc<dyn ChatClient>,
        images: ImageFetcher,
        poster: Poster,
        shutdown: CancellationToken,
        guild_order: GuildOrder,
    ) -> Self {
        Self {
            view,
            client,
            images,
            poster,
            shutdown,
            guild_order,
            phase: Phase::Idle,
            next_load: 0,
            channel_load: None,
            message_load: None,
            guild_pane: None,
            channel_pane: None,
            message_pane: None,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn message_pane(&self) -> Option<&MessagePane> {
        self.message_pane.as_ref()
    }

    #[must_use]
    pub const fn channel_pane(&self) -> Option<&ChannelPane> {
        self.channel_pane.as_ref()
    }

    fn new_load<T>(&mut self, target: T) -> PendingLoad<T> {
        self.next_load += 1;
        PendingLoad {
            id: LoadId(self.next_load),
            target,
            cancel: self.shutdown.child_token(),
        }
    }

    /// Fetches the guild list, ordered per the configured policy.
    pub fn load_guilds(&mut self) {
        self.view.borrow_mut().show_loading(Region::Guilds);

        let client = self.client.clone();
        let poster = self.poster.clone();
        let order = self.guild_order;
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                biased;

                () = shutdown.cancelled() => return,
                result = client.guilds() => result,
            };

            match result {
                Ok(guilds) => {
                    let guilds = order.arrange(guilds, &client.guild_positions());
                    poster.post(Event::GuildsLoaded(guilds));
                }
                Err(err) => poster.post(Event::GuildsFailed(err.to_string())),
            }
        });
    }

    #[tracing::instrument(skip_all, fields(guild = %guild.id))]
    pub fn select_guild(&mut self, guild: Guild) {
        tracing::info!("selecting guild \"{}\"", guild.name);

        // dropping a pending load cancels it
        self.channel_load = None;
        self.channel_pane = None;
        let mut view = self.view.borrow_mut();
        if self.message_load.take().is_some() {
            view.replace_content(Region::Messages, Content::Empty);
        }
        view.show_loading(Region::Channels);
        drop(view);

        let load = self.new_load(guild);
        let id = load.id;
        let target = load.target.id;
        let cancel = load.cancel.clone();
        let client = self.client.clone();
        let poster = self.poster.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    tracing::trace!("channel load for guild {target} superseded");
                    return;
                }
                result = client.channels(target) => result,
            };

            poster.post(match result {
                Ok(channels) => Event::ChannelsLoaded {
                    load: id,
                    guild: target,
                    channels,
                },
                Err(err) => Event::ChannelsFailed {
                    load: id,
                    guild: target,
                    error: err.to_string(),
                },
            });
        });

        self.channel_load = Some(load);
    }

    #[tracing::instrument(skip_all, fields(channel = %channel.id))]
    pub fn select_channel(&mut self, channel: Channel) {
        tracing::info!("selecting channel #{}", channel.name);

        self.message_load = None;
        self.message_pane = None;
        self.view.borrow_mut().show_loading(Region::Messages);

        let load = self.new_load(channel);
        let id = load.id;
        let target = load.target.id;
        let cancel = load.cancel.clone();
        let client = self.client.clone();
        let poster = self.poster.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    tracing::trace!("message load for channel {target} superseded");
                    return;
                }
                result = client.message_history(target) => result,
            };

            poster.post(match result {
                Ok(history) => Event::MessagesLoaded {
                    load: id,
                    channel: target,
                    history,
                },
                Err(err) => Event::MessagesFailed {
                    load: id,
                    channel: target,
                    error: err.to_string(),
                },
            });
        });

        self.message_load = Some(load);
    }

    /// Takes the pending channel load if `load` is it.
    fn finish_channel_load(&mut self, load: LoadId, guild: GuildId) -> Option<Guild> {
        match self.channel_load.take() {
            Some(pending) if pending.id == load && pending.target.id == guild => {
                Some(pending.target.clone())
            }
            other => {
                tracing::trace!("discarding superseded channel list for guild {guild}");
                self.channel_load = other;
                None
            }
        }
    }

    fn finish_message_load(&mut self, load: LoadId, channel: ChannelId) -> Option<Channel> {
        match self.message_load.take() {
            Some(pending) if pending.id == load && pending.target.id == channel => {
                Some(pending.target.clone())
            }
            other => {
                tracing::trace!("discarding superseded history for channel {channel}");
                self.message_load = other;
                None
            }
        }
    }

    fn on_guilds_loaded(&mut self, guilds: &[Guild]) {
        let mut view = self.view.borrow_mut();
        self.guild_pane = Some(GuildPane::build(
            &mut *view,
            &self.images,
            guilds.to_vec(),
            Event::GuildActivated,
        ));
    }

    fn on_channels_loaded(&mut self, load: LoadId, guild: GuildId, channels: &[Channel]) {
        let Some(guild) = self.finish_channel_load(load, guild) else {
            return;
        };

        let mut view = self.view.borrow_mut();
        self.channel_pane = Some(ChannelPane::build(
            &mut *view,
            &self.images,
            channels.to_vec(),
            Event::ChannelActivated,
        ));
        self.message_pane = None;
        view.replace_content(Region::Messages, Content::Empty);

        self.phase = Phase::GuildSelected(guild.id);
        tracing::debug!("now in guild \"{}\"", guild.name);
    }

    fn on_messages_loaded(
        &mut self,
        load: LoadId,
        channel: ChannelId,
        history: &[crate::model::message::Message],
    ) {
        let Some(channel) = self.finish_message_load(load, channel) else {
            return;
        };

        {
            let mut view = self.view.borrow_mut();
            self.message_pane = Some(MessagePane::build(
                &mut *view,
                &self.images,
                channel.id,
                history.to_vec(),
            ));
        }
        self.phase = Phase::ChannelSelected {
            guild: channel.guild,
            channel: channel.id,
        };

        if channel.guild.is_valid() {
            let client = self.client.clone();
            let shutdown = self.shutdown.clone();
            let guild = channel.guild;

            tokio::spawn(async move {
                tokio::select! {
                    () = shutdown.cancelled() => {}
                    result = client.subscribe_presence(guild) => {
                        if let Err(err) = result {
                            tracing::warn!("couldn't subscribe to guild {guild}: {err}");
                        }
                    }
                }
            });
        }
    }

    fn on_load_failed(&mut self, region: Region, notice: &str, error: &str, queue: &mut SignalQueue) {
        tracing::warn!("{notice}: {error}");
        self.view
            .borrow_mut()
            .replace_content(region, Content::Notice(notice.to_string()));
        queue.push(Event::ErrorOccurred(format!("{notice}: {error}")));
    }
}

impl Component for SelectionController {
    fn commands(&self) -> Vec<CommandGroup> {
        vec![CommandGroup::new(vec![Command::Confirm], "select").in_cat(CommandCategory::Selection)]
    }

    fn handle_event(&mut self, event: &Event, queue: &mut SignalQueue) {
        match event {
            Event::GuildsLoaded(guilds) => self.on_guilds_loaded(guilds),
            Event::GuildsFailed(error) => {
                self.on_load_failed(Region::Guilds, "Couldn't load guilds", error, queue);
            }

            Event::RowActivated { region, index } => match region {
                Region::Guilds => {
                    if let Some(pane) = &self.guild_pane {
                        pane.activate(*index, queue);
                    }
                }
                Region::Channels => {
                    if let Some(pane) = &self.channel_pane {
                        pane.activate(*index, queue);
                    }
                }
                Region::Messages => {}
            },
            Event::GuildActivated(guild) => {
                self.select_guild(guild.clone());
                queue.push(Message::to_app(AppAction::FocusRegion(Region::Channels)));
            }
            Event::ChannelActivated(channel) => {
                self.select_channel(channel.clone());
                queue.push(Message::to_app(AppAction::FocusRegion(Region::Messages)));
            }

            Event::ChannelsLoaded {
                load,
                guild,
                channels,
            } => self.on_channels_loaded(*load, *guild, channels),
            Event::ChannelsFailed { load, guild, error } => {
                if self.finish_channel_load(*load, *guild).is_some() {
                    self.on_load_failed(Region::Channels, "Couldn't load channels", error, queue);
                }
            }

            Event::MessagesLoaded {
                load,
                channel,
                history,
            } => self.on_messages_loaded(*load, *channel, history),
            Event::MessagesFailed {
                load,
                channel,
                error,
            } => {
                if self.finish_message_load(*load, *channel).is_some() {
                    self.on_load_failed(Region::Messages, "Couldn't load messages", error, queue);
                }
            }

            Event::MessageCreated { channel, message } => {
                let mut view = self.view.borrow_mut();
                live_router::route(
                    self.message_pane.as_mut(),
                    &mut *view,
                    &self.images,
                    *channel,
                    message.clone(),
                );
            }

            Event::ImageLoaded { widget, bitmap } => {
                if !self.view.borrow_mut().set_bitmap(*widget, bitmap.clone()) {
                    tracing::trace!("image arrived for destroyed widget {widget:?}");
                }
            }
            _ => {}
        }
    }
}
