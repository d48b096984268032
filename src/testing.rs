use crate::{
    client::{ChatClient, GatewayEvent},
    components::Component,
    error::{Error, Result},
    model::{
        channel::{Channel, ChannelKind},
        guild::Guild,
        ids::{ChannelId, GuildId, MessageId, UserId},
        message::{Author, Message},
    },
    system::{
        command::Command,
        event::Event,
        mailbox::Mailbox,
        message::Message as AppMessage,
        signal::{Signal, SignalQueue},
    },
    utils::image_fetcher::{ImageError, ImageSource},
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};
use tokio::sync::{broadcast, oneshot};

pub struct ComponentTestHarness<C: Component> {
    component: C,
    events: Vec<Event>,
    messages: Vec<AppMessage>,
}

impl<C: Component> ComponentTestHarness<C> {
    pub const fn new(component: C) -> Self {
        Self {
            component,
            events: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub const fn component(&self) -> &C {
        &self.component
    }

    pub fn component_mut(&mut self) -> &mut C {
        &mut self.component
    }

    pub fn given_command(&mut self, command: Command) {
        let mut queue = SignalQueue::default();
        self.component.handle_command(&command, &mut queue);
        self.process_signals(queue);
    }

    pub fn given_event(&mut self, event: Event) {
        let mut queue = SignalQueue::default();
        queue.push(event);
        self.process_signals(queue);
    }

    /// Waits for the next signal a background task posts, then processes it
    /// like the UI loop would.
    pub async fn given_posted(&mut self, mailbox: &mut Mailbox) {
        let signal = mailbox
            .next()
            .await
            .expect("a background task should have posted something");
        let mut queue = SignalQueue::default();
        queue.push(signal);
        self.process_signals(queue);
    }

    /// Lets spawned tasks run, then processes whatever they posted.
    pub async fn settle(&mut self, mailbox: &mut Mailbox) {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        let mut queue = SignalQueue::default();
        mailbox.drain_into(&mut queue);
        self.process_signals(queue);
    }

    fn process_signals(&mut self, mut queue: SignalQueue) {
        while let Some(signal) = queue.pop() {
            let mut new_queue = SignalQueue::default();

            match &signal {
                Signal::Event(event) => self.component.handle_event(event, &mut new_queue),
                Signal::Message(message) => self.component.handle_message(message, &mut new_queue),
            }

            while let Some(new_signal) = new_queue.pop() {
                queue.push(new_signal);
            }

            match signal {
                Signal::Event(event) => self.events.push(event),
                Signal::Message(message) => self.messages.push(message),
            }
        }
    }

    pub fn expect_event<P: FnMut(&&Event) -> bool>(&self, predicate: P) {
        let event = self.events.iter().find(predicate);
        assert!(
            event.is_some(),
            "Matching event not found. These events were recorded:\n{:?}",
            self.events
        );
    }

    pub fn expect_no_event<P: FnMut(&&Event) -> bool>(&self, predicate: P) {
        let event = self.events.iter().find(predicate);
        assert!(
            event.is_none(),
            "Unexpected event found. These events were recorded:\n{:?}",
            self.events
        );
    }

    pub fn expect_message<P: FnMut(&&AppMessage) -> bool>(&self, predicate: P) {
        let message = self.messages.iter().find(predicate);
        assert!(
            message.is_some(),
            "Matching message not found. These message were recorded:\n{:?}",
            self.messages
        );
    }
}

pub fn guild(id: u64, name: &str) -> Guild {
    Guild::new(GuildId(id), name.to_string(), None)
}

pub fn channel(id: u64, guild: u64, name: &str) -> Channel {
    Channel::new(
        ChannelId(id),
        GuildId(guild),
        name.to_string(),
        ChannelKind::Text,
    )
}

pub fn message(id: u64, channel: u64, author: u64, body: &str) -> Message {
    Message {
        id: MessageId(id),
        channel: ChannelId(channel),
        author: Author {
            id: UserId(author),
            name: format!("user{author}"),
            avatar_url: None,
        },
        body: body.to_string(),
    }
}

/// A 2x2 single-color PNG.
pub fn png(color: [u8; 3]) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(2, 2, image::Rgb(color));
    let mut bytes = std::io::Cursor::new(vec![]);
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("encoding a PNG in memory should work");
    bytes.into_inner()
}

#[derive(Debug, Default)]
pub struct StaticImageSource {
    images: HashMap<String, Vec<u8>>,
    stalled: bool,
}

impl StaticImageSource {
    pub fn with(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.images.insert(url.to_string(), bytes);
        self
    }

    /// Every fetch hangs forever.
    pub const fn stalled(mut self) -> Self {
        self.stalled = true;
        self
    }
}

#[async_trait]
impl ImageSource for StaticImageSource {
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, ImageError> {
        if self.stalled {
            std::future::pending::<()>().await;
        }
        self.images.get(url).cloned().ok_or(ImageError::Status(404))
    }
}

type Gate<T> = oneshot::Receiver<Result<T>>;

/// A `ChatClient` whose fetches complete with canned data, or, for gated
/// targets, whenever the test decides.
#[derive(Debug)]
pub struct MockClient {
    guilds: Vec<Guild>,
    guild_positions: Vec<GuildId>,
    fail_guilds: bool,

    channels: HashMap<GuildId, Vec<Channel>>,
    histories: HashMap<ChannelId, Vec<Message>>,

    channel_gates: Mutex<HashMap<GuildId, Gate<Vec<Channel>>>>,
    history_gates: Mutex<HashMap<ChannelId, Gate<Vec<Message>>>>,

    presence: Mutex<Vec<GuildId>>,
    events: broadcast::Sender<GatewayEvent>,
    closed: AtomicBool,
}

impl Default for MockClient {
    fn default() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            guilds: vec![],
            guild_positions: vec![],
            fail_guilds: false,
            channels: HashMap::new(),
            histories: HashMap::new(),
            channel_gates: Mutex::default(),
            history_gates: Mutex::default(),
            presence: Mutex::default(),
            events,
            closed: AtomicBool::new(false),
        }
    }
}

impl MockClient {
    pub fn with_guilds(mut self, guilds: Vec<Guild>, positions: Vec<GuildId>) -> Self {
        self.guilds = guilds;
        self.guild_positions = positions;
        self
    }

    pub const fn failing_guilds(mut self) -> Self {
        self.fail_guilds = true;
        self
    }

    pub fn with_channels(mut self, guild: u64, channels: Vec<Channel>) -> Self {
        self.channels.insert(GuildId(guild), channels);
        self
    }

    pub fn with_history(mut self, channel: u64, history: Vec<Message>) -> Self {
        self.histories.insert(ChannelId(channel), history);
        self
    }

    /// The next channel fetch for `guild` waits for the returned sender.
    pub fn gate_channels(&self, guild: u64) -> oneshot::Sender<Result<Vec<Channel>>> {
        let (send, recv) = oneshot::channel();
        self.channel_gates
            .lock()
            .expect("lock shouldn't be poisoned")
            .insert(GuildId(guild), recv);
        send
    }

    /// The next history fetch for `channel` waits for the returned sender.
    pub fn gate_history(&self, channel: u64) -> oneshot::Sender<Result<Vec<Message>>> {
        let (send, recv) = oneshot::channel();
        self.history_gates
            .lock()
            .expect("lock shouldn't be poisoned")
            .insert(ChannelId(channel), recv);
        send
    }

    pub fn emit(&self, event: GatewayEvent) {
        let _ = self.events.send(event);
    }

    pub fn presence_subscriptions(&self) -> Vec<GuildId> {
        self.presence
            .lock()
            .expect("lock shouldn't be poisoned")
            .clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

pub fn server_error() -> Error {
    Error::Status {
        status: 500,
        body: "internal error".to_string(),
    }
}

async fn wait_for<T>(gate: Gate<T>) -> Result<T> {
    gate.await
        .unwrap_or_else(|_| Err(Error::Closed("gate dropped".to_string())))
}

#[async_trait]
impl ChatClient for MockClient {
    async fn guilds(&self) -> Result<Vec<Guild>> {
        if self.fail_guilds {
            return Err(server_error());
        }
        Ok(self.guilds.clone())
    }

    fn guild_positions(&self) -> Vec<GuildId> {
        self.guild_positions.clone()
    }

    async fn channels(&self, guild: GuildId) -> Result<Vec<Channel>> {
        let gate = self
            .channel_gates
            .lock()
            .expect("lock shouldn't be poisoned")
            .remove(&guild);
        match gate {
            Some(gate) => wait_for(gate).await,
            None => Ok(self.channels.get(&guild).cloned().unwrap_or_default()),
        }
    }

    async fn message_history(&self, channel: ChannelId) -> Result<Vec<Message>> {
        let gate = self
            .history_gates
            .lock()
            .expect("lock shouldn't be poisoned")
            .remove(&channel);
        match gate {
            Some(gate) => wait_for(gate).await,
            None => Ok(self.histories.get(&channel).cloned().unwrap_or_default()),
        }
    }

    async fn subscribe_presence(&self, guild: GuildId) -> Result<()> {
        self.presence
            .lock()
            .expect("lock shouldn't be poisoned")
            .push(guild);
        Ok(())
    }

    fn events(&self) -> broadcast::Receiver<GatewayEvent> {
        self.events.subscribe()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
