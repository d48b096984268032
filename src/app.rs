use crate::{
    client::ChatClient,
    components::{
        live_router::LiveEventRouter, selection::SelectionController, status_bar::StatusBar,
        Component,
    },
    config::{key_map::KeyMap, Config},
    system::{
        command::{Command, CommandCategory, CommandGroup},
        event::Event,
        mailbox::Mailbox,
        message::{AppAction, Message},
        signal::SignalQueue,
        Signal,
    },
    utils::image_fetcher::{HttpImageSource, ImageFetcher, ImageSource},
    view::{render, screen::{Movement, Screen}, Region},
};
use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{prelude::*, Terminal};
use std::{cell::RefCell, rc::Rc, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

const DEBOUNCE: Duration = Duration::from_millis(20); // 50 FPS

/// Everything the app shares with its background work: the one client, the
/// loaded config, and the token that cancels all outstanding tasks.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub client: Arc<dyn ChatClient>,
    pub config: Config,
    pub shutdown: CancellationToken,
}

impl AppContext {
    pub fn new(client: Arc<dyn ChatClient>, config: Config, shutdown: CancellationToken) -> Self {
        Self {
            client,
            config,
            shutdown,
        }
    }

    /// Cancels every outstanding task, then closes the client.
    pub async fn teardown(&self) {
        tracing::info!("Shutting down");
        self.shutdown.cancel();
        self.client.close().await;
    }
}

#[derive(Debug)]
pub struct App {
    context: AppContext,

    screen: Rc<RefCell<Screen>>,
    mailbox: Mailbox,

    selection: SelectionController,
    status_bar: StatusBar,
    router: LiveEventRouter,

    key_map: Rc<KeyMap>,
    exiting: bool,
}

impl App {
    /// Must be called from within a tokio runtime; the live event router
    /// starts right away.
    pub fn new(context: AppContext) -> Self {
        let mailbox = Mailbox::default();
        let screen = Rc::new(RefCell::new(Screen::default()));
        let key_map = Rc::new(context.config.key_map.clone());

        let source: Option<Arc<dyn ImageSource>> = context
            .config
            .images
            .enabled
            .then(|| Arc::new(HttpImageSource::default()) as Arc<dyn ImageSource>);
        let images = ImageFetcher::new(
            source,
            mailbox.poster(),
            context.config.images.timeout(),
            context.shutdown.clone(),
        );

        let selection = SelectionController::new(
            screen.clone(),
            context.client.clone(),
            images,
            mailbox.poster(),
            context.shutdown.clone(),
            context.config.guilds.order,
        );
        let router =
            LiveEventRouter::install(context.client.as_ref(), mailbox.poster(), &context.shutdown);

        Self {
            context,
            screen,
            mailbox,
            selection,
            status_bar: StatusBar::new(key_map.clone()),
            router,
            key_map,
            exiting: false,
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.selection.load_guilds();
        self.status_bar.commands = self.commands();
        terminal.draw(|frame| self.draw(frame))?;

        loop {
            // results of background work first, so that a row index from
            // the input below refers to what was last drawn
            let mut queue = SignalQueue::default();
            self.mailbox.drain_into(&mut queue);
            let mut update = self.process_signals(queue);

            let mut queue = SignalQueue::default();
            if crossterm::event::poll(DEBOUNCE)? {
                let event = crossterm::event::read()?;
                update |= self.handle_raw_event(&event, &mut queue);
            }
            queue.push(Event::Tick);
            update |= self.process_signals(queue);

            if self.exiting {
                return Ok(());
            }

            if update {
                self.status_bar.commands = self.commands();
                terminal.draw(|frame| self.draw(frame))?;
            }
        }
    }

    /// Stops background work and closes the client.
    pub async fn shutdown(self) {
        self.router.stop();
        self.context.teardown().await;
    }

    fn draw(&mut self, frame: &mut Frame) {
        let layout = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).split(frame.area());

        render::render_screen(frame, layout[0], &mut self.screen.borrow_mut());
        self.status_bar.render(frame, layout[1]);
    }

    fn commands(&self) -> Vec<CommandGroup> {
        let mut out = vec![
            CommandGroup::new(vec![Command::NavUp, Command::NavDown], "navigate")
                .in_cat(CommandCategory::RegionNav),
            CommandGroup::new(vec![Command::NavTop, Command::NavBottom], "top/bottom")
                .in_cat(CommandCategory::RegionNav),
            CommandGroup::new(vec![Command::FocusLeft, Command::FocusRight], "focus")
                .in_cat(CommandCategory::AppNav),
        ];
        if self.screen.borrow().focus() != Region::Messages {
            out.extend(self.selection.commands());
        }
        out.push(CommandGroup::new(vec![Command::Quit], "quit").in_cat(CommandCategory::AppNav));
        out
    }

    /// Returns whether the screen needs redrawing.
    fn handle_raw_event(&mut self, event: &CrosstermEvent, queue: &mut SignalQueue) -> bool {
        match event {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    queue.push(Message::to_app(AppAction::Quit));
                    return true;
                }

                let command = self.key_map.command_for_key((*key).into(), &self.commands());
                if let Some(command) = command {
                    self.handle_command(&command, queue);
                    return true;
                }
                false
            }
            CrosstermEvent::Resize(..) => true,
            _ => false,
        }
    }

    fn handle_command(&mut self, command: &Command, queue: &mut SignalQueue) {
        let mut screen = self.screen.borrow_mut();
        let focus = screen.focus();

        let movement = match command {
            Command::NavUp => Some(Movement::Up),
            Command::NavDown => Some(Movement::Down),
            Command::NavTop => Some(Movement::Top),
            Command::NavBottom => Some(Movement::Bottom),
            _ => None,
        };
        if let Some(movement) = movement {
            screen.move_cursor(focus, movement);
            queue.push(Event::CursorMoved(focus));
            return;
        }

        match command {
            Command::FocusLeft => queue.push(Message::to_app(AppAction::FocusRegion(focus.left()))),
            Command::FocusRight => {
                queue.push(Message::to_app(AppAction::FocusRegion(focus.right())));
            }
            Command::Confirm => {
                if let Some(index) = screen.activated_row(focus) {
                    queue.push(Event::RowActivated {
                        region: focus,
                        index,
                    });
                }
            }
            Command::Quit => queue.push(Message::to_app(AppAction::Quit)),
            _ => {}
        }
    }

    fn handle_message(&mut self, message: &Message, queue: &mut SignalQueue) {
        match message.read_as_app() {
            Some(AppAction::FocusRegion(region)) => {
                self.screen.borrow_mut().set_focus(*region);
                queue.push(Event::FocusChanged);
            }
            Some(AppAction::Quit) => {
                tracing::info!("Quit requested");
                self.exiting = true;
            }
            None => {}
        }
    }

    /// Processes `queue` until it is empty. Returns whether anything other
    /// than a tick went through.
    fn process_signals(&mut self, mut queue: SignalQueue) -> bool {
        let mut update = false;

        while let Some(signal) = queue.pop() {
            let mut new_queue = SignalQueue::default();

            match &signal {
                Signal::Event(event) => {
                    if !matches!(event, Event::Tick) {
                        tracing::trace!("event: {event}");
                        update = true;
                    }
                    self.selection.handle_event(event, &mut new_queue);
                    self.status_bar.handle_event(event, &mut new_queue);
                }
                Signal::Message(message) => {
                    tracing::trace!("message: {message}");
                    update = true;
                    self.handle_message(message, &mut new_queue);
                }
            }

            while let Some(new_signal) = new_queue.pop() {
                queue.push(new_signal);
            }
        }

        update
    }
}
