use super::Component;
use crate::{
    config::key_map::KeyMap,
    system::{command::CommandGroup, event::Event, signal::SignalQueue},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Padding, Paragraph},
};
use std::{
    rc::Rc,
    time::{Duration, Instant},
};

const ERROR_MESSAGE_DURATION: Duration = Duration::from_secs(5);
const INFO_MESSAGE_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageKind {
    Error,
    Info,
}

#[derive(Debug)]
struct StatusMessage {
    kind: MessageKind,
    content: String,
    start: Instant,
    duration: Duration,
}

impl StatusMessage {
    fn error(content: &str) -> Self {
        Self {
            kind: MessageKind::Error,
            content: content.to_string(),
            start: Instant::now(),
            duration: ERROR_MESSAGE_DURATION,
        }
    }

    fn info(content: &str) -> Self {
        Self {
            kind: MessageKind::Info,
            content: content.to_string(),
            start: Instant::now(),
            duration: INFO_MESSAGE_DURATION,
        }
    }

    fn expired(&self) -> bool {
        self.start.elapsed() >= self.duration
    }
}

/// Key hints for whatever is focused, or a passing error or info message.
#[derive(Debug, Default)]
pub struct StatusBar {
    pub commands: Vec<CommandGroup>,
    message: Option<StatusMessage>,

    key_map: Rc<KeyMap>,
}

impl StatusBar {
    pub fn new(key_map: Rc<KeyMap>) -> Self {
        Self {
            key_map,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|message| message.content.as_str())
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content = self.message.as_ref().map_or_else(
            || {
                Line::from(
                    self.commands
                        .iter()
                        .flat_map(|group| self.key_map.cmd_group_to_span(group))
                        .collect::<Vec<Span>>(),
                )
            },
            |message| {
                let (prefix, style) = match message.kind {
                    MessageKind::Error => ("● Error: ", Style::default().red()),
                    MessageKind::Info => ("● ", Style::default().blue()),
                };
                Line::from(vec![
                    Span::styled(prefix, style),
                    Span::from(message.content.clone()),
                ])
            },
        );

        let content = Paragraph::new(content).block(Block::default().padding(Padding::horizontal(1)));
        frame.render_widget(content, area);
    }

    fn handle_event(&mut self, event: &Event, queue: &mut SignalQueue) {
        match event {
            Event::ErrorOccurred(error) => {
                self.message = Some(StatusMessage::error(error));
            }
            Event::InfoPosted(info) => {
                self.message = Some(StatusMessage::info(info));
            }
            Event::GatewayClosed(reason) => {
                self.message = Some(StatusMessage::error(&format!(
                    "Lost connection to Discord ({reason}). Restart to reconnect."
                )));
            }
            Event::Tick => {
                if self.message.as_ref().is_some_and(StatusMessage::expired) {
                    self.message = None;
                    queue.push(Event::StatusMessageCleared);
                }
            }
            _ => (),
        }
    }
}
