use crate::system::{
    command::{Command, CommandGroup},
    event::Event,
    message::Message,
    signal::SignalQueue,
};
use ratatui::{layout::Rect, Frame};

pub mod list_pane;
pub mod list_store;
pub mod live_router;
pub mod message_pane;
pub mod selection;
pub mod status_bar;

pub trait Component {
    fn commands(&self) -> Vec<CommandGroup> {
        vec![]
    }

    fn handle_command(&mut self, _command: &Command, _queue: &mut SignalQueue) {}

    fn handle_event(&mut self, _event: &Event, _queue: &mut SignalQueue) {}

    fn handle_message(&mut self, _message: &Message, _queue: &mut SignalQueue) {}

    fn render(&mut self, _frame: &mut Frame, _area: Rect) {}
}
