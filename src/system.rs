/// Commands represent user intentions. They correspond one-to-one with key
/// presses, and are the things that users can configure key maps for. Each
/// command is handled by the root component (`App`), which forwards it to
/// whatever the focused region needs.
pub mod command;

/// Events represent things that happen within the program. Events are emitted
/// by components as a result of handling a command, a message, or another
/// event, or when an async process (such as a channel fetch) has completed
/// and its result has been posted back to the UI loop.
pub mod event;

/// The hand-off point between background tasks and the UI loop. Tasks hold a
/// cloneable `Poster`; the UI loop owns the `Mailbox` and drains it once per
/// iteration. Nothing a task produces touches view state until it has gone
/// through here.
pub mod mailbox;

/// Messages represent direct imperative communications between components. Like
/// events, a component may emit a message when it handles a command, event,
/// or another message. Unlike events, messages are tagged with a recipient
/// component, and are only handled by that component.
pub mod message;

/// Signal utilities including the Signal enum and `SignalQueue` for managing
/// the communication between components in the event-driven system.
pub mod signal;

pub use signal::Signal;
