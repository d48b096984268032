use super::signal::{Signal, SignalQueue};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

/// Receiving end of the UI hand-off channel. Owned by the UI loop.
#[derive(Debug)]
pub struct Mailbox {
    send: UnboundedSender<Signal>,
    recv: UnboundedReceiver<Signal>,
}

impl Default for Mailbox {
    fn default() -> Self {
        let (send, recv) = mpsc::unbounded_channel::<Signal>();
        Self { send, recv }
    }
}

impl Mailbox {
    pub fn poster(&self) -> Poster {
        Poster(self.send.clone())
    }

    /// Moves every signal posted so far onto `queue`, in posting order.
    /// Returns how many were moved.
    pub fn drain_into(&mut self, queue: &mut SignalQueue) -> usize {
        let mut count = 0;
        loop {
            match self.recv.try_recv() {
                Ok(signal) => {
                    queue.push(signal);
                    count += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        count
    }

    /// Waits (up to one second) for the next posted signal.
    #[cfg(test)]
    pub async fn next(&mut self) -> Option<Signal> {
        tokio::time::timeout(std::time::Duration::from_secs(1), self.recv.recv())
            .await
            .ok()
            .flatten()
    }
}

/// Sending end of the UI hand-off channel. Cheap to clone and `Send`, so
/// background tasks carry one instead of any reference into view state.
#[derive(Debug, Clone)]
pub struct Poster(UnboundedSender<Signal>);

impl Poster {
    pub fn post(&self, signal: impl Into<Signal>) {
        let signal = signal.into();
        if let Err(err) = self.0.send(signal) {
            tracing::debug!("UI loop is gone, dropping {}", err.0);
        }
    }
}
