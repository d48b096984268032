use super::message_pane::MessagePane;
use crate::{
    client::{ChatClient, GatewayEvent},
    model::{ids::ChannelId, message::Message},
    system::{event::Event, mailbox::Poster},
    utils::image_fetcher::ImageFetcher,
    view::View,
};
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tokio_util::sync::CancellationToken;

/// The one subscription to the client's live events. Created at startup and
/// kept until shutdown; it forwards new messages to the UI loop, where
/// [`route`] decides whether they are shown.
#[derive(Debug)]
pub struct LiveEventRouter {
    task: JoinHandle<()>,
    cancel: CancellationToken,
}

impl LiveEventRouter {
    pub fn install(client: &dyn ChatClient, poster: Poster, shutdown: &CancellationToken) -> Self {
        let mut events = client.events();
        let cancel = shutdown.child_token();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    () = token.cancelled() => break,
                    event = events.recv() => event,
                };

                match event {
                    Ok(GatewayEvent::MessageCreated { channel, message }) => {
                        poster.post(Event::MessageCreated { channel, message });
                    }
                    Ok(GatewayEvent::Ready { .. }) => {}
                    Ok(GatewayEvent::Closed(reason)) => {
                        poster.post(Event::GatewayClosed(reason));
                        break;
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!("live event subscriber fell behind, {missed} events missed");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            tracing::debug!("live event router stopped");
        });

        Self { task, cancel }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for LiveEventRouter {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Appends `message` to `pane` if the pane is showing `channel`. Returns
/// whether it was appended.
pub fn route(
    pane: Option<&mut MessagePane>,
    view: &mut dyn View,
    images: &ImageFetcher,
    channel: ChannelId,
    message: Message,
) -> bool {
    match pane {
        Some(pane) if pane.channel() == channel => pane.append(view, images, message).is_some(),
        _ => {
            tracing::trace!("dropping live message for channel {channel}");
            false
        }
    }
}

#[expect(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        system::{mailbox::Mailbox, Signal},
        testing::{message, MockClient},
        view::{screen::Screen, Region},
    };
    use std::time::Duration;

    fn no_images(mailbox: &Mailbox) -> ImageFetcher {
        ImageFetcher::new(
            None,
            mailbox.poster(),
            Duration::from_secs(15),
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn forwards_live_messages_in_order() {
        let mut mailbox = Mailbox::default();
        let client = MockClient::default();
        let _router = LiveEventRouter::install(&client, mailbox.poster(), &CancellationToken::new());

        client.emit(GatewayEvent::MessageCreated {
            channel: ChannelId(1),
            message: message(1, 1, 10, "first"),
        });
        client.emit(GatewayEvent::MessageCreated {
            channel: ChannelId(2),
            message: message(2, 2, 10, "second"),
        });

        for expected in ["first", "second"] {
            let signal = mailbox.next().await.unwrap();
            assert!(matches!(
                signal,
                Signal::Event(Event::MessageCreated { ref message, .. }) if message.body == expected
            ));
        }
    }

    #[tokio::test]
    async fn closed_gateway_is_reported_and_stops_the_router() {
        let mut mailbox = Mailbox::default();
        let client = MockClient::default();
        let router = LiveEventRouter::install(&client, mailbox.poster(), &CancellationToken::new());

        client.emit(GatewayEvent::Closed("connection reset".into()));

        let signal = mailbox.next().await.unwrap();
        assert!(matches!(signal, Signal::Event(Event::GatewayClosed(_))));

        tokio::time::timeout(Duration::from_secs(1), async {
            while router.is_running() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn shutdown_stops_the_router() {
        let mailbox = Mailbox::default();
        let client = MockClient::default();
        let shutdown = CancellationToken::new();
        let router = LiveEventRouter::install(&client, mailbox.poster(), &shutdown);

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), async {
            while router.is_running() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[test]
    fn only_the_bound_channel_is_appended() {
        let mailbox = Mailbox::default();
        let images = no_images(&mailbox);
        let mut screen = Screen::default();
        let mut pane = MessagePane::build(
            &mut screen,
            &images,
            ChannelId(1),
            vec![message(1, 1, 10, "m1"), message(2, 1, 11, "m2")],
        );

        assert!(route(
            Some(&mut pane),
            &mut screen,
            &images,
            ChannelId(1),
            message(3, 1, 12, "m3"),
        ));
        assert!(!route(
            Some(&mut pane),
            &mut screen,
            &images,
            ChannelId(2),
            message(4, 2, 12, "elsewhere"),
        ));

        let bodies: Vec<&str> = pane
            .store()
            .iter()
            .map(|(message, _)| message.body.as_str())
            .collect();
        assert_eq!(bodies, vec!["m1", "m2", "m3"]);
        assert_eq!(screen.rows(Region::Messages).len(), 3);
    }

    #[test]
    fn nothing_is_appended_without_a_pane() {
        let mailbox = Mailbox::default();
        let mut screen = Screen::default();

        assert!(!route(
            None,
            &mut screen,
            &no_images(&mailbox),
            ChannelId(1),
            message(1, 1, 10, "m1"),
        ));
        assert!(screen.rows(Region::Messages).is_empty());
    }
}
