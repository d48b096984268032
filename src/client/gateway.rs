use super::{
    wire::{op, GatewayPayload, GuildSubscribe, Hello, Identify, Outbound, Ready, WireMessage},
    GatewayEvent,
};
use crate::{
    error::{Error, Result},
    model::ids::GuildId,
};
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use serde::Serialize;
use std::time::Duration;
use tokio::{
    net::TcpStream,
    sync::{broadcast, mpsc, oneshot},
};
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};
use tokio_util::sync::CancellationToken;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Sink = SplitSink<Socket, WsMessage>;
type Stream = SplitStream<Socket>;

#[derive(Debug)]
enum Outgoing {
    GuildSubscribe(GuildId),
}

enum Flow {
    Continue,
    HeartbeatRequested,
}

/// Handle on a running gateway session. The session itself lives in a
/// spawned task; this only talks to it through a channel.
#[derive(Debug)]
pub struct Gateway {
    outbound: mpsc::UnboundedSender<Outgoing>,
    cancel: CancellationToken,
}

impl Gateway {
    /// Opens a session and waits for it to become ready. Returns the user's
    /// guild ordering preference alongside the handle. The whole handshake,
    /// from the socket upgrade to READY, has to finish within `ready_timeout`.
    pub async fn connect(
        url: &str,
        token: &str,
        cdn: String,
        events: broadcast::Sender<GatewayEvent>,
        cancel: CancellationToken,
        ready_timeout: Duration,
    ) -> Result<(Self, Vec<GuildId>)> {
        tracing::info!("Connecting to gateway at {url}");
        let (outbound, outbound_recv) = mpsc::unbounded_channel();

        let handshake = async {
            let (socket, _) = connect_async(url).await?;
            let (mut sink, mut stream) = socket.split();

            let hello = match next_payload(&mut stream).await? {
                payload if payload.op == op::HELLO => serde_json::from_value::<Hello>(payload.d)?,
                payload => {
                    return Err(Error::Closed(format!(
                        "expected hello, got op {}",
                        payload.op
                    )))
                }
            };
            if hello.heartbeat_interval == 0 {
                return Err(Error::Closed("hello carried no heartbeat interval".to_string()));
            }
            send(&mut sink, op::IDENTIFY, Identify::new(token)).await?;

            let (ready_send, ready_recv) = oneshot::channel();
            let session = Session {
                cdn,
                events,
                last_seq: None,
                ready: Some(ready_send),
            };
            tokio::spawn(session.run(
                sink,
                stream,
                outbound_recv,
                Duration::from_millis(hello.heartbeat_interval),
                cancel.clone(),
            ));

            ready_recv
                .await
                .map_err(|_| Error::Closed("session ended before it became ready".to_string()))
        };

        let positions = tokio::time::timeout(ready_timeout, handshake)
            .await
            .unwrap_or(Err(Error::Timeout("the gateway handshake")));
        if positions.is_err() {
            // a session may already be running
            cancel.cancel();
        }
        let positions = positions?;

        tracing::info!("Gateway session ready");
        Ok((Self { outbound, cancel }, positions))
    }

    pub fn subscribe_guild(&self, guild: GuildId) -> Result<()> {
        self.outbound
            .send(Outgoing::GuildSubscribe(guild))
            .map_err(|_| Error::Closed("session has ended".to_string()))
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }
}

struct Session {
    cdn: String,
    events: broadcast::Sender<GatewayEvent>,
    last_seq: Option<u64>,
    ready: Option<oneshot::Sender<Vec<GuildId>>>,
}

impl Session {
    async fn run(
        mut self,
        mut sink: Sink,
        mut stream: Stream,
        mut outbound: mpsc::UnboundedReceiver<Outgoing>,
        heartbeat_every: Duration,
        cancel: CancellationToken,
    ) {
        let mut heartbeat = tokio::time::interval(heartbeat_every);
        // the first tick completes immediately
        heartbeat.tick().await;

        let reason = loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!("Closing gateway session");
                    if let Err(err) = sink.send(WsMessage::Close(None)).await {
                        tracing::debug!("Error while closing gateway socket: {err}");
                    }
                    return;
                }
                _ = heartbeat.tick() => {
                    if let Err(err) = send(&mut sink, op::HEARTBEAT, self.last_seq).await {
                        break err.to_string();
                    }
                }
                Some(outgoing) = outbound.recv() => {
                    let res = match outgoing {
                        Outgoing::GuildSubscribe(guild) => {
                            send(&mut sink, op::GUILD_SUBSCRIBE, GuildSubscribe::new(guild)).await
                        }
                    };
                    if let Err(err) = res {
                        break err.to_string();
                    }
                }
                frame = stream.next() => match frame {
                    Some(Ok(WsMessage::Text(text))) => match self.handle_text(&text) {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::HeartbeatRequested) => {
                            if let Err(err) = send(&mut sink, op::HEARTBEAT, self.last_seq).await {
                                break err.to_string();
                            }
                        }
                        Err(Error::Closed(reason)) => break reason,
                        Err(err) => tracing::warn!("Ignoring gateway payload: {err}"),
                    },
                    Some(Ok(WsMessage::Close(frame))) => {
                        break frame.map_or_else(
                            || "closed by server".to_string(),
                            |frame| format!("closed by server ({}): {}", frame.code, frame.reason),
                        );
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => break err.to_string(),
                    None => break "connection ended".to_string(),
                },
            }
        };

        tracing::error!("Gateway session ended: {reason}");
        // nobody listening is fine
        let _ = self.events.send(GatewayEvent::Closed(reason));
    }

    fn handle_text(&mut self, text: &str) -> Result<Flow> {
        let payload: GatewayPayload = serde_json::from_str(text)?;
        if payload.s.is_some() {
            self.last_seq = payload.s;
        }

        match payload.op {
            op::DISPATCH => self.dispatch(payload.t.as_deref(), payload.d)?,
            op::HEARTBEAT => return Ok(Flow::HeartbeatRequested),
            op::HEARTBEAT_ACK => tracing::trace!("heartbeat acknowledged"),
            op::RECONNECT | op::INVALID_SESSION => {
                return Err(Error::Closed(format!(
                    "server ended the session (op {})",
                    payload.op
                )))
            }
            other => tracing::trace!("unhandled gateway op {other}"),
        }

        Ok(Flow::Continue)
    }

    fn dispatch(&mut self, kind: Option<&str>, data: serde_json::Value) -> Result<()> {
        match kind {
            Some("READY") => {
                let positions = serde_json::from_value::<Ready>(data)?.guild_positions();
                if let Some(ready) = self.ready.take() {
                    let _ = ready.send(positions.clone());
                }
                let _ = self.events.send(GatewayEvent::Ready {
                    guild_positions: positions,
                });
            }
            Some("MESSAGE_CREATE") => {
                let message = serde_json::from_value::<WireMessage>(data)?.into_message(&self.cdn);
                let _ = self.events.send(GatewayEvent::MessageCreated {
                    channel: message.channel,
                    message,
                });
            }
            Some(other) => tracing::trace!("ignoring dispatch {other}"),
            None => {}
        }
        Ok(())
    }
}

async fn next_payload(stream: &mut Stream) -> Result<GatewayPayload> {
    loop {
        match stream.next().await {
            Some(Ok(WsMessage::Text(text))) => return Ok(serde_json::from_str(&text)?),
            Some(Ok(WsMessage::Close(_))) | None => {
                return Err(Error::Closed("connection ended during handshake".to_string()))
            }
            Some(Ok(_)) => {}
            Some(Err(err)) => return Err(err.into()),
        }
    }
}

async fn send<T: Serialize>(sink: &mut Sink, op: u8, d: T) -> Result<()> {
    let text = serde_json::to_string(&Outbound { op, d })?;
    sink.send(WsMessage::Text(text)).await?;
    Ok(())
}

#[expect(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn connect_to(url: &str, timeout: Duration) -> Result<(Gateway, Vec<GuildId>)> {
        let (events, _) = broadcast::channel(8);
        Gateway::connect(
            url,
            "token",
            "https://cdn".to_string(),
            events,
            CancellationToken::new(),
            timeout,
        )
        .await
    }

    /// Accepts one connection and hands it to `serve`.
    async fn server<F, Fut>(serve: F) -> String
    where
        F: FnOnce(TcpStream) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            serve(socket).await;
        });
        url
    }

    #[tokio::test]
    async fn silent_server_times_out_the_handshake() {
        let url = server(|_socket| async move {
            // never answer the upgrade
            std::future::pending::<()>().await;
        })
        .await;

        let res = tokio::time::timeout(
            Duration::from_secs(5),
            connect_to(&url, Duration::from_millis(200)),
        )
        .await
        .unwrap();

        assert!(matches!(res, Err(Error::Timeout(_))));
    }

    #[tokio::test]
    async fn missing_hello_times_out_the_handshake() {
        let url = server(|socket| async move {
            let _ws = tokio_tungstenite::accept_async(socket).await.unwrap();
            std::future::pending::<()>().await;
        })
        .await;

        let res = tokio::time::timeout(
            Duration::from_secs(5),
            connect_to(&url, Duration::from_millis(200)),
        )
        .await
        .unwrap();

        assert!(matches!(res, Err(Error::Timeout(_))));
    }

    #[tokio::test]
    async fn zero_heartbeat_interval_is_rejected() {
        let url = server(|socket| async move {
            let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();
            let hello = r#"{"op":10,"d":{"heartbeat_interval":0}}"#;
            ws.send(WsMessage::Text(hello.to_string())).await.unwrap();
            std::future::pending::<()>().await;
        })
        .await;

        let res = connect_to(&url, Duration::from_secs(5)).await;

        assert!(matches!(res, Err(Error::Closed(reason)) if reason.contains("heartbeat")));
    }
}
