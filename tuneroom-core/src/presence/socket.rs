use std::{io, thread, time::Duration};

use crossbeam_channel::Receiver;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::{
    net::TcpStream,
    sync::mpsc::{self, UnboundedReceiver},
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

use crate::{error::PresenceError, presence::ActivityUpdate};

pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

const ACTIVITY_EVENT: &str = "update_activity";

#[derive(Serialize)]
struct SocketEvent<'a> {
    event: &'a str,
    data: &'a ActivityUpdate,
}

/// Frame an update the way the chat server expects it
pub fn encode_event(update: &ActivityUpdate) -> Result<String, PresenceError> {
    Ok(serde_json::to_string(&SocketEvent {
        event: ACTIVITY_EVENT,
        data: update,
    })?)
}

/// An open websocket to the chat server
pub struct PresenceSocket {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl PresenceSocket {
    pub async fn connect(url: &str) -> Result<Self, PresenceError> {
        let (ws, _) = tokio_tungstenite::connect_async(url).await?;
        log::info!("Presence socket connected to {}", url);
        Ok(Self { ws })
    }

    /// Forward updates until the update channel closes (`Ok`) or the
    /// connection fails (`Err`).
    ///
    /// `last` holds the most recent update; it is re-sent first so a
    /// reconnect restores the user's status.
    pub async fn run(
        self,
        updates: &mut UnboundedReceiver<ActivityUpdate>,
        last: &mut Option<ActivityUpdate>,
    ) -> Result<(), PresenceError> {
        let (mut ws_tx, mut ws_rx) = self.ws.split();

        if let Some(update) = last.as_ref() {
            ws_tx.send(Message::Text(encode_event(update)?.into())).await?;
        }

        loop {
            tokio::select! {
                update = updates.recv() => {
                    let Some(update) = update else {
                        let _ = ws_tx.close().await;
                        return Ok(());
                    };
                    let text = encode_event(&update)?;
                    *last = Some(update);
                    log::trace!("sending presence: {}", text);
                    ws_tx.send(Message::Text(text.into())).await?;
                }
                message = ws_rx.next() => {
                    match message {
                        Some(Ok(Message::Ping(payload))) => {
                            ws_tx.send(Message::Pong(payload)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            log::info!("Presence socket closed by server: {:?}", frame);
                            return Err(PresenceError::Closed);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                        None => return Err(PresenceError::Closed),
                    }
                }
            }
        }
    }
}

/// Sleep out the reconnect delay while keeping `last` current.
/// Returns false once the update channel has closed.
async fn wait_before_retry(
    updates: &mut UnboundedReceiver<ActivityUpdate>,
    last: &mut Option<ActivityUpdate>,
    delay: Duration,
) -> bool {
    let delay = tokio::time::sleep(delay);
    tokio::pin!(delay);

    loop {
        tokio::select! {
            () = &mut delay => return true,
            update = updates.recv() => match update {
                Some(update) => *last = Some(update),
                None => return false,
            },
        }
    }
}

async fn forward(url: String, mut updates: UnboundedReceiver<ActivityUpdate>) {
    let mut last = None;

    loop {
        match PresenceSocket::connect(&url).await {
            Ok(socket) => match socket.run(&mut updates, &mut last).await {
                Ok(()) => {
                    log::info!("Presence channel closed, forwarder stopping");
                    return;
                }
                Err(e) => log::warn!("Presence socket dropped: {}", e),
            },
            Err(e) => log::warn!("Presence connect to {} failed: {}", url, e),
        }

        if !wait_before_retry(&mut updates, &mut last, RECONNECT_DELAY).await {
            return;
        }
    }
}

/// Run the presence forwarder on its own thread.
///
/// The thread lives until every sender of `rx` is dropped.
pub fn spawn_forwarder(
    url: String,
    rx: Receiver<ActivityUpdate>,
) -> io::Result<thread::JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("presence".to_string())
        .spawn(move || {
            let (async_tx, async_rx) = mpsc::unbounded_channel();

            // Bridge the blocking channel into the runtime
            thread::spawn(move || {
                for update in rx.iter() {
                    if async_tx.send(update).is_err() {
                        break;
                    }
                }
            });

            runtime.block_on(forward(url, async_rx));
        })
}
