use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use common::{
    http::Identity,
    ws::{ClientMsg, ServerMsg},
    LobbyError,
};
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use log::{debug, info, warn};
use tokio::sync::{broadcast::error::RecvError, mpsc};

use crate::{connection::Client, AppState};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| websocket(socket, state))
}

// One task reads frames and store notifications, a second one drains the
// outbox into the socket.
async fn websocket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let identity = match authenticate(&mut receiver, &state).await {
        Ok(identity) => identity,
        Err(error) => {
            debug!("rejecting connection: {error}");
            send(&mut sender, &ServerMsg::Error { lobby_id: None, error }).await;
            if let Err(err) = sender.close().await {
                debug!("error closing rejected connection: {err}");
            }
            return;
        }
    };
    info!("{} connected", identity.name());

    // Subscribe before the first snapshot can be requested so that no change
    // falls between the two.
    let mut events = state.store.subscribe();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut client = Client::new(identity.clone(), state, tx);
    client.send(ServerMsg::Authenticated { identity });

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if !send(&mut sender, &msg).await {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Ok(frame)) => match ClientMsg::try_from(frame) {
                    Ok(msg) => client.handle(msg).await,
                    Err(err) => {
                        debug!("error reading client msg: {err}");
                        client.send(ServerMsg::Error {
                            lobby_id: None,
                            error: LobbyError::Protocol(err.to_string()),
                        });
                    }
                },
                Some(Err(err)) => {
                    warn!("websocket error for {}: {err}", client.identity().name());
                    break;
                }
            },
            event = events.recv() => match event {
                Ok(event) => client.on_event(event).await,
                Err(RecvError::Lagged(missed)) => {
                    debug!("{} missed {missed} changes, resyncing", client.identity().name());
                    client.resync().await;
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut send_task => break,
        }
    }

    info!("{} disconnected", client.identity().name());
    client.disconnect().await;
    send_task.abort();
}

/// The first frame has to name a live session.
async fn authenticate(
    receiver: &mut SplitStream<WebSocket>,
    state: &AppState,
) -> Result<Identity, LobbyError> {
    let frame = match receiver.next().await {
        Some(Ok(frame)) => frame,
        Some(Err(err)) => return Err(LobbyError::Protocol(err.to_string())),
        None => return Err(LobbyError::Protocol("closed before authenticating".to_string())),
    };

    match ClientMsg::try_from(frame) {
        Ok(ClientMsg::Authenticate { session }) => state
            .sessions
            .resolve(session)
            .await
            .ok_or(LobbyError::Unauthenticated),
        Ok(_) => Err(LobbyError::Unauthenticated),
        Err(err) => Err(LobbyError::Protocol(err.to_string())),
    }
}

/// Returns whether the frame went out.
async fn send(sender: &mut SplitSink<WebSocket, Message>, msg: &ServerMsg) -> bool {
    let frame = match Message::try_from(msg) {
        Ok(frame) => frame,
        Err(err) => {
            warn!("failed to encode {msg:?}: {err}");
            return true;
        }
    };
    sender.send(frame).await.is_ok()
}
