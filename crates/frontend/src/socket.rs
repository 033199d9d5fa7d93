use common::{
    http::SessionToken,
    ws::{ClientMsg, ServerMsg},
};
use futures::{
    channel::mpsc::{unbounded, UnboundedSender},
    SinkExt, StreamExt,
};
use log::{info, warn};
use reqwasm::websocket::{futures::WebSocket, Message};
use wasm_bindgen_futures::spawn_local;
use yew::Callback;

use crate::api::ClientError;

/// A live, authenticated socket to the lobby server.
///
/// Frames queued with [`LobbyConnection::send`] go out in order. Dropping the
/// connection closes the socket, which the server treats as leaving any
/// lobby this connection joined.
pub struct LobbyConnection {
    tx: UnboundedSender<ClientMsg>,
}

impl LobbyConnection {
    pub fn open(
        session: SessionToken,
        on_message: Callback<ServerMsg>,
        on_closed: Callback<()>,
    ) -> Result<Self, ClientError> {
        let ws = WebSocket::open(&socket_url()?)
            .map_err(|err| ClientError::Network(err.to_string()))?;
        let (mut sink, mut stream) = ws.split();
        let (tx, mut rx) = unbounded::<ClientMsg>();

        tx.unbounded_send(ClientMsg::Authenticate { session })
            .map_err(|err| ClientError::Network(err.to_string()))?;

        spawn_local(async move {
            while let Some(msg) = rx.next().await {
                let frame = match Message::try_from(&msg) {
                    Ok(frame) => frame,
                    Err(err) => {
                        warn!("error serializing {msg:?}: {err}");
                        continue;
                    }
                };
                if let Err(err) = sink.send(frame).await {
                    info!("error sending message: {err}");
                    break;
                }
            }
            if let Err(err) = sink.close().await {
                info!("error closing socket: {err}");
            }
        });

        spawn_local(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(frame) => match ServerMsg::try_from(frame) {
                        Ok(msg) => on_message.emit(msg),
                        Err(err) => info!("error deserializing message: {err}"),
                    },
                    Err(err) => {
                        info!("error receiving message: {err}");
                        break;
                    }
                }
            }
            on_closed.emit(());
        });

        Ok(Self { tx })
    }

    pub fn send(&self, msg: ClientMsg) {
        if let Err(err) = self.tx.unbounded_send(msg) {
            info!("socket already closed: {err}");
        }
    }
}

fn socket_url() -> Result<String, ClientError> {
    let location = web_sys::window()
        .map(|window| window.location())
        .ok_or_else(|| ClientError::Network("no window".to_string()))?;
    let (protocol, host) = location
        .protocol()
        .and_then(|protocol| Ok((protocol, location.host()?)))
        .map_err(|err| ClientError::Network(format!("{err:?}")))?;
    Ok(format!("{}//{host}/ws", ws_scheme(&protocol)))
}

fn ws_scheme(protocol: &str) -> &'static str {
    match protocol {
        "https:" => "wss:",
        _ => "ws:",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_pages_use_secure_sockets() {
        assert_eq!(ws_scheme("https:"), "wss:");
        assert_eq!(ws_scheme("http:"), "ws:");
    }
}
