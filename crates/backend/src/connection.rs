//! One authenticated WebSocket client: what it watches, which lobby it is
//! seated in, and what it gets told when the store changes.

use std::{collections::HashSet, sync::Arc};

use common::{
    http::Identity,
    ws::{ClientMsg, ServerMsg},
    LobbyError, LobbyId,
};
use log::debug;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    membership::{self, LeaveOutcome},
    store::StoreEvent,
    AppState,
};

pub struct Client {
    identity: Identity,
    state: Arc<AppState>,
    outbox: UnboundedSender<ServerMsg>,
    watching_list: bool,
    watched: HashSet<LobbyId>,
    /// Lobby this connection joined. Left again when the connection drops.
    seat: Option<LobbyId>,
}

impl Client {
    pub fn new(identity: Identity, state: Arc<AppState>, outbox: UnboundedSender<ServerMsg>) -> Self {
        Self {
            identity,
            state,
            outbox,
            watching_list: false,
            watched: HashSet::new(),
            seat: None,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn send(&self, msg: ServerMsg) {
        if self.outbox.send(msg).is_err() {
            debug!("outbox of {} is closed", self.identity.name());
        }
    }

    fn send_error(&self, lobby_id: Option<LobbyId>, error: LobbyError) {
        debug!("{} -> {error}", self.identity.name());
        self.send(ServerMsg::Error { lobby_id, error });
    }

    pub async fn handle(&mut self, msg: ClientMsg) {
        match msg {
            ClientMsg::Authenticate { .. } => self.send_error(
                None,
                LobbyError::Protocol("connection is already authenticated".to_string()),
            ),
            ClientMsg::WatchLobbies => {
                self.watching_list = true;
                self.send_list().await;
            }
            ClientMsg::UnwatchLobbies => self.watching_list = false,
            ClientMsg::WatchLobby { lobby_id } => {
                self.watched.insert(lobby_id);
                self.send_snapshot(lobby_id).await;
            }
            ClientMsg::UnwatchLobby { lobby_id } => {
                self.watched.remove(&lobby_id);
            }
            ClientMsg::CreateLobby(settings) => {
                match membership::create(
                    &self.state.store,
                    &self.identity,
                    settings,
                    self.state.max_players,
                )
                .await
                {
                    Ok(lobby) => self.send(ServerMsg::LobbyCreated { lobby }),
                    Err(error) => self.send_error(None, error),
                }
            }
            ClientMsg::JoinLobby { lobby_id } => self.join(lobby_id).await,
            ClientMsg::LeaveLobby { lobby_id } => {
                let outcome = membership::leave(&self.state.store, lobby_id, &self.identity).await;
                if self.seat == Some(lobby_id) {
                    self.seat = None;
                }
                match outcome {
                    LeaveOutcome::Left | LeaveOutcome::Closed => {
                        self.send(ServerMsg::Left { lobby_id })
                    }
                    LeaveOutcome::NotFound => self.send_error(Some(lobby_id), LobbyError::NotFound),
                    LeaveOutcome::NotMember => {
                        debug!("{} is not in lobby {lobby_id}", self.identity.name())
                    }
                }
            }
        }
    }

    async fn join(&mut self, lobby_id: LobbyId) {
        if let Some(seat) = self.seat.filter(|seat| *seat != lobby_id) {
            self.send_error(
                Some(lobby_id),
                LobbyError::Conflict(format!("already seated in lobby {seat}")),
            );
            return;
        }

        match membership::join(&self.state.store, lobby_id, &self.identity).await {
            Ok(_) => {
                self.seat = Some(lobby_id);
                self.send(ServerMsg::Joined { lobby_id });
            }
            Err(error) => self.send_error(Some(lobby_id), error),
        }
    }

    pub async fn on_event(&mut self, event: StoreEvent) {
        if event.lobby.is_none() && self.seat == Some(event.lobby_id) {
            self.seat = None;
        }
        if self.watching_list {
            self.send_list().await;
        }
        if self.watched.contains(&event.lobby_id) {
            self.send(ServerMsg::LobbySnapshot {
                lobby_id: event.lobby_id,
                lobby: event.lobby,
            });
        }
    }

    /// Re-sends everything watched, after notifications were dropped.
    pub async fn resync(&mut self) {
        // The deletion or removal that freed the seat may be among the
        // dropped notifications.
        if let Some(seat) = self.seat {
            let seated = self
                .state
                .store
                .get(seat)
                .await
                .map_or(false, |lobby| lobby.is_member(self.identity.id));
            if !seated {
                debug!("{} lost its seat in lobby {seat}", self.identity.name());
                self.seat = None;
            }
        }
        if self.watching_list {
            self.send_list().await;
        }
        let watched: Vec<LobbyId> = self.watched.iter().copied().collect();
        for lobby_id in watched {
            self.send_snapshot(lobby_id).await;
        }
    }

    /// Gives up the seat, closing the lobby if this client hosts it.
    pub async fn disconnect(self) {
        if let Some(lobby_id) = self.seat {
            let outcome = membership::leave(&self.state.store, lobby_id, &self.identity).await;
            debug!(
                "{} disconnected from lobby {lobby_id}: {outcome:?}",
                self.identity.name()
            );
        }
    }

    async fn send_list(&self) {
        let lobbies = self.state.store.list().await;
        self.send(ServerMsg::Lobbies(lobbies));
    }

    async fn send_snapshot(&self, lobby_id: LobbyId) {
        let lobby = self.state.store.get(lobby_id).await;
        self.send(ServerMsg::LobbySnapshot { lobby_id, lobby });
    }
}
