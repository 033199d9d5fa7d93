//! In-memory lobby records with change notifications.
//!
//! Every mutation happens under one lock and publishes its [`StoreEvent`]
//! before the lock is released, so subscribers see changes in commit order.

use std::{
    collections::HashMap,
    time::{SystemTime, UNIX_EPOCH},
};

use common::{Lobby, LobbyError, LobbyId, NewLobby, Player};
use futures::lock::Mutex;
use log::{debug, warn};
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Full content of a record after a change; `lobby` is `None` once deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEvent {
    pub lobby_id: LobbyId,
    pub lobby: Option<Lobby>,
}

/// What a transaction decided to do with the record it was handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation<T> {
    /// Discard the working copy.
    Unchanged(T),
    /// Commit the working copy.
    Changed(T),
    /// Remove the record.
    Delete(T),
}

struct Entry {
    seq: u64,
    lobby: Lobby,
}

#[derive(Default)]
struct Records {
    entries: HashMap<LobbyId, Entry>,
    next_seq: u64,
}

/// The store already holds as many lobbies as it is allowed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no room for more than {0} lobbies")]
pub struct LimitReached(pub usize);

impl From<LimitReached> for LobbyError {
    fn from(value: LimitReached) -> Self {
        LobbyError::Write(value.to_string())
    }
}

pub struct LobbyStore {
    records: Mutex<Records>,
    events: broadcast::Sender<StoreEvent>,
    max_lobbies: usize,
}

impl LobbyStore {
    pub fn new(event_capacity: usize) -> Self {
        let (events, _rx) = broadcast::channel(event_capacity.max(1));
        Self {
            records: Mutex::new(Records::default()),
            events,
            max_lobbies: usize::MAX,
        }
    }

    /// Caps how many lobbies may exist at once.
    pub fn with_limit(mut self, max_lobbies: usize) -> Self {
        self.max_lobbies = max_lobbies;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Inserts a lobby seating `host`, with a server-assigned id and timestamp.
    pub async fn create(
        &self,
        settings: NewLobby,
        host: Player,
        max_players: u8,
    ) -> Result<Lobby, LimitReached> {
        let mut records = self.records.lock().await;
        if records.entries.len() >= self.max_lobbies {
            warn!("refusing lobby '{}', store is full", settings.name);
            return Err(LimitReached(self.max_lobbies));
        }
        let lobby = Lobby::new(Uuid::new_v4(), settings, host, max_players, now_millis());
        let seq = records.next_seq;
        records.next_seq += 1;
        records.entries.insert(
            lobby.id,
            Entry {
                seq,
                lobby: lobby.clone(),
            },
        );
        self.publish(lobby.id, Some(lobby.clone()));
        Ok(lobby)
    }

    pub async fn get(&self, id: LobbyId) -> Option<Lobby> {
        let records = self.records.lock().await;
        records.entries.get(&id).map(|entry| entry.lobby.clone())
    }

    /// All lobbies, newest first.
    pub async fn list(&self) -> Vec<Lobby> {
        let records = self.records.lock().await;
        let mut entries: Vec<&Entry> = records.entries.values().collect();
        entries.sort_by(|a, b| {
            (b.lobby.created_at, b.seq).cmp(&(a.lobby.created_at, a.seq))
        });
        entries.into_iter().map(|entry| entry.lobby.clone()).collect()
    }

    /// Atomic read-modify-write of one record.
    ///
    /// `f` works on a copy; the copy is only written back when it returns
    /// [`Mutation::Changed`]. Returns `None` if the record does not exist.
    pub async fn update<T>(
        &self,
        id: LobbyId,
        f: impl FnOnce(&mut Lobby) -> Mutation<T>,
    ) -> Option<T> {
        let mut records = self.records.lock().await;
        let entry = records.entries.get_mut(&id)?;
        let mut working = entry.lobby.clone();

        match f(&mut working) {
            Mutation::Unchanged(out) => Some(out),
            Mutation::Changed(out) => {
                entry.lobby = working.clone();
                self.publish(id, Some(working));
                Some(out)
            }
            Mutation::Delete(out) => {
                records.entries.remove(&id);
                self.publish(id, None);
                Some(out)
            }
        }
    }

    fn publish(&self, lobby_id: LobbyId, lobby: Option<Lobby>) {
        // No receivers just means nobody is connected.
        if self.events.send(StoreEvent { lobby_id, lobby }).is_err() {
            debug!("no subscribers for change to lobby {lobby_id}");
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
