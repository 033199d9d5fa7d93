//! Seating players in lobbies. Both directions are single atomic
//! transactions against the latest record.

use common::{http::Identity, Lobby, LobbyError, LobbyId, NewLobby};
use log::info;

use crate::store::{LobbyStore, Mutation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyMember,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    Left,
    /// The host left, the lobby is gone.
    Closed,
    NotMember,
    NotFound,
}

pub async fn create(
    store: &LobbyStore,
    host: &Identity,
    settings: NewLobby,
    max_players: u8,
) -> Result<Lobby, LobbyError> {
    let settings = settings.validate()?;
    let lobby = store.create(settings, host.to_player(), max_players).await?;
    info!("{} created lobby '{}' ({})", host.name(), lobby.name, lobby.id);
    Ok(lobby)
}

pub async fn join(
    store: &LobbyStore,
    lobby_id: LobbyId,
    player: &Identity,
) -> Result<JoinOutcome, LobbyError> {
    let outcome = store
        .update(lobby_id, |lobby| {
            if lobby.is_member(player.id) {
                Mutation::Unchanged(Ok(JoinOutcome::AlreadyMember))
            } else if lobby.is_full() {
                Mutation::Unchanged(Err(LobbyError::Full {
                    max_players: lobby.max_players,
                }))
            } else {
                lobby.union_player(player.to_player());
                Mutation::Changed(Ok(JoinOutcome::Joined))
            }
        })
        .await
        .ok_or(LobbyError::NotFound)??;

    if outcome == JoinOutcome::Joined {
        info!("{} joined lobby {lobby_id}", player.name());
    }
    Ok(outcome)
}

/// The host leaving deletes the lobby, anyone else is just removed.
pub async fn leave(store: &LobbyStore, lobby_id: LobbyId, player: &Identity) -> LeaveOutcome {
    let outcome = store
        .update(lobby_id, |lobby| {
            if lobby.is_host(player.id) {
                Mutation::Delete(LeaveOutcome::Closed)
            } else if lobby.remove_player(player.id) {
                Mutation::Changed(LeaveOutcome::Left)
            } else {
                Mutation::Unchanged(LeaveOutcome::NotMember)
            }
        })
        .await
        .unwrap_or(LeaveOutcome::NotFound);

    match outcome {
        LeaveOutcome::Left => info!("{} left lobby {lobby_id}", player.name()),
        LeaveOutcome::Closed => info!("host {} closed lobby {lobby_id}", player.name()),
        LeaveOutcome::NotMember | LeaveOutcome::NotFound => {}
    }
    outcome
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use common::NameError;
    use uuid::Uuid;

    use super::*;

    fn identity(name: &str) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            display_name: name.to_string(),
            email: None,
            avatar_url: None,
        }
    }

    fn settings(name: &str) -> NewLobby {
        NewLobby {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_validates_the_name() {
        let store = LobbyStore::new(16);
        let host = identity("alice");
        assert_eq!(
            create(&store, &host, settings(""), 6).await,
            Err(LobbyError::InvalidName(NameError::Empty))
        );
        assert!(store.list().await.is_empty());

        let lobby = create(&store, &host, settings("Friday Game"), 6).await.unwrap();
        assert_eq!(store.list().await, vec![lobby]);
    }

    #[tokio::test]
    async fn create_reports_a_full_store_as_a_write_failure() {
        let store = LobbyStore::new(16).with_limit(1);
        let host = identity("alice");
        create(&store, &host, settings("first"), 6).await.unwrap();

        let err = create(&store, &host, settings("second"), 6).await.unwrap_err();
        assert!(matches!(err, LobbyError::Write(_)));
        assert_eq!(err.title(), "Write failed");
    }

    #[tokio::test]
    async fn joining_twice_seats_once() {
        let store = LobbyStore::new(16);
        let lobby = create(&store, &identity("alice"), settings("x"), 6).await.unwrap();
        let bob = identity("bob");

        assert_eq!(join(&store, lobby.id, &bob).await, Ok(JoinOutcome::Joined));
        assert_eq!(join(&store, lobby.id, &bob).await, Ok(JoinOutcome::AlreadyMember));

        let lobby = store.get(lobby.id).await.unwrap();
        assert_eq!(lobby.players.iter().filter(|p| p.id == bob.id).count(), 1);
        assert_eq!(lobby.player_count(), 2);
    }

    #[tokio::test]
    async fn join_respects_capacity() {
        let store = LobbyStore::new(16);
        let lobby = create(&store, &identity("alice"), settings("x"), 2).await.unwrap();

        assert_eq!(join(&store, lobby.id, &identity("bob")).await, Ok(JoinOutcome::Joined));
        assert_eq!(
            join(&store, lobby.id, &identity("carol")).await,
            Err(LobbyError::Full { max_players: 2 })
        );
    }

    #[tokio::test]
    async fn join_unknown_lobby() {
        let store = LobbyStore::new(16);
        assert_eq!(
            join(&store, Uuid::new_v4(), &identity("bob")).await,
            Err(LobbyError::NotFound)
        );
    }

    #[tokio::test]
    async fn concurrent_joins_never_overbook() {
        let store = Arc::new(LobbyStore::new(64));
        let lobby_id = create(&store, &identity("host"), settings("x"), 6)
            .await
            .unwrap()
            .id;

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let player = identity(&format!("p{i}"));
                    join(&store, lobby_id, &player).await
                })
            })
            .collect();

        let mut joined = 0;
        for handle in handles {
            if handle.await.unwrap() == Ok(JoinOutcome::Joined) {
                joined += 1;
            }
        }
        assert_eq!(joined, 5);
        assert_eq!(store.get(lobby_id).await.unwrap().player_count(), 6);
    }

    #[tokio::test]
    async fn non_host_leave_keeps_the_lobby() {
        let store = LobbyStore::new(16);
        let lobby = create(&store, &identity("alice"), settings("x"), 6).await.unwrap();
        let bob = identity("bob");
        join(&store, lobby.id, &bob).await.unwrap();

        assert_eq!(leave(&store, lobby.id, &bob).await, LeaveOutcome::Left);
        let after = store.get(lobby.id).await.unwrap();
        assert!(!after.is_member(bob.id));
        assert_eq!(after.player_count(), 1);

        assert_eq!(leave(&store, lobby.id, &bob).await, LeaveOutcome::NotMember);
    }

    #[tokio::test]
    async fn host_leave_deletes_the_lobby() {
        let store = LobbyStore::new(16);
        let alice = identity("alice");
        let lobby = create(&store, &alice, settings("x"), 6).await.unwrap();
        join(&store, lobby.id, &identity("bob")).await.unwrap();

        assert_eq!(leave(&store, lobby.id, &alice).await, LeaveOutcome::Closed);
        assert_eq!(store.get(lobby.id).await, None);
        assert_eq!(leave(&store, lobby.id, &alice).await, LeaveOutcome::NotFound);
    }

    #[tokio::test]
    async fn host_is_keyed_by_id_not_name() {
        let store = LobbyStore::new(16);
        let lobby = create(&store, &identity("alice"), settings("x"), 6).await.unwrap();
        let impostor = identity("alice");
        join(&store, lobby.id, &impostor).await.unwrap();

        assert_eq!(leave(&store, lobby.id, &impostor).await, LeaveOutcome::Left);
        assert!(store.get(lobby.id).await.is_some());
    }
}
