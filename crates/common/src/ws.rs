use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    error::LobbyError,
    http::{Identity, SessionToken},
    lobby::{Lobby, LobbyId, NewLobby},
};

#[cfg(feature = "axum")]
pub mod axum;
#[cfg(feature = "reqwasm")]
pub mod reqwasm;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum ServerMsg {
    Authenticated {
        identity: Identity,
    },
    /// Every lobby, newest first.
    Lobbies(Vec<Lobby>),
    /// Current content of a watched lobby; `None` once it is deleted.
    LobbySnapshot {
        lobby_id: LobbyId,
        lobby: Option<Lobby>,
    },
    LobbyCreated {
        lobby: Lobby,
    },
    Joined {
        lobby_id: LobbyId,
    },
    Left {
        lobby_id: LobbyId,
    },
    Error {
        lobby_id: Option<LobbyId>,
        error: LobbyError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum ClientMsg {
    /// Must be the first frame on a connection.
    Authenticate { session: SessionToken },
    WatchLobbies,
    UnwatchLobbies,
    WatchLobby { lobby_id: LobbyId },
    UnwatchLobby { lobby_id: LobbyId },
    CreateLobby(NewLobby),
    JoinLobby { lobby_id: LobbyId },
    LeaveLobby { lobby_id: LobbyId },
}

#[derive(Debug, Error)]
pub enum TryFromError {
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("invalid message type of message '{0}'")]
    InvalidMessageType(String),
}

#[cfg_attr(not(any(feature = "axum", feature = "reqwasm")), allow(dead_code))]
fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, TryFromError> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::lobby::{GameMap, GameSpeed};

    #[test]
    fn client_frames_are_tagged_json() {
        let msg = ClientMsg::CreateLobby(NewLobby {
            name: "Friday Game".to_string(),
            map: GameMap::Europe,
            speed: GameSpeed::Fast,
            ..Default::default()
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.starts_with(r#"{"CreateLobby":"#));
        assert_eq!(decode::<ClientMsg>(json.as_bytes()).unwrap(), msg);
    }

    #[test]
    fn missing_lobby_snapshot_is_null() {
        let lobby_id = Uuid::nil();
        let msg = ServerMsg::LobbySnapshot {
            lobby_id,
            lobby: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"LobbySnapshot":{"lobby_id":"00000000-0000-0000-0000-000000000000","lobby":null}}"#
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            decode::<ClientMsg>(b"{\"Dance\":{}}"),
            Err(TryFromError::SerdeJsonError(_))
        ));
    }
}
