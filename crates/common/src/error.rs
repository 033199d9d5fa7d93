use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lobby::MAX_LOBBY_NAME_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Deserialize, Serialize)]
pub enum NameError {
    #[error("lobby name is required")]
    Empty,

    #[error("lobby name is longer than {} characters", MAX_LOBBY_NAME_LEN)]
    TooLong,
}

/// Every failure a client can be told about, one variant per kind so the UI
/// can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Error, Deserialize, Serialize)]
pub enum LobbyError {
    #[error("not signed in")]
    Unauthenticated,

    #[error("sign-in failed: {0}")]
    SignIn(String),

    #[error(transparent)]
    InvalidName(#[from] NameError),

    #[error("lobby does not exist")]
    NotFound,

    #[error("lobby is full ({max_players} players)")]
    Full { max_players: u8 },

    #[error("{0}")]
    Conflict(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl LobbyError {
    /// Short heading for the kind of failure.
    pub fn title(&self) -> &'static str {
        match self {
            LobbyError::Unauthenticated | LobbyError::SignIn(_) => "Authentication failed",
            LobbyError::InvalidName(_) => "Invalid lobby name",
            LobbyError::NotFound => "Lobby not found",
            LobbyError::Full { .. } => "Lobby full",
            LobbyError::Conflict(_) => "Conflict",
            LobbyError::Write(_) => "Write failed",
            LobbyError::Protocol(_) => "Protocol error",
        }
    }
}
