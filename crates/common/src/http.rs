use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::LobbyError,
    lobby::{Player, PlayerId},
};

pub type SessionToken = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoginRequest {
    pub display_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoginResponse {
    pub session: SessionToken,
    pub identity: Identity,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: LobbyError,
}

/// Who is signed in on a session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Identity {
    pub id: PlayerId,
    pub display_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

impl Identity {
    pub fn name(&self) -> &str {
        match (&self.display_name[..], &self.email) {
            ("", Some(email)) if !email.is_empty() => email,
            ("", _) => "Unknown",
            (name, _) => name,
        }
    }

    /// The roster entry for this identity.
    pub fn to_player(&self) -> Player {
        Player {
            id: self.id,
            name: self.name().to_string(),
            avatar: self.avatar_url.clone().filter(|url| !url.is_empty()),
        }
    }
}
