pub mod error;
pub mod http;
pub mod lobby;
pub mod ws;

pub use error::{LobbyError, NameError};
pub use lobby::{GameMap, GameMode, GameSpeed, Lobby, LobbyId, NewLobby, Player, PlayerId};
