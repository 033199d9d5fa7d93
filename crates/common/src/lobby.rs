use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::NameError;

pub type LobbyId = Uuid;
pub type PlayerId = Uuid;

pub const MAX_LOBBY_NAME_LEN: usize = 32;
pub const DEFAULT_MAX_PLAYERS: u8 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown option '{0}'")]
pub struct UnknownOption(String);

/// Implements `Display`/`FromStr` over the human readable labels and exposes
/// all variants in form order.
macro_rules! labelled_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = UnknownOption;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownOption(other.to_string())),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum GameMode {
    #[default]
    Base,
    KnightsAndCities,
    Seafarers,
}

labelled_enum!(GameMode {
    Base => "Base",
    KnightsAndCities => "Knights and Cities",
    Seafarers => "Seafarers",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum GameMap {
    #[default]
    Base,
    Usa,
    Europe,
    Random,
}

labelled_enum!(GameMap {
    Base => "Base",
    Usa => "USA",
    Europe => "Europe",
    Random => "Random",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum GameSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

labelled_enum!(GameSpeed {
    Slow => "Slow",
    Normal => "Normal",
    Fast => "Fast",
});

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub avatar: Option<String>,
}

impl Player {
    /// Letter shown in place of a missing avatar.
    pub fn initial(&self) -> char {
        self.name.chars().next().unwrap_or('?')
    }
}

/// Contents of the create-lobby form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewLobby {
    pub name: String,
    pub mode: GameMode,
    pub map: GameMap,
    pub speed: GameSpeed,
}

impl NewLobby {
    /// Trims the name and checks it is present and short enough.
    pub fn validate(mut self) -> Result<Self, NameError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(NameError::Empty);
        }
        if self.name.chars().count() > MAX_LOBBY_NAME_LEN {
            return Err(NameError::TooLong);
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Lobby {
    pub id: LobbyId,
    pub name: String,
    pub mode: GameMode,
    pub map: GameMap,
    pub speed: GameSpeed,
    pub max_players: u8,
    pub host: PlayerId,
    pub host_name: String,
    /// Unix milliseconds, assigned by the server.
    pub created_at: u64,
    pub players: Vec<Player>,
}

impl Lobby {
    /// A fresh lobby with `host` as its only member.
    pub fn new(id: LobbyId, settings: NewLobby, host: Player, max_players: u8, created_at: u64) -> Self {
        Self {
            id,
            name: settings.name,
            mode: settings.mode,
            map: settings.map,
            speed: settings.speed,
            max_players,
            host: host.id,
            host_name: host.name.clone(),
            created_at,
            players: vec![host],
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= usize::from(self.max_players)
    }

    pub fn is_member(&self, player: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == player)
    }

    pub fn is_host(&self, player: PlayerId) -> bool {
        self.host == player
    }

    /// Appends `player` unless a player with the same id is already seated.
    /// Returns whether the roster changed.
    pub fn union_player(&mut self, player: Player) -> bool {
        if self.is_member(player.id) {
            return false;
        }
        self.players.push(player);
        true
    }

    /// Removes every roster entry with the given id. Returns whether the
    /// roster changed.
    pub fn remove_player(&mut self, player: PlayerId) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != player);
        self.players.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str) -> Player {
        Player {
            id: Uuid::new_v4(),
            name: name.to_string(),
            avatar: None,
        }
    }

    fn lobby(host: Player) -> Lobby {
        let settings = NewLobby {
            name: "Friday Game".to_string(),
            mode: GameMode::Base,
            map: GameMap::Europe,
            speed: GameSpeed::Fast,
        };
        Lobby::new(Uuid::new_v4(), settings, host, DEFAULT_MAX_PLAYERS, 0)
    }

    #[test]
    fn validate_trims_and_rejects_blank_names() {
        let form = NewLobby {
            name: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(form.validate(), Err(NameError::Empty));

        let form = NewLobby {
            name: "  Friday Game ".to_string(),
            ..Default::default()
        };
        assert_eq!(form.validate().unwrap().name, "Friday Game");
    }

    #[test]
    fn validate_counts_characters_not_bytes() {
        let ok = NewLobby {
            name: "ä".repeat(MAX_LOBBY_NAME_LEN),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let too_long = NewLobby {
            name: "a".repeat(MAX_LOBBY_NAME_LEN + 1),
            ..Default::default()
        };
        assert_eq!(too_long.validate(), Err(NameError::TooLong));
    }

    #[test]
    fn new_lobby_seats_the_host() {
        let host = player("alice");
        let lobby = lobby(host.clone());
        assert_eq!(lobby.players, vec![host.clone()]);
        assert!(lobby.is_host(host.id));
        assert_eq!(lobby.host_name, "alice");
        assert_eq!(lobby.player_count(), 1);
    }

    #[test]
    fn union_is_idempotent() {
        let mut lobby = lobby(player("alice"));
        let bob = player("bob");
        assert!(lobby.union_player(bob.clone()));
        assert!(!lobby.union_player(bob.clone()));
        assert_eq!(lobby.player_count(), 2);
        assert_eq!(lobby.players[1], bob);
    }

    #[test]
    fn remove_keeps_insertion_order() {
        let mut lobby = lobby(player("alice"));
        let bob = player("bob");
        let carol = player("carol");
        lobby.union_player(bob.clone());
        lobby.union_player(carol.clone());

        assert!(lobby.remove_player(bob.id));
        assert!(!lobby.remove_player(bob.id));
        let names: Vec<_> = lobby.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["alice", "carol"]);
    }

    #[test]
    fn full_at_cap() {
        let mut lobby = lobby(player("alice"));
        lobby.max_players = 2;
        assert!(!lobby.is_full());
        lobby.union_player(player("bob"));
        assert!(lobby.is_full());
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for mode in GameMode::ALL {
            assert_eq!(mode.label().parse::<GameMode>().unwrap(), *mode);
        }
        assert_eq!("USA".parse::<GameMap>().unwrap(), GameMap::Usa);
        assert!("Moon".parse::<GameMap>().is_err());
        assert_eq!(GameSpeed::default(), GameSpeed::Normal);
    }
}
