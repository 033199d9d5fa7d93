//! What the lobby room shows, driven by snapshots from the server.

use common::{Lobby, LobbyError, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomView {
    /// Waiting for the first snapshot.
    Loading,
    Active(Lobby),
    /// The lobby was deleted while we were in it.
    HostLeft,
    /// The lobby did not exist when we arrived.
    Missing,
    /// We left on our own.
    Departed,
}

/// Something the view has to do in response to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomEffect {
    /// Send `JoinLobby` for this room.
    Join,
    /// Navigate back to the lobby list.
    ReturnToList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub view: RoomView,
    /// A `JoinLobby` is in flight.
    pub join_pending: bool,
    /// The server confirmed this connection joined.
    pub seated: bool,
    /// Last join failure. Joins are not retried once one fails.
    pub join_error: Option<LobbyError>,
}

impl Default for Room {
    fn default() -> Self {
        Self {
            view: RoomView::Loading,
            join_pending: false,
            seated: false,
            join_error: None,
        }
    }
}

impl Room {
    /// Replaces the record with the latest snapshot.
    pub fn on_snapshot(&mut self, lobby: Option<Lobby>, me: PlayerId) -> Option<RoomEffect> {
        if matches!(
            self.view,
            RoomView::HostLeft | RoomView::Missing | RoomView::Departed
        ) {
            return None;
        }

        let Some(lobby) = lobby else {
            // A deleted lobby holds no seats.
            self.join_pending = false;
            self.seated = false;
            if self.view == RoomView::Loading {
                self.view = RoomView::Missing;
                return Some(RoomEffect::ReturnToList);
            }
            self.view = RoomView::HostLeft;
            return None;
        };

        let member = lobby.is_member(me);
        self.view = RoomView::Active(lobby);
        if self.seated && member {
            self.join_pending = false;
            return None;
        }
        // Members still join once so the server ties this connection to the
        // lobby; the server treats it as a no-op.
        if self.join_pending || self.join_error.is_some() {
            return None;
        }
        self.join_pending = true;
        Some(RoomEffect::Join)
    }

    pub fn on_joined(&mut self) {
        self.join_pending = false;
        self.seated = true;
    }

    pub fn on_join_error(&mut self, error: LobbyError) {
        self.join_pending = false;
        self.join_error = Some(error);
    }

    /// Marks the room as left. Returns whether the server has to be told.
    pub fn depart(&mut self) -> bool {
        let joined = self.seated || self.join_pending;
        self.view = RoomView::Departed;
        self.seated = false;
        self.join_pending = false;
        joined
    }

    pub fn lobby(&self) -> Option<&Lobby> {
        match &self.view {
            RoomView::Active(lobby) => Some(lobby),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use common::{NewLobby, Player};
    use uuid::Uuid;

    use super::*;

    fn player(name: &str) -> Player {
        Player {
            id: Uuid::from_u128(name.bytes().map(u128::from).sum()),
            name: name.to_string(),
            avatar: None,
        }
    }

    fn lobby_hosted_by(host: &Player) -> Lobby {
        let settings = NewLobby {
            name: "Friday Game".to_string(),
            ..Default::default()
        };
        Lobby::new(Uuid::from_u128(1 << 64), settings, host.clone(), 6, 0)
    }

    #[test]
    fn newcomer_joins_once() {
        let host = player("alice");
        let me = player("bob");
        let mut lobby = lobby_hosted_by(&host);
        let mut room = Room::default();

        assert_eq!(room.on_snapshot(Some(lobby.clone()), me.id), Some(RoomEffect::Join));
        assert!(room.join_pending);
        // More snapshots before the join lands do not send it again.
        assert_eq!(room.on_snapshot(Some(lobby.clone()), me.id), None);

        lobby.union_player(me.clone());
        assert_eq!(room.on_snapshot(Some(lobby.clone()), me.id), None);
        room.on_joined();
        assert!(!room.join_pending);
        assert_eq!(room.on_snapshot(Some(lobby.clone()), me.id), None);
        assert_eq!(room.lobby(), Some(&lobby));
    }

    #[test]
    fn host_claims_its_seat_on_arrival() {
        let host = player("alice");
        let lobby = lobby_hosted_by(&host);
        let mut room = Room::default();

        assert_eq!(room.on_snapshot(Some(lobby.clone()), host.id), Some(RoomEffect::Join));
        room.on_joined();
        assert_eq!(room.on_snapshot(Some(lobby), host.id), None);
    }

    #[test]
    fn removed_player_rejoins() {
        let host = player("alice");
        let me = player("bob");
        let mut lobby = lobby_hosted_by(&host);
        lobby.union_player(me.clone());
        let mut room = Room::default();

        room.on_snapshot(Some(lobby.clone()), me.id);
        room.on_joined();

        lobby.remove_player(me.id);
        assert_eq!(room.on_snapshot(Some(lobby), me.id), Some(RoomEffect::Join));
    }

    #[test]
    fn failed_joins_are_not_retried() {
        let host = player("alice");
        let me = player("bob");
        let lobby = lobby_hosted_by(&host);
        let mut room = Room::default();

        room.on_snapshot(Some(lobby.clone()), me.id);
        room.on_join_error(LobbyError::Full { max_players: 6 });

        assert_eq!(room.on_snapshot(Some(lobby), me.id), None);
        assert_eq!(room.join_error, Some(LobbyError::Full { max_players: 6 }));
    }

    #[test]
    fn deleted_lobby_means_host_left_without_redirect() {
        let host = player("alice");
        let me = player("bob");
        let mut room = Room::default();

        room.on_snapshot(Some(lobby_hosted_by(&host)), me.id);
        assert_eq!(room.on_snapshot(None, me.id), None);
        assert_eq!(room.view, RoomView::HostLeft);
        assert_eq!(room.lobby(), None);
        // Nothing left to leave on the server.
        assert!(!room.depart());
    }

    #[test]
    fn unknown_lobby_returns_to_list() {
        let mut room = Room::default();
        assert_eq!(
            room.on_snapshot(None, Uuid::from_u128(7)),
            Some(RoomEffect::ReturnToList)
        );
        assert_eq!(room.view, RoomView::Missing);
    }

    #[test]
    fn snapshots_after_leaving_are_ignored() {
        let host = player("alice");
        let mut room = Room::default();

        room.on_snapshot(Some(lobby_hosted_by(&host)), host.id);
        room.on_joined();
        assert!(room.depart());
        assert_eq!(room.on_snapshot(None, host.id), None);
        assert_eq!(room.view, RoomView::Departed);
        assert!(!room.depart());
    }
}
