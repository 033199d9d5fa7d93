use common::{
    ws::{ClientMsg, ServerMsg},
    Lobby, LobbyError, LobbyId, Player, PlayerId,
};
use log::{info, warn};
use yew::{context::ContextHandle, prelude::*};
use yew_router::prelude::*;

use crate::{
    api::ClientError,
    components::notice::Notice,
    room_state::{Room, RoomEffect, RoomView},
    session::SessionContext,
    socket::LobbyConnection,
    Route,
};

#[derive(Properties, PartialEq)]
pub struct Props {
    pub id: LobbyId,
}

pub struct LobbyRoom {
    room: Room,
    me: Option<PlayerId>,
    error: Option<ClientError>,
    connection: Option<LobbyConnection>,
    session: Option<SessionContext>,
    _handle: Option<ContextHandle<SessionContext>>,
}

pub enum Msg {
    Server(ServerMsg),
    Closed,
    Leave,
    BackToList,
    Dismiss,
    SessionChanged(SessionContext),
}

impl LobbyRoom {
    fn send(&self, msg: ClientMsg) {
        match &self.connection {
            Some(connection) => connection.send(msg),
            None => warn!("no connection to send {msg:?}"),
        }
    }

    /// Leaves the lobby on the server, if we ever joined it.
    fn depart(&mut self, id: LobbyId) {
        if self.room.depart() {
            self.send(ClientMsg::LeaveLobby { lobby_id: id });
        }
    }

    fn on_server(&mut self, ctx: &Context<Self>, msg: ServerMsg) -> bool {
        let id = ctx.props().id;
        match msg {
            ServerMsg::LobbySnapshot { lobby_id, lobby } if lobby_id == id => {
                let Some(me) = self.me else {
                    return false;
                };
                match self.room.on_snapshot(lobby, me) {
                    Some(RoomEffect::Join) => self.send(ClientMsg::JoinLobby { lobby_id: id }),
                    Some(RoomEffect::ReturnToList) => {
                        info!("lobby {id} does not exist, going back to the list");
                        if let Some(navigator) = ctx.link().navigator() {
                            navigator.replace(&Route::Lobby);
                        }
                    }
                    None => {}
                }
                true
            }
            ServerMsg::Joined { lobby_id } if lobby_id == id => {
                self.room.on_joined();
                false
            }
            ServerMsg::Error {
                error: LobbyError::Unauthenticated,
                ..
            } => {
                info!("session rejected, signing out");
                if let Some(session) = &self.session {
                    session.sign_out();
                }
                false
            }
            ServerMsg::Error { lobby_id, error } => {
                if lobby_id == Some(id) && self.room.join_pending {
                    self.room.on_join_error(error.clone());
                }
                self.error = Some(error.into());
                true
            }
            other => {
                info!("received {other:?}");
                false
            }
        }
    }

    fn view_lobby(&self, ctx: &Context<Self>, lobby: &Lobby) -> Html {
        let roster: Html = lobby
            .players
            .iter()
            .map(|player| view_player(lobby, player))
            .collect();

        html! {
            <>
                <h2>{ lobby.name.clone() }</h2>
                <p class="host">{ hosted_by(lobby) }</p>
                <dl class="settings">
                    <dt>{"Mode"}</dt><dd>{ lobby.mode.label() }</dd>
                    <dt>{"Map"}</dt><dd>{ lobby.map.label() }</dd>
                    <dt>{"Speed"}</dt><dd>{ lobby.speed.label() }</dd>
                    <dt>{"Players"}</dt><dd>{ format!("{}/{}", lobby.player_count(), lobby.max_players) }</dd>
                </dl>
                <ul class="roster">{ roster }</ul>
                <button onclick={ctx.link().callback(|_| Msg::Leave)}>{"Leave Lobby"}</button>
            </>
        }
    }
}

fn hosted_by(lobby: &Lobby) -> String {
    format!("Hosted by {}", lobby.host_name)
}

fn view_player(lobby: &Lobby, player: &Player) -> Html {
    let avatar = match &player.avatar {
        Some(url) => html! { <img class="avatar" src={url.clone()} alt={player.name.clone()} /> },
        None => html! { <span class="avatar">{ player.initial().to_string() }</span> },
    };
    html! {
        <li key={player.id.to_string()}>
            { avatar }
            <span class="name">{ player.name.clone() }</span>
            if lobby.is_host(player.id) {
                <span class="badge">{"Host"}</span>
            }
        </li>
    }
}

impl Component for LobbyRoom {
    type Message = Msg;
    type Properties = Props;

    fn create(ctx: &Context<Self>) -> Self {
        let (session, handle) = ctx
            .link()
            .context::<SessionContext>(ctx.link().callback(Msg::SessionChanged))
            .unzip();
        let me = session
            .as_ref()
            .and_then(|session| session.session.identity())
            .map(|identity| identity.id);

        let mut error = None;
        let connection = match session.as_ref().and_then(|session| session.session.token()) {
            Some(token) => match LobbyConnection::open(
                token,
                ctx.link().callback(Msg::Server),
                ctx.link().callback(|_| Msg::Closed),
            ) {
                Ok(connection) => {
                    connection.send(ClientMsg::WatchLobby {
                        lobby_id: ctx.props().id,
                    });
                    Some(connection)
                }
                Err(err) => {
                    error = Some(err);
                    None
                }
            },
            None => None,
        };

        Self {
            room: Room::default(),
            me,
            error,
            connection,
            session,
            _handle: handle,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Server(msg) => self.on_server(ctx, msg),
            Msg::Closed => {
                if self.connection.take().is_none() {
                    return false;
                }
                info!("room connection closed");
                self.error = Some(ClientError::Network(
                    "lost the connection to the lobby server".to_string(),
                ));
                true
            }
            Msg::Leave => {
                self.depart(ctx.props().id);
                if let Some(navigator) = ctx.link().navigator() {
                    navigator.push(&Route::Lobby);
                }
                true
            }
            Msg::BackToList => {
                if let Some(navigator) = ctx.link().navigator() {
                    navigator.push(&Route::Lobby);
                }
                false
            }
            Msg::Dismiss => self.error.take().is_some(),
            Msg::SessionChanged(context) => {
                self.me = context.session.identity().map(|identity| identity.id);
                self.session = Some(context);
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let content = match &self.room.view {
            RoomView::Loading => html! { <p>{"Loading lobby..."}</p> },
            RoomView::Active(lobby) => self.view_lobby(ctx, lobby),
            RoomView::HostLeft => html! {
                <div class="modal" role="alertdialog">
                    <h2>{"The host left"}</h2>
                    <p>{"This lobby was closed by its host."}</p>
                    <button onclick={ctx.link().callback(|_| Msg::BackToList)}>{"Back to lobbies"}</button>
                </div>
            },
            RoomView::Missing | RoomView::Departed => html! {},
        };

        html! {
            <main class="lobby-room">
                { content }
                if let Some(error) = &self.error {
                    <Notice error={error.clone()} on_dismiss={ctx.link().callback(|_| Msg::Dismiss)} />
                }
            </main>
        }
    }

    fn destroy(&mut self, ctx: &Context<Self>) {
        let id = ctx.props().id;
        self.depart(id);
        if let Some(connection) = self.connection.take() {
            connection.send(ClientMsg::UnwatchLobby { lobby_id: id });
        }
    }
}
