use std::{fmt::Display, str::FromStr};

use common::{
    ws::{ClientMsg, ServerMsg},
    GameMap, GameMode, GameSpeed, Lobby, LobbyError, LobbyId, NameError, NewLobby,
};
use log::{info, warn};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::{context::ContextHandle, prelude::*};
use yew_router::prelude::*;

use crate::{
    api::ClientError,
    components::notice::Notice,
    session::SessionContext,
    socket::LobbyConnection,
    Route,
};

pub struct LobbyList {
    lobbies: Vec<Lobby>,
    selected: Option<LobbyId>,
    creating: bool,
    form: CreateForm,
    pending: PendingCreate,
    error: Option<ClientError>,
    connection: Option<LobbyConnection>,
    session: Option<SessionContext>,
    _handle: Option<ContextHandle<SessionContext>>,
}

#[derive(Default)]
struct CreateForm {
    name: NodeRef,
    mode: NodeRef,
    map: NodeRef,
    speed: NodeRef,
}

impl CreateForm {
    fn read(&self) -> NewLobby {
        NewLobby {
            name: self
                .name
                .cast::<HtmlInputElement>()
                .map(|input| input.value())
                .unwrap_or_default(),
            mode: selected(&self.mode),
            map: selected(&self.map),
            speed: selected(&self.speed),
        }
    }
}

/// At most one `CreateLobby` in flight at a time.
#[derive(Debug, Default)]
struct PendingCreate(bool);

impl PendingCreate {
    /// The validated settings to send, or `None` while a create is in flight.
    fn submit(&mut self, form: NewLobby) -> Option<Result<NewLobby, NameError>> {
        if self.0 {
            return None;
        }
        let settings = form.validate();
        self.0 = settings.is_ok();
        Some(settings)
    }

    fn finish(&mut self) {
        self.0 = false;
    }

    fn is_pending(&self) -> bool {
        self.0
    }
}

fn selected<T: FromStr + Default>(select: &NodeRef) -> T {
    select
        .cast::<HtmlSelectElement>()
        .and_then(|select| select.value().parse().ok())
        .unwrap_or_default()
}

fn options<T: Copy + Default + PartialEq + Display>(all: &[T]) -> Html {
    all.iter()
        .map(|option| {
            html! {
                <option value={option.to_string()} selected={*option == T::default()}>
                    { option.to_string() }
                </option>
            }
        })
        .collect()
}

pub enum Msg {
    Server(ServerMsg),
    Closed,
    Select(LobbyId),
    Join,
    OpenCreate,
    CloseCreate,
    Create,
    Dismiss,
    SessionChanged(SessionContext),
}

impl LobbyList {
    fn selected_lobby(&self) -> Option<&Lobby> {
        let id = self.selected?;
        self.lobbies.iter().find(|lobby| lobby.id == id)
    }

    fn send(&self, msg: ClientMsg) {
        match &self.connection {
            Some(connection) => connection.send(msg),
            None => warn!("no connection to send {msg:?}"),
        }
    }

    fn on_server(&mut self, ctx: &Context<Self>, msg: ServerMsg) -> bool {
        match msg {
            ServerMsg::Lobbies(lobbies) => {
                self.lobbies = lobbies;
                true
            }
            ServerMsg::LobbyCreated { lobby } => {
                info!("created lobby {} ({})", lobby.name, lobby.id);
                self.pending.finish();
                self.creating = false;
                if let Some(navigator) = ctx.link().navigator() {
                    navigator.push(&Route::LobbyRoom { id: lobby.id });
                }
                true
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
            ServerMsg::Error { error, .. } => {
                self.pending.finish();
                self.error = Some(error.into());
                true
            }
            other => {
                info!("received {other:?}");
                false
            }
        }
    }

    fn view_details(&self, ctx: &Context<Self>) -> Html {
        let Some(lobby) = self.selected_lobby() else {
            return html! { <p class="details">{"Select a lobby to see its details."}</p> };
        };
        html! {
            <div class="details">
                <h3>{ lobby.name.clone() }</h3>
                <dl>
                    <dt>{"Host"}</dt><dd>{ lobby.host_name.clone() }</dd>
                    <dt>{"Mode"}</dt><dd>{ lobby.mode.label() }</dd>
                    <dt>{"Map"}</dt><dd>{ lobby.map.label() }</dd>
                    <dt>{"Speed"}</dt><dd>{ lobby.speed.label() }</dd>
                    <dt>{"Players"}</dt><dd>{ format!("{}/{}", lobby.player_count(), lobby.max_players) }</dd>
                </dl>
                <button onclick={ctx.link().callback(|_| Msg::Join)}>{"Join Game"}</button>
            </div>
        }
    }

    fn view_create(&self, ctx: &Context<Self>) -> Html {
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Create
        });
        html! {
            <div class="modal" role="dialog">
                <h2>{"Create Lobby"}</h2>
                <form {onsubmit}>
                    <label>
                        {"Name"}
                        <input ref={self.form.name.clone()} type="text" required=true maxlength="32" />
                    </label>
                    <label>
                        {"Mode"}
                        <select ref={self.form.mode.clone()}>{ options(GameMode::ALL) }</select>
                    </label>
                    <label>
                        {"Map"}
                        <select ref={self.form.map.clone()}>{ options(GameMap::ALL) }</select>
                    </label>
                    <label>
                        {"Speed"}
                        <select ref={self.form.speed.clone()}>{ options(GameSpeed::ALL) }</select>
                    </label>
                    <button type="button" onclick={ctx.link().callback(|_| Msg::CloseCreate)}>{"Cancel"}</button>
                    <button type="submit" disabled={self.pending.is_pending()}>{"Create"}</button>
                </form>
            </div>
        }
    }
}

impl Component for LobbyList {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let (session, handle) = ctx
            .link()
            .context::<SessionContext>(ctx.link().callback(Msg::SessionChanged))
            .unzip();

        let mut error = None;
        let connection = match session.as_ref().and_then(|session| session.session.token()) {
            Some(token) => match LobbyConnection::open(
                token,
                ctx.link().callback(Msg::Server),
                ctx.link().callback(|_| Msg::Closed),
            ) {
                Ok(connection) => {
                    connection.send(ClientMsg::WatchLobbies);
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
            lobbies: Vec::new(),
            selected: None,
            creating: false,
            form: CreateForm::default(),
            pending: PendingCreate::default(),
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
                info!("lobby connection closed");
                self.pending.finish();
                self.error = Some(ClientError::Network(
                    "lost the connection to the lobby server".to_string(),
                ));
                true
            }
            Msg::Select(id) => {
                self.selected = Some(id);
                true
            }
            Msg::Join => {
                if let (Some(id), Some(navigator)) = (self.selected, ctx.link().navigator()) {
                    navigator.push(&Route::LobbyRoom { id });
                }
                false
            }
            Msg::OpenCreate => {
                self.creating = true;
                true
            }
            Msg::CloseCreate => {
                self.creating = false;
                true
            }
            Msg::Create => match self.pending.submit(self.form.read()) {
                Some(Ok(settings)) => {
                    self.send(ClientMsg::CreateLobby(settings));
                    true
                }
                Some(Err(err)) => {
                    self.error = Some(LobbyError::from(err).into());
                    true
                }
                None => false,
            },
            Msg::Dismiss => self.error.take().is_some(),
            Msg::SessionChanged(context) => {
                self.session = Some(context);
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let rows: Html = self
            .lobbies
            .iter()
            .map(|lobby| {
                let id = lobby.id;
                let class = classes!("lobby", (self.selected == Some(id)).then_some("selected"));
                html! {
                    <li {class} onclick={ctx.link().callback(move |_| Msg::Select(id))}>
                        <span class="name">{ lobby.name.clone() }</span>
                        <span class="count">{ format!("{}/{}", lobby.player_count(), lobby.max_players) }</span>
                    </li>
                }
            })
            .collect();

        html! {
            <main class="lobby-list">
                <section>
                    <h2>{"Lobbies"}</h2>
                    <button onclick={ctx.link().callback(|_| Msg::OpenCreate)}>{"Create Lobby"}</button>
                    if self.lobbies.is_empty() {
                        <p>{"No lobbies yet."}</p>
                    } else {
                        <ul>{ rows }</ul>
                    }
                </section>
                <section>{ self.view_details(ctx) }</section>
                if self.creating {
                    { self.view_create(ctx) }
                }
                if let Some(error) = &self.error {
                    <Notice error={error.clone()} on_dismiss={ctx.link().callback(|_| Msg::Dismiss)} />
                }
            </main>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        if let Some(connection) = self.connection.take() {
            connection.send(ClientMsg::UnwatchLobbies);
        }
    }
}
