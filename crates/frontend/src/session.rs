//! The signed-in identity of this tab, shared with every view through a yew
//! context. The token lives in `sessionStorage` so it dies with the tab.

use common::http::{Identity, SessionToken};
use log::warn;
use wasm_bindgen_futures::spawn_local;
use web_sys::Storage;
use yew::prelude::*;

use crate::api;

const STORAGE_KEY: &str = "lobby.session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// Stored token not yet checked with the server.
    Pending,
    SignedOut,
    SignedIn {
        token: SessionToken,
        identity: Identity,
    },
}

impl Session {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::SignedIn { identity, .. } => Some(identity),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<SessionToken> {
        match self {
            Session::SignedIn { token, .. } => Some(*token),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub session: Session,
    set: Callback<Session>,
}

impl SessionContext {
    pub fn sign_in(&self, token: SessionToken, identity: Identity) {
        store_token(Some(token));
        self.set.emit(Session::SignedIn { token, identity });
    }

    pub fn sign_out(&self) {
        if let Some(token) = self.session.token() {
            spawn_local(async move {
                if let Err(err) = api::logout(token).await {
                    warn!("error signing out: {err}");
                }
            });
        }
        store_token(None);
        self.set.emit(Session::SignedOut);
    }
}

fn storage() -> Option<Storage> {
    web_sys::window()?.session_storage().ok()?
}

fn load_token() -> Option<SessionToken> {
    storage()?.get_item(STORAGE_KEY).ok()??.parse().ok()
}

fn store_token(token: Option<SessionToken>) {
    let Some(storage) = storage() else {
        warn!("session storage unavailable");
        return;
    };
    let result = match token {
        Some(token) => storage.set_item(STORAGE_KEY, &token.to_string()),
        None => storage.remove_item(STORAGE_KEY),
    };
    if let Err(err) = result {
        warn!("error writing session storage: {err:?}");
    }
}

#[derive(Properties, PartialEq)]
pub struct Props {
    pub children: Children,
}

pub struct SessionProvider {
    session: Session,
    set: Callback<Session>,
}

pub enum Msg {
    Set(Session),
}

impl Component for SessionProvider {
    type Message = Msg;
    type Properties = Props;

    fn create(ctx: &Context<Self>) -> Self {
        let session = match load_token() {
            Some(token) => {
                ctx.link().send_future(async move {
                    match api::resolve_session(token).await {
                        Ok(Some(identity)) => Msg::Set(Session::SignedIn { token, identity }),
                        Ok(None) => {
                            store_token(None);
                            Msg::Set(Session::SignedOut)
                        }
                        Err(err) => {
                            warn!("error resolving session: {err}");
                            Msg::Set(Session::SignedOut)
                        }
                    }
                });
                Session::Pending
            }
            None => Session::SignedOut,
        };

        Self {
            session,
            set: ctx.link().callback(Msg::Set),
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Set(session) => {
                let changed = self.session != session;
                self.session = session;
                changed
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let context = SessionContext {
            session: self.session.clone(),
            set: self.set.clone(),
        };
        html! {
            <ContextProvider<SessionContext> {context}>
                { ctx.props().children.clone() }
            </ContextProvider<SessionContext>>
        }
    }
}
