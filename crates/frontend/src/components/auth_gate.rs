use log::warn;
use yew::{context::ContextHandle, prelude::*};
use yew_router::prelude::*;

use crate::{
    session::{Session, SessionContext},
    Route,
};

#[derive(Properties, PartialEq)]
pub struct Props {
    pub children: Children,
}

/// Renders its children only for a signed-in session.
pub struct AuthGate {
    session: Session,
    _handle: Option<ContextHandle<SessionContext>>,
}

pub enum Msg {
    SessionChanged(SessionContext),
}

impl Component for AuthGate {
    type Message = Msg;
    type Properties = Props;

    fn create(ctx: &Context<Self>) -> Self {
        let subscription = ctx
            .link()
            .context::<SessionContext>(ctx.link().callback(Msg::SessionChanged));
        match subscription {
            Some((context, handle)) => Self {
                session: context.session,
                _handle: Some(handle),
            },
            None => {
                warn!("auth gate rendered outside a session provider");
                Self {
                    session: Session::SignedOut,
                    _handle: None,
                }
            }
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SessionChanged(context) => {
                let changed = self.session != context.session;
                self.session = context.session;
                changed
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        match self.session {
            Session::Pending => html! {},
            Session::SignedOut => html! { <Redirect<Route> to={Route::Login} /> },
            Session::SignedIn { .. } => html! { <>{ ctx.props().children.clone() }</> },
        }
    }
}
