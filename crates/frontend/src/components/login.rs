use common::http::{LoginRequest, LoginResponse};
use log::{info, warn};
use web_sys::HtmlInputElement;
use yew::{context::ContextHandle, prelude::*};
use yew_router::prelude::*;

use crate::{
    api::{self, ClientError},
    components::notice::Notice,
    session::SessionContext,
    Route,
};

pub struct Login {
    display_name: NodeRef,
    email: NodeRef,
    avatar_url: NodeRef,
    submitting: bool,
    error: Option<ClientError>,
    session: Option<SessionContext>,
    _handle: Option<ContextHandle<SessionContext>>,
}

pub enum Msg {
    Submit,
    SignedIn(LoginResponse),
    Failed(ClientError),
    Dismiss,
    SessionChanged(SessionContext),
}

impl Login {
    fn request(&self) -> LoginRequest {
        LoginRequest {
            display_name: value_of(&self.display_name).unwrap_or_default(),
            email: value_of(&self.email),
            avatar_url: value_of(&self.avatar_url),
        }
    }
}

/// Trimmed value of an input, `None` when blank.
fn value_of(input: &NodeRef) -> Option<String> {
    let value = input.cast::<HtmlInputElement>()?.value();
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl Component for Login {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let (session, handle) = ctx
            .link()
            .context::<SessionContext>(ctx.link().callback(Msg::SessionChanged))
            .unzip();

        Self {
            display_name: NodeRef::default(),
            email: NodeRef::default(),
            avatar_url: NodeRef::default(),
            submitting: false,
            error: None,
            session,
            _handle: handle,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Submit => {
                if self.submitting {
                    return false;
                }
                self.submitting = true;
                let request = self.request();
                ctx.link().send_future(async move {
                    match api::login(&request).await {
                        Ok(response) => Msg::SignedIn(response),
                        Err(err) => Msg::Failed(err),
                    }
                });
                true
            }
            Msg::SignedIn(LoginResponse { session, identity }) => {
                self.submitting = false;
                let Some(context) = &self.session else {
                    warn!("signed in without a session provider");
                    return false;
                };
                info!("signed in as {}", identity.name());
                context.sign_in(session, identity);
                if let Some(navigator) = ctx.link().navigator() {
                    navigator.push(&Route::Lobby);
                }
                false
            }
            Msg::Failed(err) => {
                info!("sign in failed: {err}");
                self.submitting = false;
                self.error = Some(err);
                true
            }
            Msg::Dismiss => self.error.take().is_some(),
            Msg::SessionChanged(context) => {
                self.session = Some(context);
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });

        html! {
            <main class="login">
                <h2>{"Sign in"}</h2>
                <form {onsubmit}>
                    <label>
                        {"Display name"}
                        <input ref={self.display_name.clone()} type="text" required=true maxlength="32" />
                    </label>
                    <label>
                        {"Email (optional)"}
                        <input ref={self.email.clone()} type="email" />
                    </label>
                    <label>
                        {"Avatar URL (optional)"}
                        <input ref={self.avatar_url.clone()} type="url" />
                    </label>
                    <button type="submit" disabled={self.submitting}>{"Sign in"}</button>
                </form>
                if let Some(error) = &self.error {
                    <Notice error={error.clone()} on_dismiss={ctx.link().callback(|_| Msg::Dismiss)} />
                }
            </main>
        }
    }
}
