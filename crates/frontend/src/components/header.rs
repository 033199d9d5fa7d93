use yew::prelude::*;
use yew_router::prelude::*;

use crate::{session::SessionContext, Route};

#[function_component]
pub fn Header() -> Html {
    let context = use_context::<SessionContext>();
    let identity = context
        .as_ref()
        .and_then(|context| context.session.identity().cloned());

    let account = match (identity, context) {
        (Some(identity), Some(context)) => {
            let player = identity.to_player();
            let avatar = match &player.avatar {
                Some(url) => html! { <img class="avatar" src={url.clone()} alt={player.name.clone()} /> },
                None => html! { <span class="avatar">{ player.initial().to_string() }</span> },
            };
            let sign_out = Callback::from(move |_: MouseEvent| context.sign_out());
            html! {
                <div class="account">
                    { avatar }
                    <span class="name">{ player.name }</span>
                    <button onclick={sign_out}>{"Sign out"}</button>
                </div>
            }
        }
        _ => html! {
            <Link<Route> to={Route::Login}>{"Login"}</Link<Route>>
        },
    };

    html! {
        <header>
            <h1 class="title">{"5-6 Player Catan"}</h1>
            <nav>
                <Link<Route> to={Route::Home}>{"Home"}</Link<Route>>
                <Link<Route> to={Route::Lobby}>{"Lobby"}</Link<Route>>
            </nav>
            { account }
        </header>
    }
}
