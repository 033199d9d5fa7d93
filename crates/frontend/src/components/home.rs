use yew::prelude::*;
use yew_router::prelude::*;

use crate::Route;

#[function_component]
pub fn Home() -> Html {
    html! {
        <main class="home">
            <h1>{"5-6 Player Catan"}</h1>
            <p>{"Settle the island with up to six friends. Pick a mode, a map and a pace, then wait for the table to fill."}</p>
            <Link<Route> to={Route::Lobby} classes={classes!("button")}>{"Play Now"}</Link<Route>>
        </main>
    }
}
