use crate::{
    components::{
        auth_gate::AuthGate, header::Header, home::Home, lobby_list::LobbyList,
        lobby_room::LobbyRoom, login::Login,
    },
    session::SessionProvider,
};
use uuid::Uuid;
use yew::prelude::*;
use yew_router::prelude::*;

mod api;
mod components;
mod redirect;
mod room_state;
mod session;
mod socket;

#[derive(Routable, PartialEq, Eq, Clone, Copy, Debug)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/lobby")]
    Lobby,
    #[at("/lobby/:id")]
    LobbyRoom { id: Uuid },
    #[at("/login")]
    Login,
    #[at("/not-found")]
    #[not_found]
    NotFound,
}

fn switch(route: Route) -> Html {
    match route {
        Route::Home => html! { <Home /> },
        Route::Lobby => html! {
            <AuthGate>
                <LobbyList />
            </AuthGate>
        },
        Route::LobbyRoom { id } => html! {
            <AuthGate>
                <LobbyRoom key={id.to_string()} {id} />
            </AuthGate>
        },
        Route::Login => html! { <Login /> },
        Route::NotFound => html! { "Not Found." },
    }
}

#[function_component]
fn App() -> Html {
    html! {
        <HashRouter>
            <SessionProvider>
                <Header />
                <Switch<Route> render={switch} />
            </SessionProvider>
        </HashRouter>
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    redirect::apply();
    yew::Renderer::<App>::new().render();
}
