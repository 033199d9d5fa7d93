use yew::prelude::*;

use crate::api::ClientError;

#[derive(Properties, PartialEq)]
pub struct Props {
    pub error: ClientError,
    pub on_dismiss: Callback<()>,
}

/// A modal telling the user what went wrong.
#[function_component]
pub fn Notice(props: &Props) -> Html {
    let on_dismiss = props.on_dismiss.reform(|_: MouseEvent| ());
    html! {
        <div class="modal notice" role="alertdialog">
            <h2>{ props.error.title() }</h2>
            <p>{ props.error.to_string() }</p>
            <button onclick={on_dismiss}>{"OK"}</button>
        </div>
    }
}
