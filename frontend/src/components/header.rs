use yew::prelude::*;

use crate::provider::{AppDataContext, FetchState};

#[function_component(Header)]
pub fn header() -> Html {
    let ctx = use_context::<AppDataContext>().expect("header rendered outside provider");

    let farm_name = ctx
        .data
        .profile
        .as_ref()
        .and_then(|p| p.farm_name.clone())
        .unwrap_or_else(|| "My Flock".to_string());

    let on_refresh = {
        let refresh = ctx.refresh.clone();
        Callback::from(move |_| refresh.emit(()))
    };

    html! {
        <header class="app-header">
            <h1>{ farm_name }</h1>
            <div class="header-actions">
                if ctx.state == FetchState::Loading {
                    <span class="loading-indicator">{ "Loading…" }</span>
                }
                <button onclick={on_refresh} disabled={ctx.state == FetchState::Loading}>
                    { "Refresh" }
                </button>
            </div>
        </header>
    }
}
