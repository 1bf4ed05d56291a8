use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use shared::SignInRequest;

mod components;
mod hooks;
mod provider;
mod services;

use services::api::ApiClient;

use components::batch_form::BatchForm;
use components::batch_table::BatchTable;
use components::egg_form::EggForm;
use components::header::Header;
use components::loss_form::LossForm;
use components::summary_card::SummaryCard;
use provider::{AppDataContext, AppDataProvider, FetchState, Session};

#[function_component(Dashboard)]
fn dashboard() -> Html {
    let ctx = use_context::<AppDataContext>().expect("dashboard rendered outside provider");

    html! {
        <main class="dashboard">
            <Header />
            if let Some(message) = ctx.error.clone() {
                <div class="error-banner">{ message }</div>
            }
            if ctx.state == FetchState::Uninitialized {
                <p class="empty-state">{ "Sign in to see your flock." }</p>
            } else {
                <SummaryCard />
                <BatchTable />
                <div class="entry-forms">
                    <EggForm />
                    <LossForm />
                    <BatchForm />
                </div>
            }
        </main>
    }
}

/// Sign-in panel: exchanges credentials for a bearer token at the session
/// endpoint and hands the resulting session to the data layer.
#[derive(Properties, PartialEq)]
struct SignInProps {
    on_sign_in: Callback<Session>,
}

#[function_component(SignIn)]
fn sign_in(props: &SignInProps) -> Html {
    let user_id = use_state(String::new);
    let email = use_state(String::new);
    let form_error = use_state(|| Option::<String>::None);
    let submitting = use_state(|| false);

    let on_submit = {
        let user_id = user_id.clone();
        let email = email.clone();
        let form_error = form_error.clone();
        let submitting = submitting.clone();
        let on_sign_in = props.on_sign_in.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if user_id.trim().is_empty() {
                form_error.set(Some("Enter a user ID".to_string()));
                return;
            }

            let request = SignInRequest {
                user_id: user_id.trim().to_string(),
                email: (!email.is_empty()).then(|| (*email).clone()),
            };
            let form_error = form_error.clone();
            let submitting = submitting.clone();
            let on_sign_in = on_sign_in.clone();

            submitting.set(true);
            spawn_local(async move {
                match ApiClient::new().sign_in(&request).await {
                    Ok(session) => on_sign_in.emit(Session {
                        user_id: session.user_id,
                        token: session.token,
                    }),
                    Err(err) => form_error.set(Some(err.user_message())),
                }
                submitting.set(false);
            });
        })
    };

    let text_input = |state: &UseStateHandle<String>| {
        let state = state.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            state.set(input.value());
        })
    };

    html! {
        <form class="sign-in" onsubmit={on_submit}>
            <h2>{ "Sign in" }</h2>
            if let Some(message) = (*form_error).clone() {
                <p class="form-error">{ message }</p>
            }
            <input type="text" placeholder="User ID" value={(*user_id).clone()}
                   oninput={text_input(&user_id)} />
            <input type="email" placeholder="Email (first sign-in)" value={(*email).clone()}
                   oninput={text_input(&email)} />
            <button type="submit" disabled={*submitting}>{ "Sign in" }</button>
        </form>
    }
}

#[function_component(App)]
fn app() -> Html {
    let session = use_state(|| Option::<Session>::None);

    let on_sign_in = {
        let session = session.clone();
        Callback::from(move |new_session: Session| session.set(Some(new_session)))
    };

    let on_sign_out = {
        let session = session.clone();
        Callback::from(move |_| {
            if let Some(current) = (*session).clone() {
                // Best-effort server-side revocation; local state clears
                // regardless.
                spawn_local(async move {
                    let _ = ApiClient::new().with_token(current.token).sign_out().await;
                });
            }
            session.set(None)
        })
    };

    html! {
        <AppDataProvider session={(*session).clone()}>
            if session.is_none() {
                <SignIn on_sign_in={on_sign_in} />
            } else {
                <button class="sign-out" onclick={on_sign_out}>{ "Sign out" }</button>
                <Dashboard />
            }
        </AppDataProvider>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
