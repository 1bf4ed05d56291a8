use chrono::Utc;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use shared::CreateEggEntryRequest;

use crate::provider::AppDataContext;

#[function_component(EggForm)]
pub fn egg_form() -> Html {
    let ctx = use_context::<AppDataContext>().expect("egg form rendered outside provider");

    let date = use_state(|| Utc::now().date_naive().to_string());
    let count = use_state(|| "0".to_string());
    let form_error = use_state(|| Option::<String>::None);
    let submitting = use_state(|| false);

    let on_submit = {
        let ctx = ctx.clone();
        let date = date.clone();
        let count = count.clone();
        let form_error = form_error.clone();
        let submitting = submitting.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();

            let parsed_date = match date.parse() {
                Ok(d) => d,
                Err(_) => {
                    form_error.set(Some("Check the date field".to_string()));
                    return;
                }
            };

            let request = CreateEggEntryRequest {
                date: parsed_date,
                count: count.parse().unwrap_or(0),
                notes: None,
            };

            let ctx = ctx.clone();
            let count = count.clone();
            let form_error = form_error.clone();
            let submitting = submitting.clone();

            submitting.set(true);
            spawn_local(async move {
                match ctx.api.create_egg_entry(&request).await {
                    Ok(entry) => {
                        ctx.insert_egg_entry.emit(entry);
                        ctx.refresh_silent.emit(());
                        count.set("0".to_string());
                        form_error.set(None);
                    }
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
        <form class="egg-form" onsubmit={on_submit}>
            <h3>{ "Record eggs" }</h3>
            if let Some(message) = (*form_error).clone() {
                <p class="form-error">{ message }</p>
            }
            <input type="date" value={(*date).clone()} oninput={text_input(&date)} />
            <input type="number" min="0" value={(*count).clone()} oninput={text_input(&count)} />
            <button type="submit" disabled={*submitting}>{ "Save" }</button>
        </form>
    }
}
