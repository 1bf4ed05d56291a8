use chrono::Utc;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use shared::{CreateDeathRecordRequest, DeathCause};

use crate::provider::AppDataContext;
use crate::services::logging::Logger;

#[function_component(LossForm)]
pub fn loss_form() -> Html {
    let ctx = use_context::<AppDataContext>().expect("loss form rendered outside provider");

    let batch_id = use_state(String::new);
    let date = use_state(|| Utc::now().date_naive().to_string());
    let count = use_state(|| "1".to_string());
    let cause = use_state(|| "unknown".to_string());
    let description = use_state(String::new);
    let form_error = use_state(|| Option::<String>::None);
    let submitting = use_state(|| false);

    let on_submit = {
        let ctx = ctx.clone();
        let batch_id = batch_id.clone();
        let date = date.clone();
        let count = count.clone();
        let cause = cause.clone();
        let description = description.clone();
        let form_error = form_error.clone();
        let submitting = submitting.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();

            if batch_id.is_empty() {
                form_error.set(Some("Pick the batch that lost birds".to_string()));
                return;
            }
            let (cause, date) = match (cause.parse::<DeathCause>(), date.parse()) {
                (Ok(c), Ok(d)) => (c, d),
                _ => {
                    form_error.set(Some("Check the cause and date fields".to_string()));
                    return;
                }
            };

            let request = CreateDeathRecordRequest {
                batch_id: (*batch_id).clone(),
                date,
                count: count.parse().unwrap_or(0),
                cause,
                description: (*description).clone(),
                notes: None,
            };

            let ctx = ctx.clone();
            let description = description.clone();
            let form_error = form_error.clone();
            let submitting = submitting.clone();

            submitting.set(true);
            spawn_local(async move {
                match ctx.api.create_death_record(&request).await {
                    Ok(record) => {
                        Logger::info_with_component(
                            "loss-form",
                            &format!("Logged loss of {} against {}", record.count, record.batch_id),
                        );
                        ctx.insert_death_record.emit(record);
                        ctx.refresh_silent.emit(());
                        description.set(String::new());
                        form_error.set(None);
                    }
                    // Typically "Death count N exceeds the M birds remaining".
                    Err(err) => form_error.set(Some(err.user_message())),
                }
                submitting.set(false);
            });
        })
    };

    let on_batch_change = {
        let batch_id = batch_id.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            batch_id.set(select.value());
        })
    };
    let on_cause_change = {
        let cause = cause.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            cause.set(select.value());
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
        <form class="loss-form" onsubmit={on_submit}>
            <h3>{ "Log a loss" }</h3>
            if let Some(message) = (*form_error).clone() {
                <p class="form-error">{ message }</p>
            }
            <select onchange={on_batch_change}>
                <option value="" selected={batch_id.is_empty()}>{ "Select batch" }</option>
                { for ctx.data.flock_batches.iter().filter(|b| b.is_active).map(|batch| html! {
                    <option value={batch.id.clone()}>
                        { format!("{} ({} birds)", batch.batch_name, batch.current_count) }
                    </option>
                }) }
            </select>
            <input type="date" value={(*date).clone()} oninput={text_input(&date)} />
            <input type="number" min="1" value={(*count).clone()} oninput={text_input(&count)} />
            <select onchange={on_cause_change}>
                <option value="unknown" selected=true>{ "Unknown" }</option>
                <option value="predator">{ "Predator" }</option>
                <option value="disease">{ "Disease" }</option>
                <option value="age">{ "Old age" }</option>
                <option value="injury">{ "Injury" }</option>
                <option value="culled">{ "Culled" }</option>
                <option value="other">{ "Other" }</option>
            </select>
            <input type="text" placeholder="What happened?" value={(*description).clone()}
                   oninput={text_input(&description)} />
            <button type="submit" disabled={*submitting}>{ "Log loss" }</button>
        </form>
    }
}
