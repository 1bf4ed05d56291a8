use chrono::Utc;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use shared::{AgeCategory, BatchType, CreateBatchRequest};

use crate::provider::AppDataContext;
use crate::services::logging::Logger;

#[function_component(BatchForm)]
pub fn batch_form() -> Html {
    let ctx = use_context::<AppDataContext>().expect("batch form rendered outside provider");

    let name = use_state(String::new);
    let breed = use_state(String::new);
    let batch_type = use_state(|| "hens".to_string());
    let hens = use_state(|| "0".to_string());
    let roosters = use_state(|| "0".to_string());
    let chicks = use_state(|| "0".to_string());
    let acquisition_date = use_state(|| Utc::now().date_naive().to_string());
    let age = use_state(|| "adult".to_string());
    let form_error = use_state(|| Option::<String>::None);
    let submitting = use_state(|| false);

    let on_submit = {
        let ctx = ctx.clone();
        let name = name.clone();
        let breed = breed.clone();
        let batch_type = batch_type.clone();
        let hens = hens.clone();
        let roosters = roosters.clone();
        let chicks = chicks.clone();
        let acquisition_date = acquisition_date.clone();
        let age = age.clone();
        let form_error = form_error.clone();
        let submitting = submitting.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();

            let parsed_type = batch_type.parse::<BatchType>();
            let parsed_age = age.parse::<AgeCategory>();
            let parsed_date = acquisition_date.parse::<chrono::NaiveDate>();
            let (batch_type, age_at_acquisition, date) = match (parsed_type, parsed_age, parsed_date)
            {
                (Ok(t), Ok(a), Ok(d)) => (t, a, d),
                _ => {
                    form_error.set(Some("Check the type, age, and date fields".to_string()));
                    return;
                }
            };

            let request = CreateBatchRequest {
                batch_name: (*name).clone(),
                breed: (*breed).clone(),
                batch_type,
                hens_count: hens.parse().unwrap_or(0),
                roosters_count: roosters.parse().unwrap_or(0),
                chicks_count: chicks.parse().unwrap_or(0),
                brooding_count: 0,
                acquisition_date: date,
                age_at_acquisition,
                actual_laying_start_date: None,
                expected_laying_start_date: None,
                notes: None,
            };

            let ctx = ctx.clone();
            let name = name.clone();
            let breed = breed.clone();
            let form_error = form_error.clone();
            let submitting = submitting.clone();

            submitting.set(true);
            spawn_local(async move {
                match ctx.api.create_flock_batch(&request).await {
                    Ok(batch) => {
                        Logger::info_with_component(
                            "batch-form",
                            &format!("Created batch {}", batch.id),
                        );
                        ctx.insert_batch.emit(batch);
                        ctx.refresh_silent.emit(());
                        name.set(String::new());
                        breed.set(String::new());
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

    let select_input = |state: &UseStateHandle<String>| {
        let state = state.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            state.set(select.value());
        })
    };

    html! {
        <form class="batch-form" onsubmit={on_submit}>
            <h3>{ "Add a batch" }</h3>
            if let Some(message) = (*form_error).clone() {
                <p class="form-error">{ message }</p>
            }
            <input type="text" placeholder="Batch name" value={(*name).clone()}
                   oninput={text_input(&name)} />
            <input type="text" placeholder="Breed" value={(*breed).clone()}
                   oninput={text_input(&breed)} />
            <select onchange={select_input(&batch_type)}>
                <option value="hens" selected=true>{ "Hens" }</option>
                <option value="roosters">{ "Roosters" }</option>
                <option value="chicks">{ "Chicks" }</option>
                <option value="mixed">{ "Mixed" }</option>
            </select>
            <input type="number" min="0" value={(*hens).clone()} oninput={text_input(&hens)} />
            <input type="number" min="0" value={(*roosters).clone()} oninput={text_input(&roosters)} />
            <input type="number" min="0" value={(*chicks).clone()} oninput={text_input(&chicks)} />
            <input type="date" value={(*acquisition_date).clone()}
                   oninput={text_input(&acquisition_date)} />
            <select onchange={select_input(&age)}>
                <option value="adult" selected=true>{ "Adult" }</option>
                <option value="juvenile">{ "Juvenile" }</option>
                <option value="chick">{ "Chick" }</option>
            </select>
            <button type="submit" disabled={*submitting}>{ "Add batch" }</button>
        </form>
    }
}
