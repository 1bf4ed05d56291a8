use yew::prelude::*;

use shared::LayingStatus;

use crate::provider::AppDataContext;

fn laying_label(status: Option<LayingStatus>) -> &'static str {
    match status {
        Some(LayingStatus::Laying) => "Laying",
        Some(LayingStatus::Ready) => "Ready to lay",
        Some(LayingStatus::TooYoung) => "Too young",
        None => "—",
    }
}

#[function_component(BatchTable)]
pub fn batch_table() -> Html {
    let ctx = use_context::<AppDataContext>().expect("batch table rendered outside provider");
    let data = &ctx.data;

    html! {
        <section class="batch-table">
            <h2>{ "Batches" }</h2>
            if data.flock_batches.is_empty() {
                <p class="empty-state">{ "No batches yet. Add your first birds below." }</p>
            } else {
                <table>
                    <thead>
                        <tr>
                            <th>{ "Name" }</th>
                            <th>{ "Breed" }</th>
                            <th>{ "Birds" }</th>
                            <th>{ "Acquired" }</th>
                            <th>{ "Laying" }</th>
                        </tr>
                    </thead>
                    <tbody>
                        { for data.flock_batches.iter().filter(|b| b.is_active).map(|batch| {
                            let laying = data
                                .summary
                                .batch_summaries
                                .iter()
                                .find(|s| s.id == batch.id)
                                .and_then(|s| s.laying_status);
                            html! {
                                <tr key={batch.id.clone()}>
                                    <td>{ batch.batch_name.clone() }</td>
                                    <td>{ batch.breed.clone() }</td>
                                    <td>{ format!("{} / {}", batch.current_count, batch.initial_count) }</td>
                                    <td>{ batch.acquisition_date.to_string() }</td>
                                    <td>{ laying_label(laying) }</td>
                                </tr>
                            }
                        }) }
                    </tbody>
                </table>
            }
        </section>
    }
}
