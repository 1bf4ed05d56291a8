use yew::prelude::*;

use shared::ProductionStatus;

use crate::provider::AppDataContext;

fn status_class(status: ProductionStatus) -> &'static str {
    match status {
        ProductionStatus::Poor => "status-poor",
        ProductionStatus::Fair => "status-fair",
        ProductionStatus::Good => "status-good",
        ProductionStatus::Excellent => "status-excellent",
    }
}

#[function_component(SummaryCard)]
pub fn summary_card() -> Html {
    let ctx = use_context::<AppDataContext>().expect("summary card rendered outside provider");
    let summary = &ctx.data.summary;

    html! {
        <section class="summary-card">
            <h2>{ "Flock Overview" }</h2>
            <div class="summary-grid">
                <div class="stat">
                    <span class="stat-value">{ summary.total_birds }</span>
                    <span class="stat-label">{ "Birds" }</span>
                </div>
                <div class="stat">
                    <span class="stat-value">{ summary.total_hens }</span>
                    <span class="stat-label">{ "Hens" }</span>
                </div>
                <div class="stat">
                    <span class="stat-value">{ summary.expected_layers }</span>
                    <span class="stat-label">{ "Expected layers" }</span>
                </div>
                <div class="stat">
                    <span class="stat-value">{ summary.estimated_layers }</span>
                    <span class="stat-label">{ "Estimated laying" }</span>
                </div>
                <div class="stat">
                    <span class="stat-value">{ format!("{:.2}", summary.avg_daily_eggs) }</span>
                    <span class="stat-label">{ "Avg eggs/day (30d)" }</span>
                </div>
                <div class="stat">
                    <span class="stat-value">{ format!("{:.2}%", summary.mortality_rate) }</span>
                    <span class="stat-label">{ "Mortality" }</span>
                </div>
            </div>
            <p class={classes!("production-message", status_class(summary.production_status))}>
                { summary.production_message.clone() }
            </p>
        </section>
    }
}
