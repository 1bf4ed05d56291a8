//! Derived flock statistics.
//!
//! Everything here is a pure function of already-fetched rows: the backend
//! summary endpoint and the client-side data provider both call
//! [`compute_flock_summary`] so the two never disagree. All date comparisons
//! are at UTC calendar-day granularity; callers pass "today" in explicitly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{AgeCategory, BatchType, DeathRecord, EggEntry, FlockBatch};

/// Tunable assumptions behind the derived metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Assumed eggs per laying hen per day. This is a domain assumption
    /// (breed/region dependent), not a derived value.
    pub eggs_per_hen_baseline: f64,
    /// Trailing window for the production average, in days.
    pub production_window_days: i64,
    /// Weeks after acquisition at which a juvenile batch is assumed laying-ready.
    pub juvenile_ready_weeks: i64,
    /// Weeks after acquisition at which a chick batch is assumed laying-ready.
    pub chick_ready_weeks: i64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            eggs_per_hen_baseline: 0.8,
            production_window_days: 30,
            juvenile_ready_weeks: 8,
            chick_ready_weeks: 18,
        }
    }
}

/// Banded production rating with its advisory message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStatus {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ProductionStatus {
    pub fn message(&self) -> &'static str {
        match self {
            ProductionStatus::Poor => {
                "Production is low. Check feed quality, lighting, and stress factors."
            }
            ProductionStatus::Fair => {
                "Production is below average. Review nutrition and daylight hours."
            }
            ProductionStatus::Good => "Production is on track for a healthy flock.",
            ProductionStatus::Excellent => "Excellent production. Keep doing what you're doing.",
        }
    }

    fn from_eggs_per_hen(rate: f64) -> Self {
        if rate < 0.3 {
            ProductionStatus::Poor
        } else if rate < 0.5 {
            ProductionStatus::Fair
        } else if rate < 0.7 {
            ProductionStatus::Good
        } else {
            ProductionStatus::Excellent
        }
    }
}

/// Laying readiness of a hen batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayingStatus {
    /// Has an actual laying start date on record.
    Laying,
    /// Expected to be laying by now (explicit date or age heuristic).
    Ready,
    TooYoung,
}

/// Per-batch slice of the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub id: String,
    pub batch_name: String,
    pub batch_type: BatchType,
    pub current_count: i64,
    pub hens_count: i64,
    /// Present for hen batches only.
    pub laying_status: Option<LayingStatus>,
}

/// Aggregate flock statistics. Recomputed on every aggregation pass,
/// never persisted or mutated directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlockSummary {
    pub total_birds: i64,
    pub total_hens: i64,
    pub total_roosters: i64,
    pub total_chicks: i64,
    pub total_brooding: i64,
    pub active_batches: i64,
    pub expected_layers: i64,
    pub estimated_layers: i64,
    pub total_deaths: i64,
    /// Cumulative deaths over cumulative initial stock, as a percentage.
    pub mortality_rate: f64,
    pub avg_daily_eggs: f64,
    pub avg_eggs_per_hen: f64,
    pub production_status: ProductionStatus,
    pub production_message: String,
    pub batch_summaries: Vec<BatchSummary>,
}

impl Default for FlockSummary {
    fn default() -> Self {
        Self {
            total_birds: 0,
            total_hens: 0,
            total_roosters: 0,
            total_chicks: 0,
            total_brooding: 0,
            active_batches: 0,
            expected_layers: 0,
            estimated_layers: 0,
            total_deaths: 0,
            mortality_rate: 0.0,
            avg_daily_eggs: 0.0,
            avg_eggs_per_hen: 0.0,
            production_status: ProductionStatus::Poor,
            production_message: ProductionStatus::Poor.message().to_string(),
            batch_summaries: Vec::new(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the aggregate flock summary from raw rows.
///
/// Role totals and layer estimates cover active batches only; deaths and
/// initial counts are all-time (deactivated batches included) so the
/// mortality denominator matches the numerator.
pub fn compute_flock_summary(
    batches: &[FlockBatch],
    deaths: &[DeathRecord],
    eggs: &[EggEntry],
    today: NaiveDate,
    config: &MetricsConfig,
) -> FlockSummary {
    let active: Vec<&FlockBatch> = batches.iter().filter(|b| b.is_active).collect();

    let total_birds: i64 = active.iter().map(|b| b.current_count).sum();
    let total_hens: i64 = active.iter().map(|b| b.hens_count).sum();
    let total_roosters: i64 = active.iter().map(|b| b.roosters_count).sum();
    let total_chicks: i64 = active.iter().map(|b| b.chicks_count).sum();
    let total_brooding: i64 = active.iter().map(|b| b.brooding_count).sum();

    // Only batches that have actually started laying count toward expected
    // layers; brooding hens are subtracted, floor-clamped at zero.
    let expected_layers: i64 = active
        .iter()
        .filter(|b| b.hens_count > 0 && b.actual_laying_start_date.is_some())
        .map(|b| (b.hens_count - b.brooding_count).max(0))
        .sum();

    let total_initial: i64 = batches.iter().map(|b| b.initial_count).sum();
    let total_deaths: i64 = deaths.iter().map(|d| d.count).sum();

    let mortality_rate = if total_initial > 0 {
        round2(100.0 * total_deaths as f64 / total_initial as f64)
    } else {
        0.0
    };

    let window: Vec<&EggEntry> = eggs
        .iter()
        .filter(|e| {
            let days_ago = (today - e.date).num_days();
            days_ago >= 0 && days_ago < config.production_window_days
        })
        .collect();

    let avg_daily_eggs = if window.is_empty() {
        0.0
    } else {
        window.iter().map(|e| e.count as f64).sum::<f64>() / window.len() as f64
    };

    let estimated_layers = if config.eggs_per_hen_baseline > 0.0 {
        (avg_daily_eggs / config.eggs_per_hen_baseline).round() as i64
    } else {
        0
    };

    let avg_eggs_per_hen = if expected_layers > 0 {
        round2(avg_daily_eggs / expected_layers as f64)
    } else {
        0.0
    };

    let production_status = ProductionStatus::from_eggs_per_hen(avg_eggs_per_hen);

    let batch_summaries = active
        .iter()
        .map(|b| BatchSummary {
            id: b.id.clone(),
            batch_name: b.batch_name.clone(),
            batch_type: b.batch_type,
            current_count: b.current_count,
            hens_count: b.hens_count,
            laying_status: (b.batch_type == BatchType::Hens)
                .then(|| laying_status(b, today, config)),
        })
        .collect();

    FlockSummary {
        total_birds,
        total_hens,
        total_roosters,
        total_chicks,
        total_brooding,
        active_batches: active.len() as i64,
        expected_layers,
        estimated_layers,
        total_deaths,
        mortality_rate,
        avg_daily_eggs,
        avg_eggs_per_hen,
        production_status,
        production_message: production_status.message().to_string(),
        batch_summaries,
    }
}

/// Laying readiness for one batch.
///
/// Explicit dates win; with no dates at all the acquisition age category and
/// elapsed weeks since acquisition decide.
pub fn laying_status(batch: &FlockBatch, today: NaiveDate, config: &MetricsConfig) -> LayingStatus {
    if batch.actual_laying_start_date.is_some() {
        return LayingStatus::Laying;
    }

    if let Some(expected) = batch.expected_laying_start_date {
        return if expected <= today {
            LayingStatus::Ready
        } else {
            LayingStatus::TooYoung
        };
    }

    let elapsed_weeks = (today - batch.acquisition_date).num_weeks();
    let ready = match batch.age_at_acquisition {
        AgeCategory::Adult => true,
        AgeCategory::Juvenile => elapsed_weeks >= config.juvenile_ready_weeks,
        AgeCategory::Chick => elapsed_weeks >= config.chick_ready_weeks,
    };

    if ready {
        LayingStatus::Ready
    } else {
        LayingStatus::TooYoung
    }
}
