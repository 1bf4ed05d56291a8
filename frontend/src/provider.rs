//! App-wide data provider.
//!
//! One aggregate snapshot holds every collection the UI reads. On sign-in the
//! provider hydrates from the TTL cache when it can, fetches everything in a
//! single concurrent batch, and derives the flock summary locally from the
//! raw rows. Background refreshes are silent: a failure is logged and the
//! last good snapshot stays on screen. A generation counter ties every fetch
//! to the session that started it, so a slow response from a previous user
//! can never land in the current user's view.

use std::rc::Rc;

use chrono::{NaiveDate, Utc};
use futures::join;
use serde::{Deserialize, Serialize};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use shared::cache::{APP_DATA_KEY, SUBSCRIPTION_KEY};
use shared::{
    compute_flock_summary, Customer, DeathRecord, EggEntry, Expense, FeedPurchase, FlockBatch,
    FlockEvent, FlockSummary, MetricsConfig, Sale, UserProfile,
};

use crate::hooks::use_staleness_check::{use_staleness_check, StalenessCheckConfig};
use crate::services::api::{ApiClient, ApiError};
use crate::services::cache::CacheService;
use crate::services::logging::Logger;

/// How long a cached snapshot is served before it must be refetched.
pub const APP_DATA_TTL_MINUTES: i64 = 30;

/// Everything the UI reads, fetched together and cached together.
/// Collections absent from a cached payload deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppData {
    pub flock_batches: Vec<FlockBatch>,
    pub death_records: Vec<DeathRecord>,
    pub egg_entries: Vec<EggEntry>,
    pub flock_events: Vec<FlockEvent>,
    pub customers: Vec<Customer>,
    pub sales: Vec<Sale>,
    pub expenses: Vec<Expense>,
    pub feed_purchases: Vec<FeedPurchase>,
    pub profile: Option<UserProfile>,
    pub summary: FlockSummary,
}

impl AppData {
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        flock_batches: Vec<FlockBatch>,
        death_records: Vec<DeathRecord>,
        egg_entries: Vec<EggEntry>,
        flock_events: Vec<FlockEvent>,
        customers: Vec<Customer>,
        sales: Vec<Sale>,
        expenses: Vec<Expense>,
        feed_purchases: Vec<FeedPurchase>,
        profile: Option<UserProfile>,
        today: NaiveDate,
    ) -> Self {
        let mut data = Self {
            flock_batches,
            death_records,
            egg_entries,
            flock_events,
            customers,
            sales,
            expenses,
            feed_purchases,
            profile,
            summary: FlockSummary::default(),
        };
        data.recompute_summary(today);
        data
    }

    /// Re-derive the summary from the rows currently held.
    pub fn recompute_summary(&mut self, today: NaiveDate) {
        self.summary = compute_flock_summary(
            &self.flock_batches,
            &self.death_records,
            &self.egg_entries,
            today,
            &MetricsConfig::default(),
        );
    }

    /// Splice a freshly created batch in without waiting for a refetch.
    pub fn insert_batch(&mut self, batch: FlockBatch, today: NaiveDate) {
        self.flock_batches.insert(0, batch);
        self.recompute_summary(today);
    }

    /// Splice a loss record in and mirror the server-side count decrement.
    pub fn insert_death_record(&mut self, record: DeathRecord, today: NaiveDate) {
        if let Some(batch) = self
            .flock_batches
            .iter_mut()
            .find(|b| b.id == record.batch_id)
        {
            batch.current_count = (batch.current_count - record.count).max(0);
        }
        self.death_records.insert(0, record);
        self.recompute_summary(today);
    }

    pub fn insert_egg_entry(&mut self, entry: EggEntry, today: NaiveDate) {
        self.egg_entries.insert(0, entry);
        self.recompute_summary(today);
    }
}

/// Where the provider is in its fetch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// No session, nothing loaded.
    Uninitialized,
    /// A visible (non-silent) fetch is in flight.
    Loading,
    /// A snapshot is available, possibly refreshing silently behind it.
    Ready,
}

/// The signed-in user, as handed to us by the auth layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub token: String,
}

/// Fetch every collection concurrently and derive the summary locally.
pub async fn fetch_app_data(api: &ApiClient) -> Result<AppData, ApiError> {
    let (batches, deaths, eggs, events, customers, sales, expenses, feed, profile) = join!(
        api.list_flock_batches(),
        api.list_death_records(),
        api.list_egg_entries(),
        api.list_flock_events(),
        api.list_customers(),
        api.list_sales(),
        api.list_expenses(),
        api.list_feed_purchases(),
        api.get_profile(),
    );

    Ok(AppData::assemble(
        batches?,
        deaths?,
        eggs?,
        events?,
        customers?,
        sales?,
        expenses?,
        feed?,
        profile?,
        Utc::now().date_naive(),
    ))
}

/// What to do with a completed fetch.
#[derive(Debug, PartialEq)]
pub(crate) enum FetchOutcome {
    Updated(AppData),
    /// The session changed while the fetch was in flight.
    Discarded,
    Failed(ApiError),
}

pub(crate) fn resolve_fetch(
    result: Result<AppData, ApiError>,
    fetch_generation: u64,
    current_generation: u64,
) -> FetchOutcome {
    if fetch_generation != current_generation {
        return FetchOutcome::Discarded;
    }
    match result {
        Ok(snapshot) => FetchOutcome::Updated(snapshot),
        Err(err) => FetchOutcome::Failed(err),
    }
}

/// Handle the rest of the app uses to read and mutate the snapshot.
#[derive(Clone, PartialEq)]
pub struct AppDataContext {
    pub data: Rc<AppData>,
    pub state: FetchState,
    pub error: Option<String>,
    pub api: ApiClient,
    pub refresh: Callback<()>,
    pub refresh_silent: Callback<()>,
    pub insert_batch: Callback<FlockBatch>,
    pub insert_death_record: Callback<DeathRecord>,
    pub insert_egg_entry: Callback<EggEntry>,
}

#[derive(Properties, PartialEq)]
pub struct AppDataProviderProps {
    pub session: Option<Session>,
    #[prop_or_default]
    pub children: Children,
}

#[function_component(AppDataProvider)]
pub fn app_data_provider(props: &AppDataProviderProps) -> Html {
    let data = use_state(|| Rc::new(AppData::default()));
    let state = use_state(|| FetchState::Uninitialized);
    let error = use_state(|| Option::<String>::None);
    // Bumped on every session change; in-flight fetches compare against it.
    let generation = use_mut_ref(|| 0u64);
    let in_flight = use_mut_ref(|| false);
    let previous_user = use_mut_ref(|| Option::<String>::None);
    let cache = use_memo((), |_| CacheService::new_browser());

    let run_fetch = {
        let data = data.clone();
        let state = state.clone();
        let error = error.clone();
        let generation = generation.clone();
        let in_flight = in_flight.clone();
        let cache = cache.clone();

        Callback::from(move |(session, silent): (Session, bool)| {
            let data = data.clone();
            let state = state.clone();
            let error = error.clone();
            let generation = generation.clone();
            let in_flight = in_flight.clone();
            let cache = cache.clone();

            let fetch_generation = *generation.borrow();
            if !silent {
                state.set(FetchState::Loading);
            }

            spawn_local(async move {
                *in_flight.borrow_mut() = true;
                let api = ApiClient::new().with_token(session.token.clone());
                let result = fetch_app_data(&api).await;
                *in_flight.borrow_mut() = false;
                let current_generation = *generation.borrow();

                match resolve_fetch(result, fetch_generation, current_generation) {
                    FetchOutcome::Updated(snapshot) => {
                        cache.set(&session.user_id, APP_DATA_KEY, &snapshot, APP_DATA_TTL_MINUTES);
                        if let Some(profile) = &snapshot.profile {
                            cache.set(
                                &session.user_id,
                                SUBSCRIPTION_KEY,
                                &profile.subscription_status,
                                APP_DATA_TTL_MINUTES,
                            );
                        }
                        data.set(Rc::new(snapshot));
                        error.set(None);
                        state.set(FetchState::Ready);
                    }
                    FetchOutcome::Discarded => {
                        Logger::debug_with_component(
                            "data-provider",
                            "Dropping fetch response from a superseded session",
                        );
                    }
                    FetchOutcome::Failed(err) => {
                        Logger::error_with_component(
                            "data-provider",
                            &format!("Fetch failed: {}", err),
                        );
                        if silent {
                            // Keep showing the last good snapshot.
                        } else {
                            error.set(Some(err.user_message()));
                            state.set(FetchState::Ready);
                        }
                    }
                }
            });
        })
    };

    {
        let data = data.clone();
        let state = state.clone();
        let error = error.clone();
        let generation = generation.clone();
        let previous_user = previous_user.clone();
        let cache = cache.clone();
        let run_fetch = run_fetch.clone();

        use_effect_with(props.session.clone(), move |session| {
            *generation.borrow_mut() += 1;

            match session {
                None => {
                    data.set(Rc::new(AppData::default()));
                    state.set(FetchState::Uninitialized);
                    error.set(None);
                    *previous_user.borrow_mut() = None;
                }
                Some(session) => {
                    let prev = previous_user.borrow_mut().replace(session.user_id.clone());
                    if let Some(prev) = prev {
                        if prev != session.user_id {
                            cache.clear_user(&prev);
                        }
                    }

                    match cache.get::<AppData>(&session.user_id, APP_DATA_KEY) {
                        Some(snapshot) => {
                            Logger::info_with_component(
                                "data-provider",
                                "Hydrated from cache, refreshing in background",
                            );
                            data.set(Rc::new(snapshot));
                            state.set(FetchState::Ready);
                            run_fetch.emit((session.clone(), true));
                        }
                        None => run_fetch.emit((session.clone(), false)),
                    }
                }
            }

            || ()
        });
    }

    let refresh = {
        let run_fetch = run_fetch.clone();
        let session = props.session.clone();
        Callback::from(move |_| {
            if let Some(session) = &session {
                run_fetch.emit((session.clone(), false));
            }
        })
    };

    let refresh_silent = {
        let run_fetch = run_fetch.clone();
        let session = props.session.clone();
        Callback::from(move |_| {
            if let Some(session) = &session {
                run_fetch.emit((session.clone(), true));
            }
        })
    };

    let insert_batch = {
        let data = data.clone();
        let cache = cache.clone();
        let session = props.session.clone();
        Callback::from(move |batch: FlockBatch| {
            let mut next = (**data).clone();
            next.insert_batch(batch, Utc::now().date_naive());
            if let Some(session) = &session {
                cache.set(&session.user_id, APP_DATA_KEY, &next, APP_DATA_TTL_MINUTES);
            }
            data.set(Rc::new(next));
        })
    };

    let insert_death_record = {
        let data = data.clone();
        let cache = cache.clone();
        let session = props.session.clone();
        Callback::from(move |record: DeathRecord| {
            let mut next = (**data).clone();
            next.insert_death_record(record, Utc::now().date_naive());
            if let Some(session) = &session {
                cache.set(&session.user_id, APP_DATA_KEY, &next, APP_DATA_TTL_MINUTES);
            }
            data.set(Rc::new(next));
        })
    };

    let insert_egg_entry = {
        let data = data.clone();
        let cache = cache.clone();
        let session = props.session.clone();
        Callback::from(move |entry: EggEntry| {
            let mut next = (**data).clone();
            next.insert_egg_entry(entry, Utc::now().date_naive());
            if let Some(session) = &session {
                cache.set(&session.user_id, APP_DATA_KEY, &next, APP_DATA_TTL_MINUTES);
            }
            data.set(Rc::new(next));
        })
    };

    // Background staleness sweep: when the cached snapshot outlives its TTL
    // while the tab is focused, refresh it without touching the loading flag.
    {
        let cache = cache.clone();
        let session = props.session.clone();
        let in_flight = in_flight.clone();
        let is_stale = Callback::from(move |_: ()| {
            if *in_flight.borrow() {
                return false;
            }
            match &session {
                Some(session) => cache
                    .age_ms(&session.user_id, APP_DATA_KEY)
                    .map_or(true, |age| age > APP_DATA_TTL_MINUTES * 60_000),
                None => false,
            }
        });
        use_staleness_check(
            StalenessCheckConfig::default(),
            is_stale,
            refresh_silent.clone(),
        );
    }

    let api = props
        .session
        .as_ref()
        .map(|s| ApiClient::new().with_token(s.token.clone()))
        .unwrap_or_default();

    let context = AppDataContext {
        data: (*data).clone(),
        state: *state,
        error: (*error).clone(),
        api,
        refresh,
        refresh_silent,
        insert_batch,
        insert_death_record,
        insert_egg_entry,
    };

    html! {
        <ContextProvider<AppDataContext> context={context}>
            { for props.children.iter() }
        </ContextProvider<AppDataContext>>
    }
}
