//! Periodic staleness sweep for the cached app-data snapshot.
//!
//! Every interval the hook asks whether the snapshot has outlived its TTL
//! and, if so, emits a silent refresh. Sweeps are skipped while the tab is
//! unfocused so a backgrounded browser does not hammer the API; the next
//! focused sweep catches up.
//!
//! The sweep loop is spawned once per config, but the `is_stale`/`refresh`
//! callbacks close over the session and change on every render. The loop
//! therefore never captures them directly: it reads the latest pair through
//! a shared slot the hook rewrites each render, so a loop started while
//! signed out picks up the signed-in callbacks as soon as they exist.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::logging::Logger;

#[derive(Clone, PartialEq)]
pub struct StalenessCheckConfig {
    /// How often to check, in milliseconds.
    pub interval_ms: u32,
    /// Delay before the first check, for staggering multiple consumers.
    pub initial_delay_ms: Option<u32>,
}

impl Default for StalenessCheckConfig {
    fn default() -> Self {
        Self {
            interval_ms: 600_000, // 10 minutes
            initial_delay_ms: None,
        }
    }
}

/// Always-current callbacks for the sweep loop.
type SweepHandles = Rc<RefCell<(Callback<(), bool>, Callback<()>)>>;

/// One sweep tick: consult the latest `is_stale`, fire the latest `refresh`.
/// Returns whether a refresh was triggered.
fn sweep(handles: &SweepHandles) -> bool {
    let (is_stale, refresh) = handles.borrow().clone();
    if is_stale.emit(()) {
        Logger::info_with_component(
            "staleness-check",
            "Snapshot past TTL, triggering silent refresh",
        );
        refresh.emit(());
        true
    } else {
        false
    }
}

fn document_focused() -> bool {
    web_sys::window()
        .and_then(|w| w.document())
        .map(|d| d.has_focus().unwrap_or(true))
        .unwrap_or(true)
}

/// Run `refresh` whenever `is_stale` reports true on a focused tab.
///
/// `is_stale` is polled, not pushed: the caller decides what "stale" means
/// (typically the cache entry's age against its TTL).
#[hook]
pub fn use_staleness_check(
    config: StalenessCheckConfig,
    is_stale: Callback<(), bool>,
    refresh: Callback<()>,
) {
    let handles: SweepHandles = use_mut_ref(|| (is_stale.clone(), refresh.clone()));
    // Rewrite the slot every render so the loop sees current closures.
    *handles.borrow_mut() = (is_stale, refresh);

    // Bumped when the loop is respawned or the component unmounts; each
    // loop instance exits once its epoch is superseded.
    let epoch = use_mut_ref(|| 0u64);

    {
        let handles = handles.clone();
        let epoch = epoch.clone();

        use_effect_with(config.clone(), move |config| {
            let config = config.clone();
            *epoch.borrow_mut() += 1;
            let my_epoch = *epoch.borrow();

            spawn_local(async move {
                if let Some(initial_delay) = config.initial_delay_ms {
                    TimeoutFuture::new(initial_delay).await;
                    if *epoch.borrow() != my_epoch {
                        return;
                    }
                }

                loop {
                    TimeoutFuture::new(config.interval_ms).await;

                    if *epoch.borrow() != my_epoch {
                        break;
                    }

                    if !document_focused() {
                        Logger::debug_with_component(
                            "staleness-check",
                            "Tab unfocused, skipping staleness sweep",
                        );
                        continue;
                    }

                    sweep(&handles);
                }
            });

            || ()
        });
    }

    {
        let epoch = epoch.clone();
        use_effect_with((), move |_| {
            move || {
                *epoch.borrow_mut() += 1;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_sweep_reads_callbacks_installed_after_spawn() {
        // The slot starts with the signed-out callbacks: never stale, and a
        // refresh that must not fire.
        let refreshed = Rc::new(Cell::new(0u32));
        let handles: SweepHandles = Rc::new(RefCell::new((
            Callback::from(|_: ()| false),
            Callback::from(|_: ()| panic!("refresh fired while signed out")),
        )));

        assert!(!sweep(&handles));

        // A later render swaps in the signed-in pair; the same slot must now
        // drive the refresh.
        let counter = refreshed.clone();
        *handles.borrow_mut() = (
            Callback::from(|_: ()| true),
            Callback::from(move |_: ()| counter.set(counter.get() + 1)),
        );

        assert!(sweep(&handles));
        assert_eq!(refreshed.get(), 1);
    }

    #[test]
    fn test_sweep_skips_refresh_while_fresh() {
        let refreshed = Rc::new(Cell::new(0u32));
        let counter = refreshed.clone();
        let handles: SweepHandles = Rc::new(RefCell::new((
            Callback::from(|_: ()| false),
            Callback::from(move |_: ()| counter.set(counter.get() + 1)),
        )));

        assert!(!sweep(&handles));
        assert_eq!(refreshed.get(), 0);
    }

    #[test]
    fn test_config_default_matches_ttl_cadence() {
        let config = StalenessCheckConfig::default();
        assert_eq!(config.interval_ms, 600_000); // 10 minutes
        assert_eq!(config.initial_delay_ms, None);
    }

    #[test]
    fn test_config_staggered() {
        let config = StalenessCheckConfig {
            initial_delay_ms: Some(15_000),
            ..StalenessCheckConfig::default()
        };
        assert_eq!(config.initial_delay_ms, Some(15_000));
    }
}
