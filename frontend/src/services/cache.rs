//! TTL cache over browser localStorage.
//!
//! Entries are JSON [`CacheEnvelope`]s keyed per user
//! (`flocktracker_<user_id>_<key>`). Reads past the TTL delete the entry and
//! report a miss, so a stale snapshot is never served. The backing store and
//! clock are injected, which keeps the service testable off-browser.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use shared::cache::{cache_key, user_namespace, CacheEnvelope};

/// Minimal key-value surface the cache needs from its backing store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    fn keys(&self) -> Vec<String>;
}

/// Browser localStorage. Writes are best-effort: quota exhaustion drops the
/// entry rather than failing the caller, since the cache is an accelerator.
pub struct LocalStorageStore;

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.set_item(key, value);
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }

    fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        if let Some(storage) = Self::storage() {
            let len = storage.length().unwrap_or(0);
            for i in 0..len {
                if let Ok(Some(key)) = storage.key(i) {
                    keys.push(key);
                }
            }
        }
        keys
    }
}

impl LocalStorageStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

/// In-memory store for tests and for environments without localStorage.
#[derive(Default, Clone)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

/// Per-user TTL cache. Constructed once and handed to the data provider.
#[derive(Clone)]
pub struct CacheService {
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Fn() -> i64>,
}

impl CacheService {
    /// Production wiring: localStorage plus the JS wall clock.
    pub fn new_browser() -> Self {
        Self {
            store: Rc::new(LocalStorageStore),
            clock: Rc::new(|| js_sys::Date::now() as i64),
        }
    }

    /// Inject the store and clock. Tests drive the clock by hand.
    pub fn with_parts(store: Rc<dyn KeyValueStore>, clock: Rc<dyn Fn() -> i64>) -> Self {
        Self { store, clock }
    }

    fn now_ms(&self) -> i64 {
        (self.clock)()
    }

    /// Store a value under the user's namespace with the given TTL.
    pub fn set<T: Serialize>(&self, user_id: &str, key: &str, value: &T, ttl_minutes: i64) {
        let envelope = CacheEnvelope::new(value, self.now_ms(), ttl_minutes);
        if let Ok(json) = serde_json::to_string(&envelope) {
            self.store.set(&cache_key(user_id, key), &json);
        }
    }

    /// Read a value back. Expired or unparseable entries are deleted and
    /// reported as a miss.
    pub fn get<T: DeserializeOwned>(&self, user_id: &str, key: &str) -> Option<T> {
        let storage_key = cache_key(user_id, key);
        let json = self.store.get(&storage_key)?;

        let envelope: CacheEnvelope<T> = match serde_json::from_str(&json) {
            Ok(envelope) => envelope,
            Err(_) => {
                self.store.remove(&storage_key);
                return None;
            }
        };

        if envelope.is_expired(self.now_ms()) {
            self.store.remove(&storage_key);
            return None;
        }

        Some(envelope.data)
    }

    /// Milliseconds since the entry was captured, if present and parseable.
    pub fn age_ms(&self, user_id: &str, key: &str) -> Option<i64> {
        let json = self.store.get(&cache_key(user_id, key))?;
        let envelope: CacheEnvelope<serde_json::Value> = serde_json::from_str(&json).ok()?;
        Some(envelope.age_ms(self.now_ms()))
    }

    pub fn remove(&self, user_id: &str, key: &str) {
        self.store.remove(&cache_key(user_id, key));
    }

    /// Drop every entry in one user's namespace. Called when a different
    /// user signs in on the same browser.
    pub fn clear_user(&self, user_id: &str) {
        let prefix = user_namespace(user_id);
        for key in self.store.keys() {
            if key.starts_with(&prefix) {
                self.store.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn service_with_clock(start_ms: i64) -> (CacheService, MemoryStore, Rc<Cell<i64>>) {
        let store = MemoryStore::default();
        let now = Rc::new(Cell::new(start_ms));
        let clock_now = now.clone();
        let service = CacheService::with_parts(
            Rc::new(store.clone()),
            Rc::new(move || clock_now.get()),
        );
        (service, store, now)
    }

    #[test]
    fn test_round_trip_within_ttl() {
        let (cache, _, now) = service_with_clock(1_000_000);
        cache.set("user-1", "app_data", &vec![1, 2, 3], 5);

        now.set(1_000_000 + 4 * 60_000);
        assert_eq!(cache.get::<Vec<i32>>("user-1", "app_data"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_expired_read_deletes_entry() {
        let (cache, store, now) = service_with_clock(1_000_000);
        cache.set("user-1", "app_data", &"snapshot", 5);

        now.set(1_000_000 + 5 * 60_000 + 1);
        assert_eq!(cache.get::<String>("user-1", "app_data"), None);
        // The stale entry must be gone, not merely skipped.
        assert!(store.get("flocktracker_user-1_app_data").is_none());
    }

    #[test]
    fn test_unparseable_entry_treated_as_miss() {
        let (cache, store, _) = service_with_clock(0);
        store.set("flocktracker_user-1_app_data", "not json");

        assert_eq!(cache.get::<String>("user-1", "app_data"), None);
        assert!(store.get("flocktracker_user-1_app_data").is_none());
    }

    #[test]
    fn test_clear_user_leaves_other_users() {
        let (cache, _, _) = service_with_clock(0);
        cache.set("user-1", "app_data", &"a", 5);
        cache.set("user-1", "subscription_status", &"free", 5);
        cache.set("user-2", "app_data", &"b", 5);

        cache.clear_user("user-1");

        assert_eq!(cache.get::<String>("user-1", "app_data"), None);
        assert_eq!(cache.get::<String>("user-1", "subscription_status"), None);
        assert_eq!(cache.get::<String>("user-2", "app_data"), Some("b".to_string()));
    }

    #[test]
    fn test_users_do_not_collide() {
        let (cache, _, _) = service_with_clock(0);
        cache.set("user-1", "app_data", &"mine", 5);

        assert_eq!(cache.get::<String>("user-2", "app_data"), None);
    }

    #[test]
    fn test_age_tracks_clock() {
        let (cache, _, now) = service_with_clock(10_000);
        cache.set("user-1", "app_data", &"x", 5);

        now.set(12_500);
        assert_eq!(cache.age_ms("user-1", "app_data"), Some(2_500));
        assert_eq!(cache.age_ms("user-1", "missing"), None);
    }
}
