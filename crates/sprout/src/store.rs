//! Namespaced key/value store.
//!
//! A [`Store`] is a map from dotted string keys to arbitrary values. Calling
//! [`Store::namespace`] returns a view that prefixes every key with
//! `prefix.`; all views derived from one root share the same map and the same
//! lock, so a value written through `store.namespace("db")` under `"url"` is
//! visible from the root as `"db.url"`.
//!
//! ```rust
//! use sprout::Store;
//!
//! let store = Store::new();
//! let db = store.namespace("db");
//! db.set("url", "postgres://localhost".to_string());
//!
//! assert_eq!(store.get::<String>("db.url").as_deref(), Some("postgres://localhost"));
//! assert_eq!(db.keys(), vec!["db.url".to_string()]);
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Value = Arc<dyn Any + Send + Sync>;

/// Thread-safe, namespaced key/value store.
#[derive(Clone, Default)]
pub struct Store {
    data: Arc<RwLock<HashMap<String, Value>>>,
    prefix: String,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view whose keys live under `prefix.` within this store.
    pub fn namespace(&self, prefix: &str) -> Store {
        Store {
            data: Arc::clone(&self.data),
            prefix: self.make_key(prefix),
        }
    }

    /// The full prefix of this view, empty for the root.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn make_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Value>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set<T: Any + Send + Sync>(&self, key: &str, value: T) {
        self.write().insert(self.make_key(key), Arc::new(value));
    }

    /// Returns a clone of the value under `key` if it exists and has type `T`.
    pub fn get<T: Any + Send + Sync + Clone>(&self, key: &str) -> Option<T> {
        self.read()
            .get(&self.make_key(key))
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    /// Returns true if a value exists under `key`, whatever its type.
    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(&self.make_key(key))
    }

    /// Removes the value under `key`.
    pub fn delete(&self, key: &str) {
        self.write().remove(&self.make_key(key));
    }

    /// Full keys visible from this view, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.collect_keys(&self.prefix)
    }

    /// Full keys under `prefix` relative to this view, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.collect_keys(&self.make_key(prefix))
    }

    fn collect_keys(&self, search: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .read()
            .keys()
            .filter(|key| under(key, search))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Removes every key visible from this view. On the root this empties
    /// the whole store.
    pub fn clear(&self) {
        let search = self.prefix.clone();
        self.retain_outside(&search);
    }

    /// Removes every key under `prefix` relative to this view.
    pub fn clear_prefix(&self, prefix: &str) {
        let search = self.make_key(prefix);
        self.retain_outside(&search);
    }

    fn retain_outside(&self, search: &str) {
        self.write()
            .retain(|key, _| !under(key, search));
    }

    /// Number of entries in the whole underlying map.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

/// True if `key` is `prefix` itself or lies below it.
fn under(key: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || key
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("prefix", &self.prefix)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_set_get_delete() {
        let store = Store::new();
        store.set("answer", 42u32);
        assert_eq!(store.get::<u32>("answer"), Some(42));
        assert_eq!(store.get::<String>("answer"), None);
        assert!(store.contains("answer"));

        store.delete("answer");
        assert_eq!(store.get::<u32>("answer"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_namespaces_share_data() {
        let store = Store::new();
        let cache = store.namespace("cache");
        let nested = cache.namespace("http");

        nested.set("hits", 3usize);
        assert_eq!(nested.prefix(), "cache.http");
        assert_eq!(store.get::<usize>("cache.http.hits"), Some(3));
        assert_eq!(cache.get::<usize>("http.hits"), Some(3));

        store.set("cache.http.hits", 4usize);
        assert_eq!(nested.get::<usize>("hits"), Some(4));
    }

    #[test]
    fn test_keys_are_scoped() {
        let store = Store::new();
        store.set("a.x", 1);
        store.set("a.y", 2);
        store.set("b.x", 3);
        store.set("ab.x", 4);

        assert_eq!(store.keys().len(), 4);
        assert_eq!(store.namespace("a").keys(), vec!["a.x", "a.y"]);
        assert_eq!(store.keys_with_prefix("b"), vec!["b.x"]);
    }

    #[test]
    fn test_clear_scoped_and_root() {
        let store = Store::new();
        store.set("a.x", 1);
        store.set("b.x", 2);
        store.set("b.y", 3);

        store.clear_prefix("b");
        assert_eq!(store.keys(), vec!["a.x"]);

        store.namespace("a").clear();
        assert!(store.is_empty());

        store.set("c", 1);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_writers() {
        let store = Store::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let view = store.namespace(&format!("worker{}", i));
                thread::spawn(move || view.set("done", true))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 8);
    }
}
