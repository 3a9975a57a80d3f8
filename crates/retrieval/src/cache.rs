//! Bounded LRU translation cache
//!
//! Injected into the engine rather than living as a module-level map, so
//! tests can construct isolated instances and the size stays capped.
//! Eviction is least-recently-used: a hit refreshes the entry.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

/// Bounded LRU cache for query translations, keyed by
/// `"{source_text}:{target_lang}"`.
pub struct TranslationCache {
    inner: Mutex<LruInner>,
    capacity: usize,
}

struct LruInner {
    map: HashMap<String, String>,
    order: VecDeque<String>,
}

impl TranslationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruInner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let mut inner = self.inner.lock();
        let value = inner.map.get(key).cloned()?;
        // Refresh recency
        if let Some(pos) = inner.order.iter().position(|k| k == key) {
            inner.order.remove(pos);
        }
        inner.order.push_back(key.to_string());
        Some(value)
    }

    pub fn insert(&self, key: String, value: String) {
        let mut inner = self.inner.lock();
        if inner.map.contains_key(&key) {
            inner.map.insert(key.clone(), value);
            if let Some(pos) = inner.order.iter().position(|k| k == &key) {
                inner.order.remove(pos);
            }
            inner.order.push_back(key);
            return;
        }
        if inner.map.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.map.remove(&oldest);
            }
        }
        inner.map.insert(key.clone(), value);
        inner.order.push_back(key);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(256)
    }
}
