//! Bounded response cache with FIFO eviction.
//!
//! Insertion order decides eviction: a read never refreshes an entry's
//! position. Repeated identical requests in a short window are the common
//! case, so recency tracking buys nothing over plain arrival order here.

use sidecar_core::completion::CompletionResponse;
use std::collections::{HashMap, VecDeque};

pub struct ResponseCache {
    capacity: usize,
    entries: HashMap<String, CompletionResponse>,
    order: VecDeque<String>,
}

impl ResponseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn get(&self, key: &str) -> Option<CompletionResponse> {
        self.entries.get(key).cloned()
    }

    pub fn insert(&mut self, key: String, response: CompletionResponse) {
        if self.entries.contains_key(&key) {
            self.entries.insert(key, response);
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, response);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(text: &str) -> CompletionResponse {
        CompletionResponse {
            text: text.into(),
            model: "test-model".into(),
            usage: None,
            finish_reason: None,
        }
    }

    #[test]
    fn stores_and_returns() {
        let mut cache = ResponseCache::new(2);
        cache.insert("a".into(), response("one"));
        assert_eq!(cache.get("a").unwrap().text, "one");
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut cache = ResponseCache::new(2);
        cache.insert("a".into(), response("one"));
        cache.insert("b".into(), response("two"));
        cache.insert("c".into(), response("three"));

        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn reads_do_not_refresh_position() {
        let mut cache = ResponseCache::new(2);
        cache.insert("a".into(), response("one"));
        cache.insert("b".into(), response("two"));

        // "a" is read but still evicted first: arrival order, not recency.
        assert!(cache.get("a").is_some());
        cache.insert("c".into(), response("three"));

        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn reinsert_updates_without_growing() {
        let mut cache = ResponseCache::new(2);
        cache.insert("a".into(), response("one"));
        cache.insert("a".into(), response("updated"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").unwrap().text, "updated");
    }

    #[test]
    fn clear_empties_everything() {
        let mut cache = ResponseCache::new(2);
        cache.insert("a".into(), response("one"));
        cache.clear();
        assert!(cache.is_empty());
        cache.insert("b".into(), response("two"));
        assert_eq!(cache.len(), 1);
    }
}
