//! Query Cache
//!
//! Exact-string memoization of generated responses. Keys are the raw
//! question text with no normalization, so "What is X?" and "what is x?"
//! are different entries. The cache is unbounded by default; configuring a
//! capacity switches the backing store to an LRU without changing the
//! lookup contract.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::types::QaResponse;

enum Backing {
    Unbounded(HashMap<String, QaResponse>),
    Bounded(LruCache<String, QaResponse>),
}

pub struct QueryCache {
    inner: Mutex<Backing>,
}

impl QueryCache {
    /// `capacity = None` keeps every entry for the process lifetime.
    pub fn new(capacity: Option<usize>) -> Self {
        let backing = match capacity.and_then(NonZeroUsize::new) {
            Some(cap) => Backing::Bounded(LruCache::new(cap)),
            None => Backing::Unbounded(HashMap::new()),
        };
        Self {
            inner: Mutex::new(backing),
        }
    }

    pub fn get(&self, question: &str) -> Option<QaResponse> {
        match &mut *self.inner.lock() {
            Backing::Unbounded(map) => map.get(question).cloned(),
            Backing::Bounded(lru) => lru.get(question).cloned(),
        }
    }

    pub fn put(&self, question: &str, response: QaResponse) {
        match &mut *self.inner.lock() {
            Backing::Unbounded(map) => {
                map.insert(question.to_string(), response);
            }
            Backing::Bounded(lru) => {
                lru.put(question.to_string(), response);
            }
        }
    }

    pub fn len(&self) -> usize {
        match &*self.inner.lock() {
            Backing::Unbounded(map) => map.len(),
            Backing::Bounded(lru) => lru.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn response(question: &str, answer: &str) -> QaResponse {
        QaResponse {
            question: question.to_string(),
            answer: answer.to_string(),
            relevant_bookings: Vec::new(),
            category: Category::General,
        }
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = QueryCache::new(None);
        assert!(cache.get("q").is_none());
        cache.put("q", response("q", "a"));
        assert_eq!(cache.get("q").unwrap().answer, "a");
    }

    #[test]
    fn test_keys_are_exact_strings() {
        let cache = QueryCache::new(None);
        cache.put("What is the rate?", response("What is the rate?", "a"));
        assert!(cache.get("what is the rate?").is_none());
        assert!(cache.get("What is the rate? ").is_none());
    }

    #[test]
    fn test_bounded_cache_evicts_least_recently_used() {
        let cache = QueryCache::new(Some(2));
        cache.put("a", response("a", "1"));
        cache.put("b", response("b", "2"));
        // Touch "a" so "b" becomes the eviction candidate.
        assert!(cache.get("a").is_some());
        cache.put("c", response("c", "3"));
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_unbounded_cache_keeps_everything() {
        let cache = QueryCache::new(None);
        for i in 0..100 {
            let q = format!("question {}", i);
            cache.put(&q, response(&q, "a"));
        }
        assert_eq!(cache.len(), 100);
        assert!(cache.get("question 0").is_some());
    }
}
