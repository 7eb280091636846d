//! Insertion Order Module
//!
//! Tracks key insertion order for FIFO eviction and the lazy expiry sweep.

use std::collections::VecDeque;

// == Insertion Order ==
/// Tracks the order in which keys were written.
///
/// Keys are stored in a VecDeque where:
/// - Front = Oldest insertion
/// - Back = Newest insertion
///
/// Reads never reorder keys; this is a memoization cache, not an LRU.
#[derive(Debug)]
pub(crate) struct InsertionOrder<K> {
    /// Order of keys by insertion time
    order: VecDeque<K>,
}

impl<K: PartialEq> InsertionOrder<K> {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Push ==
    /// Records `key` as the newest insertion.
    ///
    /// The caller removes any earlier occurrence first; the cache only pushes
    /// keys it has just missed on.
    pub fn push(&mut self, key: K) {
        self.order.push_back(key);
    }

    // == Remove ==
    /// Removes a key from the tracker. Used when an expired entry is found
    /// before the sweep reached it.
    pub fn remove(&mut self, key: &K) {
        self.order.retain(|k| k != key);
    }

    // == Pop Oldest ==
    /// Returns and removes the oldest inserted key.
    ///
    /// Returns None if tracker is empty.
    pub fn pop_oldest(&mut self) -> Option<K> {
        self.order.pop_front()
    }

    // == Peek Oldest ==
    /// Returns the oldest inserted key without removing it.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.order.front()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_new() {
        let order: InsertionOrder<&str> = InsertionOrder::new();
        assert!(order.is_empty());
        assert_eq!(order.len(), 0);
    }

    #[test]
    fn test_order_push_new_keys() {
        let mut order = InsertionOrder::new();

        order.push("key1");
        order.push("key2");
        order.push("key3");

        assert_eq!(order.len(), 3);
        assert_eq!(order.peek_oldest(), Some(&"key1"));
    }

    #[test]
    fn test_order_pop_oldest() {
        let mut order = InsertionOrder::new();

        order.push("key1");
        order.push("key2");
        order.push("key3");

        assert_eq!(order.pop_oldest(), Some("key1"));
        assert_eq!(order.len(), 2);
        assert_eq!(order.pop_oldest(), Some("key2"));
        assert_eq!(order.len(), 1);
    }

    #[test]
    fn test_order_pop_empty() {
        let mut order: InsertionOrder<String> = InsertionOrder::new();
        assert_eq!(order.pop_oldest(), None);
        assert_eq!(order.peek_oldest(), None);
    }

    #[test]
    fn test_order_remove() {
        let mut order = InsertionOrder::new();

        order.push("a");
        order.push("b");
        order.push("c");

        order.remove(&"b");

        assert_eq!(order.len(), 2);
        assert_eq!(order.pop_oldest(), Some("a"));
        assert_eq!(order.pop_oldest(), Some("c"));
    }

    #[test]
    fn test_order_remove_nonexistent_key() {
        let mut order = InsertionOrder::new();

        order.push("key1");
        order.push("key2");
        order.remove(&"nonexistent");

        assert_eq!(order.len(), 2);
        assert_eq!(order.peek_oldest(), Some(&"key1"));
    }

    #[test]
    fn test_order_remove_then_push_moves_key_to_back() {
        let mut order = InsertionOrder::new();

        order.push("a");
        order.push("b");
        order.remove(&"a");
        order.push("a");

        assert_eq!(order.len(), 2);
        assert_eq!(order.pop_oldest(), Some("b"));
        assert_eq!(order.pop_oldest(), Some("a"));
    }
}
