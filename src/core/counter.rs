//! Bounded-cardinality, case-insensitive frequency counter.
//!
//! Each trie node owns one of these for the literal tokens seen at its
//! position. Once the distinct-key limit is reached, new keys are folded into
//! a shared overflow bucket so counts are never lost.

use std::collections::HashMap;

use crate::core::label::CounterLimit;

/// Key that absorbs every distinct token past the limit.
pub const OVERFLOW_KEY: &str = "cardinality";

/// Average share per tracked key below which any seen value is worth keeping.
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.01;

/// Frequency table over lower-cased tokens.
#[derive(Debug, Clone)]
pub struct CaseInsensitiveCounter {
    limit: CounterLimit,
    total: u64,
    counts: HashMap<String, u64>,
}

impl CaseInsensitiveCounter {
    /// Create an empty counter.
    pub fn new(limit: CounterLimit) -> Self {
        Self {
            limit,
            total: 0,
            counts: HashMap::new(),
        }
    }

    /// Record one occurrence of `token`.
    pub fn add(&mut self, token: &str) {
        let key = token.to_lowercase();
        if self.counts.contains_key(&key) || self.under_limit() {
            *self.counts.entry(key).or_insert(0) += 1;
        } else {
            *self.counts.entry(OVERFLOW_KEY.to_string()).or_insert(0) += 1;
        }
        self.total += 1;
    }

    /// Stored count for `token`, 0 if untracked.
    pub fn get(&self, token: &str) -> u64 {
        self.counts
            .get(&token.to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct keys tracked, including the overflow key once used.
    pub fn population(&self) -> usize {
        self.counts.len()
    }

    /// Total number of `add` calls.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn limit(&self) -> CounterLimit {
        self.limit
    }

    /// Change the distinct-key limit. Existing keys are kept.
    pub fn set_limit(&mut self, limit: CounterLimit) {
        self.limit = limit;
    }

    /// Up to `n` keys by descending count, ties broken by key.
    pub fn top_n(&self, n: usize) -> Vec<String> {
        let mut entries: Vec<(&String, &u64)> = self.counts.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        entries
            .into_iter()
            .take(n)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Whether `token` is worth preserving literally.
    ///
    /// Requires room under the limit, and then either naturally diverse
    /// values (average share below [`SIGNIFICANCE_THRESHOLD`]) or a token
    /// that is more common than the average.
    pub fn is_significant(&self, token: &str) -> bool {
        if self.total == 0 || !self.under_limit() {
            return false;
        }
        let total = self.total as f64;
        let average_share = self.population() as f64 / total;
        let token_share = self.get(token) as f64 / total;
        average_share < SIGNIFICANCE_THRESHOLD || token_share > average_share
    }

    fn under_limit(&self) -> bool {
        match self.limit {
            CounterLimit::Unbounded => true,
            CounterLimit::AtMost(n) => self.counts.len() < n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_add() {
        let mut counter = CaseInsensitiveCounter::new(CounterLimit::AtMost(3));
        counter.add("test");
        counter.add("Test");
        assert_eq!(counter.get("test"), 2);
        assert_eq!(counter.get("TEST"), 2);
        assert_eq!(counter.population(), 1);
    }

    #[test]
    fn test_top_n_and_overflow() {
        let mut counter = CaseInsensitiveCounter::new(CounterLimit::AtMost(3));
        counter.add("test");
        counter.add("Test");
        counter.add("test1");
        counter.add("test1");
        counter.add("test1");
        counter.add("test3");

        assert_eq!(counter.population(), 3);
        assert_eq!(counter.top_n(2), vec!["test1", "test"]);

        counter.add("test4");
        counter.add("test5");

        assert_eq!(counter.population(), 4);
        assert_eq!(counter.get("test4"), 0);
        assert_eq!(counter.get(OVERFLOW_KEY), 2);
        assert_eq!(counter.total(), 8);
    }

    #[test]
    fn test_existing_key_still_counted_after_limit() {
        let mut counter = CaseInsensitiveCounter::new(CounterLimit::AtMost(1));
        counter.add("a");
        counter.add("b");
        counter.add("A");
        assert_eq!(counter.get("a"), 2);
        assert_eq!(counter.get(OVERFLOW_KEY), 1);
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut counter = CaseInsensitiveCounter::new(CounterLimit::AtMost(0));
        counter.add("2024");
        counter.add("2025");
        assert_eq!(counter.get("2024"), 0);
        assert_eq!(counter.get(OVERFLOW_KEY), 2);
        assert!(!counter.is_significant("2024"));
    }

    #[test]
    fn test_unbounded_tracks_everything() {
        let mut counter = CaseInsensitiveCounter::new(CounterLimit::Unbounded);
        for i in 0..500 {
            counter.add(&format!("value-{i}"));
        }
        assert_eq!(counter.population(), 500);
        assert_eq!(counter.get(OVERFLOW_KEY), 0);
    }

    #[test]
    fn test_top_n_larger_than_population() {
        let mut counter = CaseInsensitiveCounter::new(CounterLimit::Unbounded);
        counter.add("only");
        assert_eq!(counter.top_n(20), vec!["only"]);
    }

    #[test]
    fn test_top_n_ties_are_deterministic() {
        let mut counter = CaseInsensitiveCounter::new(CounterLimit::Unbounded);
        counter.add("b");
        counter.add("c");
        counter.add("a");
        assert_eq!(counter.top_n(3), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_significance_empty_counter() {
        let counter = CaseInsensitiveCounter::new(CounterLimit::Unbounded);
        assert!(!counter.is_significant("anything"));
    }

    #[test]
    fn test_significance_single_observation_is_not_significant() {
        let mut counter = CaseInsensitiveCounter::new(CounterLimit::Unbounded);
        counter.add("once");
        assert!(!counter.is_significant("once"));
    }

    #[test]
    fn test_significance_common_value() {
        let mut counter = CaseInsensitiveCounter::new(CounterLimit::AtMost(50));
        for _ in 0..10 {
            counter.add("en");
        }
        counter.add("fr");
        counter.add("de");
        assert!(counter.is_significant("en"));
        assert!(!counter.is_significant("fr"));
        assert!(!counter.is_significant("unseen"));
    }

    #[test]
    fn test_significance_diverse_population() {
        let mut counter = CaseInsensitiveCounter::new(CounterLimit::Unbounded);
        for _ in 0..200 {
            counter.add("a");
        }
        // 2 keys over 201 adds is under the threshold, so every value qualifies.
        counter.add("b");
        assert!(counter.is_significant("b"));
    }

    #[test]
    fn test_significance_requires_room_under_limit() {
        let mut counter = CaseInsensitiveCounter::new(CounterLimit::AtMost(2));
        for _ in 0..10 {
            counter.add("a");
        }
        counter.add("b");
        assert!(!counter.is_significant("a"));
    }

    #[test]
    fn test_set_limit_keeps_keys() {
        let mut counter = CaseInsensitiveCounter::new(CounterLimit::AtMost(1));
        counter.add("a");
        counter.set_limit(CounterLimit::Unbounded);
        counter.add("b");
        assert_eq!(counter.get("a"), 1);
        assert_eq!(counter.get("b"), 1);
        assert_eq!(counter.limit(), CounterLimit::Unbounded);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Property: counts are conserved exactly, overflow included
            #[test]
            fn prop_total_is_conserved(
                tokens in prop::collection::vec("[a-zA-Z]{1,6}", 0..200),
                limit in 0usize..20,
            ) {
                let mut counter = CaseInsensitiveCounter::new(CounterLimit::AtMost(limit));
                for token in &tokens {
                    counter.add(token);
                }
                let sum: u64 = counter.counts.values().sum();
                prop_assert_eq!(sum, counter.total());
                prop_assert_eq!(counter.total(), tokens.len() as u64);
            }

            // Property: population never exceeds limit plus the overflow key
            #[test]
            fn prop_population_bounded(
                tokens in prop::collection::vec("[a-z0-9]{1,8}", 0..200),
                limit in 0usize..20,
            ) {
                let mut counter = CaseInsensitiveCounter::new(CounterLimit::AtMost(limit));
                for token in &tokens {
                    counter.add(token);
                }
                prop_assert!(counter.population() <= limit + 1);
            }

            // Property: lookups ignore case
            #[test]
            fn prop_get_ignores_case(token in "[a-zA-Z]{1,10}") {
                let mut counter = CaseInsensitiveCounter::new(CounterLimit::Unbounded);
                counter.add(&token.to_uppercase());
                counter.add(&token.to_lowercase());
                prop_assert_eq!(counter.get(&token), 2);
            }
        }
    }
}
