use std::num::NonZeroUsize;

use lru::LruCache;

use super::Rendered;

/// Cache key: raw content plus the time bucket it was rendered in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub content: String,
    pub bucket: u64,
}

/// Strict LRU memo of rendered blocks with a fixed capacity.
pub struct RenderCache {
    entries: LruCache<CacheKey, Rendered>,
    hits: u64,
    misses: u64,
}

impl RenderCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up `key`, promoting it to most recently used on a hit.
    pub fn get(&mut self, key: &CacheKey) -> Option<&Rendered> {
        let found = self.entries.get(key);
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    /// Insert `value`, evicting the least recently used entry when full.
    ///
    /// Returns the evicted key, if any.
    pub fn put(&mut self, key: CacheKey, value: Rendered) -> Option<CacheKey> {
        // `push` also hands back the old value when the key was already present.
        let updating = self.entries.contains(&key);
        let displaced = self.entries.push(key, value);
        if updating {
            None
        } else {
            displaced.map(|(old, _)| old)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains(key)
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub const fn hits(&self) -> u64 {
        self.hits
    }

    pub const fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for RenderCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: usize) -> CacheKey {
        CacheKey {
            content: format!("block {n}"),
            bucket: 0,
        }
    }

    fn value(n: usize) -> Rendered {
        Rendered {
            text: format!("r{n}"),
            diagnostics: Vec::new(),
        }
    }

    fn cache(cap: usize) -> RenderCache {
        RenderCache::new(NonZeroUsize::new(cap).unwrap())
    }

    #[test]
    fn test_hit_promotes_entry() {
        let mut c = cache(2);
        c.put(key(1), value(1));
        c.put(key(2), value(2));
        assert!(c.get(&key(1)).is_some());
        let evicted = c.put(key(3), value(3));
        assert_eq!(evicted, Some(key(2)));
        assert!(c.contains(&key(1)));
    }

    #[test]
    fn test_reinserting_existing_key_evicts_nothing() {
        let mut c = cache(2);
        c.put(key(1), value(1));
        c.put(key(2), value(2));
        assert_eq!(c.put(key(1), value(9)), None);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_counts_hits_and_misses() {
        let mut c = cache(1);
        c.put(key(1), value(1));
        let _ = c.get(&key(1));
        let _ = c.get(&key(2));
        assert_eq!((c.hits(), c.misses()), (1, 1));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn holds_exactly_the_most_recent_keys(
                capacity in 1..20usize,
                extra in 1..40usize,
            ) {
                let mut c = cache(capacity);
                let total = capacity + extra;
                for n in 0..total {
                    c.put(key(n), value(n));
                }
                prop_assert_eq!(c.len(), capacity);
                let kept: Vec<_> = c.keys().cloned().collect();
                let expected: Vec<_> = (extra..total).rev().map(key).collect();
                prop_assert_eq!(kept, expected);
            }

            #[test]
            fn never_exceeds_capacity(
                capacity in 1..10usize,
                ops in proptest::collection::vec((any::<bool>(), 0..30usize), 0..200),
            ) {
                let mut c = cache(capacity);
                for (is_put, n) in ops {
                    if is_put {
                        c.put(key(n), value(n));
                    } else {
                        let _ = c.get(&key(n));
                    }
                    prop_assert!(c.len() <= capacity);
                }
            }
        }
    }
}
