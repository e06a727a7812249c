use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

type CacheKey = (String, String);

/// Bounded LRU of finished translations keyed by `(text, target language)`.
///
/// Language tags are compared case-insensitively; text is matched exactly.
#[derive(Clone, Debug)]
pub struct TranslationCache {
    entries: Arc<Mutex<LruCache<CacheKey, String>>>,
}

impl TranslationCache {
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    fn key(text: &str, target: &str) -> CacheKey {
        (text.to_string(), target.to_ascii_lowercase())
    }

    pub fn get(&self, text: &str, target: &str) -> Option<String> {
        let mut entries = self.entries.lock().expect("translation cache lock poisoned");
        entries.get(&Self::key(text, target)).cloned()
    }

    pub fn insert(&self, text: &str, target: &str, translated: impl Into<String>) {
        let mut entries = self.entries.lock().expect("translation cache lock poisoned");
        entries.put(Self::key(text, target), translated.into());
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("translation cache lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries
            .lock()
            .expect("translation cache lock poisoned")
            .cap()
            .get()
    }
}
