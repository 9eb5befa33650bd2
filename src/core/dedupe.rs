use std::collections::HashSet;
use std::sync::Mutex;

/// First-seen tracker over content-derived keys.
///
/// The first call with a given `(namespace, hash)` returns `false` and marks
/// it; later calls return `true`. Keys are never removed. The check-and-mark
/// is a single atomic step so one bag can be shared by several builders.
pub trait DedupeBag: Send + Sync {
    fn already_seen(&self, hash: &str, namespace: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct HashDedupeBag {
    seen: Mutex<HashSet<String>>,
}

impl HashDedupeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // a poisoned set is still a valid set of keys
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DedupeBag for HashDedupeBag {
    fn already_seen(&self, hash: &str, namespace: &str) -> bool {
        let key = format!("{}{}", namespace, hash);
        !self.lock().insert(key)
    }
}

/// Bag that never reports a key as seen; every shared subgraph is emitted
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDedupeBag;

impl DedupeBag for NullDedupeBag {
    fn already_seen(&self, _hash: &str, _namespace: &str) -> bool {
        false
    }
}
