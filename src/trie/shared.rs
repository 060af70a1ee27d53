//! Serialised access to one trie from many ingestion workers

use super::BestTipTrie;
use parking_lot::Mutex;
use std::sync::Arc;

/// A cloneable handle that funnels every mutation through a single lock
///
/// The trie's arena and index are not built for concurrent mutation, so
/// workers that poll peers in parallel share one of these and insert their
/// results one at a time.
#[derive(Clone, Default)]
pub struct SharedTrie {
    inner: Arc<Mutex<BestTipTrie>>,
}

impl SharedTrie {
    pub fn new() -> Self {
        SharedTrie::default()
    }

    pub fn insert<S: AsRef<str>>(&self, chain: &[S], label: impl Into<String>) {
        self.inner.lock().insert(chain, label);
    }

    pub fn insert_link(&self, parent: &str, child: &str, value: Option<String>) {
        self.inner.lock().insert_link(parent, child, value);
    }

    /// Run a read-only query while holding the lock
    pub fn with<R>(&self, f: impl FnOnce(&BestTipTrie) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Take the trie out once ingestion is done
    ///
    /// If other handles are still alive the current state is cloned.
    pub fn into_inner(self) -> BestTipTrie {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner(),
            Err(shared) => shared.lock().clone(),
        }
    }
}

impl From<BestTipTrie> for SharedTrie {
    fn from(trie: BestTipTrie) -> Self {
        SharedTrie {
            inner: Arc::new(Mutex::new(trie)),
        }
    }
}
