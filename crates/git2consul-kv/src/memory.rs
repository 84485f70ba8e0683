//! In-process store.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::{Error, KvStore, Result};

#[derive(Debug, Clone, Copy)]
struct Failure {
    transient: bool,
    /// `None` fails forever
    remaining: Option<usize>,
}

#[derive(Debug, Default)]
struct State {
    entries: BTreeMap<String, Vec<u8>>,
    writes: Vec<(String, Vec<u8>)>,
    failures: HashMap<String, Failure>,
}

/// Store that keeps entries in memory.
///
/// Besides the current entries it records every successful write in order,
/// and can be told to fail writes of specific keys.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current value of `key`.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.state().entries.get(key).cloned()
    }

    /// Current value of `key` as UTF-8 text.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| String::from_utf8_lossy(&v).into_owned())
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.state().entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().entries.is_empty()
    }

    /// Every successful write so far, oldest first.
    pub fn writes(&self) -> Vec<(String, Vec<u8>)> {
        self.state().writes.clone()
    }

    /// Make every write of `key` fail.
    pub fn fail_always(&self, key: &str, transient: bool) {
        self.state().failures.insert(
            key.to_string(),
            Failure {
                transient,
                remaining: None,
            },
        );
    }

    /// Make the next `times` writes of `key` fail.
    pub fn fail_times(&self, key: &str, times: usize, transient: bool) {
        self.state().failures.insert(
            key.to_string(),
            Failure {
                transient,
                remaining: Some(times),
            },
        );
    }

    /// Stop failing writes of `key`.
    pub fn clear_failure(&self, key: &str) {
        self.state().failures.remove(key);
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut state = self.state();

        if let Some(failure) = state.failures.get_mut(key) {
            let fire = match failure.remaining.as_mut() {
                None => true,
                Some(0) => false,
                Some(n) => {
                    *n -= 1;
                    true
                }
            };
            if fire {
                return Err(Error::Injected {
                    key: key.to_string(),
                    message: "injected store failure".into(),
                    transient: failure.transient,
                });
            }
        }

        state.entries.insert(key.to_string(), value.to_vec());
        state.writes.push((key.to_string(), value.to_vec()));
        tracing::trace!(key = %key, bytes = value.len(), "Memory store saved key");
        Ok(())
    }
}
