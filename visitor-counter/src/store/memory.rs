use {
    std::{collections::HashMap, sync::Mutex},
    futures::future::{self, BoxFuture, FutureExt},
    crate::{error::StoreError, store::CounterStore},
};

/// Process-local store. Counters are lost when the process exits.
#[derive(Default)]
pub struct InMemoryStore {
    counters: Mutex<HashMap<String, u64>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the counter under `key` at `count`, as if it had been incremented that many times.
    pub fn with_count(self, key: impl Into<String>, count: u64) -> Result<Self, StoreError> {
        self.counters.lock()
            .map_err(|err| StoreError::Internal { description: format!("failed to lock counters: {err:?}") })?
            .insert(key.into(), count);
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let counters = self.counters.lock()
            .map_err(|err| StoreError::Internal { description: format!("failed to lock counters: {err:?}") })?;
        Ok(counters.get(key).copied())
    }

    fn increment_locked(&self, key: &str) -> Result<u64, StoreError> {
        let mut counters = self.counters.lock()
            .map_err(|err| StoreError::Internal { description: format!("failed to lock counters: {err:?}") })?;
        let count = counters.entry(key.to_owned()).or_insert(0);
        *count = count.checked_add(1)
            .ok_or_else(|| StoreError::Overflow { key: key.to_owned() })?;
        Ok(*count)
    }
}

impl CounterStore for InMemoryStore {
    fn increment<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<u64, StoreError>> {
        future::ready(self.increment_locked(key)).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_record_starts_at_zero() {
        let store = InMemoryStore::new();
        assert_eq!(None, store.get("counter").unwrap());
        assert_eq!(1, store.increment("counter").await.unwrap());
        assert_eq!(Some(1), store.get("counter").unwrap());
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let store = InMemoryStore::new();
        store.increment("a").await.unwrap();
        store.increment("a").await.unwrap();
        assert_eq!(1, store.increment("b").await.unwrap());
        assert_eq!(3, store.increment("a").await.unwrap());
    }

    #[tokio::test]
    async fn overflow_is_an_error() {
        let store = InMemoryStore::new().with_count("counter", u64::MAX).unwrap();
        assert_eq!(
            Err(StoreError::Overflow { key: "counter".to_owned() }),
            store.increment("counter").await,
        );
        assert_eq!(Some(u64::MAX), store.get("counter").unwrap());
    }
}
