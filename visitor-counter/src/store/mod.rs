use {
    std::sync::Arc,
    futures::future::BoxFuture,
    crate::error::StoreError,
};

pub use self::{
    dynamodb::DynamoDbStore,
    memory::InMemoryStore,
    sqlite::{SqliteStore, SqliteStoreOpenError},
};

mod dynamodb;
mod memory;
mod sqlite;

pub trait CounterStore {
    /// Atomically increments the counter stored under `key` and returns the value after the increment.
    /// A missing record counts as zero, so the first increment returns 1.
    ///
    /// Concurrent calls never observe the same base value: every successful call produces a distinct result.
    fn increment<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<u64, StoreError>>;
}

impl<T: CounterStore + ?Sized> CounterStore for Arc<T> {
    fn increment<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<u64, StoreError>> {
        self.as_ref().increment(key)
    }
}

#[derive(Clone)]
pub struct BoxedCounterStore {
    inner: Arc<dyn CounterStore + Send + Sync>,
}

impl BoxedCounterStore {
    pub fn new<T: CounterStore + Send + Sync + 'static>(inner: T) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl CounterStore for BoxedCounterStore {
    fn increment<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<u64, StoreError>> {
        self.inner.increment(key)
    }
}
