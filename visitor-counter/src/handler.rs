use {
    tracing::{info, error},
    serde_json::Value,
    lambda_runtime::LambdaEvent,
    visitor_counter_core::{InvocationResponse, COUNTER_KEY},
    crate::{error::CounterError, store::CounterStore},
};

/// Handles visitor counter invocations. Built once per process and shared by every invocation;
/// holds no counter state of its own.
pub struct CounterHandler<S> {
    store: S,
}

impl<S: CounterStore> CounterHandler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The event is not inspected: every invocation increments the same counter.
    pub async fn handle(&self, _event: LambdaEvent<Value>) -> Result<InvocationResponse, CounterError> {
        let count = match self.store.increment(COUNTER_KEY).await {
            Ok(v) => v,
            Err(err) => {
                error!("failed to increment counter: {err:?}");
                return Err(err.into());
            }
        };

        info!(count, "counter incremented");
        Ok(InvocationResponse::count(count)?)
    }
}
