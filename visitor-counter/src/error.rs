use {
    thiserror::Error,
    visitor_counter_core::ResponseError,
};

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum StoreError {
    /// Request never got a response from the store (network failure, timeout).
    #[error("store is unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("access to store denied: {reason}")]
    AccessDenied { reason: String },

    #[error("store throttled the request: {reason}")]
    Throttled { reason: String },

    /// Any other refusal by the store service.
    #[error("store rejected the request: {reason}")]
    Rejected { reason: String },

    #[error("table not found: {reason}")]
    TableNotFound { reason: String },

    /// Request failed validation on the store side, for example because of an invalid table name.
    #[error("invalid store request: {reason}")]
    InvalidRequest { reason: String },

    #[error("store response is missing attribute {attribute:?}")]
    MissingAttribute { attribute: String },

    #[error("store returned malformed count: {reason}")]
    MalformedCount { reason: String },

    #[error("counter overflowed for key {key:?}")]
    Overflow { key: String },

    /// Failure inside a local backend implementation.
    /// If this happens, something is very broken (similar to 503 response in http).
    #[error("internal store error: {description}")]
    Internal { description: String },
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum CounterError {
    #[error("failed to increment counter: {0}")]
    Store(#[from] StoreError),

    #[error("failed to build response: {0}")]
    Response(#[from] ResponseError),
}
