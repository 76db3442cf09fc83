pub use visitor_counter_core::{CountBody, InvocationResponse};

pub mod config;
pub mod error;
pub mod handler;
pub mod store;
