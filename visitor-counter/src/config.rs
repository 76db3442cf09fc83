use {
    std::env,
    visitor_counter_core::DEFAULT_TABLE_NAME,
};

pub const ENV_TABLE_NAME: &str = "TABLE_NAME";

/// Resolved once at process start and never changed afterwards.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CounterConfig {
    pub table_name: String,
}

impl CounterConfig {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// A set but empty `TABLE_NAME` is kept as is and left for the store to reject.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::new(lookup(ENV_TABLE_NAME).unwrap_or_else(|| DEFAULT_TABLE_NAME.to_owned()))
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_NAME)
    }
}
