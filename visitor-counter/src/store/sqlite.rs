use {
    std::{sync::{Arc, Mutex}, path::Path},
    thiserror::Error,
    rusqlite::{Connection, OptionalExtension},
    futures::future::{self, BoxFuture, FutureExt},
    crate::{error::StoreError, store::CounterStore},
};

/// Local store for development and smoke tests. Each counter is a row in `table_name`,
/// incremented with a single upsert statement.
#[derive(Clone)]
pub struct SqliteStore {
    connection: Arc<Mutex<Connection>>,
    increment_query: String,
    get_query: String,
}

#[derive(Error, Debug)]
pub enum SqliteStoreOpenError {
    #[error("failed to open connection: {0:?}")]
    ConnectionOpenError(rusqlite::Error),

    #[error("failed to init database: {0:?}")]
    DatabaseInitError(rusqlite::Error),
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>, table_name: &str) -> Result<Self, SqliteStoreOpenError> {
        Self::from_connection(
            Connection::open(path).map_err(SqliteStoreOpenError::ConnectionOpenError)?,
            table_name,
        )
    }

    pub fn in_memory(table_name: &str) -> Result<Self, SqliteStoreOpenError> {
        Self::from_connection(
            Connection::open_in_memory().map_err(SqliteStoreOpenError::ConnectionOpenError)?,
            table_name,
        )
    }

    fn from_connection(connection: Connection, table_name: &str) -> Result<Self, SqliteStoreOpenError> {
        let table = quote_identifier(table_name);
        connection.execute(&format!("create table if not exists {table} (pk text primary key, \"count\" integer not null)"), ())
            .map_err(SqliteStoreOpenError::DatabaseInitError)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            // the where clause keeps the column from silently turning into a float at i64::MAX
            increment_query: format!(
                "insert into {table} (pk, \"count\") values (?1, 1) \
                on conflict (pk) do update set \"count\" = \"count\" + 1 where \"count\" < {} \
                returning \"count\"",
                i64::MAX,
            ),
            get_query: format!("select \"count\" from {table} where pk = ?1"),
        })
    }

    pub fn get(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let connection = self.connection.lock()
            .map_err(|err| StoreError::Internal { description: format!("failed to acquire sqlite connection: {err:?}") })?;
        let count = connection.query_row(&self.get_query, [key], |row| row.get::<_, i64>(0))
            .optional()
            .map_err(|err| StoreError::Internal { description: format!("failed to execute sqlite query: {err:?}") })?;

        count.map(|count| to_count(key, count)).transpose()
    }

    fn increment_locked(&self, key: &str) -> Result<u64, StoreError> {
        let connection = self.connection.lock()
            .map_err(|err| StoreError::Internal { description: format!("failed to acquire sqlite connection: {err:?}") })?;
        let count = connection.query_row(&self.increment_query, [key], |row| row.get::<_, i64>(0))
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => StoreError::Overflow { key: key.to_owned() },
                rusqlite::Error::InvalidColumnType(..) => StoreError::MalformedCount { reason: format!("{err:?}") },
                other => StoreError::Internal { description: format!("failed to execute sqlite query: {other:?}") },
            })?;

        to_count(key, count)
    }
}

impl CounterStore for SqliteStore {
    fn increment<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<u64, StoreError>> {
        future::ready(self.increment_locked(key)).boxed()
    }
}

fn to_count(key: &str, count: i64) -> Result<u64, StoreError> {
    u64::try_from(count)
        .map_err(|_| StoreError::MalformedCount { reason: format!("negative count {count} stored for key {key:?}") })
}

fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}
