//! Connection pools for the conversation store.
//!
//! Session and message writes go through a single connection. History reads
//! use a read-only pool. Migrations run on the writer when the pool opens.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// Concurrent history readers allowed per process.
const READER_CONNECTIONS: u32 = 8;

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Reader and writer handles onto one `tagarela.db`.
#[derive(Clone)]
pub struct DatabasePool {
    /// Read-only; used by history and listing queries.
    pub reader: SqlitePool,
    /// One connection; every insert, update and delete goes here.
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open (creating if needed) the database at `database_url` and bring its
    /// schema up to date.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;

        // The reader pool is read-only, so the schema must exist first.
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(options.read_only(true))
            .await?;

        Ok(Self { reader, writer })
    }
}

/// Database URL for `tagarela.db` inside the data directory.
pub fn default_database_url(data_dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join("tagarela.db").display())
}
