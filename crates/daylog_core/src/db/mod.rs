//! SQLite journal store.
//!
//! # Responsibility
//! - Hand out connections whose schema matches this build.
//! - Keep schema steps and their versioning in one place.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - Nothing reads or writes `kv_blobs` on a connection that was not opened
//!   through this module.

use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::{Duration, Instant};

pub mod schema;

pub use rusqlite::Connection;
pub use schema::{schema_version, SchemaUpgrade, SCHEMA_VERSION};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Store was written by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "journal store error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "journal store schema v{found} is newer than this build (v{supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Opens (creating if needed) the store file at `path`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    prepare("file", Connection::open(path))
}

/// Opens a private in-memory store.
pub fn open_db_in_memory() -> DbResult<Connection> {
    prepare("memory", Connection::open_in_memory())
}

fn prepare(mode: &'static str, opened: rusqlite::Result<Connection>) -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = opened.map_err(DbError::from).and_then(|mut conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let upgrade = schema::upgrade(&mut conn)?;
        Ok((conn, upgrade))
    });

    match result {
        Ok((conn, upgrade)) => {
            info!(
                "event=db_open module=db status=ok mode={mode} from_version={} to_version={} duration_ms={}",
                upgrade.from,
                upgrade.to,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}
