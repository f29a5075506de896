//! Document repository contract and SQLite implementation.

use crate::db::DbError;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed store key for the journal document.
pub const DEFAULT_DOCUMENT_KEY: &str = "daylog.document";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for document persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Stored bytes cannot be read as a journal document.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid stored document: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Byte-store contract for the journal text.
pub trait DocumentRepository {
    /// Loads the raw blob stored under `key`.
    fn load_blob(&self, key: &str) -> RepoResult<Option<Vec<u8>>>;
    /// Replaces the blob stored under `key`.
    fn save_blob(&self, key: &str, value: &[u8]) -> RepoResult<()>;

    /// Loads the document text; absence is the empty document.
    fn load_document(&self, key: &str) -> RepoResult<String> {
        match self.load_blob(key)? {
            Some(bytes) => String::from_utf8(bytes)
                .map_err(|err| RepoError::InvalidData(format!("not UTF-8: {err}"))),
            None => Ok(String::new()),
        }
    }

    /// Saves the full document text.
    fn save_document(&self, key: &str, text: &str) -> RepoResult<()> {
        self.save_blob(key, text.as_bytes())
    }
}

/// SQLite-backed key-value blob store.
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let ready: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_blobs'
            );",
            [],
            |row| row.get(0),
        )?;
        if !ready {
            return Err(RepoError::InvalidData(
                "kv_blobs table missing; open the store through db::open_db".to_string(),
            ));
        }
        Ok(Self { conn })
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn load_blob(&self, key: &str) -> RepoResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_blobs WHERE key = ?1;",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        info!(
            "event=document_load module=repo status=ok found={} bytes={}",
            value.is_some(),
            value.as_ref().map_or(0, Vec::len)
        );
        Ok(value)
    }

    fn save_blob(&self, key: &str, value: &[u8]) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO kv_blobs (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )
            .map_err(|err| {
                error!("event=document_save module=repo status=error error={err}");
                err
            })?;
        info!(
            "event=document_save module=repo status=ok bytes={}",
            value.len()
        );
        Ok(())
    }
}
