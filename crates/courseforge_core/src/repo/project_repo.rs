//! Project collection persistence contract and SQLite key-value implementation.
//!
//! # Responsibility
//! - Load and overwrite the whole project collection stored under one key.
//! - Provide `upsert` as the single write path used by callers.
//! - Map unreadable stored data to `CorruptState` instead of panicking.
//!
//! # Invariants
//! - The collection is stored as one JSON array; `save_all` replaces it.
//! - `upsert` replaces the entry with a matching id in place, else appends.
//! - `upsert` is load-modify-save and not atomic across concurrent writers.

use crate::db::DbError;
use crate::model::document::{Document, DocumentId};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed namespace key under which the collection is stored.
pub const PROJECTS_STORAGE_KEY: &str = "courseforge_projects";

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence error for project collection operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Stored data is present but cannot be decoded.
    CorruptState(String),
    /// A document could not be encoded for storage.
    Serialization(serde_json::Error),
    NotFound(DocumentId),
    /// Connection is missing the table this store writes to.
    MissingRequiredTable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::CorruptState(message) => write!(f, "corrupt stored project data: {message}"),
            Self::Serialization(err) => write!(f, "failed to encode projects: {err}"),
            Self::NotFound(id) => write!(f, "project not found: {id}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::CorruptState(_) | Self::NotFound(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface over the persisted project collection.
pub trait ProjectStore {
    /// Returns every stored project in stored order. Absent data yields an
    /// empty collection.
    ///
    /// # Errors
    /// - `CorruptState` when stored data is present but unreadable.
    fn load_all(&self) -> StoreResult<Vec<Document>>;

    /// Overwrites the whole stored collection.
    fn save_all(&self, documents: &[Document]) -> StoreResult<()>;

    /// Like `load_all`, but recovers from `CorruptState` by treating the
    /// collection as empty.
    fn load_all_or_empty(&self) -> StoreResult<Vec<Document>> {
        match self.load_all() {
            Err(StoreError::CorruptState(message)) => {
                warn!(
                    "event=projects_load module=repo status=recovered error_code=corrupt_state error={}",
                    message
                );
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Replaces the stored project with the same id, or appends it.
    ///
    /// Corrupt stored data is discarded and replaced by a one-item
    /// collection.
    fn upsert(&self, document: &Document) -> StoreResult<()> {
        let mut documents = self.load_all_or_empty()?;
        match documents.iter_mut().find(|stored| stored.id == document.id) {
            Some(stored) => *stored = document.clone(),
            None => documents.push(document.clone()),
        }
        self.save_all(&documents)
    }

    /// Gets one project by id.
    fn get(&self, id: &str) -> StoreResult<Option<Document>> {
        Ok(self
            .load_all_or_empty()?
            .into_iter()
            .find(|document| document.id == id))
    }
}

impl<T: ProjectStore + ?Sized> ProjectStore for &T {
    fn load_all(&self) -> StoreResult<Vec<Document>> {
        (**self).load_all()
    }

    fn save_all(&self, documents: &[Document]) -> StoreResult<()> {
        (**self).save_all(documents)
    }
}

/// Decodes a stored collection. Blank input counts as absent.
pub(crate) fn decode_collection(raw: Option<&str>) -> StoreResult<Vec<Document>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(text) => serde_json::from_str(text).map_err(|err| StoreError::CorruptState(err.to_string())),
    }
}

pub(crate) fn encode_collection(documents: &[Document]) -> StoreResult<String> {
    serde_json::to_string(documents).map_err(StoreError::Serialization)
}

/// SQLite-backed project store using the `kv_store` table.
pub struct SqliteProjectStore<'conn> {
    conn: &'conn Connection,
    key: String,
}

impl<'conn> SqliteProjectStore<'conn> {
    /// Constructs a store from a migrated connection using the default key.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        Self::with_key(conn, PROJECTS_STORAGE_KEY)
    }

    /// Constructs a store that reads and writes under `key`.
    pub fn with_key(conn: &'conn Connection, key: impl Into<String>) -> StoreResult<Self> {
        if !table_exists(conn, "kv_store")? {
            return Err(StoreError::MissingRequiredTable("kv_store"));
        }
        Ok(Self {
            conn,
            key: key.into(),
        })
    }

    fn read_raw(&self) -> StoreResult<Option<String>> {
        let raw = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [self.key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(raw)
    }
}

impl ProjectStore for SqliteProjectStore<'_> {
    fn load_all(&self) -> StoreResult<Vec<Document>> {
        let raw = self.read_raw()?;
        let documents = decode_collection(raw.as_deref())?;
        info!(
            "event=projects_load module=repo status=ok count={}",
            documents.len()
        );
        Ok(documents)
    }

    fn save_all(&self, documents: &[Document]) -> StoreResult<()> {
        let encoded = encode_collection(documents)?;
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.key.as_str(), encoded],
        )?;
        info!(
            "event=projects_save module=repo status=ok count={} bytes={}",
            documents.len(),
            encoded.len()
        );
        Ok(())
    }
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::{decode_collection, StoreError};

    #[test]
    fn decode_treats_absent_and_blank_as_empty() {
        assert!(decode_collection(None).unwrap().is_empty());
        assert!(decode_collection(Some("  ")).unwrap().is_empty());
        assert!(decode_collection(Some("[]")).unwrap().is_empty());
    }

    #[test]
    fn decode_reports_corrupt_state() {
        let err = decode_collection(Some("{not json")).unwrap_err();
        assert!(matches!(err, StoreError::CorruptState(_)));
    }
}
