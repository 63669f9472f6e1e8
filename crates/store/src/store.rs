use crate::error::{Result, StoreError};
use crate::types::FileRecord;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs;
use std::path::Path;

const SCHEMA: &str = "
    PRAGMA journal_mode=WAL;

    CREATE TABLE IF NOT EXISTS files (
        path        TEXT PRIMARY KEY,
        name        TEXT NOT NULL,
        size_bytes  INTEGER NOT NULL,
        modified_at INTEGER NOT NULL,
        embedding   BLOB NOT NULL
    );
";

/// Durable path -> [`FileRecord`] store over a single SQLite file.
///
/// `&self` methods over one connection: single-writer discipline is enough
/// for the single-user, single-process tool this backs.
pub struct MetadataStore {
    conn: Connection,
}

impl MetadataStore {
    /// Open (or create) the store at `path`, creating parent directories.
    /// The schema is stable across runs: reopening yields previous records.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        log::info!("Opening metadata store at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Insert or update the record keyed by its path.
    pub fn upsert(&self, record: &FileRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO files (path, name, size_bytes, modified_at, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(path) DO UPDATE SET
                 name = excluded.name,
                 size_bytes = excluded.size_bytes,
                 modified_at = excluded.modified_at,
                 embedding = excluded.embedding",
            params![
                record.path,
                record.name,
                record.size_bytes,
                record.modified_at,
                serialize_embedding(&record.embedding),
            ],
        )?;
        Ok(())
    }

    pub fn get_by_path(&self, path: &str) -> Result<Option<FileRecord>> {
        self.conn
            .query_row(
                "SELECT path, name, size_bytes, modified_at, embedding
                 FROM files WHERE path = ?1",
                params![path],
                record_from_row,
            )
            .optional()
            .map_err(StoreError::from)
    }

    /// All records in insertion (rowid) order. Deterministic so downstream
    /// similarity tie-breaks stay stable across rebuilds of an unchanged store.
    pub fn list_all(&self) -> Result<Vec<FileRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT path, name, size_bytes, modified_at, embedding
             FROM files ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], record_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// File names only, in insertion order. Feeds the token summary.
    pub fn list_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM files ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }

    /// Remove a record. Returns whether a row existed.
    pub fn remove(&self, path: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM files WHERE path = ?1", params![path])?;
        Ok(changed > 0)
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    let blob: Vec<u8> = row.get(4)?;
    Ok(FileRecord {
        path: row.get(0)?,
        name: row.get(1)?,
        size_bytes: row.get(2)?,
        modified_at: row.get(3)?,
        embedding: deserialize_embedding(&blob),
    })
}

/// Little-endian f32 blob, the on-disk embedding format.
fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn deserialize_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn record(path: &str, name: &str, embedding: Vec<f32>) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            name: name.to_string(),
            size_bytes: 42,
            modified_at: 1_700_000_000,
            embedding,
        }
    }

    #[test]
    fn upsert_and_get_roundtrip() {
        let store = MetadataStore::open_in_memory().unwrap();
        let rec = record("/tmp/a.txt", "a.txt", vec![0.25, -1.5, 3.0]);
        store.upsert(&rec).unwrap();

        let loaded = store.get_by_path("/tmp/a.txt").unwrap().unwrap();
        assert_eq!(loaded, rec);
        assert!(store.get_by_path("/tmp/missing").unwrap().is_none());
    }

    #[test]
    fn upsert_same_path_updates_instead_of_duplicating() {
        let store = MetadataStore::open_in_memory().unwrap();
        store
            .upsert(&record("/tmp/a.txt", "a.txt", vec![1.0]))
            .unwrap();
        store
            .upsert(&record("/tmp/a.txt", "a.txt", vec![2.0]))
            .unwrap();

        assert_eq!(store.len().unwrap(), 1);
        let loaded = store.get_by_path("/tmp/a.txt").unwrap().unwrap();
        assert_eq!(loaded.embedding, vec![2.0]);
    }

    #[test]
    fn list_all_preserves_insertion_order() {
        let store = MetadataStore::open_in_memory().unwrap();
        for name in ["first.txt", "second.txt", "third.txt"] {
            store
                .upsert(&record(&format!("/tmp/{name}"), name, vec![0.0]))
                .unwrap();
        }

        let names: Vec<String> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["first.txt", "second.txt", "third.txt"]);
        assert_eq!(store.list_names().unwrap(), names);
    }

    #[test]
    fn remove_deletes_row() {
        let store = MetadataStore::open_in_memory().unwrap();
        store
            .upsert(&record("/tmp/a.txt", "a.txt", vec![1.0]))
            .unwrap();

        assert!(store.remove("/tmp/a.txt").unwrap());
        assert!(!store.remove("/tmp/a.txt").unwrap());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn reopen_yields_previous_records() {
        let temp = tempdir().unwrap();
        let db_path = temp.path().join("index.db");

        {
            let store = MetadataStore::open(&db_path).unwrap();
            store
                .upsert(&record("/tmp/kept.txt", "kept.txt", vec![0.5, 0.5]))
                .unwrap();
        }

        let reopened = MetadataStore::open(&db_path).unwrap();
        let loaded = reopened.get_by_path("/tmp/kept.txt").unwrap().unwrap();
        assert_eq!(loaded.name, "kept.txt");
        assert_eq!(loaded.embedding, vec![0.5, 0.5]);
    }

    #[test]
    fn open_creates_parent_directories() {
        let temp = tempdir().unwrap();
        let db_path = temp.path().join("nested").join("data").join("index.db");
        let store = MetadataStore::open(&db_path).unwrap();
        assert!(store.is_empty().unwrap());
        assert!(db_path.exists());
    }

    #[test]
    fn embedding_blob_roundtrip() {
        let original = vec![0.0_f32, 1.0, -1.0, f32::MIN_POSITIVE, 12345.678];
        let blob = serialize_embedding(&original);
        assert_eq!(blob.len(), original.len() * 4);
        assert_eq!(deserialize_embedding(&blob), original);
    }
}
