//! Schema and accessors for a litepack store: the `entries` table, its
//! derived `entries_view`, and the optional `zstd_dicts` table.
//!
//! A store's encoding is a property of the whole table, never of individual
//! rows. Nothing in here knows about codecs; this module only moves opaque
//! blobs in and out of SQLite. Iteration is cursor-backed so the transform
//! engine never holds more than one row in memory.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{LitepackError, Result};

//==================================================================================
// 1. Schema
//==================================================================================

/// Entry table plus the derived view. The view computes both display
/// timestamps from `epoch_secs`; it stores nothing and is recreated
/// identically by every transform.
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS entries (
    epoch_secs INTEGER,
    nanos INTEGER,
    level INTEGER,
    content BLOB);
CREATE VIEW IF NOT EXISTS entries_view AS
    SELECT datetime(epoch_secs, 'unixepoch', 'utc') AS timestamp_utc,
           datetime(epoch_secs, 'unixepoch', 'localtime') AS timestamp_local,
           nanos, level, content
    FROM entries;
";

/// At most one row of this table is meaningful; its presence alone marks the
/// store as dictionary-compressed.
pub(crate) const DICT_TABLE_SQL: &str = "
CREATE TABLE IF NOT EXISTS zstd_dicts (
    dict_id INTEGER NOT NULL PRIMARY KEY,
    dict_bytes BLOB NOT NULL)
";

//==================================================================================
// 2. Types
//==================================================================================

/// One log record. Immutable once written; a transform copies entries into a
/// new store, it never updates them in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Seconds since the Unix epoch.
    pub epoch_secs: i64,
    /// Sub-second offset.
    pub nanos: i32,
    /// Severity code, opaque to this crate.
    pub level: i32,
    /// Payload bytes; encoding is decided at the store level.
    pub content: Vec<u8>,
}

/// A handle on one store file.
#[derive(Debug)]
pub struct EntryStore {
    conn: Connection,
    path: PathBuf,
}

//==================================================================================
// 3. Accessors
//==================================================================================

impl EntryStore {
    /// Opens (creating if absent) the store file at `path`. Does not touch
    /// the schema; call [`EntryStore::initialize`] for that.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Opens the store at `path`, failing with `SourceNotFound` if the file
    /// does not already exist. Used for every source-side open so a typo'd
    /// path never silently materializes an empty database.
    pub fn open_existing(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LitepackError::SourceNotFound(path.to_path_buf()));
        }
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Idempotently ensures the entry table and view exist. Safe to call on
    /// an already-initialized store. A pre-existing incompatible object under
    /// either name surfaces as `SchemaMismatch`; compatible pre-existing
    /// schemas are left untouched and unvalidated.
    pub fn initialize(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA_SQL)
            .map_err(|e| LitepackError::SchemaMismatch(e.to_string()))
    }

    /// Makes a second store file addressable as `alias` within this
    /// connection's transactional session.
    pub fn attach(&self, alias: &str, path: &Path) -> Result<()> {
        let sql = format!("ATTACH DATABASE ?1 AS {}", quote_ident(alias));
        self.conn
            .execute(&sql, params![path.to_string_lossy().into_owned()])?;
        Ok(())
    }

    pub fn entry_count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Appends one row. Callers batching many inserts should wrap them in
    /// [`EntryStore::insert_batch`] so there is a single commit.
    pub fn insert(&self, entry: &Entry) -> Result<()> {
        self.conn.execute(
            "INSERT INTO entries (epoch_secs, nanos, level, content) VALUES (?1, ?2, ?3, ?4)",
            params![entry.epoch_secs, entry.nanos, entry.level, entry.content],
        )?;
        Ok(())
    }

    /// Appends a batch of rows inside one transaction.
    pub fn insert_batch(&mut self, entries: &[Entry]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO entries (epoch_secs, nanos, level, content) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for entry in entries {
                stmt.execute(params![
                    entry.epoch_secs,
                    entry.nanos,
                    entry.level,
                    entry.content
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Streams every entry through `visit` with cursor semantics: one row in
    /// memory at a time, no whole-table buffering. Row order is unspecified.
    pub fn for_each_entry<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(Entry) -> Result<()>,
    {
        let mut stmt = self
            .conn
            .prepare("SELECT epoch_secs, nanos, level, content FROM entries")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            visit(Entry {
                epoch_secs: row.get(0)?,
                nanos: row.get(1)?,
                level: row.get(2)?,
                content: row.get(3)?,
            })?;
        }
        Ok(())
    }

    /// The `content` of one arbitrary row (first by table order), used by the
    /// codec detector as its trial-decode sample.
    pub fn first_content(&self) -> Result<Option<Vec<u8>>> {
        let content = self
            .conn
            .query_row("SELECT content FROM entries LIMIT 1", [], |row| row.get(0))
            .optional()?;
        Ok(content)
    }

    /// Up to `limit` payloads in table order, for dictionary training.
    pub fn sample_contents(&self, limit: usize) -> Result<Vec<Vec<u8>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT content FROM entries LIMIT ?1")?;
        let samples = stmt
            .query_map(params![limit as i64], |row| row.get(0))?
            .collect::<std::result::Result<Vec<Vec<u8>>, _>>()?;
        Ok(samples)
    }

    /// One representative entry older than the given cutoff, if any.
    pub fn entry_before(&self, epoch_secs: i64) -> Result<Option<Entry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT epoch_secs, nanos, level, content FROM entries
                 WHERE epoch_secs < ?1 LIMIT 1",
                params![epoch_secs],
                |row| {
                    Ok(Entry {
                        epoch_secs: row.get(0)?,
                        nanos: row.get(1)?,
                        level: row.get(2)?,
                        content: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    //==============================================================================
    // 4. Dictionary record
    //==============================================================================

    pub fn has_dict_table(&self) -> Result<bool> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'zstd_dicts'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Loads the stored dictionary blob.
    ///
    /// Returns `Ok(None)` when the store has no `zstd_dicts` table at all,
    /// and `MissingDictionaryData` when the table exists but is empty. If the
    /// table somehow holds several rows, one is picked arbitrarily (no ORDER
    /// BY); multi-row dictionary tables are outside the format.
    pub fn load_dict(&self) -> Result<Option<Vec<u8>>> {
        if !self.has_dict_table()? {
            return Ok(None);
        }
        let bytes: Option<Vec<u8>> = self
            .conn
            .query_row("SELECT dict_bytes FROM zstd_dicts LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        match bytes {
            Some(bytes) => Ok(Some(bytes)),
            None => Err(LitepackError::MissingDictionaryData),
        }
    }

    /// Writes the dictionary record into this store's own database.
    pub fn write_dict(&self, dict_id: i64, dict_bytes: &[u8]) -> Result<()> {
        self.conn.execute_batch(DICT_TABLE_SQL)?;
        self.conn.execute(
            "INSERT INTO zstd_dicts (dict_id, dict_bytes) VALUES (?1, ?2)",
            params![dict_id, dict_bytes],
        )?;
        Ok(())
    }

    /// Writes the dictionary record into the attached destination. Called by
    /// the transform engine before any entry row is copied, so a partially
    /// failed run can never produce entries without their paired dictionary.
    pub fn write_dict_into(&self, alias: &str, dict_id: i64, dict_bytes: &[u8]) -> Result<()> {
        let create = format!(
            "CREATE TABLE IF NOT EXISTS {}.zstd_dicts (
                dict_id INTEGER NOT NULL PRIMARY KEY,
                dict_bytes BLOB NOT NULL)",
            quote_ident(alias)
        );
        self.conn.execute_batch(&create)?;
        let insert = format!(
            "INSERT INTO {}.zstd_dicts (dict_id, dict_bytes) VALUES (?1, ?2)",
            quote_ident(alias)
        );
        self.conn.execute(&insert, params![dict_id, dict_bytes])?;
        Ok(())
    }

    //==============================================================================
    // 5. Streaming copy
    //==============================================================================

    /// Streams every entry of this store into `alias.entries`, passing each
    /// `content` blob through `transform` and copying the other columns
    /// untouched. Runs as a single transaction with one commit at the end:
    /// an error anywhere rolls the destination's entry table back to empty.
    /// Returns the number of rows copied.
    pub fn copy_entries_into<F>(&mut self, alias: &str, mut transform: F) -> Result<u64>
    where
        F: FnMut(&[u8]) -> Result<Vec<u8>>,
    {
        let tx = self.conn.transaction()?;
        let copied = {
            let mut select = tx.prepare("SELECT epoch_secs, nanos, level, content FROM entries")?;
            let insert_sql = format!(
                "INSERT INTO {}.entries (epoch_secs, nanos, level, content) VALUES (?1, ?2, ?3, ?4)",
                quote_ident(alias)
            );
            let mut insert = tx.prepare(&insert_sql)?;

            let mut rows = select.query([])?;
            let mut copied: u64 = 0;
            while let Some(row) = rows.next()? {
                let epoch_secs: i64 = row.get(0)?;
                let nanos: i32 = row.get(1)?;
                let level: i32 = row.get(2)?;
                let content: Vec<u8> = row.get(3)?;
                let transformed = transform(&content)?;
                insert.execute(params![epoch_secs, nanos, level, transformed])?;
                copied += 1;
            }
            copied
        };
        tx.commit()?;
        Ok(copied)
    }
}

/// Double-quotes an identifier for interpolation into SQL, since aliases and
/// schema names cannot be bound as statement parameters.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
