//! Fetching and decoding a single representative entry for display.

use std::path::Path;

use crate::codec;
use crate::error::Result;
use crate::store::EntryStore;

/// A fully decoded entry: `content` is the raw payload regardless of how the
/// store on disk encodes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEntry {
    pub epoch_secs: i64,
    pub nanos: i32,
    pub level: i32,
    pub content: Vec<u8>,
}

/// Reads one entry older than `before_epoch_secs` from the store at
/// `db_path`, decoding it with whatever codec the store is detected to use.
/// Returns `Ok(None)` when no entry is old enough.
pub fn read_one(db_path: &Path, before_epoch_secs: i64) -> Result<Option<DecodedEntry>> {
    let store = EntryStore::open_existing(db_path)?;
    let codec = codec::detect(&store)?;

    let entry = match store.entry_before(before_epoch_secs)? {
        Some(entry) => entry,
        None => return Ok(None),
    };
    let content = codec.decode(&entry.content)?;
    Ok(Some(DecodedEntry {
        epoch_secs: entry.epoch_secs,
        nanos: entry.nanos,
        level: entry.level,
        content,
    }))
}
