//! Fixture-store generation for the test suite and for manual poking.
//!
//! Builds the three canonical store flavors: raw, plain-compressed, and
//! dictionary-compressed, each holding 100 JSON log entries whose timestamps
//! span the hour leading up to "now".

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::codec::Codec;
use crate::dict;
use crate::error::{LitepackError, Result};
use crate::store::{Entry, EntryStore};

const FIXTURE_ROWS: usize = 100;

/// One JSON log line of the shape the original log appender writes.
pub fn log_payload(i: usize) -> Vec<u8> {
    serde_json::json!({
        "message": format!("Test log message number {}", i),
        "logger": "test.logger",
        "thread": "main",
    })
    .to_string()
    .into_bytes()
}

/// 100 entries with `epoch_secs` starting one hour in the past.
pub fn log_entries() -> Vec<Entry> {
    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
        - 3600;
    (0..FIXTURE_ROWS)
        .map(|i| Entry {
            epoch_secs: epoch + i as i64,
            nanos: (i as i32) * 1_000_000,
            level: 20,
            content: log_payload(i),
        })
        .collect()
}

/// Creates an uncompressed store at `path`.
pub fn create_uncompressed(path: &Path) -> Result<()> {
    let mut store = EntryStore::open(path)?;
    store.initialize()?;
    store.insert_batch(&log_entries())?;
    Ok(())
}

/// Creates a store whose payloads are standalone zstd frames.
pub fn create_plain_compressed(path: &Path) -> Result<()> {
    let codec = Codec::Plain {
        level: zstd::DEFAULT_COMPRESSION_LEVEL,
    };
    let mut store = EntryStore::open(path)?;
    store.initialize()?;
    let entries = log_entries()
        .into_iter()
        .map(|mut e| {
            e.content = codec.encode(&e.content)?;
            Ok(e)
        })
        .collect::<Result<Vec<Entry>>>()?;
    store.insert_batch(&entries)?;
    Ok(())
}

/// Creates a dictionary-compressed store: trains a small dictionary from a
/// synthetic corpus, writes the `zstd_dicts` row, then the compressed entries.
pub fn create_dict_compressed(path: &Path) -> Result<()> {
    let samples: Vec<Vec<u8>> = (0..1000).map(log_payload).collect();
    let dict_bytes = zstd::dict::from_samples(&samples, 10 * 1024)
        .map_err(|e| LitepackError::DictTraining(e.to_string()))?;
    let dict_id = dict::embedded_dict_id(&dict_bytes).ok_or_else(|| {
        LitepackError::DictTraining("trained blob is missing the dictionary header".to_string())
    })?;

    let mut store = EntryStore::open(path)?;
    store.initialize()?;
    store.write_dict(dict_id as i64, &dict_bytes)?;

    let codec = Codec::Dictionary {
        dict: dict_bytes,
        level: zstd::DEFAULT_COMPRESSION_LEVEL,
    };
    let entries = log_entries()
        .into_iter()
        .map(|mut e| {
            e.content = codec.encode(&e.content)?;
            Ok(e)
        })
        .collect::<Result<Vec<Entry>>>()?;
    store.insert_batch(&entries)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{self, CodecKind};
    use tempfile::tempdir;

    #[test]
    fn fixtures_detect_as_their_own_kind() {
        let dir = tempdir().unwrap();

        let raw = dir.path().join("uncompressed.db");
        create_uncompressed(&raw).unwrap();
        let store = EntryStore::open_existing(&raw).unwrap();
        assert_eq!(codec::detect(&store).unwrap().kind(), CodecKind::Identity);
        assert_eq!(store.entry_count().unwrap(), 100);

        let plain = dir.path().join("compressed.db");
        create_plain_compressed(&plain).unwrap();
        let store = EntryStore::open_existing(&plain).unwrap();
        assert_eq!(codec::detect(&store).unwrap().kind(), CodecKind::Plain);

        let dicted = dir.path().join("compressed_dict.db");
        create_dict_compressed(&dicted).unwrap();
        let store = EntryStore::open_existing(&dicted).unwrap();
        assert_eq!(
            codec::detect(&store).unwrap().kind(),
            CodecKind::Dictionary
        );
    }

    #[test]
    fn empty_store_detects_as_identity() {
        let dir = tempdir().unwrap();
        let store = EntryStore::open(&dir.path().join("empty.db")).unwrap();
        store.initialize().unwrap();
        assert_eq!(codec::detect(&store).unwrap().kind(), CodecKind::Identity);
    }

    #[test]
    fn dict_fixture_payloads_need_the_dictionary() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("compressed_dict.db");
        create_dict_compressed(&path).unwrap();

        let store = EntryStore::open_existing(&path).unwrap();
        let codec = codec::detect(&store).unwrap();
        let sample = store.first_content().unwrap().unwrap();

        assert!(codec.decode(&sample).is_ok());
        let plain = Codec::Plain {
            level: zstd::DEFAULT_COMPRESSION_LEVEL,
        };
        assert!(plain.decode(&sample).is_err());
    }
}
