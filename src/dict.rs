//! Dictionary training for dictionary-assisted compression.
//!
//! The trainer draws a bounded sample of the source store's payloads (in
//! table order) and hands them to zstd's dictionary builder. The resulting
//! blob is self-describing: zstd embeds a random non-zero 32-bit dictionary
//! id in its header, and that id doubles as the primary key of the store's
//! `zstd_dicts` row. The id is never validated against content; it exists
//! only so a store carries a stable name for the dictionary it was written
//! with.

use crate::config::TrainerConfig;
use crate::error::{LitepackError, Result};
use crate::store::EntryStore;

/// Magic number opening every serialized zstd dictionary.
const DICT_MAGIC: u32 = 0xEC30_A437;

/// A trained dictionary plus the id zstd embedded in it.
#[derive(Debug, Clone)]
pub struct TrainedDict {
    pub dict_id: u32,
    pub bytes: Vec<u8>,
}

/// Trains a dictionary from up to `cfg.sample_limit` payloads of `store`.
///
/// Training is CPU-bound and synchronous; there is no cancellation short of
/// abandoning the call. Fails with `InsufficientSampleData` when the store
/// has no content rows at all, and with `DictTraining` when zstd rejects the
/// corpus (for example, too little total sample data to build a dictionary).
pub fn train(store: &EntryStore, cfg: &TrainerConfig) -> Result<TrainedDict> {
    let samples = store.sample_contents(cfg.sample_limit)?;
    if samples.is_empty() {
        return Err(LitepackError::InsufficientSampleData);
    }

    log::debug!(
        "training a {} byte dictionary from {} samples",
        cfg.max_dict_size,
        samples.len()
    );
    let bytes = zstd::dict::from_samples(&samples, cfg.max_dict_size)
        .map_err(|e| LitepackError::DictTraining(e.to_string()))?;

    let dict_id = embedded_dict_id(&bytes).ok_or_else(|| {
        LitepackError::DictTraining("trained blob is missing the dictionary header".to_string())
    })?;
    log::debug!("trained dictionary {} ({} bytes)", dict_id, bytes.len());

    Ok(TrainedDict { dict_id, bytes })
}

/// Reads the dictionary id out of a serialized dictionary blob: the magic
/// number occupies bytes 0..4, the little-endian id bytes 4..8.
pub(crate) fn embedded_dict_id(bytes: &[u8]) -> Option<u32> {
    if bytes.len() < 8 {
        return None;
    }
    let magic = u32::from_le_bytes(bytes[0..4].try_into().ok()?);
    if magic != DICT_MAGIC {
        return None;
    }
    let id = u32::from_le_bytes(bytes[4..8].try_into().ok()?);
    if id == 0 {
        None
    } else {
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Entry;
    use tempfile::tempdir;

    fn corpus_store(rows: usize) -> (tempfile::TempDir, EntryStore) {
        let dir = tempdir().unwrap();
        let mut store = EntryStore::open(&dir.path().join("corpus.db")).unwrap();
        store.initialize().unwrap();
        let entries: Vec<Entry> = (0..rows)
            .map(|i| Entry {
                epoch_secs: 1_600_000_000 + i as i64,
                nanos: 0,
                level: 20,
                content: format!("repetitive log payload number {} from test.logger", i)
                    .repeat(20)
                    .into_bytes(),
            })
            .collect();
        store.insert_batch(&entries).unwrap();
        (dir, store)
    }

    #[test]
    fn training_yields_a_non_zero_id_and_a_valid_header() {
        let (_dir, store) = corpus_store(200);
        let trained = train(&store, &TrainerConfig::default()).unwrap();

        assert!(trained.dict_id > 0);
        assert_eq!(embedded_dict_id(&trained.bytes), Some(trained.dict_id));
    }

    #[test]
    fn training_an_empty_store_is_insufficient_sample_data() {
        let (_dir, store) = corpus_store(0);
        let err = train(&store, &TrainerConfig::default()).unwrap_err();
        assert!(matches!(err, LitepackError::InsufficientSampleData));
    }

    #[test]
    fn sample_limit_bounds_the_corpus() {
        let (_dir, store) = corpus_store(300);
        let cfg = TrainerConfig {
            sample_limit: 150,
            ..TrainerConfig::default()
        };
        // Only checks that a reduced corpus still trains; the limit itself is
        // applied by the store's LIMIT clause.
        let trained = train(&store, &cfg).unwrap();
        assert!(trained.dict_id > 0);
    }

    #[test]
    fn embedded_dict_id_rejects_non_dictionaries() {
        assert_eq!(embedded_dict_id(b"short"), None);
        assert_eq!(embedded_dict_id(&[0u8; 32]), None);
    }
}
