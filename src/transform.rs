//! The transform engine: streams every row of a source store through a codec
//! into a freshly-initialized destination store.
//!
//! The destination is attached to the source connection, so the whole copy is
//! one transactional session with a single commit at the end. The engine owns
//! the destination for the duration of a run; on any failure the caller must
//! treat the destination file as invalid and discard it. Nothing here ever
//! mutates the source.

use std::path::Path;

use crate::codec::{self, Codec};
use crate::config::TrainerConfig;
use crate::dict;
use crate::error::{LitepackError, Result};
use crate::store::EntryStore;

/// Alias under which the destination is attached to the source connection.
const DEST_ALIAS: &str = "dest";

/// Which side of the codec the transform applies to `content`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encode,
    Decode,
}

//==================================================================================
// 1. Public operations
//==================================================================================

/// Compresses the store at `source_path` into a new store at `dest_path`.
///
/// With `use_dictionary` set, a dictionary is first trained from the source
/// corpus and its record is written to the destination before any entries.
pub fn compress(
    source_path: &Path,
    dest_path: &Path,
    use_dictionary: bool,
    cfg: &TrainerConfig,
) -> Result<()> {
    let mut source = EntryStore::open_existing(source_path)?;

    let codec = if use_dictionary {
        let trained = dict::train(&source, cfg)?;
        Codec::Dictionary {
            dict: trained.bytes,
            level: cfg.level,
        }
    } else {
        Codec::Plain { level: cfg.level }
    };

    transform(&mut source, dest_path, &codec, Direction::Encode)
}

/// Decompresses the store at `source_path` into a new store at `dest_path`,
/// detecting the source's encoding (and extracting its dictionary) first.
/// An `Identity` source is copied through unchanged.
pub fn decompress(source_path: &Path, dest_path: &Path) -> Result<()> {
    let mut source = EntryStore::open_existing(source_path)?;
    let codec = codec::detect(&source)?;
    transform(&mut source, dest_path, &codec, Direction::Decode)
}

//==================================================================================
// 2. The engine
//==================================================================================

/// Streams every source row through `codec` into the store at `dest_path`.
///
/// Column handling: the codec applies to `content` only; `epoch_secs`,
/// `nanos` and `level` pass through unexamined. The
/// dictionary record, when encoding with one, is written before any entry so
/// a partially-failed run never yields entries without their dictionary.
pub fn transform(
    source: &mut EntryStore,
    dest_path: &Path,
    codec: &Codec,
    direction: Direction,
) -> Result<()> {
    let dest = EntryStore::open(dest_path)?;
    dest.initialize()?;
    drop(dest);

    source.attach(DEST_ALIAS, dest_path)?;

    if direction == Direction::Encode {
        if let Codec::Dictionary { dict, .. } = codec {
            let dict_id = dict::embedded_dict_id(dict).ok_or_else(|| {
                LitepackError::DictTraining(
                    "dictionary blob is missing its header".to_string(),
                )
            })?;
            source.write_dict_into(DEST_ALIAS, dict_id as i64, dict)?;
        }
    }

    let copied = match direction {
        Direction::Encode => source.copy_entries_into(DEST_ALIAS, |content| codec.encode(content)),
        Direction::Decode => source.copy_entries_into(DEST_ALIAS, |content| codec.decode(content)),
    }?;

    log::info!(
        "{} {} rows from {} into {} with the {} codec",
        match direction {
            Direction::Encode => "encoded",
            Direction::Decode => "decoded",
        },
        copied,
        source.path().display(),
        dest_path.display(),
        codec.name(),
    );
    Ok(())
}
