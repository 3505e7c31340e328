//! litepack recompresses SQLite log stores between three content encodings:
//! raw bytes, standalone zstandard frames, and dictionary-assisted zstandard
//! frames.
//!
//! A store is one database file holding an `entries` table, a derived
//! `entries_view`, and (for dictionary-compressed stores) a `zstd_dicts`
//! table whose single row carries the trained dictionary. The encoding is a
//! property of the whole table and is detected from content alone: the
//! dictionary table's presence and the decodability of one sample row are
//! the only signals the format provides.

/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod codec;
pub mod config;
pub mod dict;
pub mod error;
pub mod fixtures;
pub mod reader;
pub mod store;
pub mod transform;

pub use codec::{detect, Codec, CodecKind};
pub use config::TrainerConfig;
pub use error::{LitepackError, Result};
pub use reader::{read_one, DecodedEntry};
pub use store::{Entry, EntryStore};
pub use transform::{compress, decompress, Direction};
