//! The single source of truth for litepack's tunables.
//!
//! The defaults mirror the values the store format was designed around:
//! dictionaries are trained from the first 10,000 payloads with a 10 MiB
//! target size, and frames are written at zstd's default compression level.

use serde::{Deserialize, Serialize};

/// Configuration for dictionary training and frame encoding.
///
/// Created once at the application boundary and passed by reference into the
/// trainer and the transform operations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TrainerConfig {
    /// Maximum number of `content` rows drawn (in table order) as the
    /// dictionary training corpus.
    #[serde(default = "default_sample_limit")]
    pub sample_limit: usize,

    /// Target size, in bytes, of the trained dictionary blob.
    #[serde(default = "default_max_dict_size")]
    pub max_dict_size: usize,

    /// Zstandard compression level used for every frame written by an
    /// encode transform, with or without a dictionary.
    #[serde(default = "default_level")]
    pub level: i32,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            sample_limit: default_sample_limit(),
            max_dict_size: default_max_dict_size(),
            level: default_level(),
        }
    }
}

/// Helper for `serde` to default the training sample limit.
fn default_sample_limit() -> usize {
    10_000
}

/// Helper for `serde` to default the dictionary size target (10 MiB).
fn default_max_dict_size() -> usize {
    10_485_760
}

/// Helper for `serde` to default the zstd level (the library default).
fn default_level() -> i32 {
    zstd::DEFAULT_COMPRESSION_LEVEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_store_format_constants() {
        let cfg = TrainerConfig::default();
        assert_eq!(cfg.sample_limit, 10_000);
        assert_eq!(cfg.max_dict_size, 10 * 1024 * 1024);
        assert_eq!(cfg.level, zstd::DEFAULT_COMPRESSION_LEVEL);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: TrainerConfig = serde_json::from_str("{\"sample_limit\": 50}").unwrap();
        assert_eq!(cfg.sample_limit, 50);
        assert_eq!(cfg.max_dict_size, 10_485_760);
    }
}
