//! The codec applied uniformly to every `content` value in a store, and the
//! detector that classifies an existing store's encoding.
//!
//! The three variants form a closed sum type rather than a trait hierarchy:
//! the per-variant payload (dictionary bytes) differs too much for a uniform
//! object to be clearer. Encode and decode are safe, panic-free wrappers
//! around the `zstd` crate's streaming API.

use std::io::Write;

use zstd::stream::{Decoder, Encoder};

use crate::error::{LitepackError, Result};
use crate::store::EntryStore;

/// Classification of a store's content encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    /// Raw bytes, passed through unchanged.
    Identity,
    /// Standalone zstandard frames.
    Plain,
    /// Zstandard frames that require the store's trained dictionary.
    Dictionary,
}

/// Encode/decode strategy for one store.
#[derive(Debug, Clone)]
pub enum Codec {
    Identity,
    Plain {
        level: i32,
    },
    /// Carries the serialized dictionary that parameterizes both the encode
    /// and decode contexts.
    Dictionary {
        dict: Vec<u8>,
        level: i32,
    },
}

impl Codec {
    pub fn kind(&self) -> CodecKind {
        match self {
            Codec::Identity => CodecKind::Identity,
            Codec::Plain { .. } => CodecKind::Plain,
            Codec::Dictionary { .. } => CodecKind::Dictionary,
        }
    }

    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match self.kind() {
            CodecKind::Identity => "identity",
            CodecKind::Plain => "zstd",
            CodecKind::Dictionary => "zstd-dict",
        }
    }

    /// Compresses one payload into a self-describing frame. `Identity`'s
    /// encode is the identity function.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Codec::Identity => Ok(data.to_vec()),
            Codec::Plain { level } => {
                let mut encoder = Encoder::new(Vec::with_capacity(data.len()), *level)?;
                encoder.write_all(data)?;
                Ok(encoder.finish()?)
            }
            Codec::Dictionary { dict, level } => {
                let mut encoder =
                    Encoder::with_dictionary(Vec::with_capacity(data.len()), *level, dict)?;
                encoder.write_all(data)?;
                Ok(encoder.finish()?)
            }
        }
    }

    /// Decompresses one frame. Fails with `CorruptPayload` when the input is
    /// not a valid frame for this variant's expected format, including a
    /// frame written against a different dictionary.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Codec::Identity => Ok(data.to_vec()),
            Codec::Plain { .. } => zstd::stream::decode_all(data)
                .map_err(|e| LitepackError::CorruptPayload(e.to_string())),
            Codec::Dictionary { dict, .. } => {
                let mut decoder = Decoder::with_dictionary(data, dict)
                    .map_err(|e| LitepackError::CorruptPayload(e.to_string()))?;
                let mut output = Vec::new();
                std::io::copy(&mut decoder, &mut output)
                    .map_err(|e| LitepackError::CorruptPayload(e.to_string()))?;
                Ok(output)
            }
        }
    }
}

/// Classifies a store's encoding from its content alone and returns a codec
/// able to decode it.
///
/// Checked in order, first match wins:
/// 1. a `zstd_dicts` table means `Dictionary` (an empty one is
///    `MissingDictionaryData`, never a fallback to `Plain`);
/// 2. if one arbitrary row decodes as a valid dictionary-less frame, `Plain`;
/// 3. otherwise `Identity`. An empty entry table is `Identity` outright.
///
/// The trial decode in step 2 can in principle misclassify a raw payload that
/// happens to parse as a valid frame; the format records no encoding metadata
/// of its own, so the trial decode is the only signal available.
pub fn detect(store: &EntryStore) -> Result<Codec> {
    if let Some(dict) = store.load_dict()? {
        log::debug!("zstd_dicts table found, store is dictionary-compressed");
        return Ok(Codec::Dictionary {
            dict,
            level: zstd::DEFAULT_COMPRESSION_LEVEL,
        });
    }

    let sample = match store.first_content()? {
        Some(sample) => sample,
        None => return Ok(Codec::Identity),
    };

    if zstd::stream::decode_all(&sample[..]).is_ok() {
        Ok(Codec::Plain {
            level: zstd::DEFAULT_COMPRESSION_LEVEL,
        })
    } else {
        Ok(Codec::Identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained_dict() -> Vec<u8> {
        let samples: Vec<Vec<u8>> = (0..100).map(|_| b"test data ".repeat(100)).collect();
        zstd::dict::from_samples(&samples, 1024).unwrap()
    }

    #[test]
    fn identity_returns_input_unchanged() {
        let codec = Codec::Identity;
        assert_eq!(codec.encode(b"test data").unwrap(), b"test data");
        assert_eq!(codec.decode(b"test data").unwrap(), b"test data");
        assert_eq!(codec.decode(b"").unwrap(), b"");
    }

    #[test]
    fn plain_round_trip() {
        let codec = Codec::Plain { level: 3 };
        // Repetitive enough that the frame overhead cannot swallow the gain.
        let original = b"hello world, this is a test of zstd compression. ".repeat(20);

        let compressed = codec.encode(&original).unwrap();
        assert!(compressed.len() < original.len());
        assert_eq!(codec.decode(&compressed).unwrap(), original);
    }

    #[test]
    fn dictionary_round_trip() {
        let codec = Codec::Dictionary {
            dict: trained_dict(),
            level: 3,
        };
        let original = b"test data sample content".to_vec();

        let compressed = codec.encode(&original).unwrap();
        assert_eq!(codec.decode(&compressed).unwrap(), original);
    }

    #[test]
    fn plain_decode_of_raw_bytes_is_corrupt_payload() {
        let codec = Codec::Plain { level: 3 };
        let err = codec.decode(b"not compressed data").unwrap_err();
        assert!(matches!(err, LitepackError::CorruptPayload(_)));
    }

    #[test]
    fn decoding_with_the_wrong_dictionary_fails() {
        let encoder = Codec::Dictionary {
            dict: trained_dict(),
            level: 3,
        };
        let compressed = encoder.encode(b"test data sample content").unwrap();

        let other_samples: Vec<Vec<u8>> =
            (0..100).map(|i| format!("completely different corpus {}", i).repeat(50).into_bytes()).collect();
        let decoder = Codec::Dictionary {
            dict: zstd::dict::from_samples(&other_samples, 1024).unwrap(),
            level: 3,
        };

        let err = decoder.decode(&compressed).unwrap_err();
        assert!(matches!(err, LitepackError::CorruptPayload(_)));
    }

    #[test]
    fn empty_payload_round_trips_through_every_variant() {
        for codec in [
            Codec::Identity,
            Codec::Plain { level: 3 },
            Codec::Dictionary {
                dict: trained_dict(),
                level: 3,
            },
        ] {
            let encoded = codec.encode(b"").unwrap();
            assert_eq!(codec.decode(&encoded).unwrap(), b"");
        }
    }
}
