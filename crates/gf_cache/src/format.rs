//! On-disk entry format: MessagePack payload, LZ4 compressed with the size
//! prepended, followed by a 32-byte SHA-256 of the compressed bytes.

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};

use crate::error::CacheError;

const CHECKSUM_LEN: usize = 32;

pub fn checksum_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Encodes a raw JSON feed payload into a cache entry.
pub fn encode_entry(raw_json: &[u8]) -> Result<Vec<u8>, CacheError> {
    let value: serde_json::Value = serde_json::from_slice(raw_json)?;
    let msgpack = to_vec_named(&value)?;
    let compressed = compress_prepend_size(&msgpack);

    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut entry = compressed;
    entry.extend_from_slice(&checksum);
    Ok(entry)
}

/// Splits off and checks the trailing checksum, returning the compressed part.
pub fn verified_body(entry: &[u8]) -> Result<&[u8], CacheError> {
    if entry.len() < 4 + CHECKSUM_LEN {
        return Err(CacheError::Corrupted);
    }
    let (body, checksum) = entry.split_at(entry.len() - CHECKSUM_LEN);

    let mut hasher = Sha256::new();
    hasher.update(body);
    if hasher.finalize().as_slice() != checksum {
        return Err(CacheError::ChecksumMismatch);
    }
    Ok(body)
}

/// Decodes a cache entry back into JSON feed bytes.
pub fn decode_entry(entry: &[u8]) -> Result<Vec<u8>, CacheError> {
    let body = verified_body(entry)?;
    let msgpack = decompress_size_prepended(body).map_err(|_| CacheError::Decompression)?;
    let value: serde_json::Value = from_slice(&msgpack)?;
    Ok(serde_json::to_vec(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_roundtrip_preserves_json() {
        let raw = br#"{"2012090900": {"qtr": "Final", "home": {"abbr": "NE"}}, "nextupdate": 12}"#;
        let entry = encode_entry(raw).unwrap();
        let decoded = decode_entry(&entry).unwrap();

        let expected: serde_json::Value = serde_json::from_slice(raw).unwrap();
        let actual: serde_json::Value = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_checksum_validation() {
        let mut entry = encode_entry(br#"{"a": [1, 2, 3]}"#).unwrap();
        let mid = entry.len() / 2;
        entry[mid] ^= 0xFF;
        assert!(matches!(decode_entry(&entry), Err(CacheError::ChecksumMismatch)));
    }

    #[test]
    fn test_truncated_entry() {
        assert!(matches!(decode_entry(&[0u8; 10]), Err(CacheError::Corrupted)));
    }

    #[test]
    fn test_non_json_payload_rejected() {
        assert!(matches!(encode_entry(b"not json"), Err(CacheError::Json(_))));
    }
}
