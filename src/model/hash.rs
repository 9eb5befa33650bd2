//! Content hashing for value, snak and reference node identities.
//!
//! A hash is the first 20 bytes of SHA-256, hex encoded, over the canonical
//! JSON form of the model value. Every map in the model is ordered, so equal
//! values always serialise to the same bytes.

use serde::Serialize;
use sha2::{Digest, Sha256};

const HASH_BYTES: usize = 20;

pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest[..HASH_BYTES].iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn canonical_json<T: Serialize>(value: &T) -> String {
    // model types only contain strings, numbers and string-keyed ordered maps
    serde_json::to_string(value).expect("model values serialize to JSON")
}

pub fn hash_canonical<T: Serialize>(value: &T) -> String {
    content_hash(canonical_json(value).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_stable() {
        let first = content_hash(b"hello");
        assert_eq!(first, content_hash(b"hello"));
        assert_eq!(first.len(), HASH_BYTES * 2);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, content_hash(b"hello!"));
    }

    #[test]
    fn test_distinct_values_hash_apart() {
        let a = hash_canonical(&vec!["x", "y"]);
        let b = hash_canonical(&vec!["y", "x"]);
        assert_ne!(a, b);
        assert_ne!(a, content_hash(b""));
        assert_eq!(canonical_json(&vec!["x", "y"]), r#"["x","y"]"#);
    }
}
