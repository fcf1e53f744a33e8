//! Canonical serialisation and hashing shared by block hashes and
//! transaction digests.
//!
//! `serde_json::Map` is a `BTreeMap` under the default feature set (no
//! `preserve_order`), so any `Value::Object` we build serialises with its
//! keys in sorted order for free. That is the entire canonicalisation
//! contract this module exists to guarantee: any divergence here breaks
//! cross-replica agreement on block hashes and transaction digests.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Serialises `value` to its canonical JSON form: object keys in sorted
/// order, recursively. Panics only if `value` cannot be represented as
/// JSON at all, which does not happen for the plain data types this crate
/// hashes.
pub fn to_canonical_json<T: Serialize>(value: &T) -> String {
    let value = serde_json::to_value(value).expect("value is JSON-serialisable");
    serde_json::to_string(&value).expect("canonical value serialises")
}

/// Lower-hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: impl AsRef<[u8]>) -> String {
    let digest = Sha256::digest(bytes.as_ref());
    hex::encode(digest)
}

/// Lower-hex SHA-256 of `value`'s canonical JSON encoding.
pub fn sha256_hex_of<T: Serialize>(value: &T) -> String {
    sha256_hex(to_canonical_json(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_keys_sort_regardless_of_insertion_order() {
        let a = json!({"b": 1, "a": 2});
        let b = json!({"a": 2, "b": 1});
        assert_eq!(to_canonical_json(&a), to_canonical_json(&b));
        assert_eq!(to_canonical_json(&a), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn sha256_hex_of_empty_string_matches_known_digest() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
