//! Canonical content hashing for normalized snapshots.
//!
//! The digest is a pure function of content: object members are visited in
//! sorted key order at every depth, arrays in their own order. Every value is
//! written with a one-byte type tag and strings with a length prefix, so no two
//! distinct values share an encoding.

use serde_json::Value;
use sha2::{Digest, Sha256};

const TAG_NULL: u8 = 0;
const TAG_FALSE: u8 = 1;
const TAG_TRUE: u8 = 2;
const TAG_NUMBER: u8 = 3;
const TAG_STRING: u8 = 4;
const TAG_ARRAY: u8 = 5;
const TAG_OBJECT: u8 = 6;

/// Computes the hex-encoded SHA-256 content hash of a snapshot.
pub fn content_hash(snapshot: &Value) -> String {
    let mut hasher = Sha256::new();
    feed(&mut hasher, snapshot);
    hex::encode(hasher.finalize())
}

fn feed(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => hasher.update([TAG_NULL]),
        Value::Bool(false) => hasher.update([TAG_FALSE]),
        Value::Bool(true) => hasher.update([TAG_TRUE]),
        Value::Number(n) => {
            hasher.update([TAG_NUMBER]);
            feed_str(hasher, &n.to_string());
        }
        Value::String(s) => {
            hasher.update([TAG_STRING]);
            feed_str(hasher, s);
        }
        Value::Array(items) => {
            hasher.update([TAG_ARRAY]);
            hasher.update((items.len() as u64).to_le_bytes());
            for item in items {
                feed(hasher, item);
            }
        }
        Value::Object(map) => {
            hasher.update([TAG_OBJECT]);
            hasher.update((map.len() as u64).to_le_bytes());
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (key, item) in entries {
                feed_str(hasher, key);
                feed(hasher, item);
            }
        }
    }
}

fn feed_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}
