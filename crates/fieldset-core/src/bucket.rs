//! Hash buckets over extracted record keys.

use crate::equivalence::RecordKey;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Positions of the records sharing one structural hash, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub hash: u64,
    pub members: Vec<usize>,
}

impl Bucket {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Extracted keys of a record sequence, grouped into hash buckets.
///
/// Every position appears in exactly one bucket, buckets are ordered by the
/// first appearance of their hash, and members keep insertion order.
#[derive(Debug)]
pub struct BucketIndex {
    keys: Vec<RecordKey>,
    buckets: Vec<Bucket>,
    by_hash: HashMap<u64, usize>,
}

impl BucketIndex {
    pub fn build(keys: Vec<RecordKey>) -> Self {
        let mut buckets: Vec<Bucket> = Vec::new();
        let mut by_hash: HashMap<u64, usize> = HashMap::new();
        for (pos, key) in keys.iter().enumerate() {
            match by_hash.entry(key.hash()) {
                Entry::Occupied(slot) => buckets[*slot.get()].members.push(pos),
                Entry::Vacant(slot) => {
                    slot.insert(buckets.len());
                    buckets.push(Bucket {
                        hash: key.hash(),
                        members: vec![pos],
                    });
                }
            }
        }
        Self {
            keys,
            buckets,
            by_hash,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key(&self, pos: usize) -> &RecordKey {
        &self.keys[pos]
    }

    pub fn keys(&self) -> &[RecordKey] {
        &self.keys
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn bucket(&self, hash: u64) -> Option<&Bucket> {
        self.by_hash.get(&hash).map(|&i| &self.buckets[i])
    }
}
