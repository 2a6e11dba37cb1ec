//! Deterministic feature hashing
//!
//! Values are reduced to a canonical byte form, hashed with BLAKE3 and folded
//! into `[0, num_buckets)`. BLAKE3 takes no seed, so a given value lands in the
//! same bucket in every process, on every platform.

use crate::error::{HashError, Result};
use crate::types::{BucketCount, FeatureValue};
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

/// Largest bucket count a [`BucketDistribution`] will allocate counters for
pub const MAX_DISTRIBUTION_BUCKETS: usize = 1_000_000;

const TAG_STRING: u8 = b's';
const TAG_NUMBER: u8 = b'n';
const TAG_BOOL: u8 = b'b';

/// Canonical byte representation of a feature value
///
/// A one-byte variant tag followed by the UTF-8 payload. The tag keeps `"1"`
/// and `1` apart.
pub fn canonical_bytes(value: &FeatureValue) -> Vec<u8> {
    let (tag, payload) = match value {
        FeatureValue::String(s) => (TAG_STRING, s.clone()),
        FeatureValue::Number(n) => (TAG_NUMBER, n.to_string()),
        FeatureValue::Bool(b) => (TAG_BOOL, b.to_string()),
    };

    let mut bytes = Vec::with_capacity(payload.len() + 1);
    bytes.push(tag);
    bytes.extend_from_slice(payload.as_bytes());
    bytes
}

/// Stable 64-bit digest of a feature value
pub fn stable_hash(value: &FeatureValue) -> u64 {
    let digest = blake3::hash(&canonical_bytes(value));
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(prefix)
}

/// Map a feature value into one of `buckets` buckets
pub fn hash_feature(value: &FeatureValue, buckets: BucketCount) -> u64 {
    let bucket = stable_hash(value) % buckets.get();
    trace!(kind = value.kind(), buckets = buckets.get(), bucket, "Hashed feature");
    bucket
}

/// Validate raw JSON arguments and hash them
///
/// Fails with `InvalidArgument` when `value` is not a scalar or
/// `num_buckets` is not positive.
pub fn hash_value(value: &Value, num_buckets: i64) -> Result<u64> {
    let feature = FeatureValue::try_from(value.clone())?;
    let buckets = BucketCount::try_from(num_buckets)?;
    Ok(hash_feature(&feature, buckets))
}

/// How a sample of values spreads over the buckets
#[derive(Debug, Clone, Serialize)]
pub struct BucketDistribution {
    counts: Vec<u64>,
}

impl BucketDistribution {
    /// Empty distribution over `buckets` buckets
    ///
    /// Holds one counter per bucket, so counts above
    /// [`MAX_DISTRIBUTION_BUCKETS`] are rejected.
    pub fn new(buckets: BucketCount) -> Result<Self> {
        let len = usize::try_from(buckets.get())
            .ok()
            .filter(|&n| n <= MAX_DISTRIBUTION_BUCKETS)
            .ok_or_else(|| {
                HashError::invalid_argument(format!(
                    "distribution supports at most {} buckets, got {}",
                    MAX_DISTRIBUTION_BUCKETS, buckets
                ))
            })?;
        Ok(Self {
            counts: vec![0; len],
        })
    }

    /// Hash every value and tally its bucket
    pub fn from_values<'a, I>(values: I, buckets: BucketCount) -> Result<Self>
    where
        I: IntoIterator<Item = &'a FeatureValue>,
    {
        let mut dist = Self::new(buckets)?;
        for value in values {
            dist.record(hash_feature(value, buckets));
        }
        Ok(dist)
    }

    /// Tally one bucket assignment. Out-of-range buckets are ignored.
    pub fn record(&mut self, bucket: u64) {
        let slot = usize::try_from(bucket)
            .ok()
            .and_then(|i| self.counts.get_mut(i));
        if let Some(slot) = slot {
            *slot += 1;
        }
    }

    /// Merge another distribution over the same number of buckets
    pub fn merge(mut self, other: &BucketDistribution) -> Self {
        for (slot, n) in self.counts.iter_mut().zip(&other.counts) {
            *slot += n;
        }
        self
    }

    /// Per-bucket counts, indexed by bucket
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Total number of recorded values
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Ratio of the fullest bucket to the ideal uniform share
    ///
    /// `1.0` is a perfectly even spread; `0.0` when nothing was recorded.
    pub fn max_skew(&self) -> f64 {
        let total = self.total();
        if total == 0 || self.counts.is_empty() {
            return 0.0;
        }
        let ideal = total as f64 / self.counts.len() as f64;
        let max = self.counts.iter().copied().max().unwrap_or(0);
        max as f64 / ideal
    }
}
