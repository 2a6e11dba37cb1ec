//! HashBucket Core - deterministic feature hashing
//!
//! Maps a scalar feature value and a bucket count to a stable bucket index in
//! `[0, num_buckets)`.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod hashing;
pub mod types;

pub use error::{HashError, Result};
pub use hashing::{
    canonical_bytes, hash_feature, hash_value, stable_hash, BucketDistribution,
    MAX_DISTRIBUTION_BUCKETS,
};
pub use types::{BucketCount, FeatureValue, DEFAULT_NUM_BUCKETS};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
