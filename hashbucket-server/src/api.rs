//! API request and response types

use hashbucket_core::{BucketCount, FeatureValue};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Prediction request
///
/// Both fields stay as raw JSON so the handler can tell a missing
/// `feature_value` (400) apart from one that fails hashing (500).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PredictRequest {
    /// Value to bucket; `null` counts as missing
    #[serde(default)]
    pub feature_value: Option<Value>,

    /// Number of buckets, defaults to 10 only when the key is absent
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub num_buckets: Option<Value>,
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only a missing key is `None`
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Prediction response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Bucket index in `[0, num_buckets)`
    pub hashed_feature: u64,

    /// Echo of the request's `feature_value`
    pub input_value: FeatureValue,

    /// Echo of the request's `num_buckets`, or the default
    pub num_buckets: BucketCount,
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
}
