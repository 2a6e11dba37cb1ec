//! Value types accepted by the hashing function

use crate::error::{HashError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::num::NonZeroU64;

/// Bucket count used when a caller does not provide one
pub const DEFAULT_NUM_BUCKETS: u64 = 10;

/// A scalar feature value
///
/// Mirrors the JSON scalars a caller may send. Serialization is untagged, so
/// echoing a `FeatureValue` reproduces the caller's original JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, try_from = "Value")]
pub enum FeatureValue {
    /// String value
    String(String),
    /// Numeric value, kept exactly as parsed
    Number(Number),
    /// Boolean value
    Bool(bool),
}

impl FeatureValue {
    /// Create a string feature value
    pub fn string(s: impl Into<String>) -> Self {
        FeatureValue::String(s.into())
    }

    /// Name of the variant, used in logs and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            FeatureValue::String(_) => "string",
            FeatureValue::Number(_) => "number",
            FeatureValue::Bool(_) => "boolean",
        }
    }
}

impl TryFrom<Value> for FeatureValue {
    type Error = HashError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(FeatureValue::String(s)),
            Value::Number(n) => Ok(FeatureValue::Number(n)),
            Value::Bool(b) => Ok(FeatureValue::Bool(b)),
            other => Err(HashError::invalid_argument(format!(
                "feature_value must be a string, number or boolean, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl From<FeatureValue> for Value {
    fn from(value: FeatureValue) -> Self {
        match value {
            FeatureValue::String(s) => Value::String(s),
            FeatureValue::Number(n) => Value::Number(n),
            FeatureValue::Bool(b) => Value::Bool(b),
        }
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        FeatureValue::String(s.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(s: String) -> Self {
        FeatureValue::String(s)
    }
}

impl From<i64> for FeatureValue {
    fn from(n: i64) -> Self {
        FeatureValue::Number(n.into())
    }
}

impl From<bool> for FeatureValue {
    fn from(b: bool) -> Self {
        FeatureValue::Bool(b)
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::String(s) => write!(f, "{}", s),
            FeatureValue::Number(n) => write!(f, "{}", n),
            FeatureValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A validated, strictly positive number of buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u64", try_from = "i64")]
pub struct BucketCount(NonZeroU64);

impl BucketCount {
    /// Create a bucket count, rejecting zero
    pub fn new(n: u64) -> Result<Self> {
        NonZeroU64::new(n)
            .map(BucketCount)
            .ok_or_else(|| HashError::invalid_argument("num_buckets must be a positive integer, got 0"))
    }

    /// Parse a bucket count out of an arbitrary JSON value
    ///
    /// Only integral JSON numbers greater than zero are accepted.
    pub fn from_json(value: &Value) -> Result<Self> {
        let invalid = || {
            HashError::invalid_argument(format!(
                "num_buckets must be a positive integer, got {}",
                value
            ))
        };

        match value {
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Self::new(u).map_err(|_| invalid())
                } else {
                    // Negative integers and fractions both land here.
                    Err(invalid())
                }
            }
            _ => Err(invalid()),
        }
    }

    /// Get the count as a plain integer
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

const DEFAULT_BUCKETS: NonZeroU64 = match NonZeroU64::new(DEFAULT_NUM_BUCKETS) {
    Some(n) => n,
    None => panic!("DEFAULT_NUM_BUCKETS must be non-zero"),
};

impl Default for BucketCount {
    fn default() -> Self {
        BucketCount(DEFAULT_BUCKETS)
    }
}

impl TryFrom<i64> for BucketCount {
    type Error = HashError;

    fn try_from(n: i64) -> Result<Self> {
        if n <= 0 {
            return Err(HashError::invalid_argument(format!(
                "num_buckets must be a positive integer, got {}",
                n
            )));
        }
        Self::new(n as u64)
    }
}

impl TryFrom<u64> for BucketCount {
    type Error = HashError;

    fn try_from(n: u64) -> Result<Self> {
        Self::new(n)
    }
}

impl From<BucketCount> for u64 {
    fn from(count: BucketCount) -> Self {
        count.get()
    }
}

impl fmt::Display for BucketCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_value_from_scalars() {
        assert_eq!(
            FeatureValue::try_from(json!("user_1")).unwrap(),
            FeatureValue::string("user_1")
        );
        assert_eq!(
            FeatureValue::try_from(json!(42)).unwrap(),
            FeatureValue::from(42i64)
        );
        assert_eq!(
            FeatureValue::try_from(json!(true)).unwrap(),
            FeatureValue::Bool(true)
        );
    }

    #[test]
    fn test_feature_value_rejects_non_scalars() {
        for value in [json!(null), json!([1, 2]), json!({"a": 1})] {
            let err = FeatureValue::try_from(value).unwrap_err();
            assert!(matches!(err, HashError::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_feature_value_echo_round_trip() {
        let original = json!(3.25);
        let value: FeatureValue = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(serde_json::to_value(&value).unwrap(), original);
        assert_eq!(value.kind(), "number");
    }

    #[test]
    fn test_feature_value_deserialize_rejects_object() {
        let result = serde_json::from_value::<FeatureValue>(json!({"nested": true}));
        assert!(result.is_err());
    }

    #[test]
    fn test_bucket_count_default() {
        assert_eq!(BucketCount::default().get(), DEFAULT_NUM_BUCKETS);
    }

    #[test]
    fn test_bucket_count_rejects_non_positive() {
        assert!(BucketCount::try_from(0i64).is_err());
        assert!(BucketCount::try_from(-5i64).is_err());
        assert_eq!(BucketCount::try_from(7i64).unwrap().get(), 7);
    }

    #[test]
    fn test_bucket_count_from_json() {
        assert_eq!(BucketCount::from_json(&json!(20)).unwrap().get(), 20);
        assert!(BucketCount::from_json(&json!(0)).is_err());
        assert!(BucketCount::from_json(&json!(-1)).is_err());
        assert!(BucketCount::from_json(&json!(2.5)).is_err());
        assert!(BucketCount::from_json(&json!("10")).is_err());
        assert!(BucketCount::from_json(&json!(null)).is_err());
    }

    #[test]
    fn test_bucket_count_serializes_as_integer() {
        let count = BucketCount::new(5).unwrap();
        assert_eq!(serde_json::to_value(count).unwrap(), json!(5));
    }
}
