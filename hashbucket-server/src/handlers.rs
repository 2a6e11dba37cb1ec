//! HTTP request handlers

use crate::api::{PredictRequest, PredictResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::telemetry;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use hashbucket_core::{hash_feature, BucketCount, FeatureValue};
use std::time::Instant;
use tracing::{debug, info};

/// Liveness probe; always `200 OK`
pub async fn health() -> &'static str {
    crate::metrics::record_health_check();
    "OK"
}

/// Bucket a feature value
///
/// An unparsable body, a non-object body and a missing `feature_value` are
/// all reported the same way, as a 400.
pub async fn predict(
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> ApiResult<Json<PredictResponse>> {
    let start = Instant::now();

    let Json(req) = payload.map_err(|rejection| {
        debug!("Unreadable predict body: {}", rejection.body_text());
        ApiError::missing_feature_value()
    })?;

    let raw_value = req
        .feature_value
        .ok_or_else(ApiError::missing_feature_value)?;

    let input_value = FeatureValue::try_from(raw_value)?;
    let num_buckets = match req.num_buckets {
        Some(ref raw) => BucketCount::from_json(raw)?,
        None => BucketCount::default(),
    };

    let span = telemetry::prediction_span(input_value.kind(), num_buckets.get());
    let hashed_feature = span.in_scope(|| {
        let bucket = hash_feature(&input_value, num_buckets);
        telemetry::record_bucket(bucket);
        bucket
    });

    let elapsed = start.elapsed().as_secs_f64();
    crate::metrics::record_prediction(num_buckets.get(), elapsed);

    info!(
        "Prediction: {} {} -> bucket {}/{} ({:.3}ms)",
        input_value.kind(),
        input_value,
        hashed_feature,
        num_buckets,
        elapsed * 1000.0
    );

    Ok(Json(PredictResponse {
        hashed_feature,
        input_value,
        num_buckets,
    }))
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<AppState>) -> String {
    crate::metrics::update_uptime(state.uptime_seconds());
    crate::metrics::get_prometheus_metrics()
}
