//! Row-sample diagnostics.
//!
//! Exposes the first few rows the source yields, mirroring the sample the
//! server logs at startup. Unlike `/submit`, source failures surface here
//! as errors; that is the point of the route.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::state::AppState;
use crate::api::ApiError;

const DEFAULT_SAMPLE_LIMIT: usize = 5;
const MAX_SAMPLE_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct SampleParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SampleResponse {
    pub source: String,
    pub rows: Vec<Value>,
}

pub async fn sample_rows(
    State(state): State<AppState>,
    Query(params): Query<SampleParams>,
) -> Result<Json<SampleResponse>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_SAMPLE_LIMIT)
        .clamp(1, MAX_SAMPLE_LIMIT);

    let rows = state
        .source
        .fetch_rows(&state.match_field, limit)
        .await
        .map_err(|e| ApiError::Internal(format!("sample fetch failed: {}", e)))?;

    Ok(Json(SampleResponse {
        source: state.source.describe(),
        rows: rows.into_iter().map(Value::Object).collect(),
    }))
}
