//! The lookup endpoint.
//!
//! Accepts a free-form 5k race time, finds the nearest stored pace row,
//! and returns a fixed set of presentation fields. Every failure mode
//! (unparsable query, source failure, empty dataset) degrades to
//! `row: null` with a 200; nothing here is a hard fault.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::api::state::AppState;
use crate::lookup::{find_closest, Row};

#[derive(Debug, Deserialize)]
pub struct SubmitPayload {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub received: String,
    pub row: Option<Value>,
}

pub async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<SubmitPayload>,
) -> Json<SubmitResponse> {
    let rows = match state
        .source
        .fetch_rows(&state.match_field, state.fetch_limit)
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Row fetch from {} failed: {}", state.source.describe(), e);
            return Json(SubmitResponse {
                received: payload.value,
                row: None,
            });
        }
    };

    let matched = find_closest(&payload.value, &rows, &state.match_field);

    match matched {
        Some(row) => {
            let selected = select_fields(row);
            info!(
                "Closest row for {} ≈ {}: vdot={}",
                state.match_field,
                payload.value,
                selected
                    .get("vdot")
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "null".to_string())
            );
            Json(SubmitResponse {
                received: payload.value,
                row: Some(Value::Object(selected)),
            })
        }
        None => {
            info!(
                "No row found near {} ≈ {}",
                state.match_field, payload.value
            );
            Json(SubmitResponse {
                received: payload.value,
                row: None,
            })
        }
    }
}

/// Output fields and the stored column names each one accepts.
///
/// Different table exports disagree on column naming, so each output field
/// takes the first non-null value among its known spellings. The output key
/// `easy_pase_per_km` keeps its historical misspelling; the frontend
/// depends on it.
const FIELD_ALIASES: [(&str, &[&str]); 8] = [
    ("vdot", &["vdot", "VDOT"]),
    (
        "race_half_marathon",
        &["race_half_marathon", "race_half", "half_marathon"],
    ),
    (
        "easy_pace_per_mile",
        &["easy_pace_per_mile", "easy_per_mile", "easy_mile_pace"],
    ),
    (
        "easy_pase_per_km",
        &[
            "easy_pase_per_km",
            "easy_pace_per_km",
            "easy_per_km",
            "easy_km_pace",
        ],
    ),
    (
        "marathon_pace_per_mile",
        &[
            "marathon_pace_per_mile",
            "marathon_per_mile",
            "marathon_mile_pace",
        ],
    ),
    (
        "marathon_pace_per_km",
        &["marathon_pace_per_km", "marathon_per_km", "marathon_km_pace"],
    ),
    (
        "threshold_pace_per_km",
        &["threshold_pace_per_km", "threshold_per_km", "threshold_km_pace"],
    ),
    (
        "threshold_pace_per_mile",
        &[
            "threshold_pace_per_mile",
            "threshold_per_mile",
            "threshold_mile_pace",
        ],
    ),
];

/// Project a matched row onto the response fields, resolving aliases.
fn select_fields(row: &Row) -> serde_json::Map<String, Value> {
    FIELD_ALIASES
        .iter()
        .map(|(output, aliases)| {
            let value = pick_first_existing(row, aliases);
            (output.to_string(), value)
        })
        .collect()
}

/// First non-null value among the given keys, or null.
fn pick_first_existing(row: &Row, keys: &[&str]) -> Value {
    keys.iter()
        .find_map(|k| row.get(*k).filter(|v| !v.is_null()))
        .cloned()
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::source::JsonlTable;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    fn setup_state(dir: &TempDir, lines: &[&str]) -> AppState {
        let path = dir.path().join("vdot.jsonl");
        std::fs::write(&path, lines.join("\n")).unwrap();
        AppState {
            source: Arc::new(JsonlTable::new(path)),
            match_field: "race_5km".to_string(),
            fetch_limit: 1000,
            cors_origins: vec!["http://localhost:5173".to_string()],
        }
    }

    async fn post_json(app: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[test]
    fn test_pick_first_existing() {
        let row: Row = serde_json::from_value(json!({
            "VDOT": 45,
            "vdot": null,
        }))
        .unwrap();

        assert_eq!(pick_first_existing(&row, &["vdot", "VDOT"]), json!(45));
        assert_eq!(pick_first_existing(&row, &["missing"]), Value::Null);
    }

    #[test]
    fn test_select_fields_aliases() {
        let row: Row = serde_json::from_value(json!({
            "race_5km": "20:00",
            "vdot": 43,
            "easy_pace_per_km": "5:45",
            "threshold_per_mile": "7:02",
        }))
        .unwrap();

        let selected = select_fields(&row);
        assert_eq!(selected["vdot"], json!(43));
        // Historical output key, filled from the corrected column spelling
        assert_eq!(selected["easy_pase_per_km"], json!("5:45"));
        assert_eq!(selected["threshold_pace_per_mile"], json!("7:02"));
        assert_eq!(selected["marathon_pace_per_km"], Value::Null);
        // Match column itself is not part of the response
        assert!(!selected.contains_key("race_5km"));
    }

    #[tokio::test]
    async fn test_submit_exact_match() {
        let dir = TempDir::new().unwrap();
        let state = setup_state(
            &dir,
            &[
                r#"{"race_5km":"19:00","vdot":45}"#,
                r#"{"race_5km":"20:00","vdot":43}"#,
                r#"{"race_5km":"21:30","vdot":40}"#,
            ],
        );
        let app = build_router(state);

        let (status, body) = post_json(app, "/submit", r#"{"value":"20"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["received"], "20");
        assert_eq!(body["row"]["vdot"], 43);
    }

    #[tokio::test]
    async fn test_submit_tie_breaks_to_first_row() {
        let dir = TempDir::new().unwrap();
        let state = setup_state(
            &dir,
            &[
                r#"{"race_5km":"19:00","vdot":45}"#,
                r#"{"race_5km":"20:00","vdot":43}"#,
                r#"{"race_5km":"21:30","vdot":40}"#,
            ],
        );
        let app = build_router(state);

        // 19:30 is equidistant from 19:00 and 20:00
        let (status, body) = post_json(app, "/submit", r#"{"value":"19:30"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["row"]["vdot"], 45);
    }

    #[tokio::test]
    async fn test_submit_unparsable_query() {
        let dir = TempDir::new().unwrap();
        let state = setup_state(&dir, &[r#"{"race_5km":"19:00","vdot":45}"#]);
        let app = build_router(state);

        let (status, body) = post_json(app, "/submit", r#"{"value":"abc"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["received"], "abc");
        assert_eq!(body["row"], Value::Null);
    }

    #[tokio::test]
    async fn test_submit_empty_dataset() {
        let dir = TempDir::new().unwrap();
        let state = AppState {
            source: Arc::new(JsonlTable::new(dir.path().join("missing.jsonl"))),
            match_field: "race_5km".to_string(),
            fetch_limit: 1000,
            cors_origins: Vec::new(),
        };
        let app = build_router(state);

        let (status, body) = post_json(app, "/submit", r#"{"value":"20"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["row"], Value::Null);
    }

    #[tokio::test]
    async fn test_submit_seconds_dataset() {
        let dir = TempDir::new().unwrap();
        let state = setup_state(
            &dir,
            &[
                r#"{"race_5km":1100,"vdot":46}"#,
                r#"{"race_5km":1250,"vdot":42}"#,
                r#"{"race_5km":1400,"vdot":38}"#,
            ],
        );
        let app = build_router(state);

        // 20 min = 1200s; closest stored seconds value is 1250
        let (status, body) = post_json(app, "/submit", r#"{"value":"20"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["row"]["vdot"], 42);
    }

    #[tokio::test]
    async fn test_submit_response_shape() {
        let dir = TempDir::new().unwrap();
        let state = setup_state(
            &dir,
            &[r#"{"race_5km":"20:00","vdot":43,"easy_pace_per_km":"5:45","race_half_marathon":"1:32:00"}"#],
        );
        let app = build_router(state);

        let (_, body) = post_json(app, "/submit", r#"{"value":"20:00"}"#).await;
        let row = body["row"].as_object().unwrap();
        assert_eq!(row.len(), 8);
        assert_eq!(row["race_half_marathon"], "1:32:00");
        assert_eq!(row["easy_pase_per_km"], "5:45");
        assert_eq!(row["marathon_pace_per_mile"], Value::Null);
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let state = setup_state(&dir, &[]);
        let app = build_router(state);

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
