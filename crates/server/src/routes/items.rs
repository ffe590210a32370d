use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use service::Record;
use tracing::info;

use crate::errors::ApiError;
use crate::state::AppState;

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::InvalidIdentifier(raw.to_string()))
}

// Decoded by hand so every malformed body is a 400, whatever the content type.
// Only a JSON object is a record; the derived decoder would also take `[id, name, age]`.
fn decode_record(body: &[u8]) -> Result<Record, ApiError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidPayload(e.to_string()))?;
    if !value.is_object() {
        return Err(ApiError::InvalidPayload(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    }
    serde_json::from_value(value).map_err(|e| ApiError::InvalidPayload(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// POST /items
pub async fn create_item(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let record = decode_record(&body)?;
    let stored = state.store.insert_new(record).await?;
    info!(id = stored.id, name = %stored.name, age = stored.age, "created item");
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /items/:id
pub async fn get_item(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let id = parse_id(&raw_id)?;
    state.store.get(id).await.map(Json).ok_or(ApiError::NotFound(id))
}

/// PUT /items/:id
///
/// Full replace: the path id wins over the body id and absent fields are
/// stored as their defaults.
pub async fn update_item(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<Record>, ApiError> {
    let id = parse_id(&raw_id)?;
    if !state.store.contains(id).await {
        return Err(ApiError::NotFound(id));
    }
    let record = decode_record(&body)?;
    let stored = state.store.replace(id, record).await?;
    info!(id, "updated item");
    Ok(Json(stored))
}
