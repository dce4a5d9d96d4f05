use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::weight_entry::{CreateWeightRequest, LatestWeight, WeightEntry};
use crate::AppState;

pub async fn create_weight(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateWeightRequest>,
) -> AppResult<(StatusCode, Json<WeightEntry>)> {
    body.validate()?;

    let date = body.entry_date(Utc::now().date_naive())?;
    let note = body.normalized_note();

    let entry =
        db::weights::insert_weight(&state.db, auth_user.id, date, body.weight, note.as_deref())
            .await?;

    tracing::info!(
        user_id = %auth_user.id,
        username = %auth_user.username,
        entry_id = %entry.id,
        date = %entry.date,
        "Weight recorded"
    );

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_weights(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<WeightEntry>>> {
    let entries = db::weights::fetch_samples_for_user(&state.db, auth_user.id).await?;
    Ok(Json(entries))
}

pub async fn latest_weight(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<LatestWeight>> {
    let latest = db::weights::fetch_latest_for_user(&state.db, auth_user.id).await?;
    Ok(Json(LatestWeight::from_entry(latest)))
}

pub async fn delete_weight(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = db::weights::delete_weight_entry(&state.db, entry_id, auth_user.id).await?;
    if !deleted {
        return Err(AppError::NotFound("Weight entry not found".into()));
    }

    tracing::info!(
        user_id = %auth_user.id,
        username = %auth_user.username,
        entry_id = %entry_id,
        "Weight entry deleted"
    );
    Ok(Json(serde_json::json!({ "deleted": true, "id": entry_id })))
}
