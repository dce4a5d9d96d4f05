use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::middleware::AuthUser;
use crate::db;
use crate::error::AppResult;
use crate::services::color::{assign_display_color, validate_color, DisplayColor};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateColorRequest {
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct ColorSettingsResponse {
    /// Saved color, if any.
    pub color: Option<String>,
    pub display: DisplayColor,
}

pub async fn get_color(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<ColorSettingsResponse>> {
    let stored = db::users::fetch_user_color(&state.db, auth_user.id).await?;
    let display = assign_display_color(stored.as_deref(), &mut rand::thread_rng());

    Ok(Json(ColorSettingsResponse {
        color: stored,
        display,
    }))
}

pub async fn update_color(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpdateColorRequest>,
) -> AppResult<Json<ColorSettingsResponse>> {
    let color = validate_color(&body.color)?;
    db::users::store_user_color(&state.db, auth_user.id, &color).await?;

    tracing::info!(user_id = %auth_user.id, color = %color, "Display color saved");

    Ok(Json(ColorSettingsResponse {
        display: DisplayColor {
            color: color.clone(),
            persisted: true,
        },
        color: Some(color),
    }))
}
