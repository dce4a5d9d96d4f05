use axum::{extract::State, Extension, Json};
use chrono::{NaiveDate, Utc};

use crate::auth::middleware::AuthUser;
use crate::db;
use crate::error::AppResult;
use crate::models::challenge::{ChallengeStatus, TodayChallenge};
use crate::services::challenge::challenge_for;
use crate::AppState;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub async fn today_challenge(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<TodayChallenge>> {
    let date = today();
    let completed = db::challenges::is_completed(&state.db, auth_user.id, date).await?;

    Ok(Json(TodayChallenge {
        date,
        prompt: challenge_for(date),
        completed,
    }))
}

pub async fn complete_today(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<TodayChallenge>> {
    let date = today();
    db::challenges::mark_completed(&state.db, auth_user.id, date).await?;

    tracing::info!(
        user_id = %auth_user.id,
        username = %auth_user.username,
        date = %date,
        "Daily challenge completed"
    );

    Ok(Json(TodayChallenge {
        date,
        prompt: challenge_for(date),
        completed: true,
    }))
}

pub async fn today_status(State(state): State<AppState>) -> AppResult<Json<Vec<ChallengeStatus>>> {
    let statuses = db::challenges::fetch_statuses(&state.db, today()).await?;
    Ok(Json(statuses))
}
