use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChallengeStatus {
    pub username: String,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct TodayChallenge {
    pub date: NaiveDate,
    pub prompt: &'static str,
    pub completed: bool,
}
