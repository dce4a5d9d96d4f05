use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::challenge::ChallengeStatus;

pub async fn is_completed(db: &PgPool, user_id: Uuid, date: NaiveDate) -> Result<bool, sqlx::Error> {
    let completed = sqlx::query_scalar::<_, bool>(
        "SELECT completed FROM challenge_log WHERE user_id = $1 AND challenge_date = $2",
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(db)
    .await?;

    Ok(completed.unwrap_or(false))
}

/// Idempotent: completing twice on the same day keeps a single row.
pub async fn mark_completed(db: &PgPool, user_id: Uuid, date: NaiveDate) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO challenge_log (id, user_id, challenge_date, completed)
        VALUES ($1, $2, $3, TRUE)
        ON CONFLICT (user_id, challenge_date) DO UPDATE SET completed = TRUE
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(date)
    .execute(db)
    .await?;

    Ok(())
}

/// Every registered user with their completion flag for `date`, by username.
pub async fn fetch_statuses(db: &PgPool, date: NaiveDate) -> Result<Vec<ChallengeStatus>, sqlx::Error> {
    sqlx::query_as::<_, ChallengeStatus>(
        r#"
        SELECT u.username, COALESCE(c.completed, FALSE) AS completed
        FROM users u
        LEFT JOIN challenge_log c ON c.user_id = u.id AND c.challenge_date = $1
        ORDER BY u.username
        "#,
    )
    .bind(date)
    .fetch_all(db)
    .await
}
