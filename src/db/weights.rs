use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::weight_entry::{WeightEntry, WeightSample};

/// Every user's samples, ascending by date then creation time.
pub async fn fetch_all_samples(db: &PgPool) -> Result<Vec<WeightSample>, sqlx::Error> {
    sqlx::query_as::<_, WeightSample>(
        r#"
        SELECT u.username, w.entry_date, w.weight, w.created_at
        FROM weight_entries w
        JOIN users u ON u.id = w.user_id
        ORDER BY w.entry_date ASC, w.created_at ASC
        "#,
    )
    .fetch_all(db)
    .await
}

/// One user's entries, newest first.
pub async fn fetch_samples_for_user(
    db: &PgPool,
    user_id: Uuid,
) -> Result<Vec<WeightEntry>, sqlx::Error> {
    sqlx::query_as::<_, WeightEntry>(
        r#"
        SELECT id, entry_date, weight, note, created_at
        FROM weight_entries
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn fetch_latest_for_user(
    db: &PgPool,
    user_id: Uuid,
) -> Result<Option<WeightEntry>, sqlx::Error> {
    sqlx::query_as::<_, WeightEntry>(
        r#"
        SELECT id, entry_date, weight, note, created_at
        FROM weight_entries
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn insert_weight(
    db: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
    weight: f64,
    note: Option<&str>,
) -> Result<WeightEntry, sqlx::Error> {
    sqlx::query_as::<_, WeightEntry>(
        r#"
        INSERT INTO weight_entries (id, user_id, entry_date, weight, note)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, entry_date, weight, note, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(date)
    .bind(weight)
    .bind(note)
    .fetch_one(db)
    .await
}

/// Returns whether a row owned by `user_id` was removed.
pub async fn delete_weight_entry(
    db: &PgPool,
    entry_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM weight_entries WHERE id = $1 AND user_id = $2")
        .bind(entry_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
