use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::error::AppResult;
use crate::models::user::{User, UserColor};

const TEST_USERS: &[(&str, &str)] = &[("alice", "alice123"), ("bob", "bob123")];

pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(db)
        .await
}

pub async fn find_by_id(db: &PgPool, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await
}

/// Inserts a user unless the name is taken. Returns `None` on conflict.
pub async fn insert_user(
    db: &PgPool,
    username: &str,
    password_hash: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO users (id, username, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (username) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .fetch_optional(db)
    .await
}

pub async fn update_password(
    db: &PgPool,
    user_id: Uuid,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(password_hash)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn fetch_user_color(db: &PgPool, user_id: Uuid) -> Result<Option<String>, sqlx::Error> {
    let color = sqlx::query_scalar::<_, Option<String>>("SELECT color FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await?;
    Ok(color.flatten())
}

pub async fn store_user_color(db: &PgPool, user_id: Uuid, color: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET color = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(color)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn fetch_all_user_colors(db: &PgPool) -> Result<Vec<UserColor>, sqlx::Error> {
    sqlx::query_as::<_, UserColor>("SELECT username, color FROM users ORDER BY username")
        .fetch_all(db)
        .await
}

/// Creates the `alice` and `bob` accounts if they do not exist yet.
pub async fn seed_test_users(db: &PgPool) -> AppResult<()> {
    for (username, password) in TEST_USERS {
        if find_by_username(db, username).await?.is_some() {
            continue;
        }
        let pwd_hash = hash_password(password)?;
        if insert_user(db, username, &pwd_hash).await?.is_some() {
            tracing::info!(username = %username, "Seeded test user");
        }
    }
    Ok(())
}
