/// Session database operations
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Session;

const SESSION_COLUMNS: &str =
    "id, user_id, last_activity_at, expires_at, revoked_at, created_at, updated_at";

/// Create a new session
pub async fn create_session(
    pool: &PgPool,
    user_id: Uuid,
    ttl_days: i64,
) -> Result<Session, sqlx::Error> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(ttl_days);

    let query = format!(
        r#"
        INSERT INTO sessions (id, user_id, last_activity_at, expires_at, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $3, $3)
        RETURNING {SESSION_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Session>(&query)
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(now)
        .bind(expires_at)
        .fetch_one(pool)
        .await
}

/// Get a live session (not revoked, not expired) for a specific user
pub async fn find_live_session(
    pool: &PgPool,
    session_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Session>, sqlx::Error> {
    let query = format!(
        r#"
        SELECT {SESSION_COLUMNS}
        FROM sessions
        WHERE id = $1 AND user_id = $2 AND revoked_at IS NULL AND expires_at > NOW()
        "#
    );
    sqlx::query_as::<_, Session>(&query)
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Revoke a session (logout)
pub async fn revoke_session(pool: &PgPool, session_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE sessions
        SET revoked_at = NOW(), updated_at = NOW()
        WHERE id = $1 AND revoked_at IS NULL
        "#,
    )
    .bind(session_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Revoke every live session for a user (account deactivation)
pub async fn revoke_all_for_user(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE sessions
        SET revoked_at = NOW(), updated_at = NOW()
        WHERE user_id = $1 AND revoked_at IS NULL
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Update session last activity timestamp
pub async fn touch_last_activity(pool: &PgPool, session_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE sessions
        SET last_activity_at = NOW(), updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(session_id)
    .execute(pool)
    .await?;

    Ok(())
}
