/// User database operations
use access_control::Role;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;

const USER_COLUMNS: &str = "id, email, password_hash, full_name, role, company_id, \
     email_verified, failed_login_attempts, locked_until, last_login_at, \
     created_at, updated_at, deleted_at";

/// Find an active user by email (login path; deactivated accounts are
/// invisible here)
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let query = format!(
        "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1) AND deleted_at IS NULL"
    );
    sqlx::query_as::<_, User>(&query)
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Find an active user by id
pub async fn find_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
    sqlx::query_as::<_, User>(&query)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Create a user (admin provisioning)
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    full_name: &str,
    role: Role,
    company_id: Option<Uuid>,
) -> Result<User, sqlx::Error> {
    let query = format!(
        r#"
        INSERT INTO users (id, email, password_hash, full_name, role, company_id, email_verified)
        VALUES ($1, $2, $3, $4, $5, $6, FALSE)
        RETURNING {USER_COLUMNS}
        "#
    );
    sqlx::query_as::<_, User>(&query)
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(role)
        .bind(company_id)
        .fetch_one(pool)
        .await
}

/// List all users, newest first (admin panel; includes deactivated)
pub async fn list_users(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<User>, sqlx::Error> {
    let query = format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
    );
    sqlx::query_as::<_, User>(&query)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Change a user's role and company affiliation
pub async fn update_role(
    pool: &PgPool,
    user_id: Uuid,
    role: Role,
    company_id: Option<Uuid>,
) -> Result<Option<User>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE users
        SET role = $2, company_id = $3, updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {USER_COLUMNS}
        "#
    );
    sqlx::query_as::<_, User>(&query)
        .bind(user_id)
        .bind(role)
        .bind(company_id)
        .fetch_optional(pool)
        .await
}

/// Deactivate a user (soft delete). Future session resolutions for this
/// user fail, which is what evicts them from the product.
pub async fn soft_delete(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Record a failed login attempt; locks the account for
/// `lockout_minutes` once `max_attempts` consecutive failures accumulate.
/// Returns the updated attempt count.
pub async fn record_failed_login(
    pool: &PgPool,
    user_id: Uuid,
    max_attempts: i32,
    lockout_minutes: i32,
) -> Result<i32, sqlx::Error> {
    let (attempts,): (i32,) = sqlx::query_as(
        r#"
        UPDATE users
        SET failed_login_attempts = failed_login_attempts + 1,
            locked_until = CASE
                WHEN failed_login_attempts + 1 >= $2
                THEN NOW() + make_interval(mins => $3)
                ELSE locked_until
            END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING failed_login_attempts
        "#,
    )
    .bind(user_id)
    .bind(max_attempts)
    .bind(lockout_minutes)
    .fetch_one(pool)
    .await?;

    Ok(attempts)
}

/// Clear the failure counter and stamp a successful login
pub async fn record_successful_login(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET failed_login_attempts = 0,
            locked_until = NULL,
            last_login_at = NOW(),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}
