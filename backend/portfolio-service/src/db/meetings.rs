/// Meeting database operations
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Meeting;

const MEETING_COLUMNS: &str = "id, title, company_id, scheduled_at, location, created_by, \
     cancelled_at, created_at, updated_at";

pub async fn insert(
    pool: &PgPool,
    title: &str,
    company_id: Option<Uuid>,
    scheduled_at: DateTime<Utc>,
    location: Option<&str>,
    created_by: Uuid,
) -> Result<Meeting, sqlx::Error> {
    let query = format!(
        r#"
        INSERT INTO meetings (id, title, company_id, scheduled_at, location, created_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {MEETING_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Meeting>(&query)
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(company_id)
        .bind(scheduled_at)
        .bind(location)
        .bind(created_by)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, meeting_id: Uuid) -> Result<Option<Meeting>, sqlx::Error> {
    let query = format!("SELECT {MEETING_COLUMNS} FROM meetings WHERE id = $1");
    sqlx::query_as::<_, Meeting>(&query)
        .bind(meeting_id)
        .fetch_optional(pool)
        .await
}

/// Meetings within a window, soonest first; cancelled meetings excluded
pub async fn list_between(
    pool: &PgPool,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    company_id: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Meeting>, sqlx::Error> {
    let query = format!(
        r#"
        SELECT {MEETING_COLUMNS}
        FROM meetings
        WHERE cancelled_at IS NULL
          AND scheduled_at >= $1 AND scheduled_at < $2
          AND ($3::uuid IS NULL OR company_id = $3)
        ORDER BY scheduled_at ASC
        LIMIT $4 OFFSET $5
        "#
    );
    sqlx::query_as::<_, Meeting>(&query)
        .bind(from)
        .bind(to)
        .bind(company_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn cancel(pool: &PgPool, meeting_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE meetings SET cancelled_at = NOW(), updated_at = NOW() WHERE id = $1 AND cancelled_at IS NULL",
    )
    .bind(meeting_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
