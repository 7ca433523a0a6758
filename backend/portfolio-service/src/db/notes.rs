/// Note database operations
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Note;

const NOTE_COLUMNS: &str =
    "id, author_id, company_id, deal_id, body, created_at, updated_at, deleted_at";

pub async fn insert(
    pool: &PgPool,
    author_id: Uuid,
    company_id: Option<Uuid>,
    deal_id: Option<Uuid>,
    body: &str,
) -> Result<Note, sqlx::Error> {
    let query = format!(
        r#"
        INSERT INTO notes (id, author_id, company_id, deal_id, body)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {NOTE_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Note>(&query)
        .bind(Uuid::new_v4())
        .bind(author_id)
        .bind(company_id)
        .bind(deal_id)
        .bind(body)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, note_id: Uuid) -> Result<Option<Note>, sqlx::Error> {
    let query = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1 AND deleted_at IS NULL");
    sqlx::query_as::<_, Note>(&query)
        .bind(note_id)
        .fetch_optional(pool)
        .await
}

/// List notes for a company and/or deal, newest first
pub async fn list(
    pool: &PgPool,
    company_id: Option<Uuid>,
    deal_id: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Note>, sqlx::Error> {
    let query = format!(
        r#"
        SELECT {NOTE_COLUMNS}
        FROM notes
        WHERE deleted_at IS NULL
          AND ($1::uuid IS NULL OR company_id = $1)
          AND ($2::uuid IS NULL OR deal_id = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#
    );
    sqlx::query_as::<_, Note>(&query)
        .bind(company_id)
        .bind(deal_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn update_body(
    pool: &PgPool,
    note_id: Uuid,
    body: &str,
) -> Result<Option<Note>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE notes
        SET body = $2, updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {NOTE_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Note>(&query)
        .bind(note_id)
        .bind(body)
        .fetch_optional(pool)
        .await
}

pub async fn soft_delete(pool: &PgPool, note_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE notes SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(note_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
