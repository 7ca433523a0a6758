/// Fundraising lead database operations
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::lead::{CreateLeadRequest, UpdateLeadRequest};
use crate::models::{Lead, LeadStage};

const LEAD_COLUMNS: &str = "id, firm_name, contact_name, contact_email, stage, \
     target_amount_usd, owner_id, summary, created_at, updated_at, deleted_at";

/// Create a lead; new leads start at `identified`.
pub async fn insert(pool: &PgPool, req: &CreateLeadRequest) -> Result<Lead, sqlx::Error> {
    let query = format!(
        r#"
        INSERT INTO leads (id, firm_name, contact_name, contact_email, stage,
                           target_amount_usd, owner_id, summary)
        VALUES ($1, $2, $3, $4, 'identified', $5, $6, $7)
        RETURNING {LEAD_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Lead>(&query)
        .bind(Uuid::new_v4())
        .bind(&req.firm_name)
        .bind(&req.contact_name)
        .bind(req.contact_email.as_deref())
        .bind(req.target_amount_usd)
        .bind(req.owner_id)
        .bind(req.summary.as_deref())
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, lead_id: Uuid) -> Result<Option<Lead>, sqlx::Error> {
    let query = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1 AND deleted_at IS NULL");
    sqlx::query_as::<_, Lead>(&query)
        .bind(lead_id)
        .fetch_optional(pool)
        .await
}

/// List leads with optional stage/owner filters, newest first
pub async fn list(
    pool: &PgPool,
    stage: Option<LeadStage>,
    owner_id: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Lead>, sqlx::Error> {
    let query = format!(
        r#"
        SELECT {LEAD_COLUMNS}
        FROM leads
        WHERE deleted_at IS NULL
          AND ($1::lead_stage IS NULL OR stage = $1)
          AND ($2::uuid IS NULL OR owner_id = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#
    );
    sqlx::query_as::<_, Lead>(&query)
        .bind(stage)
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Partial update; absent fields keep their current values
pub async fn update(
    pool: &PgPool,
    lead_id: Uuid,
    changes: &UpdateLeadRequest,
) -> Result<Option<Lead>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE leads
        SET firm_name = COALESCE($2, firm_name),
            contact_name = COALESCE($3, contact_name),
            contact_email = COALESCE($4, contact_email),
            stage = COALESCE($5, stage),
            target_amount_usd = COALESCE($6, target_amount_usd),
            owner_id = COALESCE($7, owner_id),
            summary = COALESCE($8, summary),
            updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {LEAD_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Lead>(&query)
        .bind(lead_id)
        .bind(changes.firm_name.as_deref())
        .bind(changes.contact_name.as_deref())
        .bind(changes.contact_email.as_deref())
        .bind(changes.stage)
        .bind(changes.target_amount_usd)
        .bind(changes.owner_id)
        .bind(changes.summary.as_deref())
        .fetch_optional(pool)
        .await
}

pub async fn soft_delete(pool: &PgPool, lead_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE leads SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(lead_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
