/// Deal database operations
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::deal::{CreateDealRequest, UpdateDealRequest};
use crate::models::{Deal, DealStage};

const DEAL_COLUMNS: &str = "id, company_id, round_name, stage, amount_usd, valuation_usd, \
     lead_partner_id, expected_close, created_at, updated_at, deleted_at";

/// Create a deal; every deal enters the pipeline at `sourced`.
pub async fn insert(pool: &PgPool, req: &CreateDealRequest) -> Result<Deal, sqlx::Error> {
    let query = format!(
        r#"
        INSERT INTO deals (id, company_id, round_name, stage, amount_usd, valuation_usd,
                           lead_partner_id, expected_close)
        VALUES ($1, $2, $3, 'sourced', $4, $5, $6, $7)
        RETURNING {DEAL_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Deal>(&query)
        .bind(Uuid::new_v4())
        .bind(req.company_id)
        .bind(&req.round_name)
        .bind(req.amount_usd)
        .bind(req.valuation_usd)
        .bind(req.lead_partner_id)
        .bind(req.expected_close)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, deal_id: Uuid) -> Result<Option<Deal>, sqlx::Error> {
    let query = format!("SELECT {DEAL_COLUMNS} FROM deals WHERE id = $1 AND deleted_at IS NULL");
    sqlx::query_as::<_, Deal>(&query)
        .bind(deal_id)
        .fetch_optional(pool)
        .await
}

/// Pipeline listing with optional stage/company filters, newest first
pub async fn list(
    pool: &PgPool,
    stage: Option<DealStage>,
    company_id: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Deal>, sqlx::Error> {
    let query = format!(
        r#"
        SELECT {DEAL_COLUMNS}
        FROM deals
        WHERE deleted_at IS NULL
          AND ($1::deal_stage IS NULL OR stage = $1)
          AND ($2::uuid IS NULL OR company_id = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#
    );
    sqlx::query_as::<_, Deal>(&query)
        .bind(stage)
        .bind(company_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Partial update of deal fields; stage moves go through `update_stage`.
pub async fn update_fields(
    pool: &PgPool,
    deal_id: Uuid,
    changes: &UpdateDealRequest,
) -> Result<Option<Deal>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE deals
        SET round_name = COALESCE($2, round_name),
            amount_usd = COALESCE($3, amount_usd),
            valuation_usd = COALESCE($4, valuation_usd),
            lead_partner_id = COALESCE($5, lead_partner_id),
            expected_close = COALESCE($6, expected_close),
            updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {DEAL_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Deal>(&query)
        .bind(deal_id)
        .bind(changes.round_name.as_deref())
        .bind(changes.amount_usd)
        .bind(changes.valuation_usd)
        .bind(changes.lead_partner_id)
        .bind(changes.expected_close)
        .fetch_optional(pool)
        .await
}

/// Move a deal to a new stage. Transition legality is validated by the
/// service layer before this runs.
pub async fn update_stage(
    pool: &PgPool,
    deal_id: Uuid,
    stage: DealStage,
) -> Result<Option<Deal>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE deals
        SET stage = $2, updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {DEAL_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Deal>(&query)
        .bind(deal_id)
        .bind(stage)
        .fetch_optional(pool)
        .await
}

pub async fn soft_delete(pool: &PgPool, deal_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE deals SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(deal_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
