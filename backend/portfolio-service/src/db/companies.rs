/// Company and company-metric database operations
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::company::UpdateCompanyRequest;
use crate::models::{Company, CompanyMetric};

const COMPANY_COLUMNS: &str = "id, name, sector, stage, website, description, founded_on, \
     created_at, updated_at, deleted_at";

pub async fn insert(
    pool: &PgPool,
    name: &str,
    sector: Option<&str>,
    stage: Option<&str>,
    website: Option<&str>,
    description: Option<&str>,
    founded_on: Option<NaiveDate>,
) -> Result<Company, sqlx::Error> {
    let query = format!(
        r#"
        INSERT INTO companies (id, name, sector, stage, website, description, founded_on)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {COMPANY_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Company>(&query)
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(sector)
        .bind(stage)
        .bind(website)
        .bind(description)
        .bind(founded_on)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, company_id: Uuid) -> Result<Option<Company>, sqlx::Error> {
    let query =
        format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1 AND deleted_at IS NULL");
    sqlx::query_as::<_, Company>(&query)
        .bind(company_id)
        .fetch_optional(pool)
        .await
}

/// List companies with optional sector/stage filters, newest first
pub async fn list(
    pool: &PgPool,
    sector: Option<&str>,
    stage: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Company>, sqlx::Error> {
    let query = format!(
        r#"
        SELECT {COMPANY_COLUMNS}
        FROM companies
        WHERE deleted_at IS NULL
          AND ($1::text IS NULL OR sector = $1)
          AND ($2::text IS NULL OR stage = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#
    );
    sqlx::query_as::<_, Company>(&query)
        .bind(sector)
        .bind(stage)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Partial update; absent fields keep their current values
pub async fn update(
    pool: &PgPool,
    company_id: Uuid,
    changes: &UpdateCompanyRequest,
) -> Result<Option<Company>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE companies
        SET name = COALESCE($2, name),
            sector = COALESCE($3, sector),
            stage = COALESCE($4, stage),
            website = COALESCE($5, website),
            description = COALESCE($6, description),
            founded_on = COALESCE($7, founded_on),
            updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {COMPANY_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Company>(&query)
        .bind(company_id)
        .bind(changes.name.as_deref())
        .bind(changes.sector.as_deref())
        .bind(changes.stage.as_deref())
        .bind(changes.website.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.founded_on)
        .fetch_optional(pool)
        .await
}

pub async fn soft_delete(pool: &PgPool, company_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE companies SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(company_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

const METRIC_COLUMNS: &str =
    "id, company_id, period, revenue_usd, burn_usd, runway_months, headcount, created_at";

/// Record a monthly metric row; re-submitting the same period overwrites
/// the previous figures.
pub async fn upsert_metric(
    pool: &PgPool,
    company_id: Uuid,
    period: NaiveDate,
    revenue_usd: i64,
    burn_usd: i64,
    runway_months: i32,
    headcount: i32,
) -> Result<CompanyMetric, sqlx::Error> {
    let query = format!(
        r#"
        INSERT INTO company_metrics (id, company_id, period, revenue_usd, burn_usd, runway_months, headcount)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (company_id, period) DO UPDATE
        SET revenue_usd = EXCLUDED.revenue_usd,
            burn_usd = EXCLUDED.burn_usd,
            runway_months = EXCLUDED.runway_months,
            headcount = EXCLUDED.headcount
        RETURNING {METRIC_COLUMNS}
        "#
    );
    sqlx::query_as::<_, CompanyMetric>(&query)
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(period)
        .bind(revenue_usd)
        .bind(burn_usd)
        .bind(runway_months)
        .bind(headcount)
        .fetch_one(pool)
        .await
}

/// Metric history for a company, most recent period first
pub async fn list_metrics(
    pool: &PgPool,
    company_id: Uuid,
    limit: i64,
) -> Result<Vec<CompanyMetric>, sqlx::Error> {
    let query = format!(
        r#"
        SELECT {METRIC_COLUMNS}
        FROM company_metrics
        WHERE company_id = $1
        ORDER BY period DESC
        LIMIT $2
        "#
    );
    sqlx::query_as::<_, CompanyMetric>(&query)
        .bind(company_id)
        .bind(limit)
        .fetch_all(pool)
        .await
}
