/// Portfolio company endpoints (fund side).
use access_control::{has_permission, has_role, Permission, Role, SessionState};
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db;
use crate::error::{AppError, Result};
use crate::handlers::clamp_limit;
use crate::models::company::{
    CompanyQuery, CreateCompanyRequest, SubmitMetricRequest, UpdateCompanyRequest,
};

/// GET /api/v1/companies
pub async fn list_companies(
    pool: web::Data<PgPool>,
    query: web::Query<CompanyQuery>,
) -> Result<HttpResponse> {
    let companies = db::companies::list(
        &pool,
        query.sector.as_deref(),
        query.stage.as_deref(),
        clamp_limit(query.limit),
        query.offset.max(0),
    )
    .await?;

    Ok(HttpResponse::Ok().json(companies))
}

/// GET /api/v1/companies/{company_id}
pub async fn get_company(
    pool: web::Data<PgPool>,
    company_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match db::companies::find_by_id(&pool, *company_id).await? {
        Some(company) => Ok(HttpResponse::Ok().json(company)),
        None => Err(AppError::NotFound("company".to_string())),
    }
}

/// POST /api/v1/companies
pub async fn create_company(
    pool: web::Data<PgPool>,
    session: SessionState,
    req: web::Json<CreateCompanyRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    if !has_permission(&session, Permission::ManageDeals) {
        return Err(AppError::Forbidden(
            "managing portfolio companies requires the capital team".to_string(),
        ));
    }

    let company = db::companies::insert(
        &pool,
        &req.name,
        req.sector.as_deref(),
        req.stage.as_deref(),
        req.website.as_deref(),
        req.description.as_deref(),
        req.founded_on,
    )
    .await?;

    Ok(HttpResponse::Created().json(company))
}

/// PATCH /api/v1/companies/{company_id}
pub async fn update_company(
    pool: web::Data<PgPool>,
    session: SessionState,
    company_id: web::Path<Uuid>,
    req: web::Json<UpdateCompanyRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    if !has_permission(&session, Permission::ManageDeals) {
        return Err(AppError::Forbidden(
            "managing portfolio companies requires the capital team".to_string(),
        ));
    }

    match db::companies::update(&pool, *company_id, &req).await? {
        Some(company) => Ok(HttpResponse::Ok().json(company)),
        None => Err(AppError::NotFound("company".to_string())),
    }
}

/// DELETE /api/v1/companies/{company_id} — admin only.
pub async fn delete_company(
    pool: web::Data<PgPool>,
    session: SessionState,
    company_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if !has_role(&session, &[Role::Admin]) {
        return Err(AppError::Forbidden(
            "removing a company requires an admin".to_string(),
        ));
    }

    if db::companies::soft_delete(&pool, *company_id).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::NotFound("company".to_string()))
    }
}

/// GET /api/v1/companies/{company_id}/metrics
pub async fn company_metrics(
    pool: web::Data<PgPool>,
    company_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if db::companies::find_by_id(&pool, *company_id).await?.is_none() {
        return Err(AppError::NotFound("company".to_string()));
    }

    let metrics = db::companies::list_metrics(&pool, *company_id, 36).await?;
    Ok(HttpResponse::Ok().json(metrics))
}

/// POST /api/v1/companies/{company_id}/metrics — capital team recording
/// figures on a company's behalf.
pub async fn record_company_metrics(
    pool: web::Data<PgPool>,
    session: SessionState,
    company_id: web::Path<Uuid>,
    req: web::Json<SubmitMetricRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    if !has_permission(&session, Permission::ManageDeals) {
        return Err(AppError::Forbidden(
            "recording metrics requires the capital team".to_string(),
        ));
    }

    if db::companies::find_by_id(&pool, *company_id).await?.is_none() {
        return Err(AppError::NotFound("company".to_string()));
    }

    let metric = db::companies::upsert_metric(
        &pool,
        *company_id,
        req.period,
        req.revenue_usd,
        req.burn_usd,
        req.runway_months,
        req.headcount,
    )
    .await?;

    Ok(HttpResponse::Created().json(metric))
}
