/// Founder portal endpoints, mounted at /api/v1/my/{company_id}.
///
/// The scope's guard requires the founder role AND ownership of the
/// `company_id` path parameter, so these handlers only ever run for the
/// founder's own company.
use access_control::{has_permission, Permission, SessionState};
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db;
use crate::error::{AppError, Result};
use crate::models::company::{
    SubmitMetricRequest, UpdateCompanyProfileRequest, UpdateCompanyRequest,
};
use crate::services::deals as deal_service;

/// GET /api/v1/my/{company_id}
pub async fn my_company(
    pool: web::Data<PgPool>,
    company_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match db::companies::find_by_id(&pool, *company_id).await? {
        Some(company) => Ok(HttpResponse::Ok().json(company)),
        None => Err(AppError::NotFound("company".to_string())),
    }
}

/// PATCH /api/v1/my/{company_id} — founder-editable profile fields only.
pub async fn update_my_company(
    pool: web::Data<PgPool>,
    session: SessionState,
    company_id: web::Path<Uuid>,
    req: web::Json<UpdateCompanyProfileRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    if !has_permission(&session, Permission::ManageCompany) {
        return Err(AppError::Forbidden(
            "editing the company profile requires its founder".to_string(),
        ));
    }

    let changes = UpdateCompanyRequest {
        name: None,
        sector: None,
        stage: None,
        website: req.website.clone(),
        description: req.description.clone(),
        founded_on: None,
    };

    match db::companies::update(&pool, *company_id, &changes).await? {
        Some(company) => Ok(HttpResponse::Ok().json(company)),
        None => Err(AppError::NotFound("company".to_string())),
    }
}

/// GET /api/v1/my/{company_id}/metrics
pub async fn my_metrics(
    pool: web::Data<PgPool>,
    company_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let metrics = db::companies::list_metrics(&pool, *company_id, 36).await?;
    Ok(HttpResponse::Ok().json(metrics))
}

/// POST /api/v1/my/{company_id}/metrics — monthly figures submission.
pub async fn submit_my_metrics(
    pool: web::Data<PgPool>,
    session: SessionState,
    company_id: web::Path<Uuid>,
    req: web::Json<SubmitMetricRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    if !has_permission(&session, Permission::ManageCompany) {
        return Err(AppError::Forbidden(
            "submitting metrics requires the company founder".to_string(),
        ));
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

/// GET /api/v1/my/{company_id}/deals — the founder's view of their own
/// rounds; economics are redacted because founders lack the
/// sensitive-data permission.
pub async fn my_deals(
    pool: web::Data<PgPool>,
    session: SessionState,
    company_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let deals = db::deals::list(&pool, None, Some(*company_id), 100, 0).await?;

    let responses: Vec<_> = deals
        .into_iter()
        .map(|deal| deal_service::deal_response(deal, &session))
        .collect();

    Ok(HttpResponse::Ok().json(responses))
}
