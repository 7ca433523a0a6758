/// Fundraising lead endpoints.
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db;
use crate::error::{AppError, Result};
use crate::handlers::clamp_limit;
use crate::models::lead::{CreateLeadRequest, LeadQuery, UpdateLeadRequest};

/// GET /api/v1/leads
pub async fn list_leads(
    pool: web::Data<PgPool>,
    query: web::Query<LeadQuery>,
) -> Result<HttpResponse> {
    let leads = db::leads::list(
        &pool,
        query.stage,
        query.owner_id,
        clamp_limit(query.limit),
        query.offset.max(0),
    )
    .await?;

    Ok(HttpResponse::Ok().json(leads))
}

/// GET /api/v1/leads/{lead_id}
pub async fn get_lead(pool: web::Data<PgPool>, lead_id: web::Path<Uuid>) -> Result<HttpResponse> {
    match db::leads::find_by_id(&pool, *lead_id).await? {
        Some(lead) => Ok(HttpResponse::Ok().json(lead)),
        None => Err(AppError::NotFound("lead".to_string())),
    }
}

/// POST /api/v1/leads
pub async fn create_lead(
    pool: web::Data<PgPool>,
    req: web::Json<CreateLeadRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let lead = db::leads::insert(&pool, &req).await?;
    Ok(HttpResponse::Created().json(lead))
}

/// PATCH /api/v1/leads/{lead_id}
pub async fn update_lead(
    pool: web::Data<PgPool>,
    lead_id: web::Path<Uuid>,
    req: web::Json<UpdateLeadRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    match db::leads::update(&pool, *lead_id, &req).await? {
        Some(lead) => Ok(HttpResponse::Ok().json(lead)),
        None => Err(AppError::NotFound("lead".to_string())),
    }
}

/// DELETE /api/v1/leads/{lead_id}
pub async fn delete_lead(
    pool: web::Data<PgPool>,
    lead_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if db::leads::soft_delete(&pool, *lead_id).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::NotFound("lead".to_string()))
    }
}
