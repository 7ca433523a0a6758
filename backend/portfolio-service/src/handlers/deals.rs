/// Deal pipeline endpoints.
use access_control::{has_permission, has_role, Permission, Role, SessionState};
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db;
use crate::error::{AppError, Result};
use crate::handlers::clamp_limit;
use crate::models::deal::{
    CreateDealRequest, DealQuery, UpdateDealRequest, UpdateDealStageRequest,
};
use crate::services::deals as deal_service;

/// GET /api/v1/deals
pub async fn list_deals(
    pool: web::Data<PgPool>,
    session: SessionState,
    query: web::Query<DealQuery>,
) -> Result<HttpResponse> {
    let deals = db::deals::list(
        &pool,
        query.stage,
        query.company_id,
        clamp_limit(query.limit),
        query.offset.max(0),
    )
    .await?;

    let responses: Vec<_> = deals
        .into_iter()
        .map(|deal| deal_service::deal_response(deal, &session))
        .collect();

    Ok(HttpResponse::Ok().json(responses))
}

/// GET /api/v1/deals/{deal_id}
pub async fn get_deal(
    pool: web::Data<PgPool>,
    session: SessionState,
    deal_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match db::deals::find_by_id(&pool, *deal_id).await? {
        Some(deal) => Ok(HttpResponse::Ok().json(deal_service::deal_response(deal, &session))),
        None => Err(AppError::NotFound("deal".to_string())),
    }
}

/// POST /api/v1/deals
pub async fn create_deal(
    pool: web::Data<PgPool>,
    session: SessionState,
    req: web::Json<CreateDealRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    if !has_permission(&session, Permission::ManageDeals) {
        return Err(AppError::Forbidden(
            "creating deals requires the capital team".to_string(),
        ));
    }

    if db::companies::find_by_id(&pool, req.company_id).await?.is_none() {
        return Err(AppError::BadRequest("unknown company".to_string()));
    }

    let deal = db::deals::insert(&pool, &req).await?;
    Ok(HttpResponse::Created().json(deal_service::deal_response(deal, &session)))
}

/// PATCH /api/v1/deals/{deal_id}
pub async fn update_deal(
    pool: web::Data<PgPool>,
    session: SessionState,
    deal_id: web::Path<Uuid>,
    req: web::Json<UpdateDealRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    if !has_permission(&session, Permission::ManageDeals) {
        return Err(AppError::Forbidden(
            "editing deals requires the capital team".to_string(),
        ));
    }

    match db::deals::update_fields(&pool, *deal_id, &req).await? {
        Some(deal) => Ok(HttpResponse::Ok().json(deal_service::deal_response(deal, &session))),
        None => Err(AppError::NotFound("deal".to_string())),
    }
}

/// PATCH /api/v1/deals/{deal_id}/stage
pub async fn update_deal_stage(
    pool: web::Data<PgPool>,
    session: SessionState,
    deal_id: web::Path<Uuid>,
    req: web::Json<UpdateDealStageRequest>,
) -> Result<HttpResponse> {
    if !has_permission(&session, Permission::ManageDeals) {
        return Err(AppError::Forbidden(
            "moving deals requires the capital team".to_string(),
        ));
    }

    let deal = deal_service::move_stage(&pool, *deal_id, req.stage).await?;
    Ok(HttpResponse::Ok().json(deal_service::deal_response(deal, &session)))
}

/// DELETE /api/v1/deals/{deal_id} — admin only.
pub async fn delete_deal(
    pool: web::Data<PgPool>,
    session: SessionState,
    deal_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if !has_role(&session, &[Role::Admin]) {
        return Err(AppError::Forbidden(
            "removing a deal requires an admin".to_string(),
        ));
    }

    if db::deals::soft_delete(&pool, *deal_id).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::NotFound("deal".to_string()))
    }
}
