/// Admin panel endpoints: user provisioning and lifecycle.
///
/// The whole scope is admin-guarded; handlers still re-check the
/// user-management permission so the rule survives any future rewiring of
/// route scopes.
use access_control::{has_permission, Permission, Role, SessionState};
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db;
use crate::error::{AppError, Result};
use crate::handlers::clamp_limit;
use crate::models::user::{CreateUserRequest, UpdateUserRoleRequest, UserResponse};
use crate::security;

#[derive(Debug, serde::Deserialize)]
pub struct UserListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/v1/admin/users
pub async fn list_users(
    pool: web::Data<PgPool>,
    session: SessionState,
    query: web::Query<UserListQuery>,
) -> Result<HttpResponse> {
    require_user_management(&session)?;

    let users = db::users::list_users(&pool, clamp_limit(query.limit), query.offset.max(0)).await?;
    let responses: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(HttpResponse::Ok().json(responses))
}

/// POST /api/v1/admin/users — provision an account.
pub async fn create_user(
    pool: web::Data<PgPool>,
    session: SessionState,
    req: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    require_user_management(&session)?;
    req.validate()?;

    if req.role == Role::Founder && req.company_id.is_none() {
        return Err(AppError::BadRequest(
            "founder accounts require a company affiliation".to_string(),
        ));
    }

    if let Some(company_id) = req.company_id {
        if db::companies::find_by_id(&pool, company_id).await?.is_none() {
            return Err(AppError::BadRequest("unknown company".to_string()));
        }
    }

    if db::users::find_by_email(&pool, &req.email).await?.is_some() {
        return Err(AppError::Conflict("email already exists".to_string()));
    }

    let password_hash = security::hash_password(&req.password)?;

    let user = db::users::create_user(
        &pool,
        &req.email,
        &password_hash,
        &req.full_name,
        req.role,
        req.company_id,
    )
    .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "user provisioned");

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// PATCH /api/v1/admin/users/{user_id}/role
pub async fn update_user_role(
    pool: web::Data<PgPool>,
    session: SessionState,
    user_id: web::Path<Uuid>,
    req: web::Json<UpdateUserRoleRequest>,
) -> Result<HttpResponse> {
    require_user_management(&session)?;

    if req.role == Role::Founder && req.company_id.is_none() {
        return Err(AppError::BadRequest(
            "founder accounts require a company affiliation".to_string(),
        ));
    }

    match db::users::update_role(&pool, *user_id, req.role, req.company_id).await? {
        Some(user) => Ok(HttpResponse::Ok().json(UserResponse::from(user))),
        None => Err(AppError::NotFound("user".to_string())),
    }
}

/// DELETE /api/v1/admin/users/{user_id} — deactivate the account and
/// revoke every live session, so the next guard resolution fails closed.
pub async fn deactivate_user(
    pool: web::Data<PgPool>,
    session: SessionState,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    require_user_management(&session)?;

    if let Some(actor) = session.user() {
        if actor.user_id == *user_id {
            return Err(AppError::BadRequest(
                "admins cannot deactivate their own account".to_string(),
            ));
        }
    }

    if !db::users::soft_delete(&pool, *user_id).await? {
        return Err(AppError::NotFound("user".to_string()));
    }

    let revoked = db::sessions::revoke_all_for_user(&pool, *user_id).await?;
    tracing::info!(user_id = %user_id, revoked_sessions = revoked, "user deactivated");

    Ok(HttpResponse::NoContent().finish())
}

fn require_user_management(session: &SessionState) -> Result<()> {
    if has_permission(session, Permission::ManageUsers) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "user management requires an admin".to_string(),
        ))
    }
}
