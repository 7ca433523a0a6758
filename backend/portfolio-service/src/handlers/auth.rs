/// Authentication endpoints.
///
/// `login` and `refresh` are the only unguarded API routes; `logout` and
/// `me` run inside a guarded scope and therefore always see a resolved
/// identity.
use access_control::CurrentUser;
use actix_web::{web, HttpResponse};
use std::sync::Arc;
use validator::Validate;

use crate::error::Result;
use crate::models::user::{LoginRequest, RefreshTokenRequest};
use crate::services::AuthService;

/// POST /api/v1/auth/login
pub async fn login(
    auth: web::Data<Arc<AuthService>>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let response = auth.login(&req).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    auth: web::Data<Arc<AuthService>>,
    req: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse> {
    let tokens = auth.refresh(&req.refresh_token).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    auth: web::Data<Arc<AuthService>>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    auth.logout(user.session_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/auth/me — the dashboard's session rehydration endpoint.
pub async fn me(user: CurrentUser) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(user))
}
