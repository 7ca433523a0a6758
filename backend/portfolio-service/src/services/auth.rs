/// Authentication flows: login, token refresh, logout.
///
/// Login failures are categorized (invalid credentials, unconfirmed
/// account, rate limited) and never mutate session state; only a fully
/// verified login creates a session row and issues tokens.
use crypto_core::jwt::{self, TokenResponse};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::db;
use crate::error::{AppError, Result};
use crate::models::user::{LoginRequest, UserResponse};
use crate::security;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub tokens: TokenResponse,
    pub user: UserResponse,
}

pub struct AuthService {
    pool: PgPool,
    max_failed_logins: i32,
    lockout_minutes: i32,
    session_ttl_days: i64,
}

impl AuthService {
    pub fn new(pool: PgPool, auth: &AuthConfig) -> Self {
        Self {
            pool,
            max_failed_logins: auth.max_failed_logins,
            lockout_minutes: auth.lockout_minutes as i32,
            session_ttl_days: auth.session_ttl_days,
        }
    }

    /// Verify credentials and mint a session + token pair.
    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse> {
        let user = db::users::find_by_email(&self.pool, &req.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if user.is_locked() {
            tracing::warn!(user_id = %user.id, "login attempt against locked account");
            return Err(AppError::RateLimited);
        }

        if !security::verify_password(&req.password, &user.password_hash)? {
            let attempts = db::users::record_failed_login(
                &self.pool,
                user.id,
                self.max_failed_logins,
                self.lockout_minutes,
            )
            .await?;

            if attempts >= self.max_failed_logins {
                tracing::warn!(user_id = %user.id, attempts, "account locked after repeated failures");
                return Err(AppError::RateLimited);
            }
            return Err(AppError::InvalidCredentials);
        }

        if !user.email_verified {
            return Err(AppError::AccountUnconfirmed);
        }

        let session =
            db::sessions::create_session(&self.pool, user.id, self.session_ttl_days).await?;
        db::users::record_successful_login(&self.pool, user.id).await?;

        let tokens = jwt::generate_token_pair(user.id, session.id, &user.email)
            .map_err(|e| AppError::Internal(format!("token generation failed: {e}")))?;

        tracing::info!(user_id = %user.id, session_id = %session.id, "user logged in");

        Ok(LoginResponse {
            tokens,
            user: UserResponse::from(user),
        })
    }

    /// Exchange a live refresh token for a fresh access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        let claims = jwt::validate_token(refresh_token)
            .map_err(|_| AppError::Unauthorized("invalid refresh token".to_string()))?
            .claims;

        if claims.token_type != "refresh" {
            return Err(AppError::Unauthorized(
                "access token presented to refresh endpoint".to_string(),
            ));
        }

        let (user_id, session_id) = parse_identity(&claims.sub, &claims.sid)?;

        let session = db::sessions::find_live_session(&self.pool, session_id, user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("session expired or revoked".to_string()))?;

        let user = db::users::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("account no longer active".to_string()))?;

        db::sessions::touch_last_activity(&self.pool, session.id).await?;

        let access_token = jwt::generate_access_token(user.id, session.id, &user.email)
            .map_err(|e| AppError::Internal(format!("token generation failed: {e}")))?;

        Ok(TokenResponse {
            access_token,
            refresh_token: refresh_token.to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
        })
    }

    /// Revoke the session behind the presented credentials. In-flight
    /// queries keyed by this identity become invalid at their next
    /// resolution; evicting any client-side caches is the caller's job.
    pub async fn logout(&self, session_id: Uuid) -> Result<()> {
        db::sessions::revoke_session(&self.pool, session_id).await?;
        tracing::info!(%session_id, "session revoked");
        Ok(())
    }
}

fn parse_identity(sub: &str, sid: &str) -> Result<(Uuid, Uuid)> {
    match (Uuid::parse_str(sub), Uuid::parse_str(sid)) {
        (Ok(user_id), Ok(session_id)) => Ok((user_id, session_id)),
        _ => Err(AppError::Unauthorized("malformed token claims".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_parsing_rejects_malformed_claims() {
        let user = Uuid::new_v4();
        let session = Uuid::new_v4();

        assert!(parse_identity(&user.to_string(), &session.to_string()).is_ok());
        assert!(parse_identity("not-a-uuid", &session.to_string()).is_err());
        assert!(parse_identity(&user.to_string(), "").is_err());
    }
}
