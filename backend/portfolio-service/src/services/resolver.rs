/// Database-backed session resolution for the route guard.
///
/// Joins the live session row with the active user profile. Any absence
/// (revoked session, expired session, deactivated user) resolves to
/// `Unauthenticated`; infrastructure failures surface as `Backend` so the
/// guard can log them while still failing closed.
use access_control::{CurrentUser, SessionError, SessionResolver};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;

pub struct PgSessionResolver {
    pool: PgPool,
}

impl PgSessionResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionResolver for PgSessionResolver {
    async fn resolve(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<CurrentUser, SessionError> {
        let session = db::sessions::find_live_session(&self.pool, session_id, user_id)
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))?
            .ok_or(SessionError::Unauthenticated)?;

        let user = db::users::find_by_id(&self.pool, user_id)
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))?
            .ok_or(SessionError::Unauthenticated)?;

        Ok(CurrentUser {
            user_id: user.id,
            session_id: session.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            company_id: user.company_id,
        })
    }
}
