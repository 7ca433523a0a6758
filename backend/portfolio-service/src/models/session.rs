use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Server-side session row backing issued token pairs.
///
/// Tokens carry this row's id in their `sid` claim; revoking the row
/// invalidates every outstanding token for the session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub last_activity_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// A session is live iff it is neither revoked nor expired.
    pub fn is_live(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            last_activity_at: now,
            expires_at: now + chrono::Duration::days(30),
            revoked_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn fresh_session_is_live() {
        assert!(session().is_live());
    }

    #[test]
    fn revoked_or_expired_sessions_are_dead() {
        let mut revoked = session();
        revoked.revoked_at = Some(Utc::now());
        assert!(!revoked.is_live());

        let mut expired = session();
        expired.expires_at = Utc::now() - chrono::Duration::minutes(1);
        assert!(!expired.is_live());
    }
}
