//! Session model: roles, the resolved user, and the resolution seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;
use uuid::Uuid;

/// Platform roles, matching the database `user_role` enum.
///
/// The set is closed: there is no wildcard "any role", and callers that
/// want admins included must list them explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    /// Capital-team member. Historically also spelled `capital_team` on
    /// the wire; both parse to this variant.
    #[serde(alias = "capital_team")]
    Partner,
    Founder,
}

impl Role {
    /// Every role the platform knows about.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Partner, Role::Founder];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Partner => "partner",
            Role::Founder => "founder",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "partner" | "capital_team" => Some(Role::Partner),
            "founder" => Some(Role::Founder),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved identity behind a request.
///
/// Produced exclusively by a [`SessionResolver`]; everything downstream
/// reads it, nothing mutates it.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    /// Company affiliation; set for founders, absent for fund-side users.
    pub company_id: Option<Uuid>,
}

/// Authentication state of a request.
///
/// Lifecycle: `Resolving -> Authenticated | Anonymous`, and
/// `Authenticated -> Anonymous` on logout or token expiry/revocation.
/// `Resolving` is a first-class state: every permission check must treat
/// it as "not yet", never as "no" rendered to the user and never as
/// "yes".
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// Credentials are still being resolved. Also the default: a session
    /// nobody has resolved yet is "not sure yet", not "signed out".
    #[default]
    Resolving,
    /// No valid credentials.
    Anonymous,
    /// Credentials resolved to a live user profile.
    Authenticated(CurrentUser),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    pub fn company_id(&self) -> Option<Uuid> {
        self.user().and_then(|u| u.company_id)
    }
}

/// Why a session could not be resolved.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No live session for the presented credentials (expired, revoked,
    /// or the user is gone).
    #[error("not authenticated")]
    Unauthenticated,

    /// The profile lookup itself failed. Guards must treat this exactly
    /// like `Unauthenticated` — fail closed, never fail open.
    #[error("session backend unavailable: {0}")]
    Backend(String),
}

/// Resolves a validated token identity into a [`CurrentUser`].
///
/// The production implementation joins the user-profile row and checks
/// the session row is live; tests substitute stubs.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, user_id: Uuid, session_id: Uuid)
        -> Result<CurrentUser, SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_accepts_canonical_and_legacy_names() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("partner"), Some(Role::Partner));
        assert_eq!(Role::parse("capital_team"), Some(Role::Partner));
        assert_eq!(Role::parse("Founder"), Some(Role::Founder));
        assert_eq!(Role::parse("board_observer"), None);
    }

    #[test]
    fn role_serde_round_trip() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            let back: Role = serde_json::from_str(&json).unwrap();
            assert_eq!(role, back);
        }

        let legacy: Role = serde_json::from_str("\"capital_team\"").unwrap();
        assert_eq!(legacy, Role::Partner);
    }

    #[test]
    fn unresolved_default_is_pending_not_signed_out() {
        let session = SessionState::default();
        assert!(matches!(session, SessionState::Resolving));
        assert!(!session.is_authenticated());
        assert!(session.role().is_none());
    }

    #[test]
    fn session_state_accessors() {
        let anonymous = SessionState::Anonymous;
        assert!(!anonymous.is_authenticated());
        assert!(anonymous.user().is_none());
        assert!(anonymous.role().is_none());

        let company = Uuid::new_v4();
        let session = SessionState::Authenticated(CurrentUser {
            user_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            email: "founder@startup.io".into(),
            full_name: "Ada Founder".into(),
            role: Role::Founder,
            company_id: Some(company),
        });

        assert!(session.is_authenticated());
        assert_eq!(session.role(), Some(Role::Founder));
        assert_eq!(session.company_id(), Some(company));
    }
}
