//! Pure authorization decisions.
//!
//! Every function here is side-effect free and evaluates against the live
//! session it is handed; decisions are never cached across calls, so they
//! cannot go stale relative to the session they were computed from.

use serde::Serialize;
use uuid::Uuid;

use crate::session::{Role, SessionState};

/// Coarse capabilities mapped from roles via a fixed table.
///
/// Used to toggle individual fields and actions inside a route that the
/// guard has already admitted — deal economics redaction, in-handler
/// admin checks — rather than to gate whole routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewPortfolio,
    ViewSensitive,
    ManageDeals,
    ManageUsers,
    ManageCompany,
}

/// The fixed role -> permission-set table. Closed: roles grant exactly
/// what is listed here and nothing else.
pub fn role_permissions(role: Role) -> &'static [Permission] {
    match role {
        Role::Admin => &[
            Permission::ViewPortfolio,
            Permission::ViewSensitive,
            Permission::ManageDeals,
            Permission::ManageUsers,
            Permission::ManageCompany,
        ],
        Role::Partner => &[
            Permission::ViewPortfolio,
            Permission::ViewSensitive,
            Permission::ManageDeals,
        ],
        Role::Founder => &[Permission::ManageCompany],
    }
}

/// Why an access decision came back negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    SessionPending,
    NotAuthenticated,
    RoleNotAllowed,
    NotResourceOwner,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::SessionPending => "session_pending",
            DenyReason::NotAuthenticated => "not_authenticated",
            DenyReason::RoleNotAllowed => "role_not_allowed",
            DenyReason::NotResourceOwner => "not_resource_owner",
        }
    }
}

/// Outcome of [`can_access`]: a fresh, per-call decision with the reason
/// attached when access is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: Option<DenyReason>,
}

impl AccessDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: DenyReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }
}

/// Declares that, beyond role membership, the session's company
/// affiliation must equal the resource owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipRequirement {
    /// Owner of the resource being accessed, typically a company id taken
    /// from the request path. `None` (owner unknown) must deny.
    pub resource_owner: Option<Uuid>,
}

/// True iff the session is authenticated and its role is in
/// `allowed_roles`.
///
/// Fails closed: `Resolving` and `Anonymous` sessions never satisfy any
/// role set, and an empty role set denies everyone, including admins.
pub fn has_role(session: &SessionState, allowed_roles: &[Role]) -> bool {
    match session {
        SessionState::Authenticated(user) => allowed_roles.contains(&user.role),
        SessionState::Resolving | SessionState::Anonymous => false,
    }
}

/// True iff the session's company affiliation equals `resource_owner`.
///
/// A missing owner id — or a session without an affiliation — is false,
/// never true: unknown ownership must not grant access.
pub fn has_ownership(session: &SessionState, resource_owner: Option<Uuid>) -> bool {
    match (session.company_id(), resource_owner) {
        (Some(affiliation), Some(owner)) => affiliation == owner,
        _ => false,
    }
}

/// Conjunction of [`has_role`] and, when `ownership` is declared,
/// [`has_ownership`]. Never grants access when either sub-check fails.
pub fn can_access(
    session: &SessionState,
    allowed_roles: &[Role],
    ownership: Option<&OwnershipRequirement>,
) -> AccessDecision {
    match session {
        SessionState::Resolving => AccessDecision::deny(DenyReason::SessionPending),
        SessionState::Anonymous => AccessDecision::deny(DenyReason::NotAuthenticated),
        SessionState::Authenticated(_) => {
            if !has_role(session, allowed_roles) {
                return AccessDecision::deny(DenyReason::RoleNotAllowed);
            }
            match ownership {
                Some(requirement) if !has_ownership(session, requirement.resource_owner) => {
                    AccessDecision::deny(DenyReason::NotResourceOwner)
                }
                _ => AccessDecision::allow(),
            }
        }
    }
}

/// True iff the session is authenticated and its role grants
/// `permission` per the fixed table. Re-evaluates against the live
/// session on every call.
pub fn has_permission(session: &SessionState, permission: Permission) -> bool {
    match session {
        SessionState::Authenticated(user) => role_permissions(user.role).contains(&permission),
        SessionState::Resolving | SessionState::Anonymous => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CurrentUser;

    fn authenticated(role: Role, company_id: Option<Uuid>) -> SessionState {
        SessionState::Authenticated(CurrentUser {
            user_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            email: format!("{}@vantage.dev", role.as_str()),
            full_name: "Test User".into(),
            role,
            company_id,
        })
    }

    #[test]
    fn unresolved_sessions_never_satisfy_any_role_set() {
        for session in [SessionState::Resolving, SessionState::Anonymous] {
            assert!(!has_role(&session, &[Role::Admin]));
            assert!(!has_role(&session, &[Role::Partner, Role::Founder]));
            // Even the full role universe must not match.
            assert!(!has_role(&session, &Role::ALL));
        }
    }

    #[test]
    fn role_membership_is_exhaustive_over_the_role_universe() {
        for role in Role::ALL {
            let session = authenticated(role, None);
            for allowed in Role::ALL {
                assert_eq!(has_role(&session, &[allowed]), role == allowed);
            }
            assert!(has_role(&session, &Role::ALL));
        }
    }

    #[test]
    fn empty_role_set_denies_everyone_including_admin() {
        let admin = authenticated(Role::Admin, None);
        assert!(!has_role(&admin, &[]));
        assert!(!can_access(&admin, &[], None).is_allowed());
    }

    #[test]
    fn ownership_denies_on_missing_owner_regardless_of_session() {
        let sessions = [
            SessionState::Resolving,
            SessionState::Anonymous,
            authenticated(Role::Founder, Some(Uuid::new_v4())),
            authenticated(Role::Admin, None),
        ];
        for session in &sessions {
            assert!(!has_ownership(session, None));
        }
    }

    #[test]
    fn ownership_is_affiliation_equality() {
        let company = Uuid::new_v4();
        let founder = authenticated(Role::Founder, Some(company));

        assert!(has_ownership(&founder, Some(company)));
        assert!(!has_ownership(&founder, Some(Uuid::new_v4())));

        // No affiliation on the session: never an owner.
        let unaffiliated = authenticated(Role::Founder, None);
        assert!(!has_ownership(&unaffiliated, Some(company)));
    }

    #[test]
    fn can_access_is_the_conjunction_of_role_and_ownership() {
        let company = Uuid::new_v4();
        let other = Uuid::new_v4();
        let founder = authenticated(Role::Founder, Some(company));

        let owns = OwnershipRequirement {
            resource_owner: Some(company),
        };
        let does_not_own = OwnershipRequirement {
            resource_owner: Some(other),
        };
        let owner_unknown = OwnershipRequirement {
            resource_owner: None,
        };

        // Role ok, no ownership requirement declared.
        assert!(can_access(&founder, &[Role::Founder], None).is_allowed());

        // Role ok + ownership ok.
        assert!(can_access(&founder, &[Role::Founder], Some(&owns)).is_allowed());

        // Role ok, ownership fails.
        let denied = can_access(&founder, &[Role::Founder], Some(&does_not_own));
        assert!(!denied.is_allowed());
        assert_eq!(denied.reason, Some(DenyReason::NotResourceOwner));

        // Role ok, owner unknown: still denied.
        let denied = can_access(&founder, &[Role::Founder], Some(&owner_unknown));
        assert_eq!(denied.reason, Some(DenyReason::NotResourceOwner));

        // Role fails: ownership is never even consulted.
        let denied = can_access(&founder, &[Role::Admin], Some(&owns));
        assert!(!denied.is_allowed());
        assert_eq!(denied.reason, Some(DenyReason::RoleNotAllowed));
    }

    #[test]
    fn can_access_reports_session_state_in_the_reason() {
        let decision = can_access(&SessionState::Resolving, &Role::ALL, None);
        assert_eq!(decision.reason, Some(DenyReason::SessionPending));

        let decision = can_access(&SessionState::Anonymous, &Role::ALL, None);
        assert_eq!(decision.reason, Some(DenyReason::NotAuthenticated));
    }

    #[test]
    fn permission_table_is_closed() {
        let expectations: [(Role, &[Permission]); 3] = [
            (
                Role::Admin,
                &[
                    Permission::ViewPortfolio,
                    Permission::ViewSensitive,
                    Permission::ManageDeals,
                    Permission::ManageUsers,
                    Permission::ManageCompany,
                ],
            ),
            (
                Role::Partner,
                &[
                    Permission::ViewPortfolio,
                    Permission::ViewSensitive,
                    Permission::ManageDeals,
                ],
            ),
            (Role::Founder, &[Permission::ManageCompany]),
        ];

        for (role, granted) in expectations {
            let session = authenticated(role, None);
            for permission in [
                Permission::ViewPortfolio,
                Permission::ViewSensitive,
                Permission::ManageDeals,
                Permission::ManageUsers,
                Permission::ManageCompany,
            ] {
                assert_eq!(
                    has_permission(&session, permission),
                    granted.contains(&permission),
                    "{role} / {permission:?}"
                );
            }
        }
    }

    #[test]
    fn permissions_fail_closed_for_unresolved_sessions() {
        for session in [SessionState::Resolving, SessionState::Anonymous] {
            assert!(!has_permission(&session, Permission::ViewPortfolio));
            assert!(!has_permission(&session, Permission::ManageUsers));
        }
    }
}
