//! Access control for Vantage services.
//!
//! Single source of truth for authorization decisions: the session model
//! (who is the current user and are we sure yet), the pure policy
//! evaluator (role, ownership, and permission checks), and the route
//! guard middleware that gates whole scopes behind those decisions.
//!
//! Handlers and feature code must go through [`policy`] rather than
//! comparing role strings inline; the guard is the only component that
//! resolves credentials into a [`SessionState`].

pub mod error;
pub mod guard;
pub mod policy;
pub mod session;

pub use error::GuardError;
pub use guard::{decide, GuardOutcome, RouteGuard, RouteRequirement};
pub use policy::{
    can_access, has_ownership, has_permission, has_role, role_permissions, AccessDecision,
    DenyReason, OwnershipRequirement, Permission,
};
pub use session::{CurrentUser, Role, SessionError, SessionResolver, SessionState};
