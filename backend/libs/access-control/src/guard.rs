//! Route guard: gates an entire route scope behind an access decision.
//!
//! The guard is the only place credentials are resolved into a
//! [`SessionState`]. For every request it renders exactly one of four
//! outcomes: pending, redirect-to-login, visible denial, or the wrapped
//! service. A resolver failure is treated as unauthenticated — the guard
//! fails closed, it never falls through to the handler.

use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    http::header,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::GuardError;
use crate::policy::{can_access, DenyReason, OwnershipRequirement};
use crate::session::{CurrentUser, Role, SessionError, SessionResolver, SessionState};

/// Access requirement attached to a route scope.
///
/// Declared by the route author at registration time, never derived at
/// runtime. `owner_param` names the path parameter that carries the
/// resource owner (company) id when ownership is required.
#[derive(Debug, Clone)]
pub struct RouteRequirement {
    allowed_roles: Vec<Role>,
    owner_param: Option<&'static str>,
}

impl RouteRequirement {
    pub fn roles(allowed_roles: impl Into<Vec<Role>>) -> Self {
        Self {
            allowed_roles: allowed_roles.into(),
            owner_param: None,
        }
    }

    /// Additionally require that the session's company affiliation equals
    /// the id found in the named path parameter.
    pub fn with_owner_param(mut self, param: &'static str) -> Self {
        self.owner_param = Some(param);
        self
    }

    pub fn allowed_roles(&self) -> &[Role] {
        &self.allowed_roles
    }

    pub fn owner_param(&self) -> Option<&'static str> {
        self.owner_param
    }
}

/// The four mutually exclusive guard outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Session still resolving: render the neutral waiting state, never
    /// the denial and never the protected content.
    Pending,
    /// No session: go to login, preserving the requested path.
    RedirectToLogin { next: String },
    /// Authenticated but not allowed: visible denial.
    Denied { reason: DenyReason },
    /// Allowed: run the wrapped service.
    Allow,
}

/// Pure decision function behind the middleware: for any combination of
/// inputs it returns exactly one outcome.
pub fn decide(
    session: &SessionState,
    requirement: &RouteRequirement,
    resource_owner: Option<Uuid>,
    requested_path: &str,
) -> GuardOutcome {
    match session {
        SessionState::Resolving => GuardOutcome::Pending,
        SessionState::Anonymous => GuardOutcome::RedirectToLogin {
            next: requested_path.to_string(),
        },
        SessionState::Authenticated(_) => {
            let ownership = requirement
                .owner_param()
                .map(|_| OwnershipRequirement { resource_owner });
            let decision = can_access(session, requirement.allowed_roles(), ownership.as_ref());
            if decision.is_allowed() {
                GuardOutcome::Allow
            } else {
                GuardOutcome::Denied {
                    reason: decision.reason.unwrap_or(DenyReason::RoleNotAllowed),
                }
            }
        }
    }
}

/// Actix middleware enforcing a [`RouteRequirement`] on a scope.
pub struct RouteGuard {
    requirement: Rc<RouteRequirement>,
    resolver: Arc<dyn SessionResolver>,
    login_path: Rc<String>,
}

impl RouteGuard {
    pub fn new(resolver: Arc<dyn SessionResolver>, requirement: RouteRequirement) -> Self {
        Self {
            requirement: Rc::new(requirement),
            resolver,
            login_path: Rc::new("/login".to_string()),
        }
    }

    /// Override the login entry point unauthenticated clients are sent to.
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = Rc::new(path.into());
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RouteGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RouteGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RouteGuardService {
            service: Rc::new(service),
            requirement: self.requirement.clone(),
            resolver: self.resolver.clone(),
            login_path: self.login_path.clone(),
        }))
    }
}

pub struct RouteGuardService<S> {
    service: Rc<S>,
    requirement: Rc<RouteRequirement>,
    resolver: Arc<dyn SessionResolver>,
    login_path: Rc<String>,
}

impl<S, B> Service<ServiceRequest> for RouteGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let requirement = self.requirement.clone();
        let resolver = self.resolver.clone();
        let login_path = self.login_path.clone();

        Box::pin(async move {
            let session = resolve_session(&req, resolver.as_ref()).await;

            // Ownership owner id comes from the URL; anything missing or
            // malformed stays None and therefore denies.
            let resource_owner = requirement.owner_param().and_then(|name| {
                req.match_info()
                    .get(name)
                    .and_then(|raw| Uuid::parse_str(raw).ok())
            });

            let requested = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| req.path().to_string());

            match decide(&session, &requirement, resource_owner, &requested) {
                GuardOutcome::Pending => Err(GuardError::SessionPending.into()),
                GuardOutcome::RedirectToLogin { next } => {
                    Err(GuardError::AuthenticationRequired {
                        location: format!("{}?next={}", login_path, urlencoding::encode(&next)),
                    }
                    .into())
                }
                GuardOutcome::Denied { reason } => Err(GuardError::AccessDenied { reason }.into()),
                GuardOutcome::Allow => {
                    if let SessionState::Authenticated(user) = &session {
                        req.extensions_mut().insert(user.clone());
                    }
                    req.extensions_mut().insert(session);
                    service.call(req).await
                }
            }
        })
    }
}

/// Resolve the request's bearer token into a session state.
///
/// Every failure mode lands on `Anonymous`: missing/malformed header,
/// invalid or expired token, a refresh token presented as access, and
/// resolver errors (which are logged — they are operational incidents,
/// but must still fail closed).
async fn resolve_session(req: &ServiceRequest, resolver: &dyn SessionResolver) -> SessionState {
    let token = match bearer_token(req) {
        Some(token) => token,
        None => return SessionState::Anonymous,
    };

    let claims = match crypto_core::jwt::validate_token(&token) {
        Ok(data) => data.claims,
        Err(err) => {
            tracing::debug!("token validation failed: {}", err);
            return SessionState::Anonymous;
        }
    };

    if claims.token_type != "access" {
        tracing::debug!("non-access token presented to route guard");
        return SessionState::Anonymous;
    }

    let (user_id, session_id) =
        match (Uuid::parse_str(&claims.sub), Uuid::parse_str(&claims.sid)) {
            (Ok(user_id), Ok(session_id)) => (user_id, session_id),
            _ => return SessionState::Anonymous,
        };

    match resolver.resolve(user_id, session_id).await {
        Ok(user) => SessionState::Authenticated(user),
        Err(SessionError::Unauthenticated) => SessionState::Anonymous,
        Err(SessionError::Backend(reason)) => {
            tracing::error!(
                %user_id,
                "session resolution failed, treating as unauthenticated: {}",
                reason
            );
            SessionState::Anonymous
        }
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.to_string())
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CurrentUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("User not authenticated")),
        )
    }
}

impl FromRequest for SessionState {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        // Outside a guarded scope nothing has resolved the session, so the
        // caller sees the pending state, which satisfies no check.
        ready(Ok(req
            .extensions()
            .get::<SessionState>()
            .cloned()
            .unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn resolving_session_is_pending_not_denied() {
        let requirement = RouteRequirement::roles([Role::Admin]);
        let outcome = decide(&SessionState::Resolving, &requirement, None, "/admin/users");
        assert_eq!(outcome, GuardOutcome::Pending);
    }

    #[test]
    fn anonymous_session_redirects_preserving_the_requested_path() {
        let requirement = RouteRequirement::roles([Role::Founder]);
        let outcome = decide(
            &SessionState::Anonymous,
            &requirement,
            None,
            "/my/42?tab=metrics",
        );
        assert_eq!(
            outcome,
            GuardOutcome::RedirectToLogin {
                next: "/my/42?tab=metrics".to_string()
            }
        );
    }

    #[test]
    fn wrong_owner_is_denied() {
        let company = Uuid::new_v4();
        let other = Uuid::new_v4();
        let session = authenticated(Role::Founder, Some(company));
        let requirement =
            RouteRequirement::roles([Role::Founder]).with_owner_param("company_id");

        let outcome = decide(&session, &requirement, Some(other), "/my/other");
        assert_eq!(
            outcome,
            GuardOutcome::Denied {
                reason: DenyReason::NotResourceOwner
            }
        );
    }

    #[test]
    fn empty_role_set_denies_even_admin() {
        let session = authenticated(Role::Admin, None);
        let requirement = RouteRequirement::roles(Vec::new());

        let outcome = decide(&session, &requirement, None, "/anything");
        assert_eq!(
            outcome,
            GuardOutcome::Denied {
                reason: DenyReason::RoleNotAllowed
            }
        );
    }

    #[test]
    fn partner_in_allowed_set_is_let_through() {
        let session = authenticated(Role::Partner, None);
        let requirement = RouteRequirement::roles([Role::Admin, Role::Partner]);

        let outcome = decide(&session, &requirement, None, "/deals");
        assert_eq!(outcome, GuardOutcome::Allow);
    }

    #[test]
    fn matching_owner_is_let_through() {
        let company = Uuid::new_v4();
        let session = authenticated(Role::Founder, Some(company));
        let requirement =
            RouteRequirement::roles([Role::Founder]).with_owner_param("company_id");

        let outcome = decide(&session, &requirement, Some(company), "/my/own");
        assert_eq!(outcome, GuardOutcome::Allow);
    }

    #[test]
    fn missing_owner_id_denies_when_ownership_is_required() {
        let session = authenticated(Role::Founder, Some(Uuid::new_v4()));
        let requirement =
            RouteRequirement::roles([Role::Founder]).with_owner_param("company_id");

        let outcome = decide(&session, &requirement, None, "/my/unknown");
        assert_eq!(
            outcome,
            GuardOutcome::Denied {
                reason: DenyReason::NotResourceOwner
            }
        );
    }

    #[test]
    fn every_input_combination_yields_exactly_one_outcome() {
        // decide() is total by type; pin down that the variant picked for
        // each session state is the intended one across the role grid.
        let company = Uuid::new_v4();
        let requirements = [
            RouteRequirement::roles(Vec::new()),
            RouteRequirement::roles([Role::Admin]),
            RouteRequirement::roles([Role::Admin, Role::Partner]),
            RouteRequirement::roles([Role::Founder]).with_owner_param("company_id"),
        ];

        for requirement in &requirements {
            for owner in [None, Some(company)] {
                let outcome =
                    decide(&SessionState::Resolving, requirement, owner, "/p");
                assert_eq!(outcome, GuardOutcome::Pending);

                let outcome =
                    decide(&SessionState::Anonymous, requirement, owner, "/p");
                assert!(matches!(outcome, GuardOutcome::RedirectToLogin { .. }));

                for role in Role::ALL {
                    let session = authenticated(role, Some(company));
                    let outcome = decide(&session, requirement, owner, "/p");
                    assert!(matches!(
                        outcome,
                        GuardOutcome::Allow | GuardOutcome::Denied { .. }
                    ));
                }
            }
        }
    }
}
