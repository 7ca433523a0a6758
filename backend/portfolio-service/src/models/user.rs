use access_control::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// User model - core identity entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    /// Company affiliation; set for founders, absent for fund-side users
    pub company_id: Option<Uuid>,
    pub email_verified: bool,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Check if the account is currently locked out
    pub fn is_locked(&self) -> bool {
        if let Some(locked_until) = self.locked_until {
            locked_until > Utc::now()
        } else {
            false
        }
    }

    /// Check if the account is deactivated (soft-deleted)
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Login request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 256))]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Admin request to provision a user
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub full_name: String,
    pub role: Role,
    /// Required when role is founder; the company the account belongs to
    pub company_id: Option<Uuid>,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Admin request to change a user's role
#[derive(Debug, Deserialize)]
pub struct UpdateUserRoleRequest {
    pub role: Role,
    pub company_id: Option<Uuid>,
}

/// User as returned by the API (no credential material)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
    pub email_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub deactivated: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let deactivated = user.is_deleted();
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            company_id: user.company_id,
            email_verified: user.email_verified,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            deactivated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: "gp@vantage.dev".into(),
            password_hash: "$argon2id$stub".into(),
            full_name: "General Partner".into(),
            role,
            company_id: None,
            email_verified: true,
            failed_login_attempts: 0,
            locked_until: None,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn lockout_window_is_respected() {
        let mut u = user(Role::Partner);
        assert!(!u.is_locked());

        u.locked_until = Some(Utc::now() + chrono::Duration::minutes(5));
        assert!(u.is_locked());

        u.locked_until = Some(Utc::now() - chrono::Duration::minutes(5));
        assert!(!u.is_locked());
    }

    #[test]
    fn login_request_validates_shape() {
        let ok = LoginRequest {
            email: "gp@vantage.dev".into(),
            password: "hunter2hunter2".into(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = LoginRequest {
            email: "not-an-email".into(),
            password: "hunter2hunter2".into(),
        };
        assert!(bad_email.validate().is_err());

        let empty_password = LoginRequest {
            email: "gp@vantage.dev".into(),
            password: "".into(),
        };
        assert!(empty_password.validate().is_err());
    }

    #[test]
    fn response_never_carries_the_password_hash() {
        let response = UserResponse::from(user(Role::Admin));
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }
}
