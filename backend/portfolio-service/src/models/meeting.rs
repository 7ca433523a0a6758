use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Scheduled meeting, optionally tied to a portfolio company.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meeting {
    pub id: Uuid,
    pub title: String,
    pub company_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    pub location: Option<String>,
    pub created_by: Uuid,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meeting {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled_at.is_some()
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateMeetingRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub company_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
}

/// Upcoming-window query; defaults to the next 14 days.
#[derive(Debug, Deserialize)]
pub struct MeetingQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub company_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}
