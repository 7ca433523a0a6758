use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Free-form note attached to a company and/or a deal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: Uuid,
    pub author_id: Uuid,
    pub company_id: Option<Uuid>,
    pub deal_id: Option<Uuid>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateNoteRequest {
    pub company_id: Option<Uuid>,
    pub deal_id: Option<Uuid>,
    #[validate(length(min = 1, max = 16000))]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateNoteRequest {
    #[validate(length(min = 1, max = 16000))]
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct NoteQuery {
    pub company_id: Option<Uuid>,
    pub deal_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}
