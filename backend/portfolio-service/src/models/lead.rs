use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

/// Fundraising pipeline stage for an LP lead, matching the database
/// `lead_stage` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "lead_stage", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadStage {
    Identified,
    Contacted,
    Meeting,
    Committed,
    Declined,
}

impl LeadStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStage::Identified => "identified",
            LeadStage::Contacted => "contacted",
            LeadStage::Meeting => "meeting",
            LeadStage::Committed => "committed",
            LeadStage::Declined => "declined",
        }
    }
}

/// Fundraising lead (prospective LP)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub firm_name: String,
    pub contact_name: String,
    pub contact_email: Option<String>,
    pub stage: LeadStage,
    /// Target commitment, whole USD
    pub target_amount_usd: Option<i64>,
    /// Partner responsible for the relationship
    pub owner_id: Option<Uuid>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateLeadRequest {
    #[validate(length(min = 1, max = 200))]
    pub firm_name: String,
    #[validate(length(min = 1, max = 128))]
    pub contact_name: String,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(range(min = 0))]
    pub target_amount_usd: Option<i64>,
    pub owner_id: Option<Uuid>,
    #[validate(length(max = 4000))]
    pub summary: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateLeadRequest {
    #[validate(length(min = 1, max = 200))]
    pub firm_name: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub contact_name: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    pub stage: Option<LeadStage>,
    #[validate(range(min = 0))]
    pub target_amount_usd: Option<i64>,
    pub owner_id: Option<Uuid>,
    #[validate(length(max = 4000))]
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LeadQuery {
    pub stage: Option<LeadStage>,
    pub owner_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_validates_contact_email() {
        let bad = CreateLeadRequest {
            firm_name: "Granite LP".into(),
            contact_name: "Pat Doe".into(),
            contact_email: Some("nope".into()),
            target_amount_usd: Some(5_000_000),
            owner_id: None,
            summary: None,
        };
        assert!(bad.validate().is_err());

        let ok = CreateLeadRequest {
            contact_email: Some("pat@granite.example".into()),
            ..bad
        };
        assert!(ok.validate().is_ok());
    }
}
