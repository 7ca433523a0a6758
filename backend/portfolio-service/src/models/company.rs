use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Portfolio company
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub sector: Option<String>,
    /// Funding stage label (pre_seed, seed, series_a, ...)
    pub stage: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub founded_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Monthly operating metrics submitted by the founder (or recorded by the
/// capital team on their behalf).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyMetric {
    pub id: Uuid,
    pub company_id: Uuid,
    /// First day of the month the figures cover
    pub period: NaiveDate,
    pub revenue_usd: i64,
    pub burn_usd: i64,
    pub runway_months: i32,
    pub headcount: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 100))]
    pub sector: Option<String>,
    #[validate(length(max = 50))]
    pub stage: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    pub founded_on: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub sector: Option<String>,
    #[validate(length(max = 50))]
    pub stage: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    pub founded_on: Option<NaiveDate>,
}

/// Founder-editable profile fields; a founder cannot rename or restage
/// their company record.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateCompanyProfileRequest {
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompanyQuery {
    pub sector: Option<String>,
    pub stage: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SubmitMetricRequest {
    pub period: NaiveDate,
    #[validate(range(min = 0))]
    pub revenue_usd: i64,
    #[validate(range(min = 0))]
    pub burn_usd: i64,
    #[validate(range(min = 0, max = 600))]
    pub runway_months: i32,
    #[validate(range(min = 0, max = 1_000_000))]
    pub headcount: i32,
}

fn default_limit() -> i64 {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_rejects_bad_urls_and_empty_names() {
        let bad_url = CreateCompanyRequest {
            name: "Loopwire".into(),
            sector: None,
            stage: None,
            website: Some("not a url".into()),
            description: None,
            founded_on: None,
        };
        assert!(bad_url.validate().is_err());

        let empty_name = CreateCompanyRequest {
            name: "".into(),
            sector: None,
            stage: None,
            website: None,
            description: None,
            founded_on: None,
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn metric_request_rejects_negative_figures() {
        let negative = SubmitMetricRequest {
            period: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            revenue_usd: -1,
            burn_usd: 100_000,
            runway_months: 18,
            headcount: 12,
        };
        assert!(negative.validate().is_err());
    }
}
