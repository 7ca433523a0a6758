use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

/// Pipeline stage, matching the database `deal_stage` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "deal_stage", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DealStage {
    Sourced,
    Screening,
    Diligence,
    TermSheet,
    Closed,
    Passed,
}

impl DealStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::Sourced => "sourced",
            DealStage::Screening => "screening",
            DealStage::Diligence => "diligence",
            DealStage::TermSheet => "term_sheet",
            DealStage::Closed => "closed",
            DealStage::Passed => "passed",
        }
    }

    /// Terminal stages accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DealStage::Closed | DealStage::Passed)
    }

    /// Legal pipeline moves: one step forward, any step back to an
    /// earlier active stage, or out to a terminal stage. Terminal stages
    /// are final.
    pub fn can_transition_to(&self, next: DealStage) -> bool {
        if self.is_terminal() || *self == next {
            return false;
        }
        if next.is_terminal() {
            return true;
        }
        let order = |stage: DealStage| match stage {
            DealStage::Sourced => 0,
            DealStage::Screening => 1,
            DealStage::Diligence => 2,
            DealStage::TermSheet => 3,
            DealStage::Closed | DealStage::Passed => 4,
        };
        // Forward exactly one step, or backward any number of steps.
        order(next) == order(*self) + 1 || order(next) < order(*self)
    }
}

impl std::fmt::Display for DealStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deal record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Deal {
    pub id: Uuid,
    pub company_id: Uuid,
    /// Round label ("Seed", "Series A", ...)
    pub round_name: String,
    pub stage: DealStage,
    /// Proposed investment, whole USD
    pub amount_usd: Option<i64>,
    /// Pre-money valuation, whole USD
    pub valuation_usd: Option<i64>,
    pub lead_partner_id: Option<Uuid>,
    pub expected_close: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateDealRequest {
    pub company_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub round_name: String,
    #[validate(range(min = 0))]
    pub amount_usd: Option<i64>,
    #[validate(range(min = 0))]
    pub valuation_usd: Option<i64>,
    pub lead_partner_id: Option<Uuid>,
    pub expected_close: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateDealRequest {
    #[validate(length(min = 1, max = 100))]
    pub round_name: Option<String>,
    #[validate(range(min = 0))]
    pub amount_usd: Option<i64>,
    #[validate(range(min = 0))]
    pub valuation_usd: Option<i64>,
    pub lead_partner_id: Option<Uuid>,
    pub expected_close: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDealStageRequest {
    pub stage: DealStage,
}

#[derive(Debug, Deserialize)]
pub struct DealQuery {
    pub stage: Option<DealStage>,
    pub company_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Deal as returned by the API; economics are omitted for callers
/// without the sensitive-data permission.
#[derive(Debug, Serialize)]
pub struct DealResponse {
    pub id: Uuid,
    pub company_id: Uuid,
    pub round_name: String,
    pub stage: DealStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_usd: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valuation_usd: Option<i64>,
    pub lead_partner_id: Option<Uuid>,
    pub expected_close: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DealResponse {
    pub fn from_deal(deal: Deal, include_sensitive: bool) -> Self {
        Self {
            id: deal.id,
            company_id: deal.company_id,
            round_name: deal.round_name,
            stage: deal.stage,
            amount_usd: deal.amount_usd.filter(|_| include_sensitive),
            valuation_usd: deal.valuation_usd.filter(|_| include_sensitive),
            lead_partner_id: deal.lead_partner_id,
            expected_close: deal.expected_close,
            created_at: deal.created_at,
            updated_at: deal.updated_at,
        }
    }
}

fn default_limit() -> i64 {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_moves_one_step_forward() {
        assert!(DealStage::Sourced.can_transition_to(DealStage::Screening));
        assert!(DealStage::Screening.can_transition_to(DealStage::Diligence));
        assert!(DealStage::Diligence.can_transition_to(DealStage::TermSheet));
        assert!(DealStage::TermSheet.can_transition_to(DealStage::Closed));

        // Skipping ahead is not allowed.
        assert!(!DealStage::Sourced.can_transition_to(DealStage::TermSheet));
        assert!(!DealStage::Screening.can_transition_to(DealStage::TermSheet));
    }

    #[test]
    fn any_active_stage_can_pass_or_back_up() {
        for stage in [
            DealStage::Sourced,
            DealStage::Screening,
            DealStage::Diligence,
            DealStage::TermSheet,
        ] {
            assert!(stage.can_transition_to(DealStage::Passed), "{stage}");
        }

        assert!(DealStage::TermSheet.can_transition_to(DealStage::Diligence));
        assert!(DealStage::Diligence.can_transition_to(DealStage::Sourced));
    }

    #[test]
    fn terminal_stages_are_final() {
        for terminal in [DealStage::Closed, DealStage::Passed] {
            for next in [
                DealStage::Sourced,
                DealStage::Screening,
                DealStage::Diligence,
                DealStage::TermSheet,
                DealStage::Closed,
                DealStage::Passed,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn self_transitions_are_rejected() {
        assert!(!DealStage::Diligence.can_transition_to(DealStage::Diligence));
    }

    fn deal() -> Deal {
        Deal {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            round_name: "Series A".into(),
            stage: DealStage::Diligence,
            amount_usd: Some(4_000_000),
            valuation_usd: Some(28_000_000),
            lead_partner_id: None,
            expected_close: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn redacted_response_drops_economics() {
        let full = DealResponse::from_deal(deal(), true);
        assert_eq!(full.amount_usd, Some(4_000_000));
        assert_eq!(full.valuation_usd, Some(28_000_000));

        let redacted = DealResponse::from_deal(deal(), false);
        assert_eq!(redacted.amount_usd, None);
        assert_eq!(redacted.valuation_usd, None);

        let json = serde_json::to_string(&redacted).unwrap();
        assert!(!json.contains("amount_usd"));
        assert!(!json.contains("valuation_usd"));
    }
}
