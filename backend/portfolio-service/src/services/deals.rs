/// Deal pipeline rules: stage-transition legality and economics
/// redaction.
use access_control::{has_permission, Permission, SessionState};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, Result};
use crate::models::deal::DealResponse;
use crate::models::{Deal, DealStage};

/// Render a deal for the given session, dropping economics unless the
/// caller holds the sensitive-data permission.
pub fn deal_response(deal: Deal, session: &SessionState) -> DealResponse {
    DealResponse::from_deal(deal, has_permission(session, Permission::ViewSensitive))
}

/// Validate a pipeline move against the stage machine.
pub fn validate_transition(deal: &Deal, next: DealStage) -> Result<()> {
    if deal.stage.can_transition_to(next) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "illegal stage move {} -> {}",
            deal.stage, next
        )))
    }
}

/// Load, validate, and apply a stage move.
pub async fn move_stage(pool: &PgPool, deal_id: Uuid, next: DealStage) -> Result<Deal> {
    let deal = db::deals::find_by_id(pool, deal_id)
        .await?
        .ok_or_else(|| AppError::NotFound("deal".to_string()))?;

    validate_transition(&deal, next)?;

    let updated = db::deals::update_stage(pool, deal_id, next)
        .await?
        .ok_or_else(|| AppError::NotFound("deal".to_string()))?;

    tracing::info!(%deal_id, from = %deal.stage, to = %next, "deal stage updated");

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use access_control::{CurrentUser, Role};
    use chrono::Utc;

    fn deal(stage: DealStage) -> Deal {
        Deal {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            round_name: "Series B".into(),
            stage,
            amount_usd: Some(10_000_000),
            valuation_usd: Some(80_000_000),
            lead_partner_id: None,
            expected_close: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn session(role: Role) -> SessionState {
        SessionState::Authenticated(CurrentUser {
            user_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            email: format!("{}@vantage.dev", role.as_str()),
            full_name: "Test User".into(),
            role,
            company_id: None,
        })
    }

    #[test]
    fn partners_see_economics_founders_do_not() {
        let partner_view = deal_response(deal(DealStage::Diligence), &session(Role::Partner));
        assert_eq!(partner_view.amount_usd, Some(10_000_000));

        let founder_view = deal_response(deal(DealStage::Diligence), &session(Role::Founder));
        assert_eq!(founder_view.amount_usd, None);
        assert_eq!(founder_view.valuation_usd, None);

        let anonymous_view = deal_response(deal(DealStage::Diligence), &SessionState::Anonymous);
        assert_eq!(anonymous_view.amount_usd, None);
    }

    #[test]
    fn closed_deals_cannot_move() {
        let closed = deal(DealStage::Closed);
        assert!(validate_transition(&closed, DealStage::Diligence).is_err());
        assert!(validate_transition(&closed, DealStage::Passed).is_err());
    }

    #[test]
    fn stage_skips_are_rejected_with_bad_request() {
        let sourced = deal(DealStage::Sourced);
        let err = validate_transition(&sourced, DealStage::TermSheet).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
