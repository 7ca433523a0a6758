/// Meeting endpoints.
use access_control::CurrentUser;
use actix_web::{web, HttpResponse};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db;
use crate::error::{AppError, Result};
use crate::handlers::clamp_limit;
use crate::models::meeting::{CreateMeetingRequest, MeetingQuery};
use crate::permissions::check_meeting_cancellation;

/// GET /api/v1/meetings — upcoming window, defaulting to the next 14 days.
pub async fn list_meetings(
    pool: web::Data<PgPool>,
    query: web::Query<MeetingQuery>,
) -> Result<HttpResponse> {
    let from = query.from.unwrap_or_else(Utc::now);
    let to = query.to.unwrap_or_else(|| from + Duration::days(14));

    if to <= from {
        return Err(AppError::BadRequest(
            "meeting window end must be after its start".to_string(),
        ));
    }

    let meetings = db::meetings::list_between(
        &pool,
        from,
        to,
        query.company_id,
        clamp_limit(query.limit),
        query.offset.max(0),
    )
    .await?;

    Ok(HttpResponse::Ok().json(meetings))
}

/// POST /api/v1/meetings
pub async fn create_meeting(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    req: web::Json<CreateMeetingRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    if let Some(company_id) = req.company_id {
        if db::companies::find_by_id(&pool, company_id).await?.is_none() {
            return Err(AppError::BadRequest("unknown company".to_string()));
        }
    }

    let meeting = db::meetings::insert(
        &pool,
        &req.title,
        req.company_id,
        req.scheduled_at,
        req.location.as_deref(),
        user.user_id,
    )
    .await?;

    Ok(HttpResponse::Created().json(meeting))
}

/// DELETE /api/v1/meetings/{meeting_id} — cancellation, organizer or admin.
pub async fn cancel_meeting(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    meeting_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let meeting = db::meetings::find_by_id(&pool, *meeting_id)
        .await?
        .ok_or_else(|| AppError::NotFound("meeting".to_string()))?;

    check_meeting_cancellation(&user, &meeting)?;

    if db::meetings::cancel(&pool, *meeting_id).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::Conflict("meeting is already cancelled".to_string()))
    }
}
