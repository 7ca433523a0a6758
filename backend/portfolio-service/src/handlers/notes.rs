/// Note endpoints.
use access_control::CurrentUser;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db;
use crate::error::{AppError, Result};
use crate::handlers::clamp_limit;
use crate::models::note::{CreateNoteRequest, NoteQuery, UpdateNoteRequest};
use crate::permissions::{check_note_author, check_note_removal};

/// GET /api/v1/notes
pub async fn list_notes(
    pool: web::Data<PgPool>,
    query: web::Query<NoteQuery>,
) -> Result<HttpResponse> {
    let notes = db::notes::list(
        &pool,
        query.company_id,
        query.deal_id,
        clamp_limit(query.limit),
        query.offset.max(0),
    )
    .await?;

    Ok(HttpResponse::Ok().json(notes))
}

/// POST /api/v1/notes
pub async fn create_note(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    req: web::Json<CreateNoteRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    if req.company_id.is_none() && req.deal_id.is_none() {
        return Err(AppError::BadRequest(
            "a note must reference a company or a deal".to_string(),
        ));
    }

    let note = db::notes::insert(&pool, user.user_id, req.company_id, req.deal_id, &req.body)
        .await?;

    Ok(HttpResponse::Created().json(note))
}

/// PATCH /api/v1/notes/{note_id} — author only.
pub async fn update_note(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    note_id: web::Path<Uuid>,
    req: web::Json<UpdateNoteRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let note = db::notes::find_by_id(&pool, *note_id)
        .await?
        .ok_or_else(|| AppError::NotFound("note".to_string()))?;

    check_note_author(&user, &note)?;

    match db::notes::update_body(&pool, *note_id, &req.body).await? {
        Some(updated) => Ok(HttpResponse::Ok().json(updated)),
        None => Err(AppError::NotFound("note".to_string())),
    }
}

/// DELETE /api/v1/notes/{note_id} — author or admin.
pub async fn delete_note(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    note_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let note = db::notes::find_by_id(&pool, *note_id)
        .await?
        .ok_or_else(|| AppError::NotFound("note".to_string()))?;

    check_note_removal(&user, &note)?;

    db::notes::soft_delete(&pool, *note_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
