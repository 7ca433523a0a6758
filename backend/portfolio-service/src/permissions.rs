/// Resource-level permission checks applied inside handlers, after the
/// route guard has admitted the request. These cover per-record rules the
/// route scope cannot express: authorship of notes and meetings.
use access_control::{CurrentUser, Role};

use crate::error::AppError;
use crate::models::{Meeting, Note};

/// Result type for permission checks
pub type PermissionResult = std::result::Result<(), AppError>;

/// Only the author may edit a note; admins may also remove it.
pub fn check_note_author(user: &CurrentUser, note: &Note) -> PermissionResult {
    if note.author_id == user.user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "only the author can modify this note".to_string(),
        ))
    }
}

/// Authors and admins may delete a note.
pub fn check_note_removal(user: &CurrentUser, note: &Note) -> PermissionResult {
    if note.author_id == user.user_id || user.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "only the author or an admin can delete this note".to_string(),
        ))
    }
}

/// Organizers and admins may cancel a meeting.
pub fn check_meeting_cancellation(user: &CurrentUser, meeting: &Meeting) -> PermissionResult {
    if meeting.created_by == user.user_id || user.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "only the organizer or an admin can cancel this meeting".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            user_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            email: "someone@vantage.dev".into(),
            full_name: "Someone".into(),
            role,
            company_id: None,
        }
    }

    fn note(author_id: Uuid) -> Note {
        Note {
            id: Uuid::new_v4(),
            author_id,
            company_id: None,
            deal_id: None,
            body: "met the team, strong technical bench".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn only_the_author_edits_a_note() {
        let author = user(Role::Partner);
        let other = user(Role::Partner);
        let admin = user(Role::Admin);
        let n = note(author.user_id);

        assert!(check_note_author(&author, &n).is_ok());
        assert!(check_note_author(&other, &n).is_err());
        // Editing is author-only even for admins; removal is broader.
        assert!(check_note_author(&admin, &n).is_err());
        assert!(check_note_removal(&admin, &n).is_ok());
        assert!(check_note_removal(&other, &n).is_err());
    }

    #[test]
    fn organizer_or_admin_cancels_a_meeting() {
        let organizer = user(Role::Partner);
        let other = user(Role::Partner);
        let admin = user(Role::Admin);
        let meeting = Meeting {
            id: Uuid::new_v4(),
            title: "Q3 board prep".into(),
            company_id: None,
            scheduled_at: Utc::now(),
            location: None,
            created_by: organizer.user_id,
            cancelled_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(check_meeting_cancellation(&organizer, &meeting).is_ok());
        assert!(check_meeting_cancellation(&admin, &meeting).is_ok());
        assert!(check_meeting_cancellation(&other, &meeting).is_err());
    }
}
