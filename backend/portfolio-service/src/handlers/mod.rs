pub mod admin;
pub mod auth;
pub mod companies;
pub mod deals;
pub mod founder;
pub mod leads;
pub mod meetings;
pub mod notes;

pub use admin::*;
pub use auth::*;
pub use companies::*;
pub use deals::*;
pub use founder::*;
pub use leads::*;
pub use meetings::*;
pub use notes::*;

/// Cap page sizes requested by clients.
pub(crate) fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, 200)
}
