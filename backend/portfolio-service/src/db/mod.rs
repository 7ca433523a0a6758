//! sqlx repositories: one module per aggregate, free functions over the
//! shared pool. All queries are runtime-checked `query_as` calls so the
//! crate builds without a live database.

pub mod companies;
pub mod deals;
pub mod leads;
pub mod meetings;
pub mod notes;
pub mod sessions;
pub mod users;
