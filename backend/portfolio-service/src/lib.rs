//! Portfolio service: the HTTP API behind the Vantage operations
//! dashboard. Companies, deals, fundraising leads, meetings, notes, and
//! admin user management, gated by the shared access-control layer.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod permissions;
pub mod security;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
