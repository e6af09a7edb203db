//! Alumni association membership registration server
//!
//! A public form (`GET /`) submits multipart data to `POST /api/register`,
//! which validates it, rejects duplicate emails, ingests the optional photo
//! and stores one member record in SQLite.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod image;
pub mod registration;
pub mod state;
pub mod validation;

pub use config::Config;
pub use error::RegisterError;
pub use state::AppState;
