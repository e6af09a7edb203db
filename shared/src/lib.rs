//! Shared types for the alumni registration service
//!
//! Error codes, the JSON error contract and the member model used by
//! `alumni-server` and its tests.

pub mod error;
pub mod models;
pub mod util;
