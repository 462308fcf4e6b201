//! Intake and moderation of the Reciclativa professional directory.
//!
//! Public submissions are normalized, validated and stored as `pending` listings; an operator
//! holding the admin session secret approves or rejects them. Approved listings feed the
//! public directory projection.

pub mod config;
pub mod directory;
pub mod error;
pub mod telemetry;
