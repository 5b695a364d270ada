//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate generator and store calls into use-case level APIs
//!   (wizard, editor session, project list, export).
//! - Keep CLI/UI layers decoupled from storage and generation details.

pub mod editor_session;
pub mod export_service;
pub mod project_service;
pub mod wizard_service;
