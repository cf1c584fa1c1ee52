//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate collection repository calls into use-case level APIs.
//! - Keep FFI layers decoupled from document shapes and store keys.
//!
//! # Invariants
//! - Services borrow the store for one unit of work and never hold it.

pub mod client_service;
pub mod settings_service;
pub mod task_service;
pub mod team_seed;
pub mod template_service;
