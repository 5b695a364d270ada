//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the project collection store contract used by services.
//! - Isolate SQLite and JSON encoding details from session orchestration.
//!
//! # Invariants
//! - The whole collection is written on every save.
//! - Unreadable stored data surfaces as `StoreError::CorruptState`.

pub mod memory_repo;
pub mod project_repo;
