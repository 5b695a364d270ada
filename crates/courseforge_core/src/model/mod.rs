//! Domain model for multi-page visual documents.
//!
//! # Responsibility
//! - Define the persisted document/page/element shapes.
//! - Define the ephemeral generation inputs and outline drafts.
//!
//! # Invariants
//! - Structural edits return new `Document` values and never reorder
//!   unrelated pages or elements.
//! - Field names and enum values serialize to the stored camelCase layout.

pub mod document;
pub mod outline;
