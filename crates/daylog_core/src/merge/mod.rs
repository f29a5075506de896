//! Date-indexed merge of new entries into the journal document.
//!
//! # Responsibility
//! - Normalize summarizer groups into canonical merge instructions.
//! - Report which incoming dates collide with existing sections.
//! - Append or selectively overwrite section content.
//!
//! # Invariants
//! - Every operation is pure and synchronous over its inputs.
//! - A failed operation never returns a partially mutated document.

pub mod conflict;
pub mod engine;
pub mod prepare;
