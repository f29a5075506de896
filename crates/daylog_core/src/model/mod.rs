//! Journal domain model.
//!
//! # Responsibility
//! - Define the canonical date key used to identify journal sections.
//! - Provide a loss-less parse/serialize pair for the flat journal text.
//! - Define phrase/entry groups exchanged with summarizers and the merge engine.
//!
//! # Invariants
//! - The flat text is the only source of truth; the parsed model is rebuilt
//!   per operation and never persisted on its own.
//! - `Document::parse(text).serialize() == text` for every input.

pub mod date_key;
pub mod document;
pub mod phrase_group;
