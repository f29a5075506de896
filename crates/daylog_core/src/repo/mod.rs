//! Persistence of the flat journal text.
//!
//! # Responsibility
//! - Load and save the whole document as one opaque blob under a fixed key.
//! - Isolate SQLite details from the service layer.
//!
//! # Invariants
//! - A missing blob loads as the empty document, not an error.
//! - Saves replace the whole blob in one statement; there are no partial writes.

pub mod document_repo;
