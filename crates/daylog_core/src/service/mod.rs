//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, normalizer, and merge calls into use-case APIs.
//! - Keep CLI/UI layers decoupled from storage details.

pub mod journal_service;
