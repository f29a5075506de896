//! Utterance segmentation for the fallback summarizer path.
//!
//! # Responsibility
//! - Split a raw utterance into short, cleaned entries.
//! - Provide the summarizer seam and the local fallback implementation.
//!
//! # See also
//! - `merge::prepare` for how summarizer output enters the merge engine.

pub mod bullets;
pub mod fallback;
