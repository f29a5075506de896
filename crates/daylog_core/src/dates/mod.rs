//! Date expression normalization.
//!
//! # Responsibility
//! - Map spoken/generated date expressions onto canonical `M.D.YYYY` keys.
//! - Isolate "current date" reads behind a `Clock` so results are testable.

pub mod normalize;
