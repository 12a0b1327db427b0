//! Report-text disease and vitals prediction.
//!
//! Keyword classification against a static condition table plus regex
//! vital-sign extraction. Deterministic, allocation-only, never fails.

pub mod conditions;
pub mod engine;
pub mod types;
pub mod vitals;

pub use conditions::*;
pub use engine::*;
pub use types::*;
pub use vitals::*;
