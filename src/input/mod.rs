//! Input simulation module
//!
//! The nudge primitive trait, its fail-safe guard, and the pointer-backed
//! production implementation.

pub mod nudge;
pub mod pointer;

// Re-export main types
pub use nudge::{FailSafeGuard, Nudger};
pub use pointer::{PointerNudger, PointerTracker};

#[cfg(test)]
pub(crate) use nudge::testing;
