//! The three ways a maker's order stops being fillable: a per-order
//! remaining amount, a bit in a per-maker bitmap, and per-series nonces
//! orders can be bound to through their predicate or epoch check.

pub mod bit;
pub mod remaining;
pub mod series;

pub use remaining::RemainingInvalidator;
