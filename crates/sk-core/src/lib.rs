//! sk-core: stable foundation for stancekit.
//!
//! Contains:
//! - numeric (Real + float checks + bounds)
//! - ids (compact IDs for bodies, joints and obstacles)
//! - side (closed left/right key domain)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod side;

// Re-exports: nice ergonomics for downstream crates
pub use error::{SkError, SkResult};
pub use ids::*;
pub use numeric::*;
pub use side::{Side, Sided};
