//! bs-core: shared foundation for backstep.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact IDs for fields and degrees of freedom)
//! - error (shared error types)
//! - timing (opt-in wall-clock instrumentation)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
