//! pf-core: stable foundation for plumeflow.
//!
//! Contains:
//! - schema (the fixed column layout of a simulator run)
//! - record (run records and the assembled dataset)
//! - units (uom SI types + constructors + plume constants)
//! - numeric (Real + rounding and statistics helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod record;
pub mod schema;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use record::{Dataset, RunRecord};
pub use schema::{Field, Schema};
pub use units::*;
