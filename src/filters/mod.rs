//! Constraint filters applied to a normalized catalog.
//!
//! The pipeline runs them in a fixed order: environment, purpose
//! requirements, then cost. Each stage only narrows its input.

pub mod cost;
pub mod environment;
pub mod requirements;

pub use cost::{Candidate, CostLimits, filter_by_cost};
pub use environment::filter_by_environment;
pub use requirements::filter_by_requirements;
