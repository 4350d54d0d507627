//! Priority weighting and weighted-sum ranking.
//!
//! [`weights`] turns slider-style importance scores into a normalized weight
//! vector; [`wsm`] applies those weights to the surviving candidates.

pub mod weights;
pub mod wsm;

pub use weights::{PriorityInput, WeightVector, derive_weights};
pub use wsm::{RankedDrone, rank};
