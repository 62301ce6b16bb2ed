//! The evaluation pipeline: eligibility, calculation, stacking, and the
//! orchestrating engine.

mod apply;
pub mod calculator;
pub mod eligibility;
pub mod stacking;

pub use apply::PromoEngine;
pub use calculator::compute_discount;
pub use eligibility::{evaluate, Eligibility};
pub use stacking::{resolve, StackingOutcome, StackingPolicy};
