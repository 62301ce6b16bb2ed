//! Shared commerce primitives for the promo engine.
//!
//! - **Money**: integer smallest-unit monetary values with checked arithmetic
//! - **IDs**: newtype identifiers for products and categories

pub mod ids;
pub mod money;

pub use ids::{CategoryId, ProductId};
pub use money::{Currency, Money};
