//! Coupon and discount evaluation for storefront checkout flows.
//!
//! Given a catalog of coupon definitions and a snapshot of the order being
//! priced, the engine decides which requested codes apply, what each one
//! is worth, and how they combine:
//!
//! - **Eligibility**: kill switch, validity window, customer restrictions,
//!   minimums, usage caps, category/product scope — checked in a fixed
//!   order so rejection messages are deterministic
//! - **Calculation**: percentage (with cap), fixed amount, free shipping,
//!   buy-X-get-Y, each rounding half-up exactly once
//! - **Stacking**: non-stackable coupons refuse company (first one
//!   submitted wins); stackable coupons compose under a flat or
//!   sequential policy
//!
//! Evaluation is a pure function of `(catalog, context)`: no clock reads,
//! no I/O, no usage-counter mutation. The order-commit path owns counter
//! increments and must re-validate eligibility at commit time.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use promo_core::{Currency, Money};
//! use promo_engine::prelude::*;
//!
//! let catalog = CouponCatalog::new(vec![
//!     Coupon::percentage("WELCOME20", 20.0)
//!         .with_max_discount(Money::new(50_000, Currency::USD)),
//! ])?;
//!
//! let order = OrderContext::new(
//!     Money::new(120_000, Currency::USD),
//!     Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
//! )
//! .request_code("WELCOME20");
//!
//! let result = PromoEngine::new().apply(&catalog, &order)?;
//! assert!(result.is_accepted("WELCOME20"));
//! assert_eq!(result.total_discount.amount_minor, 24_000);
//! # Ok::<(), promo_engine::PromoError>(())
//! ```

pub mod coupon;
pub mod engine;
pub mod error;
pub mod order;
pub mod result;

pub use coupon::{Coupon, CouponCatalog, CouponKind, CouponScope, CouponValue};
pub use engine::{PromoEngine, StackingPolicy};
pub use error::PromoError;
pub use order::{OrderContext, OrderLine};
pub use result::{AcceptedCoupon, EvaluationResult, RejectedCoupon, RejectionReason};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::coupon::{Coupon, CouponCatalog, CouponKind, CouponScope, CouponValue};
    pub use crate::engine::{PromoEngine, StackingPolicy};
    pub use crate::error::PromoError;
    pub use crate::order::{OrderContext, OrderLine};
    pub use crate::result::{
        AcceptedCoupon, EvaluationResult, RejectedCoupon, RejectionReason,
    };
    pub use promo_core::{CategoryId, Currency, Money, ProductId};
}
