//! Coupon definitions and the catalog snapshot they live in.

mod catalog;
mod coupon;

pub use catalog::CouponCatalog;
pub use coupon::{Coupon, CouponKind, CouponScope, CouponValue};
