//! Engine error types.
//!
//! These cover programmer errors only: malformed coupon records, invalid
//! order contexts, arithmetic overflow. A coupon failing an eligibility
//! check is NOT an error; rejections travel in the evaluation result.

use thiserror::Error;

/// Errors that can occur constructing engine inputs or computing discounts.
#[derive(Error, Debug)]
pub enum PromoError {
    /// A coupon record violates a structural invariant.
    #[error("invalid coupon {code}: {reason}")]
    InvalidCoupon { code: String, reason: String },

    /// Two catalog coupons share a code (codes are case-insensitive).
    #[error("duplicate coupon code in catalog: {0}")]
    DuplicateCode(String),

    /// Order subtotal is negative.
    #[error("negative order subtotal: {0}")]
    NegativeSubtotal(i64),

    /// A line item quantity is negative.
    #[error("invalid line item quantity: {0}")]
    InvalidQuantity(i64),

    /// Mixed currencies in a single order context.
    #[error("currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow in a money calculation.
    #[error("arithmetic overflow in discount calculation")]
    Overflow,
}
