//! Evaluation results.
//!
//! Every code the customer requested lands in exactly one of `accepted` or
//! `rejected`, so the UI can render complete feedback. Rejections carry a
//! typed reason with a customer-facing message; they are normal outcomes,
//! never errors.

use promo_core::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a requested coupon code was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// No coupon with this code exists in the catalog.
    NotFound,
    /// The coupon's kill switch is off.
    Inactive,
    /// The validity window has not started.
    NotYetValid,
    /// The validity window has passed.
    Expired,
    /// The coupon is limited to new customers.
    NotNewCustomer,
    /// The order subtotal is below the coupon's minimum.
    BelowMinimum,
    /// The global usage cap is consumed.
    UsageExhausted,
    /// This customer has hit the per-user cap.
    PerUserLimitReached,
    /// No cart line matches the coupon's category/product scope.
    NoEligibleItems,
    /// The same code was already admitted on this order.
    AlreadyApplied,
    /// Excluded by a non-stackable coupon that was applied first.
    NotStackable,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RejectionReason::NotFound => "coupon code not found",
            RejectionReason::Inactive => "coupon is not active",
            RejectionReason::NotYetValid => "coupon is not valid yet",
            RejectionReason::Expired => "coupon has expired",
            RejectionReason::NotNewCustomer => "coupon is limited to new customers",
            RejectionReason::BelowMinimum => "order subtotal is below the coupon minimum",
            RejectionReason::UsageExhausted => "coupon usage limit has been reached",
            RejectionReason::PerUserLimitReached => {
                "you have reached the usage limit for this coupon"
            }
            RejectionReason::NoEligibleItems => "no items in this order are eligible",
            RejectionReason::AlreadyApplied => "coupon is already applied",
            RejectionReason::NotStackable => "coupon cannot be combined with those already applied",
        };
        f.write_str(msg)
    }
}

/// A coupon that was applied, with the discount it contributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedCoupon {
    /// The coupon code as submitted.
    pub code: String,
    /// Discount this coupon contributes. For free shipping this offsets
    /// the shipping charge, not merchandise.
    pub discount_amount: Money,
}

/// A coupon that was not applied, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RejectedCoupon {
    /// The coupon code as submitted.
    pub code: String,
    /// Why it was not applied.
    pub reason: RejectionReason,
}

/// Complete outcome of one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Applied coupons, in application order.
    pub accepted: Vec<AcceptedCoupon>,
    /// Rejected codes, in submission order (stacking rejections last).
    pub rejected: Vec<RejectedCoupon>,
    /// Total merchandise discount, clamped to `[0, subtotal]`.
    pub total_discount: Money,
    /// Shipping waived by free-shipping coupons, tracked separately
    /// because it offsets shipping cost rather than merchandise.
    pub shipping_discount: Money,
}

impl EvaluationResult {
    /// Whether the given code was accepted (case-insensitive).
    pub fn is_accepted(&self, code: &str) -> bool {
        self.accepted
            .iter()
            .any(|a| a.code.eq_ignore_ascii_case(code))
    }

    /// The rejection reason for a code, if it was rejected.
    pub fn rejection_for(&self, code: &str) -> Option<RejectionReason> {
        self.rejected
            .iter()
            .find(|r| r.code.eq_ignore_ascii_case(code))
            .map(|r| r.reason)
    }

    /// Whether any merchandise or shipping discount applies.
    pub fn has_discounts(&self) -> bool {
        self.total_discount.is_positive() || self.shipping_discount.is_positive()
    }

    /// Merchandise total after the discount (never negative).
    pub fn merchandise_total(&self, subtotal: Money) -> Money {
        subtotal
            .try_subtract(&self.total_discount)
            .unwrap_or_else(|| Money::zero(subtotal.currency))
            .clamp_between(Money::zero(subtotal.currency), subtotal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promo_core::Currency;

    fn sample() -> EvaluationResult {
        EvaluationResult {
            accepted: vec![AcceptedCoupon {
                code: "SAVE10".to_string(),
                discount_amount: Money::new(1000, Currency::USD),
            }],
            rejected: vec![RejectedCoupon {
                code: "GONE".to_string(),
                reason: RejectionReason::Expired,
            }],
            total_discount: Money::new(1000, Currency::USD),
            shipping_discount: Money::zero(Currency::USD),
        }
    }

    #[test]
    fn test_lookup_helpers() {
        let result = sample();
        assert!(result.is_accepted("save10"));
        assert!(!result.is_accepted("GONE"));
        assert_eq!(result.rejection_for("gone"), Some(RejectionReason::Expired));
        assert_eq!(result.rejection_for("SAVE10"), None);
    }

    #[test]
    fn test_merchandise_total() {
        let result = sample();
        let total = result.merchandise_total(Money::new(10_000, Currency::USD));
        assert_eq!(total.amount_minor, 9_000);
    }

    #[test]
    fn test_reason_messages_are_user_facing() {
        assert_eq!(RejectionReason::NotFound.to_string(), "coupon code not found");
        assert_eq!(RejectionReason::Expired.to_string(), "coupon has expired");
    }
}
