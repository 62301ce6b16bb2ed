//! Coupon eligibility checks.
//!
//! Checks run in a fixed order and short-circuit on the first failure, so
//! the customer always sees the same message for the same cart. This is a
//! pure decision function: no usage counters move, no I/O happens.

use crate::coupon::Coupon;
use crate::order::OrderContext;
use crate::result::RejectionReason;
use std::collections::HashSet;

/// Outcome of an eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// The coupon may be applied.
    Admit,
    /// The coupon may not be applied, and why.
    Reject(RejectionReason),
}

impl Eligibility {
    /// Whether this outcome admits the coupon.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Eligibility::Admit)
    }
}

/// Evaluate one coupon against the order context.
///
/// `admitted` holds the lowercased codes already admitted earlier in this
/// evaluation, for duplicate-submission detection.
///
/// Check order (short-circuits on first failure):
/// 1. kill switch
/// 2. validity window (both ends inclusive)
/// 3. new-customer restriction
/// 4. minimum order amount
/// 5. global usage cap
/// 6. per-customer usage cap (when the caller supplied prior uses)
/// 7. category/product scope
/// 8. duplicate submission
pub fn evaluate(coupon: &Coupon, ctx: &OrderContext, admitted: &HashSet<String>) -> Eligibility {
    use Eligibility::Reject;

    if !coupon.is_active {
        return Reject(RejectionReason::Inactive);
    }

    if ctx.now < coupon.valid_from {
        return Reject(RejectionReason::NotYetValid);
    }
    if ctx.now > coupon.valid_until {
        return Reject(RejectionReason::Expired);
    }

    if coupon.new_customers_only && !ctx.customer_is_new {
        return Reject(RejectionReason::NotNewCustomer);
    }

    if let Some(min) = &coupon.min_order_amount {
        if ctx.subtotal.amount_minor < min.amount_minor {
            return Reject(RejectionReason::BelowMinimum);
        }
    }

    if coupon.is_exhausted() {
        return Reject(RejectionReason::UsageExhausted);
    }

    if let (Some(limit), Some(prior)) = (coupon.per_user_limit, ctx.prior_uses_by_customer) {
        if prior >= limit {
            return Reject(RejectionReason::PerUserLimitReached);
        }
    }

    if !coupon.scope.is_unrestricted() {
        let any_eligible = ctx
            .line_items
            .iter()
            .any(|line| line.quantity > 0 && coupon.scope.allows(line));
        if !any_eligible {
            return Reject(RejectionReason::NoEligibleItems);
        }
    }

    if admitted.contains(&coupon.code.to_lowercase()) {
        return Reject(RejectionReason::AlreadyApplied);
    }

    Eligibility::Admit
}
