//! The application engine: one request/response cycle over the catalog
//! and an order context.
//!
//! `apply` is a pure function of its inputs. It never mutates usage
//! counters; the order-commit path owns that (and must re-validate there,
//! since counts can move between preview and commit).

use crate::coupon::{CouponCatalog, CouponKind};
use crate::engine::{calculator, eligibility, stacking, Eligibility, StackingPolicy};
use crate::error::PromoError;
use crate::order::OrderContext;
use crate::result::{AcceptedCoupon, EvaluationResult, RejectedCoupon, RejectionReason};
use promo_core::Money;
use std::collections::HashSet;
use tracing::debug;

/// Coupon application engine.
///
/// Stateless; safe to share across request handlers and to call repeatedly
/// as the cart changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromoEngine {
    policy: StackingPolicy,
}

impl PromoEngine {
    /// Engine with the default flat stacking policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with an explicit stacking policy.
    pub fn with_policy(policy: StackingPolicy) -> Self {
        Self { policy }
    }

    /// The configured stacking policy.
    pub fn policy(&self) -> StackingPolicy {
        self.policy
    }

    /// Evaluate the requested coupon codes against the order.
    ///
    /// Every requested code lands in exactly one of `accepted` or
    /// `rejected`. Hard errors are reserved for malformed inputs from the
    /// calling layer (negative subtotal, mixed currencies, overflow).
    pub fn apply(
        &self,
        catalog: &CouponCatalog,
        ctx: &OrderContext,
    ) -> Result<EvaluationResult, PromoError> {
        ctx.validate()?;
        let currency = ctx.currency();
        let zero = Money::zero(currency);

        // Phase 1: lookup + eligibility, preserving submission order.
        let mut admitted = Vec::new();
        let mut admitted_keys: HashSet<String> = HashSet::new();
        let mut rejected: Vec<RejectedCoupon> = Vec::new();
        for code in &ctx.requested_codes {
            let Some(coupon) = catalog.get(code) else {
                debug!(code = %code, "coupon code not in catalog");
                rejected.push(RejectedCoupon {
                    code: code.clone(),
                    reason: RejectionReason::NotFound,
                });
                continue;
            };
            // A coupon denominated in a foreign currency is a catalog
            // configuration error, not a rejection.
            coupon.check_currency(currency)?;
            match eligibility::evaluate(coupon, ctx, &admitted_keys) {
                Eligibility::Admit => {
                    admitted_keys.insert(coupon.code.to_lowercase());
                    admitted.push(coupon);
                }
                Eligibility::Reject(reason) => {
                    debug!(code = %code, %reason, "coupon rejected");
                    rejected.push(RejectedCoupon {
                        code: code.clone(),
                        reason,
                    });
                }
            }
        }

        // Phase 2: stacking resolution.
        let outcome = stacking::resolve(admitted);
        for r in &outcome.rejected {
            debug!(code = %r.code, "coupon excluded by non-stackable winner");
        }
        rejected.extend(outcome.rejected);

        // Phase 3: discount calculation.
        let mut accepted = Vec::with_capacity(outcome.kept.len());
        let mut merchandise_discount = zero;
        let mut shipping_discount = zero;
        let mut remaining = ctx.subtotal;
        for coupon in outcome.kept {
            let base = match self.policy {
                StackingPolicy::Flat => ctx.subtotal,
                StackingPolicy::Sequential => remaining,
            };
            let amount = calculator::compute_discount(coupon, ctx, base)?;
            if coupon.kind() == CouponKind::FreeShipping {
                shipping_discount = shipping_discount
                    .try_add(&amount)
                    .ok_or(PromoError::Overflow)?;
            } else {
                merchandise_discount = merchandise_discount
                    .try_add(&amount)
                    .ok_or(PromoError::Overflow)?;
                remaining = remaining
                    .try_subtract(&amount)
                    .ok_or(PromoError::Overflow)?
                    .clamp_between(zero, ctx.subtotal);
            }
            accepted.push(AcceptedCoupon {
                code: coupon.code.clone(),
                discount_amount: amount,
            });
        }

        // Merchandise discount never exceeds the subtotal.
        let total_discount = merchandise_discount.clamp_between(zero, ctx.subtotal);

        debug!(
            accepted = accepted.len(),
            rejected = rejected.len(),
            total_discount = total_discount.amount_minor,
            shipping_discount = shipping_discount.amount_minor,
            "evaluation complete"
        );

        Ok(EvaluationResult {
            accepted,
            rejected,
            total_discount,
            shipping_discount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupon::Coupon;
    use chrono::{TimeZone, Utc};
    use promo_core::Currency;

    fn ctx(subtotal_minor: i64) -> OrderContext {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        OrderContext::new(Money::new(subtotal_minor, Currency::USD), now)
    }

    #[test]
    fn test_unknown_code_rejected_not_found() {
        let engine = PromoEngine::new();
        let result = engine
            .apply(&CouponCatalog::empty(), &ctx(10_000).request_code("NOPE"))
            .unwrap();
        assert_eq!(result.rejection_for("NOPE"), Some(RejectionReason::NotFound));
        assert!(result.accepted.is_empty());
    }

    #[test]
    fn test_single_coupon_applies() {
        let catalog = CouponCatalog::new(vec![Coupon::percentage("SAVE10", 10.0)]).unwrap();
        let engine = PromoEngine::new();
        let result = engine
            .apply(&catalog, &ctx(10_000).request_code("SAVE10"))
            .unwrap();
        assert!(result.is_accepted("SAVE10"));
        assert_eq!(result.total_discount.amount_minor, 1_000);
    }

    #[test]
    fn test_duplicate_submission_rejected_on_second_occurrence() {
        let catalog = CouponCatalog::new(vec![Coupon::percentage("SAVE10", 10.0)]).unwrap();
        let engine = PromoEngine::new();
        let order = ctx(10_000).request_code("SAVE10").request_code("save10");
        let result = engine.apply(&catalog, &order).unwrap();

        assert_eq!(result.accepted.len(), 1);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(
            result.rejected[0].reason,
            RejectionReason::AlreadyApplied
        );
    }

    #[test]
    fn test_flat_vs_sequential_stacking() {
        let catalog = CouponCatalog::new(vec![
            Coupon::percentage("A", 10.0).stackable(true),
            Coupon::percentage("B", 10.0).stackable(true),
        ])
        .unwrap();
        let order = ctx(10_000).request_code("A").request_code("B");

        let flat = PromoEngine::new().apply(&catalog, &order).unwrap();
        assert_eq!(flat.total_discount.amount_minor, 2_000);

        let sequential = PromoEngine::with_policy(StackingPolicy::Sequential)
            .apply(&catalog, &order)
            .unwrap();
        // 10% of 10_000, then 10% of 9_000
        assert_eq!(sequential.total_discount.amount_minor, 1_900);
    }

    #[test]
    fn test_total_discount_clamped_to_subtotal() {
        let catalog = CouponCatalog::new(vec![
            Coupon::percentage("A", 60.0).stackable(true),
            Coupon::percentage("B", 60.0).stackable(true),
        ])
        .unwrap();
        let order = ctx(10_000).request_code("A").request_code("B");
        let result = PromoEngine::new().apply(&catalog, &order).unwrap();
        assert_eq!(result.total_discount.amount_minor, 10_000);
    }

    #[test]
    fn test_shipping_discount_tracked_separately() {
        let catalog = CouponCatalog::new(vec![
            Coupon::percentage("SAVE10", 10.0).stackable(true),
            Coupon::free_shipping("SHIP"),
        ])
        .unwrap();
        let order = ctx(10_000)
            .with_shipping_cost(Money::new(1_500, Currency::USD))
            .request_code("SAVE10")
            .request_code("SHIP");
        let result = PromoEngine::new().apply(&catalog, &order).unwrap();

        assert_eq!(result.total_discount.amount_minor, 1_000);
        assert_eq!(result.shipping_discount.amount_minor, 1_500);
    }

    #[test]
    fn test_foreign_currency_coupon_is_hard_error() {
        // a EUR-denominated fixed amount must never be compared against a
        // USD subtotal, whichever side's minor units are larger
        let catalog = CouponCatalog::new(vec![Coupon::fixed_amount(
            "EUR5000",
            Money::new(5_000, Currency::EUR),
        )])
        .unwrap();
        let result = PromoEngine::new().apply(&catalog, &ctx(100_000).request_code("EUR5000"));
        assert!(matches!(result, Err(PromoError::CurrencyMismatch { .. })));

        let catalog = CouponCatalog::new(vec![Coupon::fixed_amount(
            "EURBIG",
            Money::new(300_000, Currency::EUR),
        )])
        .unwrap();
        let result = PromoEngine::new().apply(&catalog, &ctx(100_000).request_code("EURBIG"));
        assert!(matches!(result, Err(PromoError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_invalid_context_is_hard_error() {
        let engine = PromoEngine::new();
        let bad = OrderContext::new(
            Money::new(-5, Currency::USD),
            Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
        );
        assert!(matches!(
            engine.apply(&CouponCatalog::empty(), &bad),
            Err(PromoError::NegativeSubtotal(-5))
        ));
    }
}
