//! Stacking resolution.
//!
//! Decides which admitted coupons actually apply together. Exclusivity is
//! about "this coupon refuses company": when a non-stackable coupon is in
//! the admitted set alongside anything else, the first non-stackable one
//! in submission order wins and everything else is rejected.

use crate::coupon::Coupon;
use crate::result::{RejectedCoupon, RejectionReason};
use serde::{Deserialize, Serialize};

/// How stacked discounts compose against the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StackingPolicy {
    /// Every coupon computes against the original subtotal. Two 10%-off
    /// coupons on a 100.00 order contribute 10.00 each.
    #[default]
    Flat,

    /// Each coupon computes against the remainder left by earlier coupons.
    /// Two 10%-off coupons on a 100.00 order contribute 10.00 then 9.00.
    Sequential,
}

/// Result of stacking resolution.
#[derive(Debug)]
pub struct StackingOutcome<'a> {
    /// Coupons to actually apply, in submission order.
    pub kept: Vec<&'a Coupon>,
    /// Coupons excluded by a non-stackable winner.
    pub rejected: Vec<RejectedCoupon>,
}

/// Resolve the admitted set into the coupons that actually apply.
///
/// `admitted` must be in requested-codes order.
pub fn resolve(admitted: Vec<&Coupon>) -> StackingOutcome<'_> {
    if admitted.len() <= 1 {
        return StackingOutcome {
            kept: admitted,
            rejected: Vec::new(),
        };
    }

    let Some(winner_idx) = admitted.iter().position(|c| !c.stackable) else {
        // all stackable: keep everything
        return StackingOutcome {
            kept: admitted,
            rejected: Vec::new(),
        };
    };

    let mut kept = Vec::with_capacity(1);
    let mut rejected = Vec::new();
    for (idx, coupon) in admitted.into_iter().enumerate() {
        if idx == winner_idx {
            kept.push(coupon);
        } else {
            rejected.push(RejectedCoupon {
                code: coupon.code.clone(),
                reason: RejectionReason::NotStackable,
            });
        }
    }
    StackingOutcome { kept, rejected }
}
