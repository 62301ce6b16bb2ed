//! Per-kind discount formulas.
//!
//! Each formula rounds to the smallest currency unit exactly once, at the
//! end, so stacked coupons never compound intermediate rounding error. The
//! returned amount is never negative and never exceeds the merchandise
//! base it was computed against.

use crate::coupon::{Coupon, CouponValue};
use crate::error::PromoError;
use crate::order::OrderContext;
use promo_core::Money;
use std::collections::BTreeMap;

/// Compute the discount an admitted coupon contributes.
///
/// `base` is the merchandise amount the coupon discounts against: the
/// original subtotal under flat stacking, the running remainder under
/// sequential stacking. Free shipping ignores `base` entirely; it waives
/// the caller-supplied shipping cost.
pub fn compute_discount(
    coupon: &Coupon,
    ctx: &OrderContext,
    base: Money,
) -> Result<Money, PromoError> {
    let currency = ctx.currency();
    let amount = match &coupon.value {
        CouponValue::Percentage {
            percent,
            max_discount_amount,
        } => {
            let mut raw = base.percentage(*percent);
            if let Some(cap) = max_discount_amount {
                raw = raw.min(*cap);
            }
            raw.min(base)
        }
        CouponValue::FixedAmount { amount } => amount.min(base),
        CouponValue::FreeShipping => {
            // "would waive $0 because none was charged" is still applied
            ctx.shipping_cost.unwrap_or_else(|| Money::zero(currency))
        }
        CouponValue::BuyXGetY {
            buy_quantity,
            get_quantity,
        } => {
            let total = buy_x_get_y_discount(coupon, ctx, *buy_quantity, *get_quantity)
                .ok_or(PromoError::Overflow)?;
            total.min(base)
        }
    };
    // Never negative, whatever the inputs were.
    if amount.is_negative() {
        return Ok(Money::zero(currency));
    }
    Ok(amount)
}

/// Total discount a buy-X-get-Y coupon forgives, `None` on overflow.
///
/// Every scope-eligible unit participates. Units are taken cheapest-first
/// (the customer-favorable tie-break); each complete group of
/// `buy + get` units forgives `get` unit prices. Incomplete trailing
/// groups forgive nothing. Quantities are aggregated per price level, so
/// the cost of evaluation does not grow with unit counts.
fn buy_x_get_y_discount(
    coupon: &Coupon,
    ctx: &OrderContext,
    buy_quantity: i64,
    get_quantity: i64,
) -> Option<Money> {
    let currency = ctx.currency();
    let group_size = buy_quantity.checked_add(get_quantity)?;
    if group_size <= 0 {
        return Some(Money::zero(currency));
    }

    // eligible units per unit price, ascending
    let mut units_by_price: BTreeMap<i64, i64> = BTreeMap::new();
    let mut total_units: i64 = 0;
    for line in &ctx.line_items {
        if line.quantity <= 0 || !coupon.scope.allows(line) {
            continue;
        }
        let units = units_by_price.entry(line.unit_price.amount_minor).or_insert(0);
        *units = units.checked_add(line.quantity)?;
        total_units = total_units.checked_add(line.quantity)?;
    }

    let complete_groups = total_units / group_size;
    let mut to_forgive = complete_groups.checked_mul(get_quantity)?;
    let mut forgiven = Money::zero(currency);
    for (price, available) in units_by_price {
        if to_forgive == 0 {
            break;
        }
        let taken = available.min(to_forgive);
        let amount = Money::new(price.checked_mul(taken)?, currency);
        forgiven = forgiven.try_add(&amount)?;
        to_forgive -= taken;
    }
    Some(forgiven)
}
