//! Order context supplied to every evaluation.
//!
//! The caller builds an `OrderContext` fresh from the current cart or
//! checkout session. The evaluation timestamp is injected rather than read
//! from the system clock, so every evaluation is deterministic.

use crate::error::PromoError;
use chrono::{DateTime, Utc};
use promo_core::{CategoryId, Currency, Money, ProductId};
use serde::{Deserialize, Serialize};

/// One cart line as seen by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Product being purchased.
    pub product_id: ProductId,
    /// Category the product belongs to.
    pub category_id: CategoryId,
    /// Price per unit.
    pub unit_price: Money,
    /// Number of units.
    pub quantity: i64,
}

impl OrderLine {
    /// Create a new order line.
    pub fn new(
        product_id: impl Into<ProductId>,
        category_id: impl Into<CategoryId>,
        unit_price: Money,
        quantity: i64,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            category_id: category_id.into(),
            unit_price,
            quantity,
        }
    }

    /// Line total (unit price times quantity), `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.try_multiply(self.quantity)
    }
}

/// Snapshot of the order being evaluated.
///
/// Constructed fresh per request and discarded after use. The engine never
/// looks anything up: customer status, prior coupon usage, and shipping
/// cost all arrive here, supplied by the calling layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderContext {
    /// Pre-discount merchandise total.
    pub subtotal: Money,
    /// Cart lines, in cart order.
    pub line_items: Vec<OrderLine>,
    /// Whether this is the customer's first order.
    pub customer_is_new: bool,
    /// Coupon codes the customer wants applied, in submission order.
    pub requested_codes: Vec<String>,
    /// Shipping cost, required for free-shipping coupons to waive anything.
    pub shipping_cost: Option<Money>,
    /// How many times this customer has used coupons with a per-user limit.
    /// Supplied by the caller; the engine owns no usage ledger.
    pub prior_uses_by_customer: Option<i64>,
    /// Evaluation timestamp, injected for determinism.
    pub now: DateTime<Utc>,
}

impl OrderContext {
    /// Create a context with no lines and no requested codes.
    pub fn new(subtotal: Money, now: DateTime<Utc>) -> Self {
        Self {
            subtotal,
            line_items: Vec::new(),
            customer_is_new: false,
            requested_codes: Vec::new(),
            shipping_cost: None,
            prior_uses_by_customer: None,
            now,
        }
    }

    /// Add a cart line.
    pub fn with_line(mut self, line: OrderLine) -> Self {
        self.line_items.push(line);
        self
    }

    /// Request a coupon code.
    pub fn request_code(mut self, code: impl Into<String>) -> Self {
        self.requested_codes.push(code.into());
        self
    }

    /// Supply the shipping cost charged on this order.
    pub fn with_shipping_cost(mut self, cost: Money) -> Self {
        self.shipping_cost = Some(cost);
        self
    }

    /// Mark the customer as new (first order).
    pub fn for_new_customer(mut self) -> Self {
        self.customer_is_new = true;
        self
    }

    /// Supply this customer's prior uses for per-user-limited coupons.
    pub fn with_prior_uses(mut self, count: i64) -> Self {
        self.prior_uses_by_customer = Some(count);
        self
    }

    /// The currency this order is priced in.
    pub fn currency(&self) -> Currency {
        self.subtotal.currency
    }

    /// Validate structural invariants. Violations are programmer errors in
    /// the calling layer, not business-rule rejections.
    pub(crate) fn validate(&self) -> Result<(), PromoError> {
        if self.subtotal.is_negative() {
            return Err(PromoError::NegativeSubtotal(self.subtotal.amount_minor));
        }
        let currency = self.subtotal.currency;
        for line in &self.line_items {
            if line.quantity < 0 {
                return Err(PromoError::InvalidQuantity(line.quantity));
            }
            if line.unit_price.currency != currency {
                return Err(PromoError::CurrencyMismatch {
                    expected: currency.code().to_string(),
                    got: line.unit_price.currency.code().to_string(),
                });
            }
        }
        if let Some(shipping) = &self.shipping_cost {
            if shipping.currency != currency {
                return Err(PromoError::CurrencyMismatch {
                    expected: currency.code().to_string(),
                    got: shipping.currency.code().to_string(),
                });
            }
        }
        Ok(())
    }
}
