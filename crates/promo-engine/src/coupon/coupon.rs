//! Coupon definitions.
//!
//! A coupon's value formula is a tagged union keyed on kind, so percentage
//! magnitudes, fixed amounts, and buy-x-get-y quantities only exist on the
//! variants that use them.

use crate::error::PromoError;
use crate::order::OrderLine;
use chrono::{DateTime, Utc};
use promo_core::{CategoryId, Currency, Money, ProductId};
use serde::{Deserialize, Serialize};

/// Kind of discount a coupon grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CouponKind {
    /// Percentage off the merchandise subtotal.
    Percentage,
    /// Fixed amount off the merchandise subtotal.
    FixedAmount,
    /// Shipping cost waived.
    FreeShipping,
    /// Buy X units, get Y units free.
    BuyXGetY,
}

/// Value formula of a coupon, keyed on kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum CouponValue {
    /// Percentage off (0 < percent), optionally capped.
    Percentage {
        percent: f64,
        max_discount_amount: Option<Money>,
    },
    /// Fixed amount off.
    FixedAmount { amount: Money },
    /// Shipping cost waived.
    FreeShipping,
    /// For every `buy_quantity` units bought, `get_quantity` units free.
    BuyXGetY {
        buy_quantity: i64,
        get_quantity: i64,
    },
}

impl CouponValue {
    /// The kind tag for this value.
    pub fn kind(&self) -> CouponKind {
        match self {
            CouponValue::Percentage { .. } => CouponKind::Percentage,
            CouponValue::FixedAmount { .. } => CouponKind::FixedAmount,
            CouponValue::FreeShipping => CouponKind::FreeShipping,
            CouponValue::BuyXGetY { .. } => CouponKind::BuyXGetY,
        }
    }
}

/// Category/product restrictions on where a coupon applies.
///
/// Empty lists mean no restriction of that sort. A line is eligible when it
/// is not excluded and, if any applicable list is non-empty, it matches at
/// least one of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CouponScope {
    /// Categories the coupon applies to (empty = all).
    #[serde(default)]
    pub applicable_categories: Vec<CategoryId>,
    /// Categories the coupon never applies to.
    #[serde(default)]
    pub excluded_categories: Vec<CategoryId>,
    /// Products the coupon applies to (empty = all).
    #[serde(default)]
    pub applicable_product_ids: Vec<ProductId>,
    /// Products the coupon never applies to.
    #[serde(default)]
    pub excluded_product_ids: Vec<ProductId>,
}

impl CouponScope {
    /// True when no restriction is configured at all.
    pub fn is_unrestricted(&self) -> bool {
        self.applicable_categories.is_empty()
            && self.excluded_categories.is_empty()
            && self.applicable_product_ids.is_empty()
            && self.excluded_product_ids.is_empty()
    }

    /// Whether this scope admits the given cart line.
    pub fn allows(&self, line: &OrderLine) -> bool {
        if self.excluded_product_ids.contains(&line.product_id)
            || self.excluded_categories.contains(&line.category_id)
        {
            return false;
        }
        let has_applicable_filter =
            !self.applicable_categories.is_empty() || !self.applicable_product_ids.is_empty();
        if !has_applicable_filter {
            return true;
        }
        self.applicable_product_ids.contains(&line.product_id)
            || self.applicable_categories.contains(&line.category_id)
    }
}

/// A coupon definition.
///
/// Identity is the `code`, compared case-insensitively. Coupons are
/// read-only inputs to every evaluation; `usage_count` is only ever
/// advanced by the order-commit path, never by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Customer-facing code (e.g., "WELCOME20").
    pub code: String,
    /// Value formula. Flattened so the wire shape is `kind` plus the
    /// fields that kind uses, nothing else.
    #[serde(flatten)]
    pub value: CouponValue,
    /// Minimum pre-discount subtotal required.
    pub min_order_amount: Option<Money>,
    /// Global usage cap (None = unlimited).
    pub usage_limit: Option<i64>,
    /// Times the coupon has been used so far.
    pub usage_count: i64,
    /// Per-customer usage cap.
    pub per_user_limit: Option<i64>,
    /// Start of the validity window (inclusive).
    pub valid_from: DateTime<Utc>,
    /// End of the validity window (inclusive).
    pub valid_until: DateTime<Utc>,
    /// Manual kill switch, independent of the date window.
    pub is_active: bool,
    /// Restricted to customers on their first order.
    pub new_customers_only: bool,
    /// May this coupon combine with others on the same order.
    pub stackable: bool,
    /// Category/product restrictions.
    #[serde(flatten)]
    pub scope: CouponScope,
}

impl Coupon {
    fn base(code: impl Into<String>, value: CouponValue, stackable: bool) -> Self {
        Self {
            code: code.into(),
            value,
            min_order_amount: None,
            usage_limit: None,
            usage_count: 0,
            per_user_limit: None,
            valid_from: DateTime::<Utc>::MIN_UTC,
            valid_until: DateTime::<Utc>::MAX_UTC,
            is_active: true,
            new_customers_only: false,
            stackable,
            scope: CouponScope::default(),
        }
    }

    /// Create a percentage-off coupon.
    pub fn percentage(code: impl Into<String>, percent: f64) -> Self {
        Self::base(
            code,
            CouponValue::Percentage {
                percent,
                max_discount_amount: None,
            },
            false,
        )
    }

    /// Create a fixed-amount coupon.
    pub fn fixed_amount(code: impl Into<String>, amount: Money) -> Self {
        Self::base(code, CouponValue::FixedAmount { amount }, false)
    }

    /// Create a free-shipping coupon. Free shipping combines with other
    /// coupons by default since it offsets shipping, not merchandise.
    pub fn free_shipping(code: impl Into<String>) -> Self {
        Self::base(code, CouponValue::FreeShipping, true)
    }

    /// Create a buy-X-get-Y coupon.
    pub fn buy_x_get_y(code: impl Into<String>, buy_quantity: i64, get_quantity: i64) -> Self {
        Self::base(
            code,
            CouponValue::BuyXGetY {
                buy_quantity,
                get_quantity,
            },
            false,
        )
    }

    /// Cap a percentage coupon's discount.
    pub fn with_max_discount(mut self, cap: Money) -> Self {
        if let CouponValue::Percentage {
            max_discount_amount,
            ..
        } = &mut self.value
        {
            *max_discount_amount = Some(cap);
        }
        self
    }

    /// Require a minimum pre-discount subtotal.
    pub fn with_minimum_order(mut self, amount: Money) -> Self {
        self.min_order_amount = Some(amount);
        self
    }

    /// Cap total uses across all customers.
    pub fn with_usage_limit(mut self, limit: i64) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// Cap uses per customer.
    pub fn with_per_user_limit(mut self, limit: i64) -> Self {
        self.per_user_limit = Some(limit);
        self
    }

    /// Restrict the validity window (both ends inclusive).
    pub fn valid_between(mut self, from: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.valid_from = from;
        self.valid_until = until;
        self
    }

    /// Restrict to customers on their first order.
    pub fn for_new_customers_only(mut self) -> Self {
        self.new_customers_only = true;
        self
    }

    /// Set whether the coupon combines with others.
    pub fn stackable(mut self, stackable: bool) -> Self {
        self.stackable = stackable;
        self
    }

    /// Restrict which categories/products the coupon applies to.
    pub fn with_scope(mut self, scope: CouponScope) -> Self {
        self.scope = scope;
        self
    }

    /// The kind tag for this coupon.
    pub fn kind(&self) -> CouponKind {
        self.value.kind()
    }

    /// Whether the global usage cap is already consumed.
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .map(|limit| self.usage_count >= limit)
            .unwrap_or(false)
    }

    /// Check every monetary field against the order's currency.
    ///
    /// A coupon denominated in another currency is a configuration error,
    /// not a rejection: comparing raw minor units across currencies would
    /// produce a silently wrong discount.
    pub(crate) fn check_currency(&self, currency: Currency) -> Result<(), PromoError> {
        let mismatch = |got: Currency| PromoError::CurrencyMismatch {
            expected: currency.code().to_string(),
            got: got.code().to_string(),
        };
        if let Some(min) = &self.min_order_amount {
            if min.currency != currency {
                return Err(mismatch(min.currency));
            }
        }
        match &self.value {
            CouponValue::Percentage {
                max_discount_amount: Some(cap),
                ..
            } if cap.currency != currency => Err(mismatch(cap.currency)),
            CouponValue::FixedAmount { amount } if amount.currency != currency => {
                Err(mismatch(amount.currency))
            }
            _ => Ok(()),
        }
    }

    /// Validate structural invariants of the record.
    ///
    /// A violation means the administrative layer produced a malformed
    /// coupon; this is a hard failure, not a rejection.
    pub fn validate(&self) -> Result<(), PromoError> {
        let invalid = |reason: &str| {
            Err(PromoError::InvalidCoupon {
                code: self.code.clone(),
                reason: reason.to_string(),
            })
        };

        if self.code.trim().is_empty() {
            return invalid("empty code");
        }
        if self.valid_from > self.valid_until {
            return invalid("validFrom is after validUntil");
        }
        if self.usage_count < 0 {
            return invalid("negative usage count");
        }
        if let Some(limit) = self.usage_limit {
            if limit < 0 {
                return invalid("negative usage limit");
            }
            if self.usage_count > limit {
                return invalid("usage count exceeds usage limit");
            }
        }
        if let Some(limit) = self.per_user_limit {
            if limit < 1 {
                return invalid("per-user limit must be at least 1");
            }
        }
        if let Some(min) = &self.min_order_amount {
            if min.is_negative() {
                return invalid("negative minimum order amount");
            }
        }
        match &self.value {
            CouponValue::Percentage {
                percent,
                max_discount_amount,
            } => {
                if !percent.is_finite() || *percent <= 0.0 {
                    return invalid("percentage must be positive");
                }
                if let Some(cap) = max_discount_amount {
                    if !cap.is_positive() {
                        return invalid("max discount amount must be positive");
                    }
                }
            }
            CouponValue::FixedAmount { amount } => {
                if !amount.is_positive() {
                    return invalid("fixed amount must be positive");
                }
            }
            CouponValue::FreeShipping => {}
            CouponValue::BuyXGetY {
                buy_quantity,
                get_quantity,
            } => {
                if *buy_quantity < 1 || *get_quantity < 1 {
                    return invalid("buy and get quantities must be at least 1");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promo_core::Currency;

    #[test]
    fn test_constructors_set_kind() {
        assert_eq!(Coupon::percentage("P", 10.0).kind(), CouponKind::Percentage);
        assert_eq!(
            Coupon::fixed_amount("F", Money::new(500, Currency::USD)).kind(),
            CouponKind::FixedAmount
        );
        assert_eq!(
            Coupon::free_shipping("S").kind(),
            CouponKind::FreeShipping
        );
        assert_eq!(Coupon::buy_x_get_y("B", 2, 1).kind(), CouponKind::BuyXGetY);
    }

    #[test]
    fn test_free_shipping_stacks_by_default() {
        assert!(Coupon::free_shipping("SHIP").stackable);
        assert!(!Coupon::percentage("P", 10.0).stackable);
    }

    #[test]
    fn test_validate_rejects_nonpositive_percent() {
        assert!(Coupon::percentage("P", 0.0).validate().is_err());
        assert!(Coupon::percentage("P", -5.0).validate().is_err());
        assert!(Coupon::percentage("P", 15.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        use chrono::TimeZone;
        let from = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let coupon = Coupon::percentage("P", 10.0).valid_between(from, until);
        assert!(coupon.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_count_over_limit() {
        let mut coupon = Coupon::percentage("P", 10.0).with_usage_limit(5);
        coupon.usage_count = 6;
        assert!(coupon.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_buy_x_get_y() {
        assert!(Coupon::buy_x_get_y("B", 0, 1).validate().is_err());
        assert!(Coupon::buy_x_get_y("B", 2, 0).validate().is_err());
        assert!(Coupon::buy_x_get_y("B", 2, 1).validate().is_ok());
    }

    #[test]
    fn test_is_exhausted() {
        let mut coupon = Coupon::percentage("P", 10.0).with_usage_limit(2);
        assert!(!coupon.is_exhausted());
        coupon.usage_count = 2;
        assert!(coupon.is_exhausted());
    }

    #[test]
    fn test_scope_allows() {
        let line = OrderLine::new("prod-1", "cat-1", Money::new(1000, Currency::USD), 1);

        let unrestricted = CouponScope::default();
        assert!(unrestricted.allows(&line));

        let category_match = CouponScope {
            applicable_categories: vec![CategoryId::new("cat-1")],
            ..Default::default()
        };
        assert!(category_match.allows(&line));

        let wrong_category = CouponScope {
            applicable_categories: vec![CategoryId::new("cat-2")],
            ..Default::default()
        };
        assert!(!wrong_category.allows(&line));

        // exclusion wins over an applicable match
        let excluded = CouponScope {
            applicable_categories: vec![CategoryId::new("cat-1")],
            excluded_product_ids: vec![ProductId::new("prod-1")],
            ..Default::default()
        };
        assert!(!excluded.allows(&line));
    }

    #[test]
    fn test_check_currency_flags_foreign_fields() {
        let eur_fixed = Coupon::fixed_amount("F", Money::new(5_000, Currency::EUR));
        assert!(eur_fixed.check_currency(Currency::USD).is_err());
        assert!(eur_fixed.check_currency(Currency::EUR).is_ok());

        let eur_cap = Coupon::percentage("P", 20.0)
            .with_max_discount(Money::new(50_000, Currency::EUR));
        assert!(eur_cap.check_currency(Currency::USD).is_err());

        let eur_minimum = Coupon::free_shipping("S")
            .with_minimum_order(Money::new(10_000, Currency::EUR));
        assert!(eur_minimum.check_currency(Currency::USD).is_err());

        assert!(Coupon::percentage("P", 20.0)
            .check_currency(Currency::USD)
            .is_ok());
    }

    #[test]
    fn test_serde_round_trip() {
        let coupon = Coupon::percentage("SAVE20", 20.0)
            .with_max_discount(Money::new(50_000, Currency::USD))
            .with_minimum_order(Money::new(100_000, Currency::USD));
        let json = serde_json::to_value(&coupon).unwrap();
        assert_eq!(json["kind"], "Percentage");
        assert_eq!(json["percent"], 20.0);
        assert!(json.get("maxDiscountAmount").is_some());
        assert!(json.get("minOrderAmount").is_some());
        let back: Coupon = serde_json::from_value(json).unwrap();
        assert_eq!(back, coupon);
    }
}
