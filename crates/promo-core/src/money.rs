//! Money type for representing monetary values.
//!
//! Amounts are stored in the smallest unit of the currency (e.g., cents
//! for USD) to avoid floating-point precision issues in discount math.
//! All fallible arithmetic is checked; callers decide how to surface
//! overflow or currency mismatches.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    KRW,
}

impl Currency {
    /// Get the ISO currency code (e.g., "USD").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::KRW => "KRW",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY | Currency::KRW => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            "KRW" => Some(Currency::KRW),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// The amount is the count of the currency's smallest unit (cents, pence,
/// whole yen). Comparison and ordering are only meaningful between values
/// of the same currency; the `try_*` methods return `None` on mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the smallest currency unit.
    pub amount_minor: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from smallest-unit count.
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Create a Money value from a decimal major-unit amount.
    ///
    /// ```
    /// use promo_core::money::{Currency, Money};
    /// let price = Money::from_decimal(49.99, Currency::USD);
    /// assert_eq!(price.amount_minor, 4999);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        let multiplier = 10_i64.pow(currency.decimal_places());
        Self::new(round_half_up(amount * multiplier as f64), currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    /// Check if this is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.amount_minor > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    /// Convert to a decimal major-unit value (display only, lossy).
    pub fn to_decimal(&self) -> f64 {
        let divisor = 10_i64.pow(self.currency.decimal_places());
        self.amount_minor as f64 / divisor as f64
    }

    /// Try to add another Money value.
    ///
    /// Returns `None` on currency mismatch or overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let sum = self.amount_minor.checked_add(other.amount_minor)?;
        Some(Money::new(sum, self.currency))
    }

    /// Try to subtract another Money value.
    ///
    /// Returns `None` on currency mismatch or overflow.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let diff = self.amount_minor.checked_sub(other.amount_minor)?;
        Some(Money::new(diff, self.currency))
    }

    /// Try to multiply by an integer factor.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        let product = self.amount_minor.checked_mul(factor)?;
        Some(Money::new(product, self.currency))
    }

    /// Compute a percentage of this amount, rounded half-up to the
    /// smallest currency unit. Rounding happens exactly once, here.
    pub fn percentage(&self, percent: f64) -> Money {
        let raw = self.amount_minor as f64 * percent / 100.0;
        Money::new(round_half_up(raw), self.currency)
    }

    /// Return the smaller of two amounts.
    ///
    /// Debug-asserts matching currencies; comparing minor units across
    /// currencies is meaningless.
    pub fn min(self, other: Money) -> Money {
        debug_assert_eq!(
            self.currency, other.currency,
            "currency mismatch in min"
        );
        if other.amount_minor < self.amount_minor {
            other
        } else {
            self
        }
    }

    /// Clamp this amount into `[floor, cap]`.
    ///
    /// Debug-asserts matching currencies.
    pub fn clamp_between(self, floor: Money, cap: Money) -> Money {
        debug_assert_eq!(
            self.currency, floor.currency,
            "currency mismatch in clamp_between"
        );
        debug_assert_eq!(
            self.currency, cap.currency,
            "currency mismatch in clamp_between"
        );
        Money::new(
            self.amount_minor.clamp(floor.amount_minor, cap.amount_minor),
            self.currency,
        )
    }

    /// Sum an iterator of same-currency values, `None` on overflow or
    /// currency mismatch.
    pub fn try_sum<'a>(
        iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Option<Money> {
        let mut acc = Money::zero(currency);
        for m in iter {
            acc = acc.try_add(m)?;
        }
        Some(acc)
    }
}

/// Round half-up to the nearest integer (0.5 rounds toward +infinity).
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

impl Add for Money {
    type Output = Money;

    /// # Panics
    /// Panics on currency mismatch or overflow. Use `try_add` in
    /// production paths.
    fn add(self, other: Money) -> Money {
        self.try_add(&other).expect("currency mismatch in addition")
    }
}

impl Sub for Money {
    type Output = Money;

    /// # Panics
    /// Panics on currency mismatch or overflow. Use `try_subtract` in
    /// production paths.
    fn sub(self, other: Money) -> Money {
        self.try_subtract(&other)
            .expect("currency mismatch in subtraction")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = self.currency.decimal_places() as usize;
        write!(f, "{} {:.places$}", self.currency.code(), self.to_decimal())
    }
}
