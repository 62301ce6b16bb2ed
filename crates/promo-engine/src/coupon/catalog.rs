//! Immutable coupon catalog snapshot.
//!
//! The catalog is read-only input to every evaluation. It validates each
//! record at construction so that a malformed coupon surfaces as a hard
//! failure in the administrative path instead of a confusing rejection at
//! checkout. Lookup is case-insensitive on the code.

use crate::coupon::Coupon;
use crate::error::PromoError;
use std::collections::HashMap;

/// A validated, case-insensitively indexed set of coupon definitions.
#[derive(Debug, Clone, Default)]
pub struct CouponCatalog {
    by_code: HashMap<String, Coupon>,
}

impl CouponCatalog {
    /// Build a catalog, validating every record and rejecting duplicate
    /// codes (codes are case-insensitive identity).
    pub fn new(coupons: impl IntoIterator<Item = Coupon>) -> Result<Self, PromoError> {
        let mut by_code = HashMap::new();
        for coupon in coupons {
            coupon.validate()?;
            let key = coupon.code.to_lowercase();
            if by_code.insert(key, coupon.clone()).is_some() {
                return Err(PromoError::DuplicateCode(coupon.code));
            }
        }
        Ok(Self { by_code })
    }

    /// An empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up a coupon by code, case-insensitively.
    pub fn get(&self, code: &str) -> Option<&Coupon> {
        self.by_code.get(&code.to_lowercase())
    }

    /// Number of coupons in the catalog.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    /// Whether the catalog holds no coupons.
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Iterate over all coupons, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Coupon> {
        self.by_code.values()
    }
}
