//! Money calculation utilities using rust_decimal for precision
//!
//! Order totals are computed here and nowhere else. Amounts are kept as
//! `Decimal` and rounded to 2 decimal places, half away from zero.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::models::LineItem;

/// Rounding for monetary values (2 decimal places)
const DECIMAL_PLACES: u32 = 2;

/// Round a monetary amount to 2 decimal places (half away from zero)
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// 定价参数 (税率、包邮门槛、运费)
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    /// Tax rate as a percentage, e.g. 18 = 18%
    pub tax_rate_percent: Decimal,
    /// Subtotals at or above this ship free
    pub free_shipping_threshold: Decimal,
    pub flat_shipping_fee: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate_percent: Decimal::from(18),
            free_shipping_threshold: Decimal::from(1000),
            flat_shipping_fee: Decimal::from(100),
        }
    }
}

impl PricingConfig {
    pub fn tax_on(&self, subtotal: Decimal) -> Option<Decimal> {
        subtotal
            .checked_mul(self.tax_rate_percent)?
            .checked_div(Decimal::ONE_HUNDRED)
            .map(round_money)
    }

    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal >= self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.flat_shipping_fee
        }
    }
}

/// Server-computed order amounts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// `total = subtotal + tax + shipping_cost`
    ///
    /// Returns `None` when any amount leaves the `Decimal` range.
    pub fn compute(items: &[LineItem], pricing: &PricingConfig) -> Option<Self> {
        let subtotal = items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.line_total()?))
            .map(round_money)?;
        let tax = pricing.tax_on(subtotal)?;
        let shipping_cost = pricing.shipping_for(subtotal);
        let total = subtotal.checked_add(tax)?.checked_add(shipping_cost)?;
        Some(Self {
            subtotal,
            tax,
            shipping_cost,
            total,
        })
    }
}
