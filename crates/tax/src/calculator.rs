//! Pluggable strategies computing a rate's monetary amount for an item.

use rust_decimal::Decimal;

use shopkeep_core::{DomainError, DomainResult, round_to_cents};

use crate::item::TaxableItem;
use crate::rate::TaxRate;

/// Computes the tax amount a rate yields for one item.
///
/// Calculators are swappable per rate. A failure is reported for the item
/// being adjusted only.
pub trait Calculator: core::fmt::Debug + Send + Sync {
    /// Short human-readable name (e.g. for admin listings and logs).
    fn description(&self) -> &'static str;

    fn compute(&self, rate: &TaxRate, item: &TaxableItem) -> DomainResult<Decimal>;
}

/// Rate fraction × item base, rounded to cents.
///
/// Inclusive rates are applied to the stored pre-tax amount (the tax is
/// already part of the price); exclusive rates to the discounted amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultTax;

impl Calculator for DefaultTax {
    fn description(&self) -> &'static str {
        "Default Tax"
    }

    fn compute(&self, rate: &TaxRate, item: &TaxableItem) -> DomainResult<Decimal> {
        let base = if rate.is_included_in_price() {
            item.pre_tax_amount()
        } else {
            item.discounted_amount()
        };
        let amount = base
            .checked_mul(rate.amount())
            .ok_or_else(|| DomainError::invariant("tax amount overflow"))?;
        Ok(round_to_cents(amount))
    }
}

/// Fixed amount per item, regardless of its price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatRate {
    pub amount: Decimal,
}

impl Calculator for FlatRate {
    fn description(&self) -> &'static str {
        "Flat Rate"
    }

    fn compute(&self, _rate: &TaxRate, _item: &TaxableItem) -> DomainResult<Decimal> {
        Ok(self.amount)
    }
}
