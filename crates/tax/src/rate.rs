use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopkeep_core::{AdjustmentId, DomainError, DomainResult, Entity, TaxRateId};
use shopkeep_zones::Zone;

use crate::adjustment::{Adjustment, AdjustmentSource};
use crate::calculator::{Calculator, DefaultTax};
use crate::category::TaxCategory;
use crate::config::TaxConfig;
use crate::item::TaxableItem;

/// Soft-delete status of a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RateStatus {
    Active,
    Deleted { deleted_at: DateTime<Utc> },
}

/// A tax rate for one tax category within one zone.
#[derive(Debug, Clone)]
pub struct TaxRate {
    id: TaxRateId,
    name: Option<String>,
    /// Decimal fraction, e.g. 0.19 for 19%.
    amount: Decimal,
    zone: Zone,
    tax_category: TaxCategory,
    included_in_price: bool,
    show_rate_in_label: bool,
    calculator: Arc<dyn Calculator>,
    status: RateStatus,
}

impl TaxRate {
    /// An additive rate using the default tax calculator.
    pub fn new(amount: Decimal, zone: Zone, tax_category: TaxCategory) -> Self {
        Self {
            id: TaxRateId::new(),
            name: None,
            amount,
            zone,
            tax_category,
            included_in_price: false,
            show_rate_in_label: true,
            calculator: Arc::new(DefaultTax),
            status: RateStatus::Active,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark the rate as already embedded in displayed prices (VAT style).
    pub fn included_in_price(mut self) -> Self {
        self.included_in_price = true;
        self
    }

    pub fn with_rate_in_label(mut self, show: bool) -> Self {
        self.show_rate_in_label = show;
        self
    }

    pub fn with_calculator(mut self, calculator: impl Calculator + 'static) -> Self {
        self.calculator = Arc::new(calculator);
        self
    }

    pub fn with_id(mut self, id: TaxRateId) -> Self {
        self.id = id;
        self
    }

    pub fn id_typed(&self) -> TaxRateId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    pub fn tax_category(&self) -> &TaxCategory {
        &self.tax_category
    }

    pub fn is_included_in_price(&self) -> bool {
        self.included_in_price
    }

    pub fn calculator(&self) -> &dyn Calculator {
        self.calculator.as_ref()
    }

    pub fn status(&self) -> RateStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, RateStatus::Active)
    }

    pub(crate) fn mark_deleted(&mut self, deleted_at: DateTime<Utc>) {
        self.status = RateStatus::Deleted { deleted_at };
    }

    /// Reject rates that cannot be applied under `config`.
    pub fn validate(&self, config: &TaxConfig) -> DomainResult<()> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(DomainError::validation("tax rate amount cannot be negative"));
        }
        if self.included_in_price && config.default_tax_zone().is_none() {
            return Err(DomainError::validation(
                "a rate included in price requires a default tax zone",
            ));
        }
        Ok(())
    }

    /// Whether the default tax zone or this rate's own zone contains `zone`.
    pub fn default_zone_or_zone_match(&self, config: &TaxConfig, zone: &Zone) -> bool {
        config
            .default_tax_zone()
            .is_some_and(|default| default.contains(zone))
            || self.zone.contains(zone)
    }

    /// Inclusive rate whose zone covers the default tax zone.
    pub fn is_default_vat(&self, config: &TaxConfig) -> bool {
        self.included_in_price
            && config
                .default_tax_zone()
                .is_some_and(|default| self.zone.contains(default))
    }

    /// Monetary amount of this rate for `item` delivered into `zone`.
    ///
    /// An inclusive rate that does not apply at the destination yields the
    /// negated calculator output: a refund of the tax embedded in the price.
    pub fn compute_amount(
        &self,
        config: &TaxConfig,
        zone: &Zone,
        item: &TaxableItem,
    ) -> DomainResult<Decimal> {
        let computed = self.calculator.compute(self, item)?;
        if self.included_in_price && !self.default_zone_or_zone_match(config, zone) {
            Ok(-computed)
        } else {
            Ok(computed)
        }
    }

    /// The adjustment this rate puts on `item`, or `None` when it amounts to zero.
    pub fn adjustment_for(
        &self,
        config: &TaxConfig,
        zone: &Zone,
        item: &TaxableItem,
    ) -> DomainResult<Option<Adjustment>> {
        let amount = self.compute_amount(config, zone, item)?;
        if amount.is_zero() {
            return Ok(None);
        }

        let included = self.included_in_price && self.default_zone_or_zone_match(config, zone);
        let label = if amount.is_sign_negative() {
            format!("Refund {}", self.label())
        } else {
            self.label()
        };

        Ok(Some(Adjustment {
            id: AdjustmentId::new(),
            source: AdjustmentSource::Tax {
                rate: Some(self.id),
            },
            adjustable: item.id(),
            order_id: item.order_id(),
            amount,
            label,
            included,
        }))
    }

    /// Display label, e.g. `"VAT 19% (Included in Price)"`.
    pub fn label(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(3);
        parts.push(
            self.name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| self.tax_category.name.clone()),
        );
        if self.show_rate_in_label {
            parts.push(format!("{}%", (self.amount * Decimal::ONE_HUNDRED).normalize()));
        }
        if self.included_in_price {
            parts.push("(Included in Price)".to_string());
        }
        parts.join(" ")
    }
}

impl Entity for TaxRate {
    type Id = TaxRateId;

    fn id(&self) -> &TaxRateId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::FlatRate;
    use rust_decimal_macros::dec;
    use shopkeep_core::{CountryId, LineItemId, OrderId, VariantId};

    fn item(price: Decimal) -> TaxableItem {
        TaxableItem::line_item(
            LineItemId::new(),
            OrderId::new(),
            VariantId::new(),
            price,
            1,
            None,
        )
    }

    #[test]
    fn inclusive_rate_without_default_zone_is_rejected() {
        let zone = Zone::countries("DE", [CountryId::new()]);
        let rate = TaxRate::new(dec!(0.19), zone, TaxCategory::new("Normal")).included_in_price();

        let err = rate.validate(&TaxConfig::default()).unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("default tax zone") => {}
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn inclusive_rate_with_default_zone_is_valid() {
        let zone = Zone::countries("DE", [CountryId::new()]).with_default_tax();
        let config = TaxConfig::new(Some(zone.clone()));
        let rate = TaxRate::new(dec!(0.19), zone, TaxCategory::new("Normal")).included_in_price();

        assert!(rate.validate(&config).is_ok());
        assert!(rate.is_default_vat(&config));
    }

    #[test]
    fn negative_rates_are_rejected() {
        let zone = Zone::countries("DE", [CountryId::new()]);
        let rate = TaxRate::new(dec!(-0.05), zone, TaxCategory::new("Normal"));
        assert!(rate.validate(&TaxConfig::default()).is_err());
    }

    #[test]
    fn label_uses_name_rate_and_inclusion() {
        let zone = Zone::countries("DE", [CountryId::new()]);
        let category = TaxCategory::new("Books");

        let plain = TaxRate::new(dec!(0.07), zone.clone(), category.clone());
        assert_eq!(plain.label(), "Books 7%");

        let named = TaxRate::new(dec!(0.075), zone.clone(), category.clone())
            .named("Sales Tax")
            .with_rate_in_label(false);
        assert_eq!(named.label(), "Sales Tax");

        let vat = TaxRate::new(dec!(0.19), zone, category)
            .named("VAT")
            .included_in_price();
        assert_eq!(vat.label(), "VAT 19% (Included in Price)");
    }

    #[test]
    fn exclusive_rate_is_charged_on_discounted_amount() {
        let zone = Zone::countries("US", [CountryId::new()]);
        let config = TaxConfig::default();
        let rate = TaxRate::new(dec!(0.10), zone.clone(), TaxCategory::new("Normal"));

        let adjustment = rate
            .adjustment_for(&config, &zone, &item(dec!(20.00)))
            .unwrap()
            .unwrap();
        assert_eq!(adjustment.amount, dec!(2.00));
        assert!(!adjustment.included);
        assert_eq!(adjustment.tax_rate_id(), Some(rate.id_typed()));
    }

    #[test]
    fn out_of_zone_inclusive_rate_becomes_a_refund() {
        let home = Zone::countries("DE", [CountryId::new()]).with_default_tax();
        let abroad = Zone::countries("US", [CountryId::new()]);
        let config = TaxConfig::new(Some(home.clone()));
        let rate = TaxRate::new(dec!(0.19), home.clone(), TaxCategory::new("Normal"))
            .named("VAT")
            .included_in_price()
            .with_calculator(FlatRate { amount: dec!(1.50) });

        let refund = rate
            .adjustment_for(&config, &abroad, &item(dec!(30.00)))
            .unwrap()
            .unwrap();
        assert_eq!(refund.amount, dec!(-1.50));
        assert!(!refund.included);
        assert!(refund.is_refund());
        assert_eq!(refund.label, "Refund VAT 19% (Included in Price)");

        let at_home = rate
            .adjustment_for(&config, &home, &item(dec!(30.00)))
            .unwrap()
            .unwrap();
        assert_eq!(at_home.amount, dec!(1.50));
        assert!(at_home.included);
    }

    #[test]
    fn zero_amounts_produce_no_adjustment() {
        let zone = Zone::countries("US", [CountryId::new()]);
        let rate = TaxRate::new(dec!(0), zone.clone(), TaxCategory::new("Exempt"));
        let result = rate
            .adjustment_for(&TaxConfig::default(), &zone, &item(dec!(10)))
            .unwrap();
        assert!(result.is_none());
    }
}
