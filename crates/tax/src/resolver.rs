//! Tax rate resolution and adjustment of taxable items.
//!
//! The resolver is pure: for each item it *plans* the tax events that bring
//! the item's tax adjustments up to date, working on a scratch copy so that a
//! later step of the plan (per-rate amounts) sees the effect of an earlier one
//! (the stored pre-tax amount). Applying a plan is all-or-nothing per item.
//!
//! ```text
//! match(zone) ──► rates covering each item's category
//!                   │
//!     covered item  ├─► purge tax adjustments ─► store pre-tax ─► one adjustment per rate
//!                   │
//!   uncovered item  └─► purge tax adjustments ─► pre-tax = 0   (only if it had any)
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use shopkeep_core::{
    AdjustmentId, DomainError, DomainResult, TaxCategoryId, TaxRateId, round_to_cents,
};
use shopkeep_zones::Zone;

use crate::config::TaxConfig;
use crate::event::{
    PreTaxAmountStored, TaxAdjustmentCreated, TaxAdjustmentDetached, TaxAdjustmentsPurged,
    TaxEvent,
};
use crate::item::{TaxableItem, TaxableItemId};
use crate::rate::TaxRate;

/// Planned tax events for one item, or the reason planning failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPlan {
    pub item_id: TaxableItemId,
    pub outcome: DomainResult<Vec<TaxEvent>>,
}

/// Result of applying tax to a batch of items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjustReport {
    /// Items whose plan was applied (including plans with nothing to do).
    pub adjusted: Vec<TaxableItemId>,
    /// Items left untouched because their plan failed.
    pub failed: Vec<(TaxableItemId, DomainError)>,
}

impl AdjustReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Resolves applicable tax rates and keeps tax adjustments in sync.
#[derive(Debug, Clone)]
pub struct TaxResolver {
    config: TaxConfig,
    rates: Vec<TaxRate>,
}

impl TaxResolver {
    /// Build a resolver, validating every rate against `config`.
    pub fn new(config: TaxConfig, rates: impl IntoIterator<Item = TaxRate>) -> DomainResult<Self> {
        let mut resolver = Self {
            config,
            rates: Vec::new(),
        };
        for rate in rates {
            resolver.add_rate(rate)?;
        }
        Ok(resolver)
    }

    pub fn config(&self) -> &TaxConfig {
        &self.config
    }

    /// All known rates, including retired ones.
    pub fn rates(&self) -> &[TaxRate] {
        &self.rates
    }

    pub fn rate(&self, id: TaxRateId) -> Option<&TaxRate> {
        self.rates.iter().find(|r| r.id_typed() == id)
    }

    /// Validate and register a rate.
    pub fn add_rate(&mut self, rate: TaxRate) -> DomainResult<()> {
        rate.validate(&self.config)?;
        if self.rate(rate.id_typed()).is_some() {
            return Err(DomainError::conflict(format!(
                "tax rate {} already exists",
                rate.id_typed()
            )));
        }
        self.rates.push(rate);
        Ok(())
    }

    /// Rates applicable to orders taxed in `zone`.
    ///
    /// Returns rates whose zone contains `zone`, plus default-zone VAT rates
    /// for tax categories no such rate covers. Without a zone nothing matches.
    pub fn match_rates(&self, zone: Option<&Zone>) -> Vec<&TaxRate> {
        let Some(zone) = zone else {
            return Vec::new();
        };

        let active = || self.rates.iter().filter(|r| r.is_active());

        let zone_rates: Vec<&TaxRate> = active().filter(|r| r.zone().contains(zone)).collect();
        let zone_categories: Vec<TaxCategoryId> =
            zone_rates.iter().map(|r| r.tax_category().id).collect();

        // A destination-specific rate replaces the default zone's rate for
        // the same category, so no refund competes with it.
        let default_rates = active()
            .filter(|r| r.is_default_vat(&self.config))
            .filter(|r| !zone_categories.contains(&r.tax_category().id));

        let mut matched: Vec<&TaxRate> = Vec::new();
        for rate in zone_rates.into_iter().chain(default_rates) {
            if !matched.iter().any(|m| m.id_typed() == rate.id_typed()) {
                matched.push(rate);
            }
        }
        matched
    }

    /// Plan the tax events for each item, independently.
    pub fn plan_items(
        &self,
        zone: Option<&Zone>,
        items: &[TaxableItem],
        occurred_at: DateTime<Utc>,
    ) -> Vec<ItemPlan> {
        let matched = self.match_rates(zone);
        items
            .iter()
            .map(|item| ItemPlan {
                item_id: item.id(),
                outcome: self.plan_item(zone, &matched, item, occurred_at),
            })
            .collect()
    }

    /// Bring the tax adjustments of `items` up to date for `zone`.
    ///
    /// Each item is planned in isolation and changed only if its whole plan
    /// succeeded; a failing item is reported and left as it was. Running this
    /// twice with unchanged inputs leaves the same adjustments in place.
    pub fn adjust(
        &self,
        zone: Option<&Zone>,
        items: &mut [TaxableItem],
        occurred_at: DateTime<Utc>,
    ) -> AdjustReport {
        let plans = self.plan_items(zone, items, occurred_at);
        let mut report = AdjustReport::default();

        for (item, plan) in items.iter_mut().zip(plans) {
            match plan.outcome {
                Ok(events) => {
                    for event in &events {
                        item.apply(event);
                    }
                    report.adjusted.push(plan.item_id);
                }
                Err(err) => report.failed.push((plan.item_id, err)),
            }
        }

        report
    }

    /// Soft-delete a rate and deal with the adjustments it produced.
    ///
    /// Adjustments on open orders are destroyed; on completed orders they are
    /// kept but detached from the rate. Returns the events per affected item.
    /// Callers that persist the events should use [`Self::plan_retirement`]
    /// and [`Self::mark_retired`] so the rate stays active until they are stored.
    pub fn retire_rate(
        &mut self,
        rate_id: TaxRateId,
        items: &[TaxableItem],
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Vec<ItemPlan>> {
        let plans = self.plan_retirement(rate_id, items, occurred_at)?;
        self.mark_retired(rate_id, occurred_at)?;
        Ok(plans)
    }

    /// Plan the clean-up of an active rate's adjustments without retiring it.
    pub fn plan_retirement(
        &self,
        rate_id: TaxRateId,
        items: &[TaxableItem],
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Vec<ItemPlan>> {
        self.active_rate(rate_id)?;

        let mut plans = Vec::new();
        for item in items {
            let sourced: Vec<AdjustmentId> = item
                .tax_adjustments()
                .filter(|a| a.tax_rate_id() == Some(rate_id))
                .map(|a| a.id)
                .collect();
            if sourced.is_empty() {
                continue;
            }

            let events = if item.is_order_completed() {
                sourced
                    .into_iter()
                    .map(|adjustment_id| {
                        TaxEvent::TaxAdjustmentDetached(TaxAdjustmentDetached {
                            item_id: item.id(),
                            adjustment_id,
                            occurred_at,
                        })
                    })
                    .collect()
            } else {
                vec![TaxEvent::TaxAdjustmentsPurged(TaxAdjustmentsPurged {
                    item_id: item.id(),
                    adjustment_ids: sourced,
                    occurred_at,
                })]
            };

            plans.push(ItemPlan {
                item_id: item.id(),
                outcome: Ok(events),
            });
        }

        Ok(plans)
    }

    /// Soft-delete an active rate; it no longer matches any zone.
    pub fn mark_retired(
        &mut self,
        rate_id: TaxRateId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let rate = self
            .rates
            .iter_mut()
            .find(|r| r.id_typed() == rate_id && r.is_active())
            .ok_or_else(DomainError::not_found)?;
        rate.mark_deleted(occurred_at);
        Ok(())
    }

    fn active_rate(&self, rate_id: TaxRateId) -> DomainResult<&TaxRate> {
        self.rate(rate_id)
            .filter(|r| r.is_active())
            .ok_or_else(DomainError::not_found)
    }

    fn plan_item(
        &self,
        zone: Option<&Zone>,
        matched: &[&TaxRate],
        item: &TaxableItem,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Vec<TaxEvent>> {
        let relevant: Vec<&TaxRate> = matched
            .iter()
            .copied()
            .filter(|r| item.tax_category() == Some(r.tax_category().id))
            .collect();

        let mut scratch = item.clone();
        let mut events: Vec<TaxEvent> = Vec::new();
        let mut record = |scratch: &mut TaxableItem, event: TaxEvent| {
            scratch.apply(&event);
            events.push(event);
        };

        let existing: Vec<AdjustmentId> = item.tax_adjustments().map(|a| a.id).collect();
        let purge = |adjustment_ids: Vec<AdjustmentId>| {
            TaxEvent::TaxAdjustmentsPurged(TaxAdjustmentsPurged {
                item_id: item.id(),
                adjustment_ids,
                occurred_at,
            })
        };
        let store_pre_tax = |pre_tax_amount: Decimal| {
            TaxEvent::PreTaxAmountStored(PreTaxAmountStored {
                item_id: item.id(),
                pre_tax_amount,
                occurred_at,
            })
        };

        let zone = match zone {
            Some(zone) if !relevant.is_empty() => zone,
            _ => {
                if !existing.is_empty() {
                    record(&mut scratch, purge(existing));
                    record(&mut scratch, store_pre_tax(Decimal::ZERO));
                }
                return Ok(events);
            }
        };

        if !existing.is_empty() {
            record(&mut scratch, purge(existing));
        }

        let pre_tax = pre_tax_amount(&scratch, &relevant)?;
        record(&mut scratch, store_pre_tax(pre_tax));

        for rate in relevant {
            if let Some(adjustment) = rate.adjustment_for(&self.config, zone, &scratch)? {
                record(
                    &mut scratch,
                    TaxEvent::TaxAdjustmentCreated(TaxAdjustmentCreated {
                        item_id: item.id(),
                        adjustment,
                        occurred_at,
                    }),
                );
            }
        }

        Ok(events)
    }
}

/// Discounted amount with every inclusive rate backed out, rounded to cents.
fn pre_tax_amount(item: &TaxableItem, rates: &[&TaxRate]) -> DomainResult<Decimal> {
    let included: Decimal = rates
        .iter()
        .filter(|r| r.is_included_in_price())
        .map(|r| r.amount())
        .sum();

    let amount = item.discounted_amount();
    if included.is_zero() {
        return Ok(round_to_cents(amount));
    }

    let divided = amount
        .checked_div(Decimal::ONE + included)
        .ok_or_else(|| DomainError::invariant("pre-tax amount overflow"))?;
    Ok(round_to_cents(divided))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustment::Adjustment;
    use crate::calculator::Calculator;
    use crate::category::TaxCategory;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use shopkeep_core::{CountryId, LineItemId, OrderId, ShipmentId, StateId, VariantId};

    fn at() -> DateTime<Utc> {
        Utc::now()
    }

    fn line_item(price: Decimal, category: &TaxCategory) -> TaxableItem {
        TaxableItem::line_item(
            LineItemId::new(),
            OrderId::new(),
            VariantId::new(),
            price,
            1,
            Some(category.id),
        )
    }

    /// Summary of an item's tax adjustments that ignores generated ids.
    fn tax_summary(item: &TaxableItem) -> Vec<(Option<TaxRateId>, Decimal, bool, String)> {
        let mut summary: Vec<_> = item
            .tax_adjustments()
            .map(|a| (a.tax_rate_id(), a.amount, a.included, a.label.clone()))
            .collect();
        summary.sort();
        summary
    }

    #[derive(Debug)]
    struct Broken;

    impl Calculator for Broken {
        fn description(&self) -> &'static str {
            "Broken"
        }

        fn compute(&self, _rate: &TaxRate, _item: &TaxableItem) -> DomainResult<Decimal> {
            Err(DomainError::invariant("calculator unavailable"))
        }
    }

    /// Germany is the default tax zone; books and clothes are taxed EU-wide,
    /// digital goods per country.
    struct Europe {
        germany: Zone,
        romania: Zone,
        world: Zone,
        books: TaxCategory,
        normal: TaxCategory,
        digital: TaxCategory,
        resolver: TaxResolver,
    }

    fn europe() -> Europe {
        let de = CountryId::new();
        let ro = CountryId::new();
        let germany = Zone::countries("Germany", [de]).with_default_tax();
        let romania = Zone::countries("Romania", [ro]);
        let eu = Zone::countries("EU", [de, ro]);
        let world = Zone::countries("World", [CountryId::new()]);

        let books = TaxCategory::new("Books");
        let normal = TaxCategory::new("Normal");
        let digital = TaxCategory::new("Digital Goods");

        let rates = vec![
            TaxRate::new(dec!(0.07), eu.clone(), books.clone()).included_in_price(),
            TaxRate::new(dec!(0.19), eu.clone(), normal.clone()).included_in_price(),
            TaxRate::new(dec!(0.19), germany.clone(), digital.clone()).included_in_price(),
            TaxRate::new(dec!(0.24), romania.clone(), digital.clone()).included_in_price(),
        ];
        let resolver = TaxResolver::new(TaxConfig::new(Some(germany.clone())), rates).unwrap();

        Europe {
            germany,
            romania,
            world,
            books,
            normal,
            digital,
            resolver,
        }
    }

    #[test]
    fn match_without_zone_is_empty() {
        let eu = europe();
        assert!(eu.resolver.match_rates(None).is_empty());
    }

    #[test]
    fn match_without_matching_or_default_rates_is_empty() {
        let zone = Zone::countries("Country Zone", [CountryId::new()]);
        let other = Zone::countries("Elsewhere", [CountryId::new()]);
        let rate = TaxRate::new(dec!(1), other, TaxCategory::new("Any"));
        let resolver = TaxResolver::new(TaxConfig::default(), vec![rate]).unwrap();

        assert!(resolver.match_rates(Some(&zone)).is_empty());
    }

    #[test]
    fn match_returns_rates_of_containing_zones() {
        let us = CountryId::new();
        let ny = StateId::new();
        let country_zone = Zone::countries("US", [us]);
        let state_zone = Zone::states("NY", [(ny, us)]);
        let category = TaxCategory::new("Books");

        let r1 = TaxRate::new(dec!(0.05), country_zone.clone(), category.clone());
        let r2 = TaxRate::new(dec!(0.02), country_zone.clone(), category.clone());
        let ids = [r1.id_typed(), r2.id_typed()];
        let resolver = TaxResolver::new(TaxConfig::default(), vec![r1, r2]).unwrap();

        let matched: Vec<TaxRateId> = resolver
            .match_rates(Some(&state_zone))
            .iter()
            .map(|r| r.id_typed())
            .collect();
        assert_eq!(matched, ids);
    }

    #[test]
    fn default_vat_matches_any_zone_but_additive_default_rate_does_not() {
        let home = Zone::countries("Home", [CountryId::new()]).with_default_tax();
        let other = Zone::countries("Other", [CountryId::new()]);
        let config = TaxConfig::new(Some(home.clone()));

        let vat = TaxRate::new(dec!(0.2), home.clone(), TaxCategory::new("Normal")).included_in_price();
        let resolver = TaxResolver::new(config.clone(), vec![vat]).unwrap();
        assert_eq!(resolver.match_rates(Some(&other)).len(), 1);
        assert_eq!(resolver.match_rates(Some(&home)).len(), 1);

        let sales_tax = TaxRate::new(dec!(0.2), home.clone(), TaxCategory::new("Normal"));
        let resolver = TaxResolver::new(config, vec![sales_tax]).unwrap();
        assert!(resolver.match_rates(Some(&other)).is_empty());
        assert_eq!(resolver.match_rates(Some(&home)).len(), 1);
    }

    #[test]
    fn default_rate_dropped_when_destination_rate_covers_category() {
        let eu = europe();
        let matched = eu.resolver.match_rates(Some(&eu.romania));

        let digital: Vec<Decimal> = matched
            .iter()
            .filter(|r| r.tax_category().id == eu.digital.id)
            .map(|r| r.amount())
            .collect();
        assert_eq!(digital, vec![dec!(0.24)]);
    }

    #[test]
    fn resolver_rejects_inclusive_rate_without_default_zone() {
        let zone = Zone::countries("DE", [CountryId::new()]);
        let rate = TaxRate::new(dec!(0.19), zone, TaxCategory::new("Normal")).included_in_price();

        let err = TaxResolver::new(TaxConfig::default(), vec![rate]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn duplicate_rate_ids_conflict() {
        let zone = Zone::countries("US", [CountryId::new()]);
        let rate = TaxRate::new(dec!(0.1), zone, TaxCategory::new("Normal"));
        let mut resolver = TaxResolver::new(TaxConfig::default(), vec![rate.clone()]).unwrap();

        assert!(matches!(resolver.add_rate(rate), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn germany_book_has_included_tax() {
        let eu = europe();
        let mut items = vec![line_item(dec!(20), &eu.books)];

        let report = eu.resolver.adjust(Some(&eu.germany), &mut items, at());
        assert!(report.is_clean());

        let item = &items[0];
        assert_eq!(item.tax_adjustments().count(), 1);
        assert_eq!(item.pre_tax_amount(), dec!(18.69));
        assert_eq!(item.included_tax_total(), dec!(1.31));
        assert_eq!(item.total(), dec!(20));
    }

    #[test]
    fn germany_sweater_and_download() {
        let eu = europe();
        let mut items = vec![line_item(dec!(30), &eu.normal), line_item(dec!(10), &eu.digital)];

        eu.resolver.adjust(Some(&eu.germany), &mut items, at());

        assert_eq!(items[0].included_tax_total(), dec!(4.79));
        assert_eq!(items[0].pre_tax_amount(), dec!(25.21));
        assert_eq!(items[1].included_tax_total(), dec!(1.60));
        assert_eq!(items[1].pre_tax_amount(), dec!(8.40));
    }

    #[test]
    fn romania_book_keeps_eu_rate() {
        let eu = europe();
        let mut items = vec![line_item(dec!(20), &eu.books)];

        eu.resolver.adjust(Some(&eu.romania), &mut items, at());

        let item = &items[0];
        assert_eq!(item.tax_adjustments().count(), 1);
        assert_eq!(item.included_tax_total(), dec!(1.31));
        assert_eq!(item.pre_tax_amount(), dec!(18.69));
        assert_eq!(item.total(), dec!(20));
    }

    #[test]
    fn romania_download_uses_only_romanian_rate() {
        let eu = europe();
        let mut items = vec![line_item(dec!(10), &eu.digital)];

        eu.resolver.adjust(Some(&eu.romania), &mut items, at());

        let item = &items[0];
        assert_eq!(item.tax_adjustments().count(), 1);
        assert_eq!(item.pre_tax_amount(), dec!(8.06));
        assert_eq!(item.included_tax_total(), dec!(1.93));
    }

    #[test]
    fn delivery_outside_default_zone_refunds_included_tax() {
        let eu = europe();
        let mut items = vec![line_item(dec!(30), &eu.normal)];

        eu.resolver.adjust(Some(&eu.world), &mut items, at());

        let item = &items[0];
        let adjustments: Vec<&Adjustment> = item.tax_adjustments().collect();
        assert_eq!(adjustments.len(), 1);
        // -(19% of the 25.21 pre-tax base)
        assert_eq!(adjustments[0].amount, dec!(-4.79));
        assert!(!adjustments[0].included);
        assert!(adjustments[0].label.starts_with("Refund "));
        assert_eq!(item.included_tax_total(), dec!(0));
        assert_eq!(item.pre_tax_amount(), dec!(25.21));
        assert_eq!(item.total(), dec!(25.21));
    }

    #[test]
    fn world_book_sells_at_net_price() {
        let eu = europe();
        let mut items = vec![line_item(dec!(20), &eu.books)];

        eu.resolver.adjust(Some(&eu.world), &mut items, at());

        assert_eq!(items[0].total(), dec!(18.69));
        assert_eq!(items[0].pre_tax_amount(), dec!(18.69));
        assert_eq!(items[0].additional_tax_total(), dec!(-1.31));
    }

    struct NewYork {
        new_york: Zone,
        books: TaxCategory,
        normal: TaxCategory,
        digital: TaxCategory,
        rates: Vec<TaxRate>,
    }

    fn new_york() -> NewYork {
        let us = CountryId::new();
        let ny = StateId::new();
        let new_york = Zone::states("New York", [(ny, us)]);
        let united_states = Zone::countries("United States", [us]);

        let books = TaxCategory::new("Books");
        let normal = TaxCategory::new("Normal");
        let digital = TaxCategory::new("Digital Goods");

        let rates = vec![
            TaxRate::new(dec!(0.05), new_york.clone(), books.clone()),
            TaxRate::new(dec!(0.10), united_states.clone(), books.clone()),
            TaxRate::new(dec!(0.20), united_states, digital.clone()),
        ];

        NewYork {
            new_york,
            books,
            normal,
            digital,
            rates,
        }
    }

    #[test]
    fn new_york_book_gets_state_and_federal_tax() {
        let ny = new_york();
        let resolver = TaxResolver::new(TaxConfig::default(), ny.rates.clone()).unwrap();
        let mut items = vec![line_item(dec!(20), &ny.books)];

        resolver.adjust(Some(&ny.new_york), &mut items, at());

        let item = &items[0];
        assert_eq!(item.tax_adjustments().count(), 2);
        assert_eq!(item.included_tax_total(), dec!(0));
        assert_eq!(item.additional_tax_total(), dec!(3));
        assert_eq!(item.total(), dec!(23));
        assert_eq!(item.pre_tax_amount(), dec!(20));
    }

    #[test]
    fn new_york_untaxed_and_digital_items() {
        let ny = new_york();
        let resolver = TaxResolver::new(TaxConfig::default(), ny.rates.clone()).unwrap();
        let mut items = vec![line_item(dec!(30), &ny.normal), line_item(dec!(10), &ny.digital)];

        resolver.adjust(Some(&ny.new_york), &mut items, at());

        assert_eq!(items[0].tax_adjustments().count(), 0);
        assert_eq!(items[0].total(), dec!(30));
        assert_eq!(items[1].tax_adjustments().count(), 1);
        assert_eq!(items[1].additional_tax_total(), dec!(2));
        assert_eq!(items[1].total(), dec!(12));
    }

    #[test]
    fn no_tax_zone_creates_no_adjustments() {
        let ny = new_york();
        let resolver = TaxResolver::new(TaxConfig::default(), ny.rates.clone()).unwrap();
        let mut items = vec![line_item(dec!(20), &ny.books)];

        let report = resolver.adjust(None, &mut items, at());

        assert!(report.is_clean());
        assert!(items[0].adjustments().is_empty());
    }

    #[test]
    fn exclusive_rate_adds_on_top() {
        let zone = Zone::countries("US", [CountryId::new()]);
        let category = TaxCategory::new("Normal");
        let rate = TaxRate::new(dec!(0.10), zone.clone(), category.clone());
        let resolver = TaxResolver::new(TaxConfig::default(), vec![rate]).unwrap();
        let mut items = vec![line_item(dec!(20.00), &category)];

        resolver.adjust(Some(&zone), &mut items, at());

        let amounts: Vec<Decimal> = items[0].tax_adjustments().map(|a| a.amount).collect();
        assert_eq!(amounts, vec![dec!(2.00)]);
        assert_eq!(items[0].pre_tax_amount(), dec!(20.00));
    }

    #[test]
    fn only_rates_for_the_item_category_apply_to_shipments() {
        let ny = new_york();
        let resolver = TaxResolver::new(TaxConfig::default(), ny.rates.clone()).unwrap();
        let mut items = vec![TaxableItem::shipment(
            ShipmentId::new(),
            OrderId::new(),
            dec!(10.0),
            Some(ny.digital.id),
        )];

        resolver.adjust(Some(&ny.new_york), &mut items, at());

        let amounts: Vec<Decimal> = items[0].tax_adjustments().map(|a| a.amount).collect();
        assert_eq!(amounts, vec![dec!(2.00)]);
    }

    #[test]
    fn stale_tax_is_purged_when_category_no_longer_covered() {
        let ny = new_york();
        let resolver = TaxResolver::new(TaxConfig::default(), ny.rates.clone()).unwrap();
        let mut items = vec![line_item(dec!(20), &ny.books)];
        resolver.adjust(Some(&ny.new_york), &mut items, at());
        assert_eq!(items[0].tax_adjustments().count(), 2);

        let elsewhere = Zone::countries("Canada", [CountryId::new()]);
        let plans = resolver.plan_items(Some(&elsewhere), &items, at());
        let events = plans[0].outcome.clone().unwrap();
        assert_eq!(events.len(), 2);

        resolver.adjust(Some(&elsewhere), &mut items, at());
        assert_eq!(items[0].tax_adjustments().count(), 0);
        assert_eq!(items[0].pre_tax_amount(), dec!(0));
    }

    #[test]
    fn untaxed_item_without_adjustments_gets_no_events() {
        let ny = new_york();
        let resolver = TaxResolver::new(TaxConfig::default(), ny.rates.clone()).unwrap();
        let items = vec![line_item(dec!(30), &ny.normal)];

        let plans = resolver.plan_items(Some(&ny.new_york), &items, at());
        assert_eq!(plans[0].outcome, Ok(vec![]));
    }

    #[test]
    fn promotions_survive_recomputation_and_reduce_the_base() {
        let ny = new_york();
        let resolver = TaxResolver::new(TaxConfig::default(), ny.rates.clone()).unwrap();
        let item = line_item(dec!(20), &ny.books);
        let promo = Adjustment::promotion(item.id(), item.order_id(), "TENOFF", dec!(-10));
        let mut items = vec![item.with_adjustment(promo)];

        resolver.adjust(Some(&ny.new_york), &mut items, at());
        resolver.adjust(Some(&ny.new_york), &mut items, at());

        assert_eq!(items[0].adjustments().iter().filter(|a| a.is_promotion()).count(), 1);
        assert_eq!(items[0].additional_tax_total(), dec!(1.50));
        assert_eq!(items[0].total(), dec!(11.50));
    }

    #[test]
    fn adjust_is_idempotent() {
        let eu = europe();
        let mut items = vec![
            line_item(dec!(20), &eu.books),
            line_item(dec!(30), &eu.normal),
            line_item(dec!(10), &eu.digital),
        ];

        eu.resolver.adjust(Some(&eu.world), &mut items, at());
        let first: Vec<_> = items.iter().map(tax_summary).collect();
        let first_pre_tax: Vec<_> = items.iter().map(|i| i.pre_tax_amount()).collect();

        eu.resolver.adjust(Some(&eu.world), &mut items, at());
        let second: Vec<_> = items.iter().map(tax_summary).collect();
        let second_pre_tax: Vec<_> = items.iter().map(|i| i.pre_tax_amount()).collect();

        assert_eq!(first, second);
        assert_eq!(first_pre_tax, second_pre_tax);
    }

    #[test]
    fn failing_item_does_not_block_siblings() {
        let zone = Zone::countries("US", [CountryId::new()]);
        let good = TaxCategory::new("Normal");
        let bad = TaxCategory::new("Exotic");
        let rates = vec![
            TaxRate::new(dec!(0.10), zone.clone(), good.clone()),
            TaxRate::new(dec!(0.10), zone.clone(), bad.clone()).with_calculator(Broken),
        ];
        let resolver = TaxResolver::new(TaxConfig::default(), rates).unwrap();

        let failing = line_item(dec!(50), &bad);
        let failing_id = failing.id();
        let mut items = vec![failing, line_item(dec!(20), &good)];
        let before = items[0].clone();

        let report = resolver.adjust(Some(&zone), &mut items, at());

        assert_eq!(report.adjusted, vec![items[1].id()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, failing_id);
        assert_eq!(items[0], before);
        assert_eq!(items[1].additional_tax_total(), dec!(2.00));
    }

    #[test]
    fn retiring_rate_purges_open_and_detaches_completed() {
        let ny = new_york();
        let federal_books = ny.rates[1].id_typed();
        let mut resolver = TaxResolver::new(TaxConfig::default(), ny.rates.clone()).unwrap();

        let mut items = vec![
            line_item(dec!(20), &ny.books),
            line_item(dec!(20), &ny.books).with_order_completed(true),
        ];
        resolver.adjust(Some(&ny.new_york), &mut items, at());

        let plans = resolver.retire_rate(federal_books, &items, at()).unwrap();
        assert_eq!(plans.len(), 2);
        for (item, plan) in items.iter_mut().zip(&plans) {
            for event in plan.outcome.as_ref().unwrap() {
                item.apply(event);
            }
        }

        assert_eq!(items[0].tax_adjustments().count(), 1);
        assert_eq!(items[1].tax_adjustments().count(), 2);
        assert!(items[1].tax_adjustments().any(|a| a.tax_rate_id().is_none()));

        assert!(!resolver.rate(federal_books).unwrap().is_active());
        assert_eq!(resolver.match_rates(Some(&ny.new_york)).len(), 2);
        assert_eq!(
            resolver.retire_rate(federal_books, &items, at()),
            Err(DomainError::NotFound)
        );
    }

    #[test]
    fn planning_a_retirement_leaves_the_rate_active() {
        let ny = new_york();
        let federal_books = ny.rates[1].id_typed();
        let mut resolver = TaxResolver::new(TaxConfig::default(), ny.rates.clone()).unwrap();
        let mut items = vec![line_item(dec!(20), &ny.books)];
        resolver.adjust(Some(&ny.new_york), &mut items, at());

        let first = resolver.plan_retirement(federal_books, &items, at()).unwrap();
        let second = resolver.plan_retirement(federal_books, &items, at()).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert!(resolver.rate(federal_books).unwrap().is_active());

        resolver.mark_retired(federal_books, at()).unwrap();
        assert!(!resolver.rate(federal_books).unwrap().is_active());
        assert_eq!(
            resolver.plan_retirement(federal_books, &items, at()),
            Err(DomainError::NotFound)
        );
        assert_eq!(resolver.mark_retired(federal_books, at()), Err(DomainError::NotFound));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: adjusting twice yields the same adjustments as adjusting once.
        #[test]
        fn adjust_twice_equals_adjust_once(
            cents in 1i64..10_000_000i64,
            rate_bp in 0i64..5_000i64,
            inclusive in any::<bool>(),
            ship_home in any::<bool>(),
        ) {
            let home = Zone::countries("Home", [CountryId::new()]).with_default_tax();
            let abroad = Zone::countries("Abroad", [CountryId::new()]);
            let category = TaxCategory::new("Normal");
            let mut rate = TaxRate::new(Decimal::new(rate_bp, 4), home.clone(), category.clone());
            if inclusive {
                rate = rate.included_in_price();
            }
            let resolver = TaxResolver::new(TaxConfig::new(Some(home.clone())), vec![rate]).unwrap();
            let zone = if ship_home { &home } else { &abroad };

            let mut items = vec![line_item(Decimal::new(cents, 2), &category)];
            resolver.adjust(Some(zone), &mut items, at());
            let once = (tax_summary(&items[0]), items[0].pre_tax_amount());
            resolver.adjust(Some(zone), &mut items, at());
            let twice = (tax_summary(&items[0]), items[0].pre_tax_amount());

            prop_assert_eq!(once, twice);
        }

        /// Property: an inclusive rate never changes what a home customer pays.
        #[test]
        fn inclusive_tax_keeps_home_price(cents in 1i64..10_000_000i64, rate_bp in 1i64..5_000i64) {
            let home = Zone::countries("Home", [CountryId::new()]).with_default_tax();
            let category = TaxCategory::new("Normal");
            let rate = TaxRate::new(Decimal::new(rate_bp, 4), home.clone(), category.clone())
                .included_in_price();
            let resolver = TaxResolver::new(TaxConfig::new(Some(home.clone())), vec![rate]).unwrap();

            let price = Decimal::new(cents, 2);
            let mut items = vec![line_item(price, &category)];
            resolver.adjust(Some(&home), &mut items, at());

            prop_assert_eq!(items[0].total(), price);
            prop_assert!(items[0].pre_tax_amount() <= price);
        }
    }
}
