//! Application service applying tax at explicit transaction boundaries.
//!
//! ```text
//! adjust_order(order, zone)
//!   ↓
//! 1. Load the order's items from the store
//!   ↓
//! 2. Plan tax events per item (pure, TaxResolver)
//!   ↓
//! 3. Commit each item's plan atomically; a failed item does not stop the rest
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use shopkeep_core::{DomainError, OrderId, TaxRateId};
use shopkeep_tax::{TaxConfig, TaxRate, TaxResolver, TaxableItemId};
use shopkeep_zones::{Address, Zone};

use crate::item_store::{StoreError, TaxableItemStore};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of taxing one order.
#[derive(Debug, Default)]
pub struct OrderTaxReport {
    /// Items whose plan was committed (possibly with no events).
    pub adjusted: Vec<TaxableItemId>,
    pub failed: Vec<(TaxableItemId, ServiceError)>,
}

impl OrderTaxReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Keeps stored items' tax adjustments in line with the configured rates.
pub struct TaxService<S> {
    resolver: TaxResolver,
    store: S,
}

impl<S: TaxableItemStore> TaxService<S> {
    pub fn new(resolver: TaxResolver, store: S) -> Self {
        Self { resolver, store }
    }

    pub fn resolver(&self) -> &TaxResolver {
        &self.resolver
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &TaxConfig {
        self.resolver.config()
    }

    /// Validate and register a new rate.
    pub fn add_rate(&mut self, rate: TaxRate) -> Result<(), ServiceError> {
        let rate_id = rate.id_typed();
        self.resolver.add_rate(rate)?;
        info!(rate_id = %rate_id, "tax rate added");
        Ok(())
    }

    /// Recompute tax for every item of an order shipping into `zone`.
    #[instrument(skip_all, fields(order_id = %order_id, zone = zone.map(Zone::name)))]
    pub fn adjust_order(
        &self,
        order_id: OrderId,
        zone: Option<&Zone>,
        occurred_at: DateTime<Utc>,
    ) -> Result<OrderTaxReport, ServiceError> {
        let items = self.store.load_order_items(order_id)?;
        let plans = self.resolver.plan_items(zone, &items, occurred_at);

        let mut report = OrderTaxReport::default();
        for plan in plans {
            let events = match plan.outcome {
                Ok(events) => events,
                Err(err) => {
                    warn!(item = %plan.item_id, error = %err, "tax planning failed");
                    report.failed.push((plan.item_id, err.into()));
                    continue;
                }
            };

            if events.is_empty() {
                report.adjusted.push(plan.item_id);
                continue;
            }

            match self.store.commit(plan.item_id, &events) {
                Ok(committed) => {
                    debug!(item = %plan.item_id, events = committed.len(), "tax events committed");
                    report.adjusted.push(plan.item_id);
                }
                Err(err) => {
                    warn!(item = %plan.item_id, error = %err, "tax commit failed");
                    report.failed.push((plan.item_id, err.into()));
                }
            }
        }

        info!(
            adjusted = report.adjusted.len(),
            failed = report.failed.len(),
            "order tax adjusted"
        );
        Ok(report)
    }

    /// Like [`Self::adjust_order`], resolving the tax zone from the order's
    /// tax address (or the default tax zone).
    pub fn adjust_order_for_address(
        &self,
        order_id: OrderId,
        zones: &[Zone],
        tax_address: Option<&Address>,
        occurred_at: DateTime<Utc>,
    ) -> Result<OrderTaxReport, ServiceError> {
        let zone = self.config().tax_zone_for(zones, tax_address);
        self.adjust_order(order_id, zone, occurred_at)
    }

    /// Retire a rate and clean up the adjustments it produced.
    ///
    /// Unlike order adjustment this stops at the first failing commit. The
    /// rate stays active until every item is committed, so a failed call can
    /// be retried and picks up the items still carrying its adjustments.
    #[instrument(skip_all, fields(rate_id = %rate_id))]
    pub fn retire_rate(
        &mut self,
        rate_id: TaxRateId,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<TaxableItemId>, ServiceError> {
        let items = self.store.load_items_taxed_by(rate_id)?;
        let plans = self.resolver.plan_retirement(rate_id, &items, occurred_at)?;

        let mut touched = Vec::with_capacity(plans.len());
        for plan in plans {
            let events = plan.outcome?;
            if let Err(err) = self.store.commit(plan.item_id, &events) {
                warn!(item = %plan.item_id, error = %err, "rate retirement commit failed");
                return Err(err.into());
            }
            touched.push(plan.item_id);
        }

        self.resolver.mark_retired(rate_id, occurred_at)?;
        info!(items = touched.len(), "tax rate retired");
        Ok(touched)
    }
}
