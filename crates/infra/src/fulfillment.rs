//! Fulfillment planning: packages in, shipments out.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::{info, instrument};

use shopkeep_core::InventoryUnitId;
use shopkeep_stock::{
    Package, Prioritizer, Shipment, ShippingCatalog, ShippingMethod, ShippingRate, StockConfig,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FulfillmentError {
    #[error("inventory unit {0} is packaged more than once")]
    DuplicateUnit(InventoryUnitId),

    #[error("inventory unit {0} is not in any package")]
    UnpackagedUnit(InventoryUnitId),
}

/// Turns candidate packages into shipments for one order.
#[derive(Debug, Clone, Default)]
pub struct FulfillmentPlanner {
    config: StockConfig,
}

impl FulfillmentPlanner {
    pub fn new(config: StockConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StockConfig {
        &self.config
    }

    /// Shipping methods a package can be offered on the configured channel.
    pub fn shipping_methods_for(
        &self,
        package: &Package,
        catalog: &impl ShippingCatalog,
    ) -> Vec<ShippingMethod> {
        package.available_shipping_methods(catalog, &self.config)
    }

    /// Prioritise `packages`, check every unit is packaged exactly once, then
    /// convert each package into a pending shipment.
    ///
    /// Units found in the packages but missing from `inventory_units` are
    /// prioritised too, so no unit ends up in two shipments.
    ///
    /// `rate` prices a method for a package; returning `None` leaves the
    /// method out of the shipment's rates. The cheapest rate is preselected.
    #[instrument(skip_all, fields(packages = packages.len(), units = inventory_units.len()))]
    pub fn plan<F>(
        &self,
        packages: Vec<Package>,
        inventory_units: &[InventoryUnitId],
        catalog: &impl ShippingCatalog,
        mut rate: F,
    ) -> Result<Vec<Shipment>, FulfillmentError>
    where
        F: FnMut(&Package, &ShippingMethod) -> Option<ShippingRate>,
    {
        let units = listed_then_packaged(&packages, inventory_units);
        let mut packages = Prioritizer::new(packages).prioritized_packages(units);
        verify_exactly_once(&packages, inventory_units)?;

        for package in &mut packages {
            let view: &Package = package;
            let mut rates: Vec<ShippingRate> = self
                .shipping_methods_for(view, catalog)
                .iter()
                .filter_map(|method| rate(view, method))
                .collect();
            select_cheapest(&mut rates);
            package.set_shipping_rates(rates);
        }

        let shipments: Vec<Shipment> = packages.into_iter().map(Package::into_shipment).collect();
        info!(shipments = shipments.len(), "fulfillment planned");
        Ok(shipments)
    }
}

/// `inventory_units` in order, followed by any other unit the packages hold.
fn listed_then_packaged(
    packages: &[Package],
    inventory_units: &[InventoryUnitId],
) -> Vec<InventoryUnitId> {
    let mut seen: HashSet<InventoryUnitId> = HashSet::new();
    let packaged = packages.iter().flat_map(|p| p.contents()).map(|item| item.unit_id());
    inventory_units
        .iter()
        .copied()
        .chain(packaged)
        .filter(|unit| seen.insert(*unit))
        .collect()
}

fn verify_exactly_once(
    packages: &[Package],
    inventory_units: &[InventoryUnitId],
) -> Result<(), FulfillmentError> {
    let mut seen: HashMap<InventoryUnitId, usize> = HashMap::new();
    for item in packages.iter().flat_map(|p| p.contents()) {
        let count = seen.entry(item.unit_id()).or_default();
        *count += 1;
        if *count > 1 {
            return Err(FulfillmentError::DuplicateUnit(item.unit_id()));
        }
    }

    match inventory_units.iter().find(|unit| !seen.contains_key(*unit)) {
        Some(unit) => Err(FulfillmentError::UnpackagedUnit(*unit)),
        None => Ok(()),
    }
}

fn select_cheapest(rates: &mut [ShippingRate]) {
    for rate in rates.iter_mut() {
        rate.selected = false;
    }
    if let Some(cheapest) = rates.iter_mut().min_by_key(|r| r.cost) {
        cheapest.selected = true;
    }
}
