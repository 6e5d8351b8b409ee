//! Transient grouping of inventory units awaiting shipment.

use rust_decimal::Decimal;

use shopkeep_core::{
    InventoryUnitId, OrderId, ShipmentId, ShippingCategoryId, ShippingMethodId, unique_by_identity,
};

use crate::catalog::ShippingCatalog;
use crate::config::StockConfig;
use crate::content::{ContentItem, ContentState};
use crate::location::StockLocation;
use crate::shipment::{Shipment, ShipmentState, ShippingRate};
use crate::shipping::ShippingMethod;
use crate::unit::InventoryUnit;

/// Inventory units leaving one stock location, plus candidate shipping rates.
///
/// Holds at most one content item per inventory unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    stock_location: StockLocation,
    contents: Vec<ContentItem>,
    shipping_rates: Vec<ShippingRate>,
}

impl Package {
    pub fn new(stock_location: StockLocation) -> Self {
        Self {
            stock_location,
            contents: Vec::new(),
            shipping_rates: Vec::new(),
        }
    }

    /// Build a package from existing content items; later duplicates are dropped.
    pub fn with_contents(
        stock_location: StockLocation,
        contents: impl IntoIterator<Item = ContentItem>,
    ) -> Self {
        let mut package = Self::new(stock_location);
        for item in contents {
            package.add(item.inventory_unit, item.state);
        }
        package
    }

    pub fn stock_location(&self) -> &StockLocation {
        &self.stock_location
    }

    pub fn contents(&self) -> &[ContentItem] {
        &self.contents
    }

    pub fn shipping_rates(&self) -> &[ShippingRate] {
        &self.shipping_rates
    }

    pub fn set_shipping_rates(&mut self, rates: Vec<ShippingRate>) {
        self.shipping_rates = rates;
    }

    /// Add a unit; a no-op when the unit is already packaged.
    pub fn add(&mut self, inventory_unit: InventoryUnit, state: ContentState) {
        if self.find_item(inventory_unit.id_typed(), None).is_none() {
            self.contents.push(ContentItem::new(inventory_unit, state));
        }
    }

    pub fn add_multiple(
        &mut self,
        inventory_units: impl IntoIterator<Item = InventoryUnit>,
        state: ContentState,
    ) {
        for unit in inventory_units {
            self.add(unit, state);
        }
    }

    /// Take a unit out of the package, returning its content item.
    pub fn remove(&mut self, inventory_unit: InventoryUnitId) -> Option<ContentItem> {
        let index = self
            .contents
            .iter()
            .position(|item| item.unit_id() == inventory_unit)?;
        Some(self.contents.remove(index))
    }

    /// Content item for `inventory_unit`, optionally only in `state`.
    pub fn find_item(
        &self,
        inventory_unit: InventoryUnitId,
        state: Option<ContentState>,
    ) -> Option<&ContentItem> {
        self.contents.iter().find(|item| {
            item.unit_id() == inventory_unit && state.is_none_or(|s| item.state == s)
        })
    }

    /// Number of packaged units, counting only `state` when given.
    pub fn quantity(&self, state: Option<ContentState>) -> u32 {
        self.contents
            .iter()
            .filter(|item| state.is_none_or(|s| item.state == s))
            .map(ContentItem::quantity)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.quantity(None) == 0
    }

    pub fn on_hand(&self) -> impl Iterator<Item = &ContentItem> {
        self.contents.iter().filter(|item| item.is_on_hand())
    }

    pub fn backordered(&self) -> impl Iterator<Item = &ContentItem> {
        self.contents.iter().filter(|item| item.is_backordered())
    }

    pub fn weight(&self) -> Decimal {
        self.contents.iter().map(ContentItem::weight).sum()
    }

    /// Order the packaged units belong to.
    pub fn order_id(&self) -> Option<OrderId> {
        self.contents
            .first()
            .map(|item| item.inventory_unit.order_id())
    }

    /// Distinct shipping categories of the packaged variants, in content order.
    pub fn shipping_categories(&self) -> Vec<ShippingCategoryId> {
        let mut categories: Vec<ShippingCategoryId> = Vec::new();
        for category in self.contents.iter().filter_map(ContentItem::shipping_category) {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        categories
    }

    /// Shipping methods able to carry this package, ordered by id.
    ///
    /// Stock-location methods qualify when every category they require is in
    /// the package. Methods available to all locations qualify when every
    /// package category can use them.
    pub fn shipping_methods(&self, catalog: &impl ShippingCatalog) -> Vec<ShippingMethod> {
        let categories = self.shipping_categories();

        let location_methods = catalog
            .location_methods(self.stock_location.id)
            .into_iter()
            .filter(|m| m.shipping_categories.iter().all(|c| categories.contains(c)));

        let mut shared: Option<Vec<ShippingMethod>> = None;
        for category in &categories {
            let methods: Vec<ShippingMethod> = catalog
                .category_methods(*category)
                .into_iter()
                .filter(|m| m.available_to_all)
                .collect();
            shared = Some(match shared {
                None => methods,
                Some(previous) => {
                    let ids: Vec<ShippingMethodId> = methods.iter().map(|m| m.id).collect();
                    previous.into_iter().filter(|m| ids.contains(&m.id)).collect()
                }
            });
        }

        let candidates = location_methods.chain(shared.unwrap_or_default());
        unique_by_identity(candidates.filter(ShippingMethod::is_active))
    }

    /// [`Self::shipping_methods`] narrowed to the configured display channel.
    pub fn available_shipping_methods(
        &self,
        catalog: &impl ShippingCatalog,
        config: &StockConfig,
    ) -> Vec<ShippingMethod> {
        let methods = self.shipping_methods(catalog);
        match config.display_channel {
            Some(channel) => methods
                .into_iter()
                .filter(|m| m.is_displayed_on(channel))
                .collect(),
            None => methods,
        }
    }

    /// Finalise unit states and turn the package into a pending shipment.
    ///
    /// Callers must first make sure each unit sits in exactly one package.
    pub fn into_shipment(self) -> Shipment {
        let inventory_units = self
            .contents
            .into_iter()
            .map(|item| {
                let mut unit = item.inventory_unit;
                unit.set_state(item.state.into());
                unit
            })
            .collect();

        Shipment {
            id: ShipmentId::new(),
            stock_location: self.stock_location.id,
            shipping_rates: self.shipping_rates,
            inventory_units,
            state: ShipmentState::Pending,
        }
    }
}
