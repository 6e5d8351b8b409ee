//! Lookup of shipping methods by stock location and shipping category.

use shopkeep_core::{DomainResult, ShippingCategoryId, ShippingMethodId, StockLocationId};

use crate::shipping::ShippingMethod;

/// Read access to the materialised shipping method graph.
///
/// Implementations only ever return active (non-deleted) methods.
pub trait ShippingCatalog {
    /// Methods explicitly attached to a stock location.
    fn location_methods(&self, location: StockLocationId) -> Vec<ShippingMethod>;

    /// Methods that can carry the given shipping category.
    fn category_methods(&self, category: ShippingCategoryId) -> Vec<ShippingMethod>;
}

/// Catalog backed by a plain list of methods.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShippingCatalog {
    methods: Vec<ShippingMethod>,
}

impl InMemoryShippingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a method.
    pub fn insert(&mut self, method: ShippingMethod) -> DomainResult<()> {
        method.validate()?;
        self.methods.push(method);
        Ok(())
    }

    pub fn methods(&self) -> &[ShippingMethod] {
        &self.methods
    }

    pub fn get_mut(&mut self, id: ShippingMethodId) -> Option<&mut ShippingMethod> {
        self.methods.iter_mut().find(|m| m.id == id)
    }

    fn active(&self) -> impl Iterator<Item = &ShippingMethod> {
        self.methods.iter().filter(|m| m.is_active())
    }
}

impl ShippingCatalog for InMemoryShippingCatalog {
    fn location_methods(&self, location: StockLocationId) -> Vec<ShippingMethod> {
        self.active()
            .filter(|m| m.stock_locations.contains(&location))
            .cloned()
            .collect()
    }

    fn category_methods(&self, category: ShippingCategoryId) -> Vec<ShippingMethod> {
        self.active()
            .filter(|m| m.shipping_categories.contains(&category))
            .cloned()
            .collect()
    }
}
