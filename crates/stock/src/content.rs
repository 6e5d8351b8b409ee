use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopkeep_core::{InventoryUnitId, ShippingCategoryId};

use crate::unit::{InventoryUnit, InventoryUnitState, Variant};

/// Whether a packaged unit can ship now or waits for stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentState {
    OnHand,
    Backordered,
}

impl From<ContentState> for InventoryUnitState {
    fn from(state: ContentState) -> Self {
        match state {
            ContentState::OnHand => InventoryUnitState::OnHand,
            ContentState::Backordered => InventoryUnitState::Backordered,
        }
    }
}

/// An inventory unit placed in a package, with its fulfillment state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub inventory_unit: InventoryUnit,
    pub state: ContentState,
}

impl ContentItem {
    pub fn new(inventory_unit: InventoryUnit, state: ContentState) -> Self {
        Self {
            inventory_unit,
            state,
        }
    }

    pub fn unit_id(&self) -> InventoryUnitId {
        self.inventory_unit.id_typed()
    }

    pub fn variant(&self) -> &Variant {
        self.inventory_unit.variant()
    }

    pub fn shipping_category(&self) -> Option<ShippingCategoryId> {
        self.variant().shipping_category
    }

    /// Always one: a content item wraps a single unit.
    pub fn quantity(&self) -> u32 {
        1
    }

    pub fn weight(&self) -> Decimal {
        self.variant().weight
    }

    pub fn is_on_hand(&self) -> bool {
        self.state == ContentState::OnHand
    }

    pub fn is_backordered(&self) -> bool {
        self.state == ContentState::Backordered
    }
}
