use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopkeep_core::{Entity, ShipmentId, ShippingMethodId, StockLocationId};

use crate::unit::InventoryUnit;

/// A priced shipping option for a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRate {
    pub shipping_method_id: ShippingMethodId,
    pub cost: Decimal,
    pub selected: bool,
}

impl ShippingRate {
    pub fn new(shipping_method_id: ShippingMethodId, cost: Decimal) -> Self {
        Self {
            shipping_method_id,
            cost,
            selected: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentState {
    #[default]
    Pending,
    Ready,
    Shipped,
    Canceled,
}

/// Units leaving one stock location together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: ShipmentId,
    pub stock_location: StockLocationId,
    pub shipping_rates: Vec<ShippingRate>,
    pub inventory_units: Vec<InventoryUnit>,
    pub state: ShipmentState,
}

impl Shipment {
    pub fn selected_rate(&self) -> Option<&ShippingRate> {
        self.shipping_rates.iter().find(|r| r.selected)
    }

    pub fn cost(&self) -> Decimal {
        self.selected_rate().map(|r| r.cost).unwrap_or(Decimal::ZERO)
    }
}

impl Entity for Shipment {
    type Id = ShipmentId;

    fn id(&self) -> &ShipmentId {
        &self.id
    }
}
