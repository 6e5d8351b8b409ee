use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopkeep_core::{Entity, InventoryUnitId, OrderId, ShippingCategoryId, VariantId};

/// The slice of a product variant that packaging needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub shipping_category: Option<ShippingCategoryId>,
    pub weight: Decimal,
}

impl Variant {
    pub fn new(shipping_category: Option<ShippingCategoryId>, weight: Decimal) -> Self {
        Self {
            id: VariantId::new(),
            shipping_category,
            weight,
        }
    }
}

/// Fulfillment state of an inventory unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryUnitState {
    OnHand,
    Backordered,
    Shipped,
    Returned,
}

/// One physical unit of a variant ordered by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryUnit {
    id: InventoryUnitId,
    order_id: OrderId,
    variant: Variant,
    state: InventoryUnitState,
}

impl InventoryUnit {
    /// A fresh unit; it stays on hand until a package says otherwise.
    pub fn new(order_id: OrderId, variant: Variant) -> Self {
        Self {
            id: InventoryUnitId::new(),
            order_id,
            variant,
            state: InventoryUnitState::OnHand,
        }
    }

    pub fn id_typed(&self) -> InventoryUnitId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    pub fn state(&self) -> InventoryUnitState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: InventoryUnitState) {
        self.state = state;
    }
}

impl Entity for InventoryUnit {
    type Id = InventoryUnitId;

    fn id(&self) -> &InventoryUnitId {
        &self.id
    }
}
