use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopkeep_core::{LineItemId, OrderId, ShipmentId, TaxCategoryId, VariantId};

use crate::adjustment::{Adjustment, AdjustmentSource};
use crate::event::TaxEvent;

/// Identity of a taxable item: a line item or a shipment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum TaxableItemId {
    LineItem(LineItemId),
    Shipment(ShipmentId),
}

impl TaxableItemId {
    pub fn kind_name(&self) -> &'static str {
        match self {
            TaxableItemId::LineItem(_) => "line_item",
            TaxableItemId::Shipment(_) => "shipment",
        }
    }
}

impl core::fmt::Display for TaxableItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TaxableItemId::LineItem(id) => write!(f, "line_item:{id}"),
            TaxableItemId::Shipment(id) => write!(f, "shipment:{id}"),
        }
    }
}

/// What is being taxed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaxableKind {
    LineItem {
        variant_id: VariantId,
        price: Decimal,
        quantity: u32,
    },
    Shipment {
        cost: Decimal,
    },
}

/// A line item or shipment together with its adjustments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxableItem {
    id: TaxableItemId,
    order_id: OrderId,
    kind: TaxableKind,
    tax_category: Option<TaxCategoryId>,
    pre_tax_amount: Decimal,
    order_completed: bool,
    adjustments: Vec<Adjustment>,
}

impl TaxableItem {
    pub fn line_item(
        id: LineItemId,
        order_id: OrderId,
        variant_id: VariantId,
        price: Decimal,
        quantity: u32,
        tax_category: Option<TaxCategoryId>,
    ) -> Self {
        Self {
            id: TaxableItemId::LineItem(id),
            order_id,
            kind: TaxableKind::LineItem {
                variant_id,
                price,
                quantity,
            },
            tax_category,
            pre_tax_amount: Decimal::ZERO,
            order_completed: false,
            adjustments: Vec::new(),
        }
    }

    pub fn shipment(
        id: ShipmentId,
        order_id: OrderId,
        cost: Decimal,
        tax_category: Option<TaxCategoryId>,
    ) -> Self {
        Self {
            id: TaxableItemId::Shipment(id),
            order_id,
            kind: TaxableKind::Shipment { cost },
            tax_category,
            pre_tax_amount: Decimal::ZERO,
            order_completed: false,
            adjustments: Vec::new(),
        }
    }

    /// Attach an existing adjustment (e.g. a promotion loaded from storage).
    pub fn with_adjustment(mut self, adjustment: Adjustment) -> Self {
        self.adjustments.push(adjustment);
        self
    }

    pub fn with_order_completed(mut self, completed: bool) -> Self {
        self.order_completed = completed;
        self
    }

    pub fn id(&self) -> TaxableItemId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn kind(&self) -> &TaxableKind {
        &self.kind
    }

    pub fn tax_category(&self) -> Option<TaxCategoryId> {
        self.tax_category
    }

    /// Stored pre-tax amount (inclusive taxes backed out).
    pub fn pre_tax_amount(&self) -> Decimal {
        self.pre_tax_amount
    }

    pub fn is_order_completed(&self) -> bool {
        self.order_completed
    }

    pub fn adjustments(&self) -> &[Adjustment] {
        &self.adjustments
    }

    pub fn tax_adjustments(&self) -> impl Iterator<Item = &Adjustment> {
        self.adjustments.iter().filter(|a| a.is_tax())
    }

    /// Undiscounted amount: price × quantity, or the shipment cost.
    pub fn amount(&self) -> Decimal {
        match &self.kind {
            TaxableKind::LineItem {
                price, quantity, ..
            } => *price * Decimal::from(*quantity),
            TaxableKind::Shipment { cost } => *cost,
        }
    }

    /// Amount after promotions; the base tax is computed from.
    pub fn discounted_amount(&self) -> Decimal {
        let promo_total: Decimal = self
            .adjustments
            .iter()
            .filter(|a| a.is_promotion())
            .map(|a| a.amount)
            .sum();
        self.amount() + promo_total
    }

    pub fn included_tax_total(&self) -> Decimal {
        self.tax_adjustments()
            .filter(|a| a.included)
            .map(|a| a.amount)
            .sum()
    }

    pub fn additional_tax_total(&self) -> Decimal {
        self.tax_adjustments()
            .filter(|a| !a.included)
            .map(|a| a.amount)
            .sum()
    }

    /// What the customer pays for this item.
    pub fn total(&self) -> Decimal {
        self.discounted_amount() + self.additional_tax_total()
    }

    /// Evolve the item from a single tax event.
    ///
    /// Events addressed to another item are ignored.
    pub fn apply(&mut self, event: &TaxEvent) {
        if event.item_id() != self.id {
            return;
        }

        match event {
            TaxEvent::TaxAdjustmentsPurged(e) => {
                self.adjustments
                    .retain(|a| !(a.is_tax() && e.adjustment_ids.contains(&a.id)));
            }
            TaxEvent::PreTaxAmountStored(e) => {
                self.pre_tax_amount = e.pre_tax_amount;
            }
            TaxEvent::TaxAdjustmentCreated(e) => {
                self.adjustments.push(e.adjustment.clone());
            }
            TaxEvent::TaxAdjustmentDetached(e) => {
                if let Some(adjustment) = self
                    .adjustments
                    .iter_mut()
                    .find(|a| a.id == e.adjustment_id)
                {
                    adjustment.source = AdjustmentSource::Tax { rate: None };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book(price: Decimal, quantity: u32) -> TaxableItem {
        TaxableItem::line_item(
            LineItemId::new(),
            OrderId::new(),
            VariantId::new(),
            price,
            quantity,
            None,
        )
    }

    #[test]
    fn line_item_amount_is_price_times_quantity() {
        assert_eq!(book(dec!(12.50), 3).amount(), dec!(37.50));
    }

    #[test]
    fn promotions_reduce_discounted_amount_and_total() {
        let item = book(dec!(20.00), 1);
        let promo = Adjustment::promotion(item.id(), item.order_id(), "SPRING", dec!(-5.00));
        let item = item.with_adjustment(promo);

        assert_eq!(item.amount(), dec!(20.00));
        assert_eq!(item.discounted_amount(), dec!(15.00));
        assert_eq!(item.total(), dec!(15.00));
        assert_eq!(item.tax_adjustments().count(), 0);
    }

    #[test]
    fn shipment_amount_is_its_cost() {
        let shipment = TaxableItem::shipment(ShipmentId::new(), OrderId::new(), dec!(7.99), None);
        assert_eq!(shipment.amount(), dec!(7.99));
        assert_eq!(shipment.id().kind_name(), "shipment");
    }
}
