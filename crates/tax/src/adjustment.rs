use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopkeep_core::{AdjustmentId, OrderId, TaxRateId};

use crate::item::TaxableItemId;

/// Where an adjustment came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdjustmentSource {
    /// Tax-origin adjustment. `rate` is `None` once the rate has been retired
    /// while the adjustment itself had to be kept.
    Tax { rate: Option<TaxRateId> },
    Promotion { code: String },
    Manual,
}

/// Monetary delta attached to a taxable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub id: AdjustmentId,
    pub source: AdjustmentSource,
    pub adjustable: TaxableItemId,
    pub order_id: OrderId,
    pub amount: Decimal,
    pub label: String,
    /// Tax already embedded in the item's price (not added on top).
    pub included: bool,
}

impl Adjustment {
    /// A promotion discount; `amount` is expected to be negative.
    pub fn promotion(
        adjustable: TaxableItemId,
        order_id: OrderId,
        code: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        let code = code.into();
        Self {
            id: AdjustmentId::new(),
            label: format!("Promotion ({code})"),
            source: AdjustmentSource::Promotion { code },
            adjustable,
            order_id,
            amount,
            included: false,
        }
    }

    pub fn is_tax(&self) -> bool {
        matches!(self.source, AdjustmentSource::Tax { .. })
    }

    pub fn is_promotion(&self) -> bool {
        matches!(self.source, AdjustmentSource::Promotion { .. })
    }

    pub fn is_refund(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Rate this adjustment was computed from, if still attached.
    pub fn tax_rate_id(&self) -> Option<TaxRateId> {
        match self.source {
            AdjustmentSource::Tax { rate } => rate,
            _ => None,
        }
    }
}
