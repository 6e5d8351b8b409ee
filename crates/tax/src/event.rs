use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopkeep_core::AdjustmentId;
use shopkeep_events::Event;

use crate::adjustment::Adjustment;
use crate::item::TaxableItemId;

/// Event: TaxAdjustmentsPurged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAdjustmentsPurged {
    pub item_id: TaxableItemId,
    pub adjustment_ids: Vec<AdjustmentId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PreTaxAmountStored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreTaxAmountStored {
    pub item_id: TaxableItemId,
    pub pre_tax_amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TaxAdjustmentCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAdjustmentCreated {
    pub item_id: TaxableItemId,
    pub adjustment: Adjustment,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TaxAdjustmentDetached (rate retired, adjustment kept).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAdjustmentDetached {
    pub item_id: TaxableItemId,
    pub adjustment_id: AdjustmentId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxEvent {
    TaxAdjustmentsPurged(TaxAdjustmentsPurged),
    PreTaxAmountStored(PreTaxAmountStored),
    TaxAdjustmentCreated(TaxAdjustmentCreated),
    TaxAdjustmentDetached(TaxAdjustmentDetached),
}

impl TaxEvent {
    pub fn item_id(&self) -> TaxableItemId {
        match self {
            TaxEvent::TaxAdjustmentsPurged(e) => e.item_id,
            TaxEvent::PreTaxAmountStored(e) => e.item_id,
            TaxEvent::TaxAdjustmentCreated(e) => e.item_id,
            TaxEvent::TaxAdjustmentDetached(e) => e.item_id,
        }
    }
}

impl Event for TaxEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TaxEvent::TaxAdjustmentsPurged(_) => "tax.adjustments.purged",
            TaxEvent::PreTaxAmountStored(_) => "tax.pre_tax_amount.stored",
            TaxEvent::TaxAdjustmentCreated(_) => "tax.adjustment.created",
            TaxEvent::TaxAdjustmentDetached(_) => "tax.adjustment.detached",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TaxEvent::TaxAdjustmentsPurged(e) => e.occurred_at,
            TaxEvent::PreTaxAmountStored(e) => e.occurred_at,
            TaxEvent::TaxAdjustmentCreated(e) => e.occurred_at,
            TaxEvent::TaxAdjustmentDetached(e) => e.occurred_at,
        }
    }
}
