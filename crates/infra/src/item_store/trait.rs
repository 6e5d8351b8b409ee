use std::sync::Arc;

use serde_json::Value as JsonValue;
use thiserror::Error;

use shopkeep_core::{OrderId, TaxRateId};
use shopkeep_events::EventEnvelope;
use shopkeep_tax::{TaxEvent, TaxableItem, TaxableItemId};

/// Stream type recorded on journaled tax events.
pub const TAXABLE_ITEM_STREAM: &str = "taxable_item";

/// Item store operation error.
///
/// These are storage failures, as opposed to domain errors raised while
/// deciding what to store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("taxable item not found: {0}")]
    NotFound(TaxableItemId),

    #[error("taxable item already stored: {0}")]
    Conflict(TaxableItemId),

    #[error("event addressed to {event_item} committed to {item}")]
    ForeignEvent {
        item: TaxableItemId,
        event_item: TaxableItemId,
    },

    #[error("failed to serialize event payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence collaborator for taxable items.
///
/// `commit` must be atomic per item: either every event of the batch is
/// applied and journaled, or none is, and no reader observes a partial batch.
pub trait TaxableItemStore: Send + Sync {
    /// Store a new item.
    fn insert(&self, item: TaxableItem) -> Result<(), StoreError>;

    fn load_item(&self, id: TaxableItemId) -> Result<TaxableItem, StoreError>;

    /// Every line item and shipment of an order, in a stable order.
    fn load_order_items(&self, order_id: OrderId) -> Result<Vec<TaxableItem>, StoreError>;

    /// Items carrying at least one adjustment sourced from `rate_id`.
    fn load_items_taxed_by(&self, rate_id: TaxRateId) -> Result<Vec<TaxableItem>, StoreError>;

    /// Apply `events` to one item and journal them, returning the envelopes.
    fn commit(
        &self,
        id: TaxableItemId,
        events: &[TaxEvent],
    ) -> Result<Vec<EventEnvelope<JsonValue>>, StoreError>;

    /// Journaled events of one item, oldest first.
    fn journal(&self, id: TaxableItemId) -> Result<Vec<EventEnvelope<JsonValue>>, StoreError>;
}

impl<S> TaxableItemStore for Arc<S>
where
    S: TaxableItemStore + ?Sized,
{
    fn insert(&self, item: TaxableItem) -> Result<(), StoreError> {
        (**self).insert(item)
    }

    fn load_item(&self, id: TaxableItemId) -> Result<TaxableItem, StoreError> {
        (**self).load_item(id)
    }

    fn load_order_items(&self, order_id: OrderId) -> Result<Vec<TaxableItem>, StoreError> {
        (**self).load_order_items(order_id)
    }

    fn load_items_taxed_by(&self, rate_id: TaxRateId) -> Result<Vec<TaxableItem>, StoreError> {
        (**self).load_items_taxed_by(rate_id)
    }

    fn commit(
        &self,
        id: TaxableItemId,
        events: &[TaxEvent],
    ) -> Result<Vec<EventEnvelope<JsonValue>>, StoreError> {
        (**self).commit(id, events)
    }

    fn journal(&self, id: TaxableItemId) -> Result<Vec<EventEnvelope<JsonValue>>, StoreError> {
        (**self).journal(id)
    }
}
