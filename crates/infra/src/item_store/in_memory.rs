use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use shopkeep_core::{OrderId, TaxRateId};
use shopkeep_events::EventEnvelope;
use shopkeep_tax::{TaxEvent, TaxableItem, TaxableItemId};

use super::r#trait::{StoreError, TAXABLE_ITEM_STREAM, TaxableItemStore};

#[derive(Debug, Clone)]
struct Record {
    item: TaxableItem,
    journal: Vec<EventEnvelope<JsonValue>>,
}

/// In-memory taxable item store.
///
/// Intended for tests/dev. A commit runs under one write lock.
#[derive(Debug, Default)]
pub struct InMemoryTaxableItemStore {
    records: RwLock<HashMap<TaxableItemId, Record>>,
}

impl InMemoryTaxableItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("lock poisoned".to_string())
    }

    fn sorted(mut items: Vec<TaxableItem>) -> Vec<TaxableItem> {
        items.sort_by_key(|item| item.id());
        items
    }
}

impl TaxableItemStore for InMemoryTaxableItemStore {
    fn insert(&self, item: TaxableItem) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        let id = item.id();
        if records.contains_key(&id) {
            return Err(StoreError::Conflict(id));
        }
        records.insert(
            id,
            Record {
                item,
                journal: Vec::new(),
            },
        );
        Ok(())
    }

    fn load_item(&self, id: TaxableItemId) -> Result<TaxableItem, StoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        records
            .get(&id)
            .map(|r| r.item.clone())
            .ok_or(StoreError::NotFound(id))
    }

    fn load_order_items(&self, order_id: OrderId) -> Result<Vec<TaxableItem>, StoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        let items = records
            .values()
            .filter(|r| r.item.order_id() == order_id)
            .map(|r| r.item.clone())
            .collect();
        Ok(Self::sorted(items))
    }

    fn load_items_taxed_by(&self, rate_id: TaxRateId) -> Result<Vec<TaxableItem>, StoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        let items = records
            .values()
            .filter(|r| {
                r.item
                    .tax_adjustments()
                    .any(|a| a.tax_rate_id() == Some(rate_id))
            })
            .map(|r| r.item.clone())
            .collect();
        Ok(Self::sorted(items))
    }

    fn commit(
        &self,
        id: TaxableItemId,
        events: &[TaxEvent],
    ) -> Result<Vec<EventEnvelope<JsonValue>>, StoreError> {
        if let Some(foreign) = events.iter().find(|e| e.item_id() != id) {
            return Err(StoreError::ForeignEvent {
                item: id,
                event_item: foreign.item_id(),
            });
        }

        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        // Build everything first; the record is only touched once nothing can fail.
        let mut next = record.journal.len() as u64 + 1;
        let mut envelopes = Vec::with_capacity(events.len());
        let mut item = record.item.clone();
        for event in events {
            envelopes.push(EventEnvelope::from_typed(
                id.to_string(),
                TAXABLE_ITEM_STREAM,
                next,
                event,
            )?);
            item.apply(event);
            next += 1;
        }

        record.item = item;
        record.journal.extend(envelopes.iter().cloned());
        Ok(envelopes)
    }

    fn journal(&self, id: TaxableItemId) -> Result<Vec<EventEnvelope<JsonValue>>, StoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        records
            .get(&id)
            .map(|r| r.journal.clone())
            .ok_or(StoreError::NotFound(id))
    }
}
