//! Taxable item storage boundary.
//!
//! Items are loaded fully materialised (adjustments included) and changed only
//! by committing a batch of [`shopkeep_tax::TaxEvent`]s for one item.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryTaxableItemStore;
pub use r#trait::{StoreError, TaxableItemStore};
