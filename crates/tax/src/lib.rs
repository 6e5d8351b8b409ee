//! Tax module: rate matching and tax adjustment of taxable items.
//!
//! Pure domain logic only: the resolver decides which adjustments an item
//! should carry and expresses that as [`TaxEvent`]s. Storing the results is
//! the caller's concern.

pub mod adjustment;
pub mod calculator;
pub mod category;
pub mod config;
pub mod event;
pub mod item;
pub mod rate;
pub mod resolver;

pub use adjustment::{Adjustment, AdjustmentSource};
pub use calculator::{Calculator, DefaultTax, FlatRate};
pub use category::TaxCategory;
pub use config::TaxConfig;
pub use event::{
    PreTaxAmountStored, TaxAdjustmentCreated, TaxAdjustmentDetached, TaxAdjustmentsPurged,
    TaxEvent,
};
pub use item::{TaxableItem, TaxableItemId, TaxableKind};
pub use rate::{RateStatus, TaxRate};
pub use resolver::{AdjustReport, ItemPlan, TaxResolver};
