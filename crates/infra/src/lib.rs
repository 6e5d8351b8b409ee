//! Infrastructure layer: storage adapters, application services, config.
//!
//! The domain crates decide; this crate loads inputs, commits the decided
//! events through a store and logs what happened.

pub mod config;
pub mod fulfillment;
pub mod item_store;
pub mod tax_service;

pub use config::AppConfig;
pub use fulfillment::{FulfillmentError, FulfillmentPlanner};
pub use item_store::{InMemoryTaxableItemStore, StoreError, TaxableItemStore};
pub use tax_service::{OrderTaxReport, ServiceError, TaxService};
