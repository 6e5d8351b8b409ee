//! `shopkeep-core` — shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model and money rounding.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;

pub use entity::{Entity, unique_by_identity};
pub use error::{DomainError, DomainResult};
pub use id::{
    AdjustmentId, CountryId, InventoryUnitId, LineItemId, OrderId, ShipmentId,
    ShippingCategoryId, ShippingMethodId, StateId, StockLocationId, TaxCategoryId, TaxRateId,
    VariantId, ZoneId,
};
pub use money::round_to_cents;
