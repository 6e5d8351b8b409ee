//! Stock module: packaging inventory units for shipment.
//!
//! A [`Package`] is a transient grouping of inventory units leaving one stock
//! location. The [`Prioritizer`] makes sure every unit ends up in exactly one
//! package before packages are turned into [`Shipment`]s.

pub mod catalog;
pub mod config;
pub mod content;
pub mod location;
pub mod package;
pub mod prioritizer;
pub mod shipment;
pub mod shipping;
pub mod unit;

pub use catalog::{InMemoryShippingCatalog, ShippingCatalog};
pub use config::{DisplayChannel, StockConfig};
pub use content::{ContentItem, ContentState};
pub use location::StockLocation;
pub use package::Package;
pub use prioritizer::Prioritizer;
pub use shipment::{Shipment, ShipmentState, ShippingRate};
pub use shipping::{DisplayOn, MethodStatus, ShippingCategory, ShippingMethod};
pub use unit::{InventoryUnit, InventoryUnitState, Variant};
