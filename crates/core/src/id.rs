//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered), so identifiers created later sort later.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

uuid_newtype!(
    /// Identifier of a geographic zone.
    ZoneId, "ZoneId"
);
uuid_newtype!(CountryId, "CountryId");
uuid_newtype!(StateId, "StateId");
uuid_newtype!(TaxCategoryId, "TaxCategoryId");
uuid_newtype!(TaxRateId, "TaxRateId");
uuid_newtype!(AdjustmentId, "AdjustmentId");
uuid_newtype!(OrderId, "OrderId");
uuid_newtype!(LineItemId, "LineItemId");
uuid_newtype!(ShipmentId, "ShipmentId");
uuid_newtype!(VariantId, "VariantId");
uuid_newtype!(
    /// Identifier of a physical stock location (warehouse, store).
    StockLocationId, "StockLocationId"
);
uuid_newtype!(InventoryUnitId, "InventoryUnitId");
uuid_newtype!(ShippingMethodId, "ShippingMethodId");
uuid_newtype!(ShippingCategoryId, "ShippingCategoryId");
