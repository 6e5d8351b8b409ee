//! Explicit tax configuration passed to the resolver at construction.

use serde::{Deserialize, Serialize};

use shopkeep_zones::{Address, Zone, match_zone};

/// Tax settings shared by every rate evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxConfig {
    /// The merchant's home tax region (for VAT-style inclusive pricing).
    default_tax_zone: Option<Zone>,
}

impl TaxConfig {
    pub fn new(default_tax_zone: Option<Zone>) -> Self {
        Self { default_tax_zone }
    }

    /// Use the first zone flagged as default tax zone, if any.
    pub fn from_zones(zones: &[Zone]) -> Self {
        Self {
            default_tax_zone: zones.iter().find(|z| z.is_default_tax()).cloned(),
        }
    }

    pub fn default_tax_zone(&self) -> Option<&Zone> {
        self.default_tax_zone.as_ref()
    }

    /// Tax zone of an order shipping to `tax_address`.
    ///
    /// Falls back to the default tax zone when the address matches no zone or
    /// the order has no tax address yet.
    pub fn tax_zone_for<'a>(&'a self, zones: &'a [Zone], tax_address: Option<&Address>) -> Option<&'a Zone> {
        tax_address
            .and_then(|address| match_zone(zones, address))
            .or(self.default_tax_zone.as_ref())
    }
}
