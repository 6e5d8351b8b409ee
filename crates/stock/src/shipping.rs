use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use shopkeep_core::{
    DomainError, DomainResult, Entity, ShippingCategoryId, ShippingMethodId, StockLocationId,
    TaxCategoryId,
};
use shopkeep_zones::{Address, Zone};

use crate::config::DisplayChannel;

/// Everything except RFC 3986 unreserved characters is escaped.
const TRACKING_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const TRACKING_PLACEHOLDER: &str = ":tracking";

/// Groups variants that ship the same way (e.g. "Oversized").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingCategory {
    pub id: ShippingCategoryId,
    pub name: String,
}

impl ShippingCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ShippingCategoryId::new(),
            name: name.into(),
        }
    }
}

impl Entity for ShippingCategory {
    type Id = ShippingCategoryId;

    fn id(&self) -> &ShippingCategoryId {
        &self.id
    }
}

/// Where a shipping method may be picked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayOn {
    #[default]
    Both,
    FrontEnd,
    BackEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodStatus {
    Active,
    Deleted,
}

/// A carrier service customers can choose for a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingMethod {
    pub id: ShippingMethodId,
    pub name: String,
    pub code: Option<String>,
    pub shipping_categories: Vec<ShippingCategoryId>,
    pub zones: Vec<Zone>,
    pub stock_locations: Vec<StockLocationId>,
    /// Offered from every stock location, not just the listed ones.
    pub available_to_all: bool,
    pub display_on: DisplayOn,
    /// URL template with a `:tracking` placeholder.
    pub tracking_url: Option<String>,
    pub tax_category: Option<TaxCategoryId>,
    pub status: MethodStatus,
}

impl ShippingMethod {
    pub fn new(
        name: impl Into<String>,
        shipping_categories: impl IntoIterator<Item = ShippingCategoryId>,
    ) -> Self {
        Self {
            id: ShippingMethodId::new(),
            name: name.into(),
            code: None,
            shipping_categories: shipping_categories.into_iter().collect(),
            zones: Vec::new(),
            stock_locations: Vec::new(),
            available_to_all: true,
            display_on: DisplayOn::Both,
            tracking_url: None,
            tax_category: None,
            status: MethodStatus::Active,
        }
    }

    /// Offer the method only from the given stock locations.
    pub fn restricted_to(mut self, locations: impl IntoIterator<Item = StockLocationId>) -> Self {
        self.available_to_all = false;
        self.stock_locations = locations.into_iter().collect();
        self
    }

    pub fn with_zones(mut self, zones: impl IntoIterator<Item = Zone>) -> Self {
        self.zones = zones.into_iter().collect();
        self
    }

    pub fn with_tracking_url(mut self, template: impl Into<String>) -> Self {
        self.tracking_url = Some(template.into());
        self
    }

    pub fn with_display_on(mut self, display_on: DisplayOn) -> Self {
        self.display_on = display_on;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == MethodStatus::Active
    }

    /// Soft-delete; deleted methods are never offered again.
    pub fn delete(&mut self) {
        self.status = MethodStatus::Deleted;
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("shipping method name is required"));
        }
        if self.shipping_categories.is_empty() {
            return Err(DomainError::validation(
                "a shipping method needs at least one shipping category",
            ));
        }
        Ok(())
    }

    /// Whether any of the method's zones covers `address`.
    pub fn include(&self, address: Option<&Address>) -> bool {
        match address {
            Some(address) => self.zones.iter().any(|z| z.include(address)),
            None => false,
        }
    }

    /// Carrier URL for `tracking`, or `None` when either side is blank.
    pub fn build_tracking_url(&self, tracking: &str) -> Option<String> {
        let template = self.tracking_url.as_deref().filter(|t| !t.trim().is_empty())?;
        if tracking.trim().is_empty() {
            return None;
        }
        let encoded = utf8_percent_encode(tracking, TRACKING_ENCODE_SET).to_string();
        Some(template.replace(TRACKING_PLACEHOLDER, &encoded))
    }

    /// Back-office-only methods are hidden from shoppers.
    pub fn is_frontend(&self) -> bool {
        self.display_on != DisplayOn::BackEnd
    }

    pub fn is_backend(&self) -> bool {
        self.display_on != DisplayOn::FrontEnd
    }

    pub fn is_displayed_on(&self, channel: DisplayChannel) -> bool {
        match channel {
            DisplayChannel::Frontend => self.is_frontend(),
            DisplayChannel::Backend => self.is_backend(),
        }
    }
}

impl Entity for ShippingMethod {
    type Id = ShippingMethodId;

    fn id(&self) -> &ShippingMethodId {
        &self.id
    }
}
