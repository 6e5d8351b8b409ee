//! Explicit stock configuration.

use serde::{Deserialize, Serialize};

/// Storefront surface shipping methods are offered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayChannel {
    Frontend,
    Backend,
}

/// Settings for packaging and shipping method selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockConfig {
    /// Restrict offered shipping methods to this channel; `None` offers all.
    pub display_channel: Option<DisplayChannel>,
}

impl StockConfig {
    pub fn for_channel(channel: DisplayChannel) -> Self {
        Self {
            display_channel: Some(channel),
        }
    }
}
