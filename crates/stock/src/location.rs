use serde::{Deserialize, Serialize};

use shopkeep_core::{Entity, StockLocationId};

/// A warehouse or store that packages ship from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLocation {
    pub id: StockLocationId,
    pub name: String,
    pub active: bool,
}

impl StockLocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: StockLocationId::new(),
            name: name.into(),
            active: true,
        }
    }
}

impl Entity for StockLocation {
    type Id = StockLocationId;

    fn id(&self) -> &StockLocationId {
        &self.id
    }
}
