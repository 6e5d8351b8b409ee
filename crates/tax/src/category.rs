use serde::{Deserialize, Serialize};

use shopkeep_core::{Entity, TaxCategoryId};

/// Classification label attached to taxable items (e.g. "Books", "Digital").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxCategory {
    pub id: TaxCategoryId,
    pub name: String,
    pub tax_code: Option<String>,
    pub is_default: bool,
}

impl TaxCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TaxCategoryId::new(),
            name: name.into(),
            tax_code: None,
            is_default: false,
        }
    }
}

impl Entity for TaxCategory {
    type Id = TaxCategoryId;

    fn id(&self) -> &TaxCategoryId {
        &self.id
    }
}
