//! Resolve units packaged more than once into exactly one package each.

use shopkeep_core::InventoryUnitId;

use crate::content::ContentState;
use crate::package::Package;

/// Keeps every inventory unit in exactly one package.
///
/// A unit stays in the first package holding it on hand, or failing that the
/// first package holding it backordered, and is removed from all others.
/// Packages left empty are dropped.
#[derive(Debug, Clone)]
pub struct Prioritizer {
    packages: Vec<Package>,
}

impl Prioritizer {
    pub fn new(packages: Vec<Package>) -> Self {
        Self { packages }
    }

    pub fn prioritized_packages(
        mut self,
        inventory_units: impl IntoIterator<Item = InventoryUnitId>,
    ) -> Vec<Package> {
        for unit in inventory_units {
            self.adjust(unit);
        }
        self.packages.retain(|p| !p.is_empty());
        self.packages
    }

    fn adjust(&mut self, unit: InventoryUnitId) {
        let keep = self
            .position_holding(unit, ContentState::OnHand)
            .or_else(|| self.position_holding(unit, ContentState::Backordered));
        let Some(keep) = keep else {
            return;
        };

        for (index, package) in self.packages.iter_mut().enumerate() {
            if index != keep {
                package.remove(unit);
            }
        }
    }

    fn position_holding(&self, unit: InventoryUnitId, state: ContentState) -> Option<usize> {
        self.packages
            .iter()
            .position(|p| p.find_item(unit, Some(state)).is_some())
    }
}
