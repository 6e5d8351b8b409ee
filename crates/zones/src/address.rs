use serde::{Deserialize, Serialize};

use shopkeep_core::{CountryId, StateId};

/// The geographic part of a postal address.
///
/// Only the country/state resolution matters for zone matching.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub country: CountryId,
    pub state: Option<StateId>,
}

impl Address {
    pub fn in_country(country: CountryId) -> Self {
        Self {
            country,
            state: None,
        }
    }

    pub fn in_state(country: CountryId, state: StateId) -> Self {
        Self {
            country,
            state: Some(state),
        }
    }
}
