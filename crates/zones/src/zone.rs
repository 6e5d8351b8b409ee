use serde::{Deserialize, Serialize};

use shopkeep_core::{CountryId, Entity, StateId, ZoneId};

use crate::address::Address;

/// What a zone is made of: whole countries or individual states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Country,
    State,
}

/// A single member region of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ZoneMember {
    Country(CountryId),
    State { state: StateId, country: CountryId },
}

impl ZoneMember {
    /// Country this member resolves into.
    pub fn country(&self) -> CountryId {
        match self {
            ZoneMember::Country(country) => *country,
            ZoneMember::State { country, .. } => *country,
        }
    }

    pub fn kind(&self) -> ZoneKind {
        match self {
            ZoneMember::Country(_) => ZoneKind::Country,
            ZoneMember::State { .. } => ZoneKind::State,
        }
    }
}

/// Named geographic grouping used as a tax or shipping jurisdiction.
///
/// All members share the zone's kind; the constructors enforce this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    id: ZoneId,
    name: String,
    description: Option<String>,
    kind: ZoneKind,
    members: Vec<ZoneMember>,
    default_tax: bool,
}

impl Zone {
    /// A zone made of whole countries.
    pub fn countries(name: impl Into<String>, countries: impl IntoIterator<Item = CountryId>) -> Self {
        let mut members: Vec<ZoneMember> = Vec::new();
        for country in countries {
            let member = ZoneMember::Country(country);
            if !members.contains(&member) {
                members.push(member);
            }
        }
        Self::build(name.into(), ZoneKind::Country, members)
    }

    /// A zone made of states, each given with the country it belongs to.
    pub fn states(
        name: impl Into<String>,
        states: impl IntoIterator<Item = (StateId, CountryId)>,
    ) -> Self {
        let mut members: Vec<ZoneMember> = Vec::new();
        for (state, country) in states {
            let member = ZoneMember::State { state, country };
            if !members.contains(&member) {
                members.push(member);
            }
        }
        Self::build(name.into(), ZoneKind::State, members)
    }

    fn build(name: String, kind: ZoneKind, members: Vec<ZoneMember>) -> Self {
        Self {
            id: ZoneId::new(),
            name,
            description: None,
            kind,
            members,
            default_tax: false,
        }
    }

    /// Nominate this zone as the merchant's home tax region.
    pub fn with_default_tax(mut self) -> Self {
        self.default_tax = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_id(mut self, id: ZoneId) -> Self {
        self.id = id;
        self
    }

    pub fn id_typed(&self) -> ZoneId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> ZoneKind {
        self.kind
    }

    pub fn members(&self) -> &[ZoneMember] {
        &self.members
    }

    pub fn is_default_tax(&self) -> bool {
        self.default_tax
    }

    fn has_country(&self, country: CountryId) -> bool {
        self.members.contains(&ZoneMember::Country(country))
    }

    /// Whether every region of `target` resolves into one of this zone's members.
    ///
    /// A state zone never contains a country zone, and empty zones contain
    /// nothing and are contained by nothing.
    pub fn contains(&self, target: &Zone) -> bool {
        if self.kind == ZoneKind::State && target.kind == ZoneKind::Country {
            return false;
        }
        if self.members.is_empty() || target.members.is_empty() {
            return false;
        }

        if self.kind == target.kind {
            target.members.iter().all(|m| self.members.contains(m))
        } else {
            target.members.iter().all(|m| self.has_country(m.country()))
        }
    }

    /// Whether the address lies inside this zone.
    pub fn include(&self, address: &Address) -> bool {
        match self.kind {
            ZoneKind::Country => self.has_country(address.country),
            ZoneKind::State => match address.state {
                Some(state) => self.members.iter().any(|m| {
                    matches!(m, ZoneMember::State { state: s, .. } if *s == state)
                }),
                None => false,
            },
        }
    }
}

impl Entity for Zone {
    type Id = ZoneId;

    fn id(&self) -> &ZoneId {
        &self.id
    }
}

/// Most specific zone that includes `address`.
///
/// State zones win over country zones; within a kind the first zone in
/// `zones` wins.
pub fn match_zone<'a>(zones: &'a [Zone], address: &Address) -> Option<&'a Zone> {
    let mut matches = zones.iter().filter(|z| z.include(address));
    let first_state = matches.clone().find(|z| z.kind() == ZoneKind::State);
    first_state.or_else(|| matches.find(|z| z.kind() == ZoneKind::Country))
}
