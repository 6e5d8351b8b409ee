//! Geographic zones (tax and shipping jurisdictions).
//!
//! Pure domain logic: zone membership, containment and address matching.

pub mod address;
pub mod zone;

pub use address::Address;
pub use zone::{Zone, ZoneKind, ZoneMember, match_zone};
