//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Ord + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Collapse a list of entities to one instance per identity, ordered by id.
///
/// The first occurrence of each identity is kept.
pub fn unique_by_identity<T: Entity>(entities: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for entity in entities {
        if !out.iter().any(|e| e.id() == entity.id()) {
            out.push(entity);
        }
    }
    out.sort_by(|a, b| a.id().cmp(b.id()));
    out
}
