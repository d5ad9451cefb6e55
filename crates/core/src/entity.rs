//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Persistence collections key their records by `Entity::id`, so the id must be
/// stable for the whole lifetime of the record.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
