//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Stock items are entities: an update overwrites every mutable field but the
/// item stays "the same" because its id does not change.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
