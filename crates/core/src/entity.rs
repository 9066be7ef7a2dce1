//! Entity traits: identity + tenant ownership.

use crate::id::UserId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

/// An entity that belongs to exactly one tenant (the owning user).
///
/// Ownership is the isolation boundary for every query: a row is only ever
/// visible to the user returned by `owner_id`.
pub trait Owned: Entity {
    fn owner_id(&self) -> UserId;

    fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id() == user
    }
}
