//! Entity trait: records that keep their identity while their fields change.

use core::fmt::Display;
use core::hash::Hash;

/// A stored record addressed by a typed id.
///
/// Ids are small `Copy` newtypes, so they are handed out by value and double
/// as map keys in stores.
pub trait Entity {
    type Id: Copy + Eq + Hash + Display;

    fn id(&self) -> Self::Id;

    /// Same record, regardless of field values.
    fn same_identity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
