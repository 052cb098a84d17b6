//! Opaque identifiers threaded through the engine.
//!
//! Seat *position* (1..10, see `Table`) is distinct from occupant
//! *identity*: a player keeps the same `PlayerId` across hands even as
//! they move seats or sit out.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! newtype_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

newtype_id!(TableId);
newtype_id!(HandId);
newtype_id!(PlayerId);
newtype_id!(ConnectionId);

/// A player's seat position at the table, 1..=10. Stable only for the
/// lifetime of the player's occupancy of that seat.
pub type Seat = u8;
