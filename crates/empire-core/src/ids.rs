//! Typed identifiers.
//!
//! Agents, dragons and structures live in the hecs world, so their ids wrap
//! a generational `hecs::Entity`: a despawned id never resolves again, which
//! is what lets every cross-entity link be a weak reference. Quests,
//! questlines and parties are bookkeeping records kept outside the ECS and
//! use plain counters.

use std::fmt;

use hecs::Entity;
use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Entity);

        impl $name {
            pub fn entity(self) -> Entity {
                self.0
            }

            /// Stable numeric form used by snapshots and logs.
            pub fn to_bits(self) -> u64 {
                self.0.to_bits().get()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.to_bits())
            }
        }
    };
}

macro_rules! record_id {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

entity_id!(AgentId, "agent");
entity_id!(DragonId, "dragon");
entity_id!(StructureId, "structure");

record_id!(QuestId, "quest");
record_id!(QuestlineId, "questline");
record_id!(PartyId, "party");
