//! Typed representation of a decoded match document.
//!
//! Field names on the wire follow the decoder's camelCase JSON. Every struct
//! keeps the keys it does not model in a flattened `extra` map, so a record
//! survives a load/clean/write cycle unchanged apart from what cleaning does.

mod events;
mod frame;
mod record;

pub use events::{BombEvent, Damage, Flash, Grenade, Kill, Participants, WeaponFire};
pub use frame::{FrameRecord, PlayerState, Position, TeamState};
pub use record::{MatchRecord, RosterEntry, RoundRecord, TeamRoster};

pub type Extra = serde_json::Map<String, serde_json::Value>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Side {
    #[serde(rename = "T")]
    T,
    #[serde(rename = "CT")]
    CT,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::T, Side::CT];

    pub fn opposite(self) -> Self {
        match self {
            Self::T => Self::CT,
            Self::CT => Self::T,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::T => "T",
            Self::CT => "CT",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decoder writes `null` for empty collections and missing team objects.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de> + Default,
{
    use serde::Deserialize;

    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
