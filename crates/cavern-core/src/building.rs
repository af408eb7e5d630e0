//! Building kinds placed on level cells.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A building occupying a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildingKind {
    /// Tool store: the level's starting building.
    ToolStore,
    /// Small teleport pad.
    TeleportPad,
    /// Docks.
    Docks,
    /// Power station.
    PowerStation,
    /// Support station.
    SupportStation,
    /// Upgrade station.
    UpgradeStation,
    /// Geological center.
    GeologicalCenter,
    /// Ore refinery.
    OreRefinery,
    /// Mining laser.
    MiningLaser,
    /// Super teleport.
    SuperTeleport,
}

impl BuildingKind {
    /// Whether this building acts as a connectivity origin (a start position).
    pub fn is_origin(self) -> bool {
        matches!(self, Self::ToolStore)
    }

    /// Stable name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::ToolStore => "tool store",
            Self::TeleportPad => "teleport pad",
            Self::Docks => "docks",
            Self::PowerStation => "power station",
            Self::SupportStation => "support station",
            Self::UpgradeStation => "upgrade station",
            Self::GeologicalCenter => "geological center",
            Self::OreRefinery => "ore refinery",
            Self::MiningLaser => "mining laser",
            Self::SuperTeleport => "super teleport",
        }
    }

    pub(crate) fn hash_tag(self) -> u32 {
        self as u32 + 1
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
