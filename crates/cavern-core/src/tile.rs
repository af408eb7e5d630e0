//! Tile-ID catalogue.
//!
//! Level files encode terrain as small integers. Each legal ID belongs to
//! one [`TileCategory`]; wall categories additionally have a *reinforced*
//! variant encoded as `base + 50` ([`REINFORCED_OFFSET`]). Any ID outside
//! the catalogue is illegal and is reported by the validator.
//!
//! | IDs      | Category        | Reinforced IDs |
//! |----------|-----------------|----------------|
//! | 1        | Ground          | -              |
//! | 2–5      | Rubble          | -              |
//! | 6        | Lava            | -              |
//! | 7–10     | Erosion         | -              |
//! | 11       | Water           | -              |
//! | 12       | Slug hole       | -              |
//! | 14–25    | Power path      | -              |
//! | 26–29    | Dirt            | 76–79          |
//! | 30–33    | Loose rock      | 80–83          |
//! | 34–37    | Hard rock       | 84–87          |
//! | 38–41    | Solid rock      | 88–91          |
//! | 42–45    | Crystal seam    | 92–95          |
//! | 46–49    | Ore seam        | 96–99          |
//! | 50–53    | Recharge seam   | 100–103        |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Offset added to a wall's base ID to encode its reinforced variant.
pub const REINFORCED_OFFSET: u16 = 50;

/// Raw tile identifier as stored in a level file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u16);

impl TileId {
    /// Plain ground.
    pub const GROUND: TileId = TileId(1);
    /// Lightest rubble.
    pub const RUBBLE: TileId = TileId(2);
    /// Lava.
    pub const LAVA: TileId = TileId(6);
    /// First erosion stage.
    pub const EROSION: TileId = TileId(7);
    /// Water.
    pub const WATER: TileId = TileId(11);
    /// Slimy slug hole.
    pub const SLUG_HOLE: TileId = TileId(12);
    /// Power path.
    pub const POWER_PATH: TileId = TileId(14);
    /// Dirt wall.
    pub const DIRT: TileId = TileId(26);
    /// Loose rock wall.
    pub const LOOSE_ROCK: TileId = TileId(30);
    /// Hard rock wall.
    pub const HARD_ROCK: TileId = TileId(34);
    /// Solid rock wall (never drillable).
    pub const SOLID_ROCK: TileId = TileId(38);
    /// Crystal seam.
    pub const CRYSTAL_SEAM: TileId = TileId(42);
    /// Ore seam.
    pub const ORE_SEAM: TileId = TileId(46);
    /// Recharge seam.
    pub const RECHARGE_SEAM: TileId = TileId(50);

    /// Classify this ID, or `None` if it is not in the catalogue.
    pub fn classify(self) -> Option<TileKind> {
        if let Some(category) = base_category(self.0) {
            return Some(TileKind {
                category,
                reinforced: false,
            });
        }
        let base = self.0.checked_sub(REINFORCED_OFFSET)?;
        base_category(base)
            .filter(|category| category.is_wall())
            .map(|category| TileKind {
                category,
                reinforced: true,
            })
    }

    /// Whether this ID belongs to the catalogue.
    pub fn is_known(self) -> bool {
        self.classify().is_some()
    }

    /// Category of this ID, if known.
    pub fn category(self) -> Option<TileCategory> {
        self.classify().map(|kind| kind.category)
    }

    /// Whether units can stand on or move through this tile.
    pub fn is_pathable(self) -> bool {
        self.classify().is_some_and(|kind| kind.is_pathable())
    }

    /// Whether this tile can be drilled away.
    pub fn is_drillable(self) -> bool {
        self.classify().is_some_and(|kind| kind.is_drillable())
    }

    /// Whether this ID uses the reinforced encoding.
    pub fn is_reinforced(self) -> bool {
        self.classify().is_some_and(|kind| kind.reinforced)
    }

    /// The reinforced variant of this wall ID, or `None` for non-walls.
    pub fn reinforced(self) -> Option<TileId> {
        let kind = self.classify()?;
        if kind.reinforced {
            return Some(self);
        }
        if !kind.category.is_wall() {
            return None;
        }
        Some(TileId(self.0 + REINFORCED_OFFSET))
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for TileId {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

/// Terrain category a tile ID maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TileCategory {
    /// Open ground.
    Ground,
    /// Rubble left behind after drilling.
    Rubble,
    /// Lava pool.
    Lava,
    /// Ground eroding into lava.
    Erosion,
    /// Water pool.
    Water,
    /// Slug spawn hole.
    SlugHole,
    /// Powered building path.
    PowerPath,
    /// Dirt wall.
    Dirt,
    /// Loose rock wall.
    LooseRock,
    /// Hard rock wall.
    HardRock,
    /// Solid rock wall.
    SolidRock,
    /// Crystal seam wall.
    CrystalSeam,
    /// Ore seam wall.
    OreSeam,
    /// Recharge seam wall.
    RechargeSeam,
}

impl TileCategory {
    /// Every category in catalogue order.
    pub const ALL: [TileCategory; 14] = [
        TileCategory::Ground,
        TileCategory::Rubble,
        TileCategory::Lava,
        TileCategory::Erosion,
        TileCategory::Water,
        TileCategory::SlugHole,
        TileCategory::PowerPath,
        TileCategory::Dirt,
        TileCategory::LooseRock,
        TileCategory::HardRock,
        TileCategory::SolidRock,
        TileCategory::CrystalSeam,
        TileCategory::OreSeam,
        TileCategory::RechargeSeam,
    ];

    /// Floor categories units can traverse.
    pub fn is_pathable(self) -> bool {
        matches!(
            self,
            Self::Ground | Self::Rubble | Self::Erosion | Self::SlugHole | Self::PowerPath
        )
    }

    /// Liquid floors that block movement.
    pub fn is_liquid(self) -> bool {
        matches!(self, Self::Lava | Self::Water)
    }

    /// Wall categories (the ones with a reinforced variant).
    pub fn is_wall(self) -> bool {
        matches!(
            self,
            Self::Dirt
                | Self::LooseRock
                | Self::HardRock
                | Self::SolidRock
                | Self::CrystalSeam
                | Self::OreSeam
                | Self::RechargeSeam
        )
    }

    /// Walls that can be drilled when not reinforced.
    pub fn is_drillable(self) -> bool {
        self.is_wall() && self != Self::SolidRock
    }

    /// Seams that yield a resource when drilled.
    pub fn is_seam(self) -> bool {
        matches!(self, Self::CrystalSeam | Self::OreSeam | Self::RechargeSeam)
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ground => "ground",
            Self::Rubble => "rubble",
            Self::Lava => "lava",
            Self::Erosion => "erosion",
            Self::Water => "water",
            Self::SlugHole => "slug hole",
            Self::PowerPath => "power path",
            Self::Dirt => "dirt",
            Self::LooseRock => "loose rock",
            Self::HardRock => "hard rock",
            Self::SolidRock => "solid rock",
            Self::CrystalSeam => "crystal seam",
            Self::OreSeam => "ore seam",
            Self::RechargeSeam => "recharge seam",
        }
    }
}

impl fmt::Display for TileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified tile: its category plus the reinforced flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileKind {
    /// Base category.
    pub category: TileCategory,
    /// Whether the reinforced encoding was used.
    pub reinforced: bool,
}

impl TileKind {
    /// Whether units can traverse this tile.
    pub fn is_pathable(self) -> bool {
        self.category.is_pathable()
    }

    /// Reinforced walls resist drilling.
    pub fn is_drillable(self) -> bool {
        !self.reinforced && self.category.is_drillable()
    }
}

fn base_category(id: u16) -> Option<TileCategory> {
    let category = match id {
        1 => TileCategory::Ground,
        2..=5 => TileCategory::Rubble,
        6 => TileCategory::Lava,
        7..=10 => TileCategory::Erosion,
        11 => TileCategory::Water,
        12 => TileCategory::SlugHole,
        14..=25 => TileCategory::PowerPath,
        26..=29 => TileCategory::Dirt,
        30..=33 => TileCategory::LooseRock,
        34..=37 => TileCategory::HardRock,
        38..=41 => TileCategory::SolidRock,
        42..=45 => TileCategory::CrystalSeam,
        46..=49 => TileCategory::OreSeam,
        50..=53 => TileCategory::RechargeSeam,
        _ => return None,
    };
    Some(category)
}
