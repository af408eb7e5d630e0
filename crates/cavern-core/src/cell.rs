//! A single grid cell.

use serde::{Deserialize, Serialize};

use crate::building::BuildingKind;
use crate::tile::{TileCategory, TileId};

/// One cell of a [`LevelGrid`](crate::LevelGrid).
///
/// `tile_id` is `None` for unassigned cells. Pathability is derived from
/// the tile catalogue rather than stored, so it can never disagree with
/// the tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cell {
    /// Terrain tile, or `None` when unassigned.
    pub tile_id: Option<TileId>,
    /// Height above the cavern floor.
    pub elevation: u32,
    /// Loose crystals lying on this cell.
    pub crystals: u32,
    /// Loose ore lying on this cell.
    pub ore: u32,
    /// Building occupying this cell, if any.
    pub building_id: Option<BuildingKind>,
}

impl Cell {
    /// A cell with the given tile and nothing else.
    pub const fn new(tile: TileId) -> Self {
        Self {
            tile_id: Some(tile),
            elevation: 0,
            crystals: 0,
            ore: 0,
            building_id: None,
        }
    }

    /// A cell with no tile assigned.
    pub const fn unassigned() -> Self {
        Self {
            tile_id: None,
            elevation: 0,
            crystals: 0,
            ore: 0,
            building_id: None,
        }
    }

    /// Set the elevation.
    pub const fn with_elevation(mut self, elevation: u32) -> Self {
        self.elevation = elevation;
        self
    }

    /// Set the crystal count.
    pub const fn with_crystals(mut self, crystals: u32) -> Self {
        self.crystals = crystals;
        self
    }

    /// Set the ore count.
    pub const fn with_ore(mut self, ore: u32) -> Self {
        self.ore = ore;
        self
    }

    /// Place a building.
    pub const fn with_building(mut self, building: BuildingKind) -> Self {
        self.building_id = Some(building);
        self
    }

    /// True iff the tile belongs to a traversable category.
    pub fn is_pathable(&self) -> bool {
        self.tile_id.is_some_and(TileId::is_pathable)
    }

    /// True iff the tile is a wall that can be drilled away.
    pub fn is_drillable(&self) -> bool {
        self.tile_id.is_some_and(TileId::is_drillable)
    }

    /// Category of the tile, if assigned and known.
    pub fn category(&self) -> Option<TileCategory> {
        self.tile_id.and_then(TileId::category)
    }

    /// Whether loose crystals or ore lie on this cell.
    pub fn has_resources(&self) -> bool {
        self.crystals > 0 || self.ore > 0
    }

    /// Whether a building acting as a start position sits here.
    pub fn is_origin(&self) -> bool {
        self.building_id.is_some_and(BuildingKind::is_origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pathability_follows_tile() {
        assert!(Cell::new(TileId::GROUND).is_pathable());
        assert!(!Cell::new(TileId::DIRT).is_pathable());
        assert!(Cell::new(TileId::DIRT).is_drillable());
        assert!(!Cell::unassigned().is_pathable());
        assert!(!Cell::unassigned().is_drillable());
        assert!(!Cell::new(TileId(13)).is_pathable());
    }

    #[test]
    fn resource_and_origin_flags() {
        let cell = Cell::new(TileId::GROUND)
            .with_crystals(3)
            .with_building(BuildingKind::ToolStore);
        assert!(cell.has_resources());
        assert!(cell.is_origin());
        assert!(!Cell::new(TileId::GROUND)
            .with_building(BuildingKind::Docks)
            .is_origin());
    }

    #[test]
    fn deserializes_sparse_json() {
        let cell: Cell = serde_json::from_str(r#"{"tileId": 26, "ore": 2}"#).unwrap();
        assert_eq!(cell.tile_id, Some(TileId::DIRT));
        assert_eq!(cell.ore, 2);
        assert_eq!(cell.crystals, 0);
        assert_eq!(cell.building_id, None);
    }
}
