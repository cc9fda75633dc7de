//! Tile Map Input
//!
//! The raw, already-decoded map record handed to the collision engine:
//! a `width × height` grid with one mandatory game layer and optional
//! front, teleporter, speedup, switch, door and tune layers. Every layer
//! is a set of parallel row-major arrays of the same length.
//!
//! Maps for tests and tools are assembled in code with [`MapBuilder`].

pub mod tiles;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use tiles::*;

/// Tile id + flag layer (game and front).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayer {
    /// Tile ids
    pub index: Vec<u8>,
    /// Flip / rotate flags
    pub flags: Vec<u8>,
}

/// Teleporter layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeleLayer {
    /// Teleporter number (pairs ins with outs)
    pub number: Vec<u8>,
    /// Teleporter tile id (TELEIN, TELEOUT, ...)
    pub kind: Vec<u8>,
}

/// Speedup (boost) layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedupLayer {
    /// Boost force; 0 means no speedup
    pub force: Vec<u8>,
    /// Speed cap; 0 means "derive from the velocity ramp"
    pub max_speed: Vec<u8>,
    /// Old-style or new-style boost tile id
    pub kind: Vec<u8>,
    /// Boost angle in degrees
    pub angle: Vec<i16>,
}

/// Switch layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchLayer {
    /// Switch number
    pub number: Vec<u8>,
    /// Switch tile id
    pub kind: Vec<u8>,
    /// Tile flags
    pub flags: Vec<u8>,
    /// Per-tile parameter (seconds, jump count, weapon, ...)
    pub delay: Vec<u8>,
}

/// Door layer: stopper tiles gated by a switch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorLayer {
    /// Stopper tile id
    pub index: Vec<u8>,
    /// Tile flags
    pub flags: Vec<u8>,
    /// Switch number gating each door
    pub number: Vec<i32>,
}

/// Tune-zone layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuneLayer {
    /// Tune zone id
    pub number: Vec<u8>,
    /// Non-zero where a tune tile is present
    pub kind: Vec<u8>,
}

/// Complete decoded map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapData {
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    /// Mandatory game layer
    pub game: TileLayer,
    /// Front layer
    pub front: Option<TileLayer>,
    /// Teleporter layer
    pub tele: Option<TeleLayer>,
    /// Speedup layer
    pub speedup: Option<SpeedupLayer>,
    /// Switch layer
    pub switch: Option<SwitchLayer>,
    /// Door layer
    pub door: Option<DoorLayer>,
    /// Tune layer
    pub tune: Option<TuneLayer>,
}

/// Map validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// Width or height is zero.
    #[error("map has zero size ({width}x{height})")]
    EmptyMap {
        /// Width in tiles
        width: u32,
        /// Height in tiles
        height: u32,
    },

    /// Dimensions overflow the addressable index range.
    #[error("map dimensions {width}x{height} are too large")]
    TooLarge {
        /// Width in tiles
        width: u32,
        /// Height in tiles
        height: u32,
    },

    /// A layer array does not match the grid size.
    #[error("layer '{layer}' has {actual} entries, expected {expected}")]
    LayerSize {
        /// Layer and array name
        layer: &'static str,
        /// `width * height`
        expected: usize,
        /// Actual array length
        actual: usize,
    },

    /// Door tiles are present but their switch numbers are not.
    #[error("door layer has tiles but no switch numbers")]
    MissingDoorNumbers,
}

impl MapData {
    /// Number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check dimensions and layer sizes.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.width == 0 || self.height == 0 {
            return Err(MapError::EmptyMap { width: self.width, height: self.height });
        }
        // world coordinates (cells * 32) must fit an i32
        let max_cells = (i32::MAX / 64) as u64;
        if self.width as u64 > max_cells || self.height as u64 > max_cells {
            return Err(MapError::TooLarge { width: self.width, height: self.height });
        }

        let expected = self.cell_count();
        let check = |layer: &'static str, actual: usize| -> Result<(), MapError> {
            if actual == expected {
                Ok(())
            } else {
                Err(MapError::LayerSize { layer, expected, actual })
            }
        };

        check("game.index", self.game.index.len())?;
        check("game.flags", self.game.flags.len())?;
        if let Some(front) = &self.front {
            check("front.index", front.index.len())?;
            check("front.flags", front.flags.len())?;
        }
        if let Some(tele) = &self.tele {
            check("tele.number", tele.number.len())?;
            check("tele.kind", tele.kind.len())?;
        }
        if let Some(speedup) = &self.speedup {
            check("speedup.force", speedup.force.len())?;
            check("speedup.max_speed", speedup.max_speed.len())?;
            check("speedup.kind", speedup.kind.len())?;
            check("speedup.angle", speedup.angle.len())?;
        }
        if let Some(switch) = &self.switch {
            check("switch.number", switch.number.len())?;
            check("switch.kind", switch.kind.len())?;
            check("switch.flags", switch.flags.len())?;
            check("switch.delay", switch.delay.len())?;
        }
        if let Some(door) = &self.door {
            check("door.index", door.index.len())?;
            check("door.flags", door.flags.len())?;
            if door.number.is_empty() {
                return Err(MapError::MissingDoorNumbers);
            }
            check("door.number", door.number.len())?;
        }
        if let Some(tune) = &self.tune {
            check("tune.number", tune.number.len())?;
            check("tune.kind", tune.kind.len())?;
        }
        Ok(())
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Assembles a [`MapData`] cell by cell.
///
/// Optional layers are created on first use. Coordinates outside the grid
/// are ignored.
#[derive(Clone, Debug)]
pub struct MapBuilder {
    map: MapData,
}

impl MapBuilder {
    /// Empty (all air) map.
    pub fn new(width: u32, height: u32) -> Self {
        let cells = width as usize * height as usize;
        Self {
            map: MapData {
                width,
                height,
                game: TileLayer { index: vec![0; cells], flags: vec![0; cells] },
                ..MapData::default()
            },
        }
    }

    fn idx(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.map.width && y < self.map.height)
            .then(|| y as usize * self.map.width as usize + x as usize)
    }

    fn cells(&self) -> usize {
        self.map.cell_count()
    }

    /// Set a game-layer tile.
    pub fn tile(self, x: u32, y: u32, tile: u8) -> Self {
        self.tile_flags(x, y, tile, 0)
    }

    /// Set a game-layer tile with flags.
    pub fn tile_flags(mut self, x: u32, y: u32, tile: u8, flags: u8) -> Self {
        if let Some(i) = self.idx(x, y) {
            self.map.game.index[i] = tile;
            self.map.game.flags[i] = flags;
        }
        self
    }

    /// Fill an inclusive rectangle of the game layer.
    pub fn rect(mut self, x0: u32, y0: u32, x1: u32, y1: u32, tile: u8) -> Self {
        for y in y0..=y1 {
            for x in x0..=x1 {
                self = self.tile(x, y, tile);
            }
        }
        self
    }

    /// Solid frame around the map edge.
    pub fn border(self) -> Self {
        let (w, h) = (self.map.width, self.map.height);
        if w == 0 || h == 0 {
            return self;
        }
        self.rect(0, 0, w - 1, 0, TILE_SOLID)
            .rect(0, h - 1, w - 1, h - 1, TILE_SOLID)
            .rect(0, 0, 0, h - 1, TILE_SOLID)
            .rect(w - 1, 0, w - 1, h - 1, TILE_SOLID)
    }

    /// Place a spawn tile.
    pub fn spawn(self, x: u32, y: u32) -> Self {
        self.tile(x, y, ENTITY_SPAWN_FIRST)
    }

    /// Set a front-layer tile.
    pub fn front(mut self, x: u32, y: u32, tile: u8, flags: u8) -> Self {
        let cells = self.cells();
        if let Some(i) = self.idx(x, y) {
            let layer = self.map.front.get_or_insert_with(|| TileLayer {
                index: vec![0; cells],
                flags: vec![0; cells],
            });
            layer.index[i] = tile;
            layer.flags[i] = flags;
        }
        self
    }

    /// Set a teleporter tile.
    pub fn tele(mut self, x: u32, y: u32, kind: u8, number: u8) -> Self {
        let cells = self.cells();
        if let Some(i) = self.idx(x, y) {
            let layer = self.map.tele.get_or_insert_with(|| TeleLayer {
                number: vec![0; cells],
                kind: vec![0; cells],
            });
            layer.kind[i] = kind;
            layer.number[i] = number;
        }
        self
    }

    /// Set a speedup tile.
    pub fn speedup(mut self, x: u32, y: u32, kind: u8, force: u8, max_speed: u8, angle: i16) -> Self {
        let cells = self.cells();
        if let Some(i) = self.idx(x, y) {
            let layer = self.map.speedup.get_or_insert_with(|| SpeedupLayer {
                force: vec![0; cells],
                max_speed: vec![0; cells],
                kind: vec![0; cells],
                angle: vec![0; cells],
            });
            layer.kind[i] = kind;
            layer.force[i] = force;
            layer.max_speed[i] = max_speed;
            layer.angle[i] = angle;
        }
        self
    }

    /// Set a switch-layer tile.
    pub fn switch_tile(mut self, x: u32, y: u32, kind: u8, number: u8, delay: u8) -> Self {
        let cells = self.cells();
        if let Some(i) = self.idx(x, y) {
            let layer = self.map.switch.get_or_insert_with(|| SwitchLayer {
                number: vec![0; cells],
                kind: vec![0; cells],
                flags: vec![0; cells],
                delay: vec![0; cells],
            });
            layer.kind[i] = kind;
            layer.number[i] = number;
            layer.delay[i] = delay;
        }
        self
    }

    /// Set a door tile gated by switch `number`.
    pub fn door(mut self, x: u32, y: u32, tile: u8, flags: u8, number: i32) -> Self {
        let cells = self.cells();
        if let Some(i) = self.idx(x, y) {
            let layer = self.map.door.get_or_insert_with(|| DoorLayer {
                index: vec![0; cells],
                flags: vec![0; cells],
                number: vec![0; cells],
            });
            layer.index[i] = tile;
            layer.flags[i] = flags;
            layer.number[i] = number;
        }
        self
    }

    /// Mark a cell as belonging to tune zone `zone`.
    pub fn tune(mut self, x: u32, y: u32, zone: u8) -> Self {
        let cells = self.cells();
        if let Some(i) = self.idx(x, y) {
            let layer = self.map.tune.get_or_insert_with(|| TuneLayer {
                number: vec![0; cells],
                kind: vec![0; cells],
            });
            layer.kind[i] = TILE_TUNE;
            layer.number[i] = zone;
        }
        self
    }

    /// Finish building.
    pub fn build(self) -> MapData {
        self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_layers() {
        let map = MapBuilder::new(8, 6)
            .border()
            .spawn(2, 2)
            .front(3, 3, TILE_FREEZE, 0)
            .tele(4, 4, TILE_TELEIN, 1)
            .tune(5, 4, 3)
            .build();

        assert_eq!(map.game.index[0], TILE_SOLID);
        assert_eq!(map.game.index[2 * 8 + 2], ENTITY_SPAWN_FIRST);
        assert_eq!(map.front.as_ref().map(|f| f.index[3 * 8 + 3]), Some(TILE_FREEZE));
        assert_eq!(map.tele.as_ref().map(|t| t.number[4 * 8 + 4]), Some(1));
        assert_eq!(map.tune.as_ref().map(|t| t.number[4 * 8 + 5]), Some(3));
        assert!(map.speedup.is_none());
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_builder_ignores_out_of_range() {
        let map = MapBuilder::new(4, 4).tile(10, 10, TILE_SOLID).build();
        assert!(map.game.index.iter().all(|&t| t == TILE_AIR));
    }

    #[test]
    fn test_validate_empty() {
        let map = MapBuilder::new(0, 5).build();
        assert_eq!(map.validate(), Err(MapError::EmptyMap { width: 0, height: 5 }));
    }

    #[test]
    fn test_validate_layer_size() {
        let mut map = MapBuilder::new(4, 4).build();
        map.game.flags.pop();
        assert!(matches!(map.validate(), Err(MapError::LayerSize { layer: "game.flags", .. })));
    }

    #[test]
    fn test_validate_door_numbers() {
        let mut map = MapBuilder::new(4, 4).door(1, 1, TILE_STOPA, 0, 1).build();
        if let Some(door) = map.door.as_mut() {
            door.number.clear();
        }
        assert_eq!(map.validate(), Err(MapError::MissingDoorNumbers));
    }
}
