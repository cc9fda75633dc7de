//! Move Restrictions
//!
//! Stopper tiles (STOP, STOPS, STOPA) on the game, front and door layers
//! forbid movement in particular directions. Restrictions are a bitmask of
//! `CANTMOVE_*` flags.

use crate::core::vec2::Vec2;
use crate::map::tiles::*;
use super::{Collision, SwitchStateProvider};

/// Probe direction index: the character's own cell.
pub const DIR_HERE: u8 = 0;

/// Default probe distance from the character center.
pub const PROBE_DISTANCE: f32 = 18.0;

/// STOP restriction indexed by `flags & (XFLIP | YFLIP | ROTATE)`.
const STOP_TABLE: [u8; 12] = [
    CANTMOVE_DOWN,  // ROTATION_0
    CANTMOVE_DOWN,  // YFLIP ^ ROTATION_180
    CANTMOVE_UP,    // YFLIP ^ ROTATION_0
    CANTMOVE_UP,    // ROTATION_180
    0,
    0,
    0,
    0,
    CANTMOVE_LEFT,  // ROTATION_90
    CANTMOVE_LEFT,  // YFLIP ^ ROTATION_270
    CANTMOVE_RIGHT, // YFLIP ^ ROTATION_90
    CANTMOVE_RIGHT, // ROTATION_270
];

/// Restriction bit checked for each probe direction (here, right, down, left, up).
const DIRECTION_MASK: [u8; 5] = [0, CANTMOVE_RIGHT, CANTMOVE_DOWN, CANTMOVE_LEFT, CANTMOVE_UP];

/// Unit offsets of the five probes.
const PROBE_OFFSETS: [(f32, f32); 5] = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)];

fn raw_restrictions(tile: u8, flags: u8) -> u8 {
    let flags = flags & (TILEFLAG_XFLIP | TILEFLAG_YFLIP | TILEFLAG_ROTATE);
    match tile {
        TILE_STOP => STOP_TABLE[flags as usize],
        TILE_STOPS if flags & TILEFLAG_ROTATE != 0 => CANTMOVE_LEFT | CANTMOVE_RIGHT,
        TILE_STOPS => CANTMOVE_DOWN | CANTMOVE_UP,
        TILE_STOPA => CANTMOVE_LEFT | CANTMOVE_RIGHT | CANTMOVE_UP | CANTMOVE_DOWN,
        _ => 0,
    }
}

/// Restrictions a single tile imposes when probed from `direction`.
///
/// A plain STOP in the character's own cell reports its full restriction;
/// every other case is masked to the probe's direction bit.
pub fn restrictions_for(direction: u8, tile: u8, flags: u8) -> u8 {
    let raw = raw_restrictions(tile, flags);
    if direction == DIR_HERE && tile == TILE_STOP {
        return raw;
    }
    raw & DIRECTION_MASK[direction as usize]
}

/// Zero the velocity components the restrictions forbid.
pub fn clamp_vel(restrictions: u8, mut vel: Vec2) -> Vec2 {
    if vel.x > 0.0 && restrictions & CANTMOVE_RIGHT != 0 {
        vel.x = 0.0;
    } else if vel.x < 0.0 && restrictions & CANTMOVE_LEFT != 0 {
        vel.x = 0.0;
    }
    if vel.y > 0.0 && restrictions & CANTMOVE_DOWN != 0 {
        vel.y = 0.0;
    } else if vel.y < 0.0 && restrictions & CANTMOVE_UP != 0 {
        vel.y = 0.0;
    }
    vel
}

impl Collision {
    /// Restrictions for a body centered at `pos`.
    ///
    /// Probes the own cell and four cells at `distance` in each direction.
    /// Door tiles contribute only while their switch is active.
    /// `override_center` replaces the own-cell index when given.
    pub fn move_restrictions(
        &self,
        switches: &dyn SwitchStateProvider,
        pos: Vec2,
        distance: f32,
        override_center: Option<usize>,
    ) -> u8 {
        if !self.has_move_restrictions() {
            return 0;
        }

        let max = Vec2::new(
            (self.width() * 32 - 16) as f32,
            (self.height() * 32 - 16) as f32,
        );
        let mut result = 0;
        for (d, &(ox, oy)) in PROBE_OFFSETS.iter().enumerate() {
            let probe = pos + Vec2::new(ox, oy) * distance;
            let probe = Vec2::new(probe.x.clamp(0.0, max.x), probe.y.clamp(0.0, max.y));
            let index = match override_center {
                Some(center) if d == DIR_HERE as usize => center,
                _ => self.pure_map_index(probe),
            };

            result |= self.move_restrictions[index][d];

            if let Some(door) = &self.map().door {
                if door.index[index] != 0 && switches.is_active(door.number[index]) {
                    result |= restrictions_for(d as u8, door.index[index], door.flags[index]);
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::NoSwitches;
    use crate::map::MapBuilder;

    struct AllOn;

    impl SwitchStateProvider for AllOn {
        fn is_active(&self, _number: i32) -> bool {
            true
        }
    }

    fn center(x: i32, y: i32) -> Vec2 {
        Vec2::new((x * 32 + 16) as f32, (y * 32 + 16) as f32)
    }

    #[test]
    fn test_stop_table() {
        assert_eq!(restrictions_for(DIR_HERE, TILE_STOP, ROTATION_0), CANTMOVE_DOWN);
        assert_eq!(restrictions_for(DIR_HERE, TILE_STOP, ROTATION_180), CANTMOVE_UP);
        assert_eq!(restrictions_for(DIR_HERE, TILE_STOP, ROTATION_90), CANTMOVE_LEFT);
        assert_eq!(restrictions_for(DIR_HERE, TILE_STOP, ROTATION_270), CANTMOVE_RIGHT);
        // masked in a probe direction
        assert_eq!(restrictions_for(1, TILE_STOP, ROTATION_0), 0);
        assert_eq!(restrictions_for(2, TILE_STOP, ROTATION_0), CANTMOVE_DOWN);
    }

    #[test]
    fn test_stops_and_stopa() {
        assert_eq!(restrictions_for(DIR_HERE, TILE_STOPA, 0), 0);
        assert_eq!(restrictions_for(3, TILE_STOPA, 0), CANTMOVE_LEFT);
        assert_eq!(restrictions_for(4, TILE_STOPS, 0), CANTMOVE_UP);
        assert_eq!(restrictions_for(1, TILE_STOPS, 0), 0);
        assert_eq!(restrictions_for(1, TILE_STOPS, ROTATION_90), CANTMOVE_RIGHT);
    }

    #[test]
    fn test_stop_blocking_up_in_own_cell() {
        let map = MapBuilder::new(10, 10).tile_flags(5, 5, TILE_STOP, ROTATION_180).build();
        let col = Collision::new(map).unwrap();
        let r = col.move_restrictions(&NoSwitches, center(5, 5), PROBE_DISTANCE, None);
        assert_eq!(r & CANTMOVE_UP, CANTMOVE_UP);
        assert_eq!(r & (CANTMOVE_DOWN | CANTMOVE_LEFT | CANTMOVE_RIGHT), 0);
    }

    #[test]
    fn test_stopa_neighbour() {
        let map = MapBuilder::new(10, 10).front(6, 5, TILE_STOPA, 0).build();
        let col = Collision::new(map).unwrap();
        let r = col.move_restrictions(&NoSwitches, center(5, 5), PROBE_DISTANCE, None);
        assert_eq!(r, CANTMOVE_RIGHT);
        let far = col.move_restrictions(&NoSwitches, center(2, 2), PROBE_DISTANCE, None);
        assert_eq!(far, 0);
    }

    #[test]
    fn test_door_gated_by_switch() {
        let map = MapBuilder::new(10, 10).door(5, 6, TILE_STOPA, 0, 1).build();
        let col = Collision::new(map).unwrap();
        let pos = center(5, 5);
        assert_eq!(col.move_restrictions(&NoSwitches, pos, PROBE_DISTANCE, None), 0);
        assert_eq!(col.move_restrictions(&AllOn, pos, PROBE_DISTANCE, None), CANTMOVE_DOWN);
    }

    #[test]
    fn test_override_center() {
        let map = MapBuilder::new(10, 10).tile_flags(1, 1, TILE_STOP, ROTATION_0).build();
        let col = Collision::new(map).unwrap();
        let idx = col.cell_index(1, 1);
        let r = col.move_restrictions(&NoSwitches, center(7, 7), PROBE_DISTANCE, Some(idx));
        assert_eq!(r, CANTMOVE_DOWN);
    }

    #[test]
    fn test_clamp_vel() {
        let v = Vec2::new(3.0, -2.0);
        assert_eq!(clamp_vel(CANTMOVE_RIGHT, v), Vec2::new(0.0, -2.0));
        assert_eq!(clamp_vel(CANTMOVE_LEFT, v), v);
        assert_eq!(clamp_vel(CANTMOVE_UP | CANTMOVE_RIGHT, v), Vec2::ZERO);
        assert_eq!(clamp_vel(CANTMOVE_DOWN, v), v);
    }
}
