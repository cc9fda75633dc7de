//! Box and Point Movement
//!
//! Swept movement of axis-aligned boxes and points through the tile grid,
//! plus helpers that push a point back out of solid ground.

use crate::core::vec2::Vec2;
use super::{Collision, PHYSICAL_SIZE};

/// Size of a character box.
pub const PHYSICAL_BOX: Vec2 = Vec2::new(PHYSICAL_SIZE, PHYSICAL_SIZE);

/// Below this squared speed a body is considered at rest.
const REST_EPSILON_SQ: f32 = 0.00001 * 0.00001;

/// Result of [`Collision::move_box`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxMove {
    /// Final position
    pub pos: Vec2,
    /// Final velocity
    pub vel: Vec2,
    /// A downward move was stopped by ground (only with positive Y elasticity)
    pub grounded: bool,
}

impl Collision {
    /// True if any corner of the box centered at `pos` is solid.
    pub fn test_box(&self, pos: Vec2, size: Vec2) -> bool {
        let half = size * 0.5;
        self.check_point(Vec2::new(pos.x - half.x, pos.y - half.y))
            || self.check_point(Vec2::new(pos.x + half.x, pos.y - half.y))
            || self.check_point(Vec2::new(pos.x - half.x, pos.y + half.y))
            || self.check_point(Vec2::new(pos.x + half.x, pos.y + half.y))
    }

    /// Move a box by `vel`, resolving collisions per axis.
    ///
    /// The displacement is split into `|vel| + 1` equal sub-steps. A blocked
    /// axis keeps its old coordinate and its velocity is scaled by
    /// `-elasticity` (clamped to `[-1, 1]`). When only the diagonal move is
    /// blocked, the box stays put and both axes reflect; that case never
    /// reports `grounded`. Sub-stepping stops once the residual velocity is
    /// below 1e-5.
    pub fn move_box(&self, pos: Vec2, vel: Vec2, size: Vec2, elasticity: Vec2) -> BoxMove {
        let mut result = BoxMove { pos, vel, grounded: false };
        if vel.length_squared() <= REST_EPSILON_SQ {
            return result;
        }

        let elasticity_x = elasticity.x.clamp(-1.0, 1.0);
        let elasticity_y = elasticity.y.clamp(-1.0, 1.0);
        let max = vel.length() as i32;
        let fraction = 1.0 / (max + 1) as f32;

        let mut pos = pos;
        let mut vel = vel;
        for _ in 0..=max {
            if vel.length_squared() <= REST_EPSILON_SQ {
                break;
            }
            let mut new_pos = pos + vel * fraction;
            if new_pos == pos {
                break;
            }

            if self.test_box(new_pos, size) {
                let mut hits = 0;
                if self.test_box(Vec2::new(pos.x, new_pos.y), size) {
                    if elasticity_y > 0.0 && vel.y > 0.0 {
                        result.grounded = true;
                    }
                    new_pos.y = pos.y;
                    vel.y *= -elasticity_y;
                    hits += 1;
                }
                if self.test_box(Vec2::new(new_pos.x, pos.y), size) {
                    new_pos.x = pos.x;
                    vel.x *= -elasticity_x;
                    hits += 1;
                }
                if hits == 0 {
                    // corner
                    new_pos = pos;
                    vel.y *= -elasticity_y;
                    vel.x *= -elasticity_x;
                }
            }
            pos = new_pos;
        }

        result.pos = pos;
        result.vel = vel;
        result
    }

    /// Move a point by `vel` in one step, reflecting blocked axes.
    ///
    /// Returns the new position and velocity. A blocked point does not move.
    pub fn move_point(&self, pos: Vec2, vel: Vec2, elasticity: f32) -> (Vec2, Vec2) {
        if !self.check_point(pos + vel) {
            return (pos + vel, vel);
        }
        let mut vel = vel;
        let mut affected = false;
        if self.check_point(Vec2::new(pos.x + vel.x, pos.y)) {
            vel.x *= -elasticity;
            affected = true;
        }
        if self.check_point(Vec2::new(pos.x, pos.y + vel.y)) {
            vel.y *= -elasticity;
            affected = true;
        }
        if !affected {
            vel *= -elasticity;
        }
        (pos, vel)
    }

    /// Free spot for a character box near `pos`: up to 5 units up or 1 down.
    pub fn nearest_air_pos_player(&self, pos: Vec2) -> Option<Vec2> {
        (-1..=5).rev()
            .map(|dist| Vec2::new(pos.x, pos.y - dist as f32))
            .find(|&candidate| !self.test_box(candidate, PHYSICAL_BOX))
    }

    /// Push `pos` out of solid ground, stepping away from `prev`.
    ///
    /// After at most 16 unit steps the point is nudged 2 units away from the
    /// nearer cell edge. A single-axis nudge is preferred when it alone frees
    /// a character box.
    pub fn nearest_air_pos(&self, pos: Vec2, prev: Vec2) -> Option<Vec2> {
        let mut pos = pos;
        for _ in 0..16 {
            if !self.check_point(pos) {
                break;
            }
            pos -= (prev - pos).normalize();
        }

        let rounded_x = (pos.x + 0.5) as i32;
        let rounded_y = (pos.y + 0.5) as i32;
        let in_block = Vec2::from_ints(rounded_x % 32, rounded_y % 32);
        let block_center = Vec2::from_ints(rounded_x, rounded_y) - in_block + Vec2::new(16.0, 16.0);
        let nudge = |offset: f32| if offset < 16.0 { -2.0 } else { 1.0 };
        let nudged = Vec2::new(block_center.x + nudge(in_block.x), block_center.y + nudge(in_block.y));

        [Vec2::new(nudged.x, pos.y), Vec2::new(pos.x, nudged.y), nudged]
            .into_iter()
            .find(|&candidate| !self.test_box(candidate, PHYSICAL_BOX))
    }

    /// Cell a swept segment `prev -> pos` starts in.
    pub fn cell_index_between(&self, prev: Vec2, pos: Vec2) -> usize {
        if prev.distance(pos) == 0.0 {
            return self.map_index(pos);
        }
        self.map_index(prev)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapBuilder;
    use crate::map::tiles::TILE_SOLID;
    use proptest::prelude::*;

    /// 20x20 map with a floor at row 10 and a pillar at column 14.
    fn floor_map() -> Collision {
        let map = MapBuilder::new(20, 20)
            .border()
            .rect(1, 10, 18, 10, TILE_SOLID)
            .rect(14, 5, 14, 9, TILE_SOLID)
            .build();
        Collision::new(map).unwrap()
    }

    #[test]
    fn test_test_box() {
        let col = floor_map();
        // standing exactly on the floor (top edge at y = 320)
        assert!(!col.test_box(Vec2::new(100.0, 305.0), PHYSICAL_BOX));
        assert!(col.test_box(Vec2::new(100.0, 310.0), PHYSICAL_BOX));
    }

    #[test]
    fn test_move_box_free_flight() {
        let col = floor_map();
        let m = col.move_box(Vec2::new(100.0, 100.0), Vec2::new(3.0, 2.0), PHYSICAL_BOX, Vec2::ZERO);
        assert_eq!(m.pos, Vec2::new(103.0, 102.0));
        assert_eq!(m.vel, Vec2::new(3.0, 2.0));
        assert!(!m.grounded);
    }

    #[test]
    fn test_move_box_lands_on_floor() {
        let col = floor_map();
        let m = col.move_box(Vec2::new(100.0, 300.0), Vec2::new(0.0, 20.0), PHYSICAL_BOX, Vec2::ZERO);
        assert_eq!(m.vel.y, 0.0);
        assert!(m.pos.y < 306.0);
        assert!(!col.test_box(m.pos, PHYSICAL_BOX));
        // zero elasticity never reports grounded
        assert!(!m.grounded);
    }

    #[test]
    fn test_move_box_bounces_with_elasticity() {
        let col = floor_map();
        let m = col.move_box(Vec2::new(100.0, 300.0), Vec2::new(0.0, 20.0), PHYSICAL_BOX, Vec2::new(0.0, 0.5));
        assert!(m.grounded);
        assert!(m.vel.y < 0.0);
    }

    #[test]
    fn test_move_box_slides_along_wall() {
        let col = floor_map();
        // pillar occupies x in [448, 480), rows 5..=9
        let m = col.move_box(Vec2::new(420.0, 250.0), Vec2::new(20.0, -3.0), PHYSICAL_BOX, Vec2::ZERO);
        assert_eq!(m.vel.x, 0.0);
        assert_eq!(m.vel.y, -3.0);
        assert!(m.pos.y < 250.0);
        assert!(!col.test_box(m.pos, PHYSICAL_BOX));
    }

    #[test]
    fn test_move_box_at_rest() {
        let col = floor_map();
        let p = Vec2::new(100.0, 100.0);
        let m = col.move_box(p, Vec2::new(1e-6, 0.0), PHYSICAL_BOX, Vec2::ZERO);
        assert_eq!(m.pos, p);
    }

    #[test]
    fn test_move_box_corner_reflects_without_grounding() {
        let map = MapBuilder::new(20, 20).border().tile(10, 10, TILE_SOLID).build();
        let col = Collision::new(map).unwrap();
        // box corner sits diagonally up-left of the lone tile
        let start = Vec2::new(305.0, 305.0);
        assert!(!col.test_box(Vec2::new(305.0, 305.7), PHYSICAL_BOX));
        assert!(!col.test_box(Vec2::new(305.7, 305.0), PHYSICAL_BOX));
        let m = col.move_box(start, Vec2::new(2.0, 2.0), PHYSICAL_BOX, Vec2::new(0.5, 0.5));
        assert!(!m.grounded);
        assert_eq!(m.vel, Vec2::new(-1.0, -1.0));
        assert!(m.pos.x < 305.0 && m.pos.y < 305.0);
    }

    #[test]
    fn test_move_box_stops_on_tiny_residual() {
        let col = floor_map();
        let start = Vec2::new(100.0, 300.0);
        let dead = col.move_box(start, Vec2::new(0.0, 20.0), PHYSICAL_BOX, Vec2::ZERO);
        let soft = col.move_box(start, Vec2::new(0.0, 20.0), PHYSICAL_BOX, Vec2::new(0.0, 1e-7));
        // the reflected speed is far below the rest threshold
        assert!(soft.vel.length() < 1e-5);
        assert!(soft.vel.y < 0.0);
        assert_eq!(soft.pos, dead.pos);
    }

    #[test]
    fn test_move_point_reflects() {
        let col = floor_map();
        let (pos, vel) = col.move_point(Vec2::new(100.0, 315.0), Vec2::new(2.0, 10.0), 0.5);
        assert_eq!(pos, Vec2::new(100.0, 315.0));
        assert_eq!(vel, Vec2::new(2.0, -5.0));

        let (pos, vel) = col.move_point(Vec2::new(100.0, 100.0), Vec2::new(2.0, 10.0), 0.5);
        assert_eq!(pos, Vec2::new(102.0, 110.0));
        assert_eq!(vel, Vec2::new(2.0, 10.0));
    }

    #[test]
    fn test_nearest_air_pos_player() {
        let col = floor_map();
        // box bottom sinks 3 units into the floor; lifting 3 frees it
        let found = col.nearest_air_pos_player(Vec2::new(100.0, 309.0)).unwrap();
        assert!(!col.test_box(found, PHYSICAL_BOX));
        assert!(found.y < 309.0 && found.y >= 304.0);
        // deep inside the floor nothing within reach is free
        assert_eq!(col.nearest_air_pos_player(Vec2::new(100.0, 336.0)), None);
    }

    #[test]
    fn test_nearest_air_pos() {
        let col = floor_map();
        // the walk moves away from `prev`
        let found = col.nearest_air_pos(Vec2::new(100.0, 321.0), Vec2::new(100.0, 330.0)).unwrap();
        assert_eq!(found, Vec2::new(100.0, 305.0));
        assert!(!col.test_box(found, PHYSICAL_BOX));
    }

    #[test]
    fn test_cell_index_between() {
        let col = floor_map();
        let prev = Vec2::new(40.0, 40.0);
        assert_eq!(col.cell_index_between(prev, Vec2::new(200.0, 40.0)), col.cell_index(1, 1));
        assert_eq!(col.cell_index_between(prev, prev), col.cell_index(1, 1));
    }

    proptest! {
        #[test]
        fn test_move_box_never_enters_solid(
            x in 40.0f32..600.0,
            y in 40.0f32..300.0,
            vx in -40.0f32..40.0,
            vy in -40.0f32..40.0,
        ) {
            let col = floor_map();
            let start = Vec2::new(x, y);
            prop_assume!(!col.test_box(start, PHYSICAL_BOX));
            let m = col.move_box(start, Vec2::new(vx, vy), PHYSICAL_BOX, Vec2::ZERO);
            prop_assert!(!col.test_box(m.pos, PHYSICAL_BOX));
        }
    }
}
