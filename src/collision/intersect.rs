//! Line Intersection
//!
//! Segment queries against the tile grid:
//! - [`Collision::intersect_line`]: unit-step sampling, used by projectiles.
//! - [`Collision::intersect_line_hook`]: cell walk aware of through tiles,
//!   hook blockers and hook teleporters.
//! - [`Collision::intersect_line_weapon`]: cell walk aware of weapon
//!   teleporters, used by lasers.

use crate::core::vec2::Vec2;
use crate::map::tiles::*;
use super::{Collision, TILE_SIZE};

/// Result of [`Collision::intersect_line`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineHit {
    /// Game tile hit, 0 for no hit
    pub tile: u8,
    /// First solid sample, or the segment end
    pub pos: Vec2,
    /// Sample before the hit, or the segment end
    pub before: Vec2,
}

impl LineHit {
    /// True if the segment hit a solid tile.
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.tile != 0
    }
}

/// What a hook segment ran into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookHit {
    /// Nothing
    Clear,
    /// Hookable ground (the game tile id)
    Ground(u8),
    /// A no-hook tile or hook blocker
    Blocked,
    /// A hook teleporter with this number
    Teleport(u8),
}

/// What a weapon segment ran into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeaponHit {
    /// Nothing
    Clear,
    /// A solid tile (the game tile id)
    Solid(u8),
    /// A weapon teleporter with this number
    Teleport(u8),
}

impl WeaponHit {
    /// True for anything but [`WeaponHit::Clear`].
    #[inline]
    pub fn is_hit(&self) -> bool {
        !matches!(self, WeaponHit::Clear)
    }
}

/// Offset to the cell a through tile is entered from.
fn through_offset(p0: Vec2, p1: Vec2) -> (i32, i32) {
    const OFFSETS: [(i32, i32); 8] = [
        (32, 0), (0, 32), (-32, 0), (0, 32),
        (32, 0), (0, -32), (-32, 0), (0, -32),
    ];
    let dx = p0.x - p1.x;
    let dy = p0.y - p1.y;
    let index = (((dx < 0.0) as usize) << 2) | (((dy < 0.0) as usize) << 1) | ((dx.abs() > dy.abs()) as usize);
    OFFSETS[index]
}

/// Whether a directional through tile with `flags` lets travel `p0 -> p1` pass.
fn through_dir_passes(flags: u8, p0: Vec2, p1: Vec2) -> bool {
    (flags == ROTATION_0 && p0.y > p1.y)
        || (flags == ROTATION_90 && p0.x < p1.x)
        || (flags == ROTATION_180 && p0.y < p1.y)
        || (flags == ROTATION_270 && p0.x > p1.x)
}

/// Whether a directional through tile with `flags` blocks travel `p0 -> p1`.
fn through_dir_blocks(flags: u8, p0: Vec2, p1: Vec2) -> bool {
    (flags == ROTATION_0 && p0.y < p1.y)
        || (flags == ROTATION_90 && p0.x > p1.x)
        || (flags == ROTATION_180 && p0.y > p1.y)
        || (flags == ROTATION_270 && p0.x < p1.x)
}

/// Grid walk state for the hook and weapon queries.
struct CellWalk {
    map_x: i32,
    map_y: i32,
    end_x: i32,
    end_y: i32,
    step_x: i32,
    step_y: i32,
    t_max_x: f32,
    t_max_y: f32,
    t_delta_x: f32,
    t_delta_y: f32,
    u: f32,
}

impl CellWalk {
    fn new(p0: Vec2, p1: Vec2) -> Self {
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;
        let map_x = ((p0.x + 0.5) as i32) >> 5;
        let map_y = ((p0.y + 0.5) as i32) >> 5;
        let step_x = if dx > 0.0 { 1 } else if dx < 0.0 { -1 } else { 0 };
        let step_y = if dy > 0.0 { 1 } else if dy < 0.0 { -1 } else { 0 };

        let (mut t_max_x, mut t_delta_x) = (1e30f32, 1e30f32);
        let (mut t_max_y, mut t_delta_y) = (1e30f32, 1e30f32);
        if step_x != 0 {
            let inv = 1.0 / dx;
            let boundary = if step_x > 0 { (map_x + 1) * TILE_SIZE } else { map_x * TILE_SIZE };
            t_max_x = ((boundary as f32 - p0.x) * inv).max(0.0);
            t_delta_x = TILE_SIZE as f32 * inv.abs();
        }
        if step_y != 0 {
            let inv = 1.0 / dy;
            let boundary = if step_y > 0 { (map_y + 1) * TILE_SIZE } else { map_y * TILE_SIZE };
            t_max_y = ((boundary as f32 - p0.y) * inv).max(0.0);
            t_delta_y = TILE_SIZE as f32 * inv.abs();
        }

        Self {
            map_x,
            map_y,
            end_x: ((p1.x + 0.5) as i32) >> 5,
            end_y: ((p1.y + 0.5) as i32) >> 5,
            step_x,
            step_y,
            t_max_x,
            t_max_y,
            t_delta_x,
            t_delta_y,
            u: 0.0,
        }
    }

    /// Step to the next cell. Returns false once the walk is over.
    fn advance(&mut self) -> bool {
        if self.map_x == self.end_x && self.map_y == self.end_y {
            return false;
        }
        if self.t_max_x < self.t_max_y {
            self.map_x += self.step_x;
            self.u = self.t_max_x;
            self.t_max_x += self.t_delta_x;
        } else {
            self.map_y += self.step_y;
            self.u = self.t_max_y;
            self.t_max_y += self.t_delta_y;
        }
        self.u <= 1.0
    }
}

impl Collision {
    /// Sample the segment at unit steps and stop at the first solid sample.
    pub fn intersect_line(&self, p0: Vec2, p1: Vec2) -> LineHit {
        let distance = p0.distance(p1);
        let end = distance as i32 + 1;
        let mut last = p0;
        let mut last_index = None;
        for i in 0..=end {
            let a = i as f32 / end as f32;
            let pos = Vec2::mix(p0, p1, a);
            let index = self.pure_map_index(pos);
            if last_index == Some(index) {
                continue;
            }
            last_index = Some(index);
            if self.is_solid_index(index) {
                return LineHit { tile: self.tile_index(index), pos, before: last };
            }
            last = pos;
        }
        LineHit { tile: 0, pos: p1, before: p1 }
    }

    fn hook_tele_number(&self, index: usize, old_tele_hook: bool) -> u8 {
        if old_tele_hook {
            self.is_teleport(index)
        } else {
            self.is_teleport_hook(index)
        }
    }

    /// Whether a solid tile at world point `(x, y)` lets a hook through.
    fn is_through(&self, x: i32, y: i32, offset: (i32, i32), p0: Vec2, p1: Vec2) -> bool {
        if x < 0 || y < 0 || x >= self.width() * TILE_SIZE || y >= self.height() * TILE_SIZE {
            return false;
        }
        let index = self.pure_map_index(Vec2::from_ints(x, y));
        let front = self.front_tile_index(index);
        if front == TILE_THROUGH_ALL || front == TILE_THROUGH_CUT {
            return true;
        }
        if front == TILE_THROUGH_DIR && through_dir_passes(self.front_tile_flags(index), p0, p1) {
            return true;
        }
        let off = self.pure_map_index(Vec2::from_ints(x + offset.0, y + offset.1));
        self.tile_index(off) == TILE_THROUGH || self.front_tile_index(off) == TILE_THROUGH
    }

    /// Whether a non-solid cell still stops a hook travelling `p0 -> p1`.
    fn is_hook_blocker(&self, index: usize, p0: Vec2, p1: Vec2) -> bool {
        let game = self.tile_index(index);
        let front = self.front_tile_index(index);
        if game == TILE_THROUGH_ALL || front == TILE_THROUGH_ALL {
            return true;
        }
        (game == TILE_THROUGH_DIR && through_dir_blocks(self.tile_flags(index), p0, p1))
            || (front == TILE_THROUGH_DIR && through_dir_blocks(self.front_tile_flags(index), p0, p1))
    }

    /// Cast a hook segment.
    ///
    /// Returns what was hit and where. With `old_tele_hook` plain TELEIN tiles
    /// act as hook teleporters instead of TELEINHOOK tiles.
    pub fn intersect_line_hook(&self, p0: Vec2, p1: Vec2, old_tele_hook: bool) -> (HookHit, Vec2) {
        let check_tele = self.has_tele_layer();

        let cell_hit = |index: usize, at: Vec2, offset: (i32, i32)| -> Option<HookHit> {
            if check_tele {
                let number = self.hook_tele_number(index, old_tele_hook);
                if number != 0 {
                    return Some(HookHit::Teleport(number));
                }
            }
            if self.is_solid_index(index) {
                let tx = (at.x + 0.5) as i32;
                let ty = (at.y + 0.5) as i32;
                if !self.is_through(tx, ty, offset, p0, p1) {
                    return Some(HookHit::Ground(self.tile_index(index)));
                }
            } else if self.is_hook_blocker(index, p0, p1) {
                return Some(HookHit::Blocked);
            }
            None
        };

        if p0 == p1 {
            let index = self.pure_map_index(p0);
            return match cell_hit(index, p0, (0, 0)) {
                Some(hit) => (hit, p0),
                None => (HookHit::Clear, p1),
            };
        }

        let offset = through_offset(p0, p1);
        let mut walk = CellWalk::new(p0, p1);
        loop {
            let index = self.cell_index(walk.map_x, walk.map_y);
            let at = Vec2::mix(p0, p1, walk.u);
            if let Some(hit) = cell_hit(index, at, offset) {
                return (hit, at);
            }
            if !walk.advance() {
                break;
            }
        }
        (HookHit::Clear, p1)
    }

    /// Shorten `p0 -> p1` so its end stays inside the map.
    ///
    /// Only the far end moves. A start point outside the map is left as is.
    pub fn clip_to_map(&self, p0: Vec2, p1: Vec2) -> Vec2 {
        let d = p1 - p0;
        let max_x = (self.width() * TILE_SIZE - 1) as f32;
        let max_y = (self.height() * TILE_SIZE - 1) as f32;
        let edges = [(-d.x, p0.x), (d.x, max_x - p0.x), (-d.y, p0.y), (d.y, max_y - p0.y)];

        let mut t0 = 0.0f32;
        let mut t1 = 1.0f32;
        for (p, q) in edges {
            if p == 0.0 {
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r <= t1 && r > t0 {
                    t0 = r;
                }
            } else if r >= t0 && r < t1 {
                t1 = r;
            }
        }
        p0 + d * t1
    }

    /// Cast a weapon (laser) segment.
    ///
    /// The reported point is pulled back one unit on each axis the segment
    /// travels in the positive direction.
    pub fn intersect_line_weapon(&self, p0: Vec2, p1: Vec2) -> (WeaponHit, Vec2) {
        let check_tele = self.has_tele_layer();
        let cell_hit = |index: usize| -> Option<WeaponHit> {
            if check_tele {
                let number = self.is_teleport_weapon(index);
                if number != 0 {
                    return Some(WeaponHit::Teleport(number));
                }
            }
            self.is_solid_index(index).then(|| WeaponHit::Solid(self.tile_index(index)))
        };

        if p0 == p1 {
            return match cell_hit(self.pure_map_index(p0)) {
                Some(hit) => (hit, p0),
                None => (WeaponHit::Clear, p1),
            };
        }

        let pull_back = |mut at: Vec2| {
            if p0.x < p1.x {
                at.x -= 1.0;
            }
            if p0.y < p1.y {
                at.y -= 1.0;
            }
            at
        };

        let mut walk = CellWalk::new(p0, p1);
        loop {
            let index = self.cell_index(walk.map_x, walk.map_y);
            if let Some(hit) = cell_hit(index) {
                return (hit, pull_back(Vec2::mix(p0, p1, walk.u)));
            }
            if !walk.advance() {
                break;
            }
        }
        (WeaponHit::Clear, p1)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapBuilder;

    fn wall_map() -> Collision {
        // solid column at x = 10
        let map = MapBuilder::new(20, 20).rect(10, 0, 10, 19, TILE_SOLID).build();
        Collision::new(map).unwrap()
    }

    #[test]
    fn test_intersect_line_hit() {
        let col = wall_map();
        let hit = col.intersect_line(Vec2::new(100.0, 100.0), Vec2::new(500.0, 100.0));
        assert!(hit.is_hit());
        assert_eq!(hit.tile, TILE_SOLID);
        assert!(hit.pos.x >= 319.5 && hit.pos.x < 321.0);
        assert!(hit.before.x < hit.pos.x);
        assert!(!col.check_point(hit.before));
    }

    #[test]
    fn test_intersect_line_miss() {
        let col = wall_map();
        let p1 = Vec2::new(300.0, 200.0);
        let hit = col.intersect_line(Vec2::new(100.0, 100.0), p1);
        assert!(!hit.is_hit());
        assert_eq!(hit.pos, p1);
        assert_eq!(hit.before, p1);
    }

    #[test]
    fn test_clip_to_map() {
        let col = wall_map();
        let p0 = Vec2::new(100.0, 100.0);
        // inside stays put
        assert_eq!(col.clip_to_map(p0, Vec2::new(200.0, 150.0)), Vec2::new(200.0, 150.0));
        // past the right edge (640 wide)
        let clipped = col.clip_to_map(p0, Vec2::new(1000.0, 100.0));
        assert!((clipped.x - 639.0).abs() < 1e-3);
        assert_eq!(clipped.y, 100.0);
        // past the top edge
        let clipped = col.clip_to_map(p0, Vec2::new(100.0, -300.0));
        assert_eq!(clipped, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_hook_hits_ground() {
        let col = wall_map();
        let (hit, at) = col.intersect_line_hook(Vec2::new(100.0, 100.0), Vec2::new(500.0, 100.0), false);
        assert_eq!(hit, HookHit::Ground(TILE_SOLID));
        assert!(at.x >= 300.0 && at.x <= 320.0);
    }

    #[test]
    fn test_hook_nohook_is_blocked_ground() {
        let map = MapBuilder::new(20, 20).tile(10, 3, TILE_NOHOOK).build();
        let col = Collision::new(map).unwrap();
        let (hit, _) = col.intersect_line_hook(Vec2::new(100.0, 112.0), Vec2::new(500.0, 112.0), false);
        assert_eq!(hit, HookHit::Ground(TILE_NOHOOK));
    }

    #[test]
    fn test_hook_clear() {
        let col = wall_map();
        let p1 = Vec2::new(200.0, 300.0);
        assert_eq!(col.intersect_line_hook(Vec2::new(100.0, 100.0), p1, false), (HookHit::Clear, p1));
        // zero-length segment in air
        let p = Vec2::new(50.0, 50.0);
        assert_eq!(col.intersect_line_hook(p, p, false), (HookHit::Clear, p));
    }

    #[test]
    fn test_hook_through_all_blocks() {
        let map = MapBuilder::new(20, 20).front(6, 3, TILE_THROUGH_ALL, 0).build();
        let col = Collision::new(map).unwrap();
        let (hit, _) = col.intersect_line_hook(Vec2::new(100.0, 112.0), Vec2::new(400.0, 112.0), false);
        assert_eq!(hit, HookHit::Blocked);
    }

    #[test]
    fn test_hook_passes_through_tile() {
        // solid with a front THROUGH_ALL is hook-through
        let map = MapBuilder::new(20, 20)
            .tile(6, 3, TILE_SOLID)
            .front(6, 3, TILE_THROUGH_CUT, 0)
            .build();
        let col = Collision::new(map).unwrap();
        let (hit, _) = col.intersect_line_hook(Vec2::new(100.0, 112.0), Vec2::new(400.0, 112.0), false);
        assert_eq!(hit, HookHit::Clear);
    }

    #[test]
    fn test_hook_teleporter() {
        let map = MapBuilder::new(20, 20)
            .tele(6, 3, TILE_TELEINHOOK, 4)
            .tele(12, 3, TILE_TELEIN, 5)
            .build();
        let col = Collision::new(map).unwrap();
        let (hit, _) = col.intersect_line_hook(Vec2::new(100.0, 112.0), Vec2::new(300.0, 112.0), false);
        assert_eq!(hit, HookHit::Teleport(4));

        let (hit, _) = col.intersect_line_hook(Vec2::new(300.0, 112.0), Vec2::new(500.0, 112.0), false);
        assert_eq!(hit, HookHit::Clear);
        let (hit, _) = col.intersect_line_hook(Vec2::new(300.0, 112.0), Vec2::new(500.0, 112.0), true);
        assert_eq!(hit, HookHit::Teleport(5));
    }

    #[test]
    fn test_weapon_hit_pulls_back() {
        let col = wall_map();
        let (hit, at) = col.intersect_line_weapon(Vec2::new(100.0, 100.0), Vec2::new(500.0, 100.0));
        assert_eq!(hit, WeaponHit::Solid(TILE_SOLID));
        assert!(at.x < 320.0);
        assert!((at.y - 99.0).abs() < 1e-3 || (at.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_weapon_teleporter() {
        let map = MapBuilder::new(20, 20).tele(6, 3, TILE_TELEINWEAPON, 2).build();
        let col = Collision::new(map).unwrap();
        let (hit, _) = col.intersect_line_weapon(Vec2::new(100.0, 112.0), Vec2::new(400.0, 112.0));
        assert_eq!(hit, WeaponHit::Teleport(2));
        let (hit, _) = col.intersect_line_weapon(Vec2::new(400.0, 400.0), Vec2::new(500.0, 400.0));
        assert!(!hit.is_hit());
    }

    #[test]
    fn test_through_offset_table() {
        let origin = Vec2::ZERO;
        assert_eq!(through_offset(origin, Vec2::new(-10.0, -1.0)), (0, 32));
        assert_eq!(through_offset(origin, Vec2::new(0.0, 10.0)), (-32, 0));
        assert_eq!(through_offset(origin, Vec2::new(10.0, 1.0)), (0, -32));
    }
}
