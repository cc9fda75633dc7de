//! Tile Effects
//!
//! Everything a character picks up from the cells it touches after moving:
//! freeze and unfreeze, race start and finish, modifier toggles, switch
//! writes, jump budgets, death, speedups and teleporters. Runs once per
//! character per tick, after weapons.

use tracing::debug;

use crate::collision::{clamp_vel, Collision, DEATH_PROBE};
use crate::core::vec2::Vec2;
use crate::game::character::{Character, Neighbors};
use crate::game::weapons::Weapon;
use crate::game::world::{Switch, TickEnv};
use crate::map::tiles::*;

/// Speedup caps are stored five times larger than the speed they allow.
const SPEEDUP_SCALE: f32 = 5.0;

/// Per-tick tile pass for one character.
///
/// Walks every cell between `prev_pos` and `pos`; a teleport ends the walk.
pub(crate) fn postcore(
    ch: &mut Character,
    others: &mut Neighbors<'_>,
    switches: &mut [Switch],
    env: &TickEnv<'_>,
) {
    let col = env.collision;

    if ch.endless_hook || env.config.sv_endless_drag != 0 {
        ch.hook_tick = 0;
    }
    ch.frozen_last_tick = false;
    if ch.deep_frozen {
        ch.freeze(env.config.sv_freeze_delay, env.game_tick);
    }

    apply_jump_rules(ch);
    handle_skippable_tiles(ch, env);

    let (start, end) = (ch.prev_pos, ch.pos);
    if col.any_tiles_between(start, end) {
        for (x, y) in CellTrace::new(start, end) {
            if handle_tiles(ch, col.cell_index(x, y), others, switches, env) {
                break;
            }
        }
    }

    if ch.telegun_teleport {
        debug!(character = ch.id.raw(), x = ch.telegun_pos.x, y = ch.telegun_pos.y, "teleport gun");
        ch.pos = ch.telegun_pos;
        if !ch.telegun_blue {
            ch.vel = Vec2::ZERO;
        }
        ch.telegun_teleport = false;
        ch.telegun_blue = false;
    }
}

/// Budget rules that can darken the feet after the primary phase.
fn apply_jump_rules(ch: &mut Character) {
    if ch.jumps == -1 || ch.jumps == 0 {
        ch.jumped |= 2;
    } else if ch.jumps == 1 && ch.jumped > 0 {
        ch.jumped |= 2;
    } else if ch.jumped_total < ch.jumps - 1 && ch.jumped > 1 {
        ch.jumped = 1;
    }

    if ch.endless_jump && ch.jumped > 1 {
        ch.jumped = 1;
    }
}

/// Death probes and speedups on the current cell.
fn handle_skippable_tiles(ch: &mut Character, env: &TickEnv<'_>) {
    let col = env.collision;
    let probes = [
        Vec2::new(DEATH_PROBE, -DEATH_PROBE),
        Vec2::new(DEATH_PROBE, DEATH_PROBE),
        Vec2::new(-DEATH_PROBE, -DEATH_PROBE),
        Vec2::new(-DEATH_PROBE, DEATH_PROBE),
    ];
    let deadly = probes.iter().any(|&offset| {
        col.collision_at(ch.pos + offset) == TILE_DEATH
            || (col.has_front() && col.front_collision_at(ch.pos + offset) == TILE_DEATH)
    });
    if deadly {
        debug!(character = ch.id.raw(), "death tile");
        ch.die(env);
        return;
    }

    let Some(speedup) = col.speedup(col.map_index(ch.pos)) else { return };
    let tuning = env.tuning(ch.tune_zone);
    match speedup.kind {
        TILE_SPEED_BOOST_OLD => {
            if speedup.force == 255 && speedup.max_speed != 0 {
                ch.vel = speedup.dir * (speedup.max_speed as f32 / SPEEDUP_SCALE);
                return;
            }
            let mut vel = ch.vel;
            let force = speedup.force as f32;
            let max_speed = if speedup.max_speed > 0 && speedup.max_speed < 5 { 5 } else { speedup.max_speed };
            if max_speed > 0 {
                let diff = heading(speedup.dir) - heading(vel);
                let speed = vel.length();
                let along = if speed == 0.0 { 0.0 } else { diff.cos() * speed };
                let left = max_speed as f32 / SPEEDUP_SCALE - along;
                let over = (left as i32).abs() > speedup.force;
                if over && left > 0.0000001 {
                    vel += speedup.dir * force;
                } else if over {
                    vel += speedup.dir * -force;
                } else {
                    vel += speedup.dir * left;
                }
            } else {
                vel += speedup.dir * force;
            }
            ch.vel = clamp_vel(ch.move_restrictions, vel);
        }
        TILE_SPEED_BOOST => {
            let mut max_speed = speedup.max_speed;
            if max_speed == 0 {
                let ramp_speed = tuning.velramp_range / (50.0 * tuning.velramp_curvature.max(1.01).ln());
                max_speed = (ramp_speed.max(tuning.velramp_start) / 50.0 * SPEEDUP_SCALE) as i32;
            }
            let current = speedup.dir.dot(ch.vel);
            let cap = max_speed as f32 / SPEEDUP_SCALE;
            let boost = if current + speedup.force as f32 > cap { cap - current } else { speedup.force as f32 };
            ch.vel = clamp_vel(ch.move_restrictions, ch.vel + speedup.dir * boost);
        }
        _ => {}
    }
}

/// Angle of `v` in `[0, 2π)`, measured with the y axis pointing up.
fn heading(v: Vec2) -> f32 {
    use std::f32::consts::{FRAC_PI_2, PI, TAU};
    let angle = if v.x > 0.0000001 {
        -(v.y / v.x).atan()
    } else if v.x < 0.0000001 {
        (v.y / v.x).atan() + PI
    } else if v.y > 0.0000001 {
        FRAC_PI_2
    } else {
        -FRAC_PI_2
    };
    if angle < 0.0 {
        angle + TAU
    } else {
        angle
    }
}

/// Apply the tiles of one cell. Returns true if the character teleported.
fn handle_tiles(
    ch: &mut Character,
    index: usize,
    others: &mut Neighbors<'_>,
    switches: &mut [Switch],
    env: &TickEnv<'_>,
) -> bool {
    let col = env.collision;
    let config = env.config;
    let tick = env.game_tick;
    let game = col.tile_index(index);
    let front = col.front_tile_index(index);
    let either = |tile: u8| game == tile || front == tile;

    if col.has_tele_layer() {
        let checkpoint = col.is_tele_checkpoint(index);
        if checkpoint != 0 {
            ch.tele_checkpoint = checkpoint;
        }
    }

    if either(TILE_START) && (ch.start_tick == -1 || config.sv_solo_server == 0) {
        ch.start_tick = tick;
        ch.finish_tick = -1;
    }
    if either(TILE_FINISH) && ch.start_tick != -1 && ch.finish_tick == -1 {
        ch.finish_tick = tick;
    }

    if either(TILE_FREEZE) && !ch.deep_frozen {
        ch.freeze(config.sv_freeze_delay, tick);
    } else if either(TILE_UNFREEZE) && !ch.deep_frozen {
        ch.unfreeze();
    }

    if either(TILE_DFREEZE) {
        ch.deep_frozen = true;
    } else if either(TILE_DUNFREEZE) {
        ch.deep_frozen = false;
    }

    if either(TILE_LFREEZE) {
        ch.live_frozen = true;
    } else if either(TILE_LUNFREEZE) {
        ch.live_frozen = false;
    }

    if either(TILE_EHOOK_ENABLE) {
        ch.endless_hook = true;
    } else if either(TILE_EHOOK_DISABLE) {
        ch.endless_hook = false;
    }

    if either(TILE_HIT_DISABLE) {
        set_hits_disabled(ch, true);
    } else if either(TILE_HIT_ENABLE) {
        set_hits_disabled(ch, false);
    }

    if either(TILE_NPC_DISABLE) {
        ch.collision_disabled = true;
    } else if either(TILE_NPC_ENABLE) {
        ch.collision_disabled = false;
    }

    if either(TILE_NPH_DISABLE) {
        ch.hook_hit_disabled = true;
    } else if either(TILE_NPH_ENABLE) {
        ch.hook_hit_disabled = false;
    }

    if either(TILE_UNLIMITED_JUMPS_ENABLE) {
        ch.endless_jump = true;
    } else if either(TILE_UNLIMITED_JUMPS_DISABLE) {
        ch.endless_jump = false;
    }

    if either(TILE_WALLJUMP) && ch.vel.y > 0.0 && ch.colliding != 0 && ch.left_wall {
        ch.left_wall = false;
        ch.jumped_total = if ch.jumps >= 2 { ch.jumps - 2 } else { 0 };
        ch.jumped = 1;
    }

    if either(TILE_JETPACK_ENABLE) {
        ch.jetpack = true;
    } else if either(TILE_JETPACK_DISABLE) {
        ch.jetpack = false;
    }

    if either(TILE_REFILL_JUMPS) {
        if !ch.last_refill_jumps {
            ch.jumped_total = 0;
            ch.jumped = 0;
            ch.last_refill_jumps = true;
        }
    } else {
        ch.last_refill_jumps = false;
    }

    if either(TILE_TELE_GUN_ENABLE) {
        ch.telegun_gun = true;
    } else if either(TILE_TELE_GUN_DISABLE) {
        ch.telegun_gun = false;
    }
    if either(TILE_TELE_GRENADE_ENABLE) {
        ch.telegun_grenade = true;
    } else if either(TILE_TELE_GRENADE_DISABLE) {
        ch.telegun_grenade = false;
    }
    if either(TILE_TELE_LASER_ENABLE) {
        ch.telegun_laser = true;
    } else if either(TILE_TELE_LASER_DISABLE) {
        ch.telegun_laser = false;
    }

    if ch.vel.y > 0.0 && ch.move_restrictions & CANTMOVE_DOWN != 0 {
        ch.jumped = 0;
        ch.jumped_total = 0;
    }
    ch.vel = clamp_vel(ch.move_restrictions, ch.vel);

    handle_switch_tile(ch, index, switches, env);

    if !col.has_tele_layer() {
        return false;
    }
    teleport(ch, index, others, env)
}

fn set_hits_disabled(ch: &mut Character, disabled: bool) {
    ch.hammer_hit_disabled = disabled;
    ch.shotgun_hit_disabled = disabled;
    ch.grenade_hit_disabled = disabled;
    ch.laser_hit_disabled = disabled;
}

/// Switch-layer effects of one cell.
fn handle_switch_tile(ch: &mut Character, index: usize, switches: &mut [Switch], env: &TickEnv<'_>) {
    let col = env.collision;
    if !col.has_switch_layer() {
        ch.last_penalty = false;
        ch.last_bonus = false;
        return;
    }
    let tick = env.game_tick;
    let number = col.switch_number(index);
    let kind = col.switch_type(index);
    let delay = col.switch_delay(index);
    let slot = number as usize;
    let gate_open = number == 0 || switches.get(slot).is_some_and(|s| s.status);

    match kind {
        TILE_SWITCHOPEN | TILE_SWITCHTIMEDOPEN | TILE_SWITCHTIMEDCLOSE | TILE_SWITCHCLOSE if number > 0 => {
            if let Some(switch) = switches.get_mut(slot) {
                let timed_end = tick + 1 + delay as i32 * crate::TICK_SPEED;
                let (status, end_tick) = match kind {
                    TILE_SWITCHOPEN => (true, 0),
                    TILE_SWITCHTIMEDOPEN => (true, timed_end),
                    TILE_SWITCHTIMEDCLOSE => (false, timed_end),
                    _ => (false, 0),
                };
                switch.status = status;
                switch.end_tick = end_tick;
                switch.kind = kind;
                switch.last_update_tick = tick;
            }
        }
        TILE_FREEZE => {
            if gate_open {
                ch.freeze(delay as i32, tick);
            }
        }
        TILE_DFREEZE if gate_open => ch.deep_frozen = true,
        TILE_DUNFREEZE if gate_open => ch.deep_frozen = false,
        TILE_LFREEZE if gate_open => ch.live_frozen = true,
        TILE_LUNFREEZE if gate_open => ch.live_frozen = false,
        TILE_HIT_ENABLE | TILE_HIT_DISABLE => {
            let disabled = kind == TILE_HIT_DISABLE;
            match Weapon::from_index(delay as i32) {
                Some(Weapon::Hammer) => ch.hammer_hit_disabled = disabled,
                Some(Weapon::Shotgun) => ch.shotgun_hit_disabled = disabled,
                Some(Weapon::Grenade) => ch.grenade_hit_disabled = disabled,
                Some(Weapon::Laser) => ch.laser_hit_disabled = disabled,
                _ => {}
            }
        }
        TILE_JUMP => {
            ch.jumps = if delay == 255 { -1 } else { delay as i32 };
        }
        TILE_ADD_TIME if !ch.last_penalty => {
            ch.start_time -= (delay as i32 * 60 + number as i32) * crate::TICK_SPEED;
            ch.last_penalty = true;
        }
        TILE_SUBTRACT_TIME if !ch.last_bonus => {
            ch.start_time += (delay as i32 * 60 + number as i32) * crate::TICK_SPEED;
            if ch.start_time > tick {
                ch.start_time = tick;
            }
            ch.last_bonus = true;
        }
        _ => {}
    }

    if kind != TILE_ADD_TIME {
        ch.last_penalty = false;
    }
    if kind != TILE_SUBTRACT_TIME {
        ch.last_bonus = false;
    }
}

/// Teleporters of one cell. Returns true if the character moved.
fn teleport(ch: &mut Character, index: usize, others: &mut Neighbors<'_>, env: &TickEnv<'_>) -> bool {
    let col = env.collision;
    let config = env.config;
    let tick = env.game_tick;
    let keep_hook = config.sv_teleport_hold_hook != 0;

    let number = col.is_teleport(index);
    if let Some(out) = col.tele_out(number, tick).filter(|_| number != 0) {
        debug!(character = ch.id.raw(), number, "teleport");
        ch.pos = out;
        if !keep_hook {
            ch.reset_hook();
        }
        if config.sv_teleport_lose_weapons != 0 {
            ch.reset_pickups();
        }
        return true;
    }

    let number = col.is_evil_teleport(index);
    if let Some(out) = col.tele_out(number, tick).filter(|_| number != 0) {
        debug!(character = ch.id.raw(), number, "evil teleport");
        ch.pos = out;
        ch.vel = Vec2::ZERO;
        if !keep_hook {
            ch.reset_hook();
            release_hooked(ch, others);
        }
        if config.sv_teleport_lose_weapons != 0 {
            ch.reset_pickups();
        }
        return true;
    }

    let evil = col.is_check_evil_teleport(index) != 0;
    if evil || col.is_check_teleport(index) != 0 {
        let Some(out) = checkpoint_out(col, ch, tick) else { return false };
        debug!(character = ch.id.raw(), checkpoint = ch.tele_checkpoint, evil, "checkpoint teleport");
        ch.pos = out;
        if evil {
            ch.vel = Vec2::ZERO;
        }
        if !keep_hook {
            ch.reset_hook();
            if evil {
                release_hooked(ch, others);
            }
        }
        return true;
    }
    false
}

/// Out of the newest checkpoint at or below the last one passed, else the
/// character's spawn.
fn checkpoint_out(col: &Collision, ch: &Character, tick: i32) -> Option<Vec2> {
    (0..=ch.tele_checkpoint)
        .rev()
        .find_map(|k| col.tele_check_out(k, tick))
        .or_else(|| col.spawn_position(ch.id.raw()))
}

fn release_hooked(ch: &Character, others: &mut Neighbors<'_>) {
    for other in others.iter_mut() {
        other.release_if_hooking(ch.id);
    }
}

// =============================================================================
// CELL TRACE
// =============================================================================

/// Grid cells crossed by a segment, start cell first.
///
/// When the segment passes exactly through a cell corner, the horizontal
/// neighbour is visited before the vertical one.
struct CellTrace {
    cx: i32,
    cy: i32,
    tx: i32,
    ty: i32,
    step_x: i32,
    step_y: i32,
    t_max_x: f32,
    t_max_y: f32,
    t_delta_x: f32,
    t_delta_y: f32,
    pending: Vec<(i32, i32)>,
    started: bool,
}

impl CellTrace {
    fn new(start: Vec2, end: Vec2) -> Self {
        const CELL: f32 = 32.0;
        let cx = (start.x as i32) >> 5;
        let cy = (start.y as i32) >> 5;
        let d = end - start;
        let step_x = (d.x > 0.0) as i32 - (d.x < 0.0) as i32;
        let step_y = (d.y > 0.0) as i32 - (d.y < 0.0) as i32;
        let (adx, ady) = (d.x.abs(), d.y.abs());

        let t_delta_x = if step_x != 0 { CELL / adx } else { f32::MAX };
        let t_delta_y = if step_y != 0 { CELL / ady } else { f32::MAX };
        let t_max_x = match step_x {
            1 => (((cx + 1) << 5) as f32 - start.x) / adx,
            -1 => (start.x - (cx << 5) as f32) / adx,
            _ => f32::MAX,
        };
        let t_max_y = match step_y {
            1 => (((cy + 1) << 5) as f32 - start.y) / ady,
            -1 => (start.y - (cy << 5) as f32) / ady,
            _ => f32::MAX,
        };

        Self {
            cx,
            cy,
            tx: (end.x as i32) >> 5,
            ty: (end.y as i32) >> 5,
            step_x,
            step_y,
            t_max_x,
            t_max_y,
            t_delta_x,
            t_delta_y,
            pending: Vec::new(),
            started: false,
        }
    }

    fn advance_x(&mut self) -> (i32, i32) {
        self.cx += self.step_x;
        self.t_max_x += self.t_delta_x;
        (self.cx, self.cy)
    }

    fn advance_y(&mut self) -> (i32, i32) {
        self.cy += self.step_y;
        self.t_max_y += self.t_delta_y;
        (self.cx, self.cy)
    }
}

impl Iterator for CellTrace {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<(i32, i32)> {
        if !self.started {
            self.started = true;
            return Some((self.cx, self.cy));
        }
        if let Some(cell) = self.pending.pop() {
            return Some(cell);
        }
        if (self.cx == self.tx && self.cy == self.ty) || self.t_max_x.min(self.t_max_y) > 1.0 {
            return None;
        }
        if self.t_max_x < self.t_max_y {
            return Some(self.advance_x());
        }
        if self.t_max_y < self.t_max_x {
            return Some(self.advance_y());
        }

        // exact corner crossing
        let mut first = None;
        if self.cx != self.tx {
            first = Some(self.advance_x());
        }
        if self.cy != self.ty {
            let second = self.advance_y();
            match first {
                Some(_) => self.pending.push(second),
                None => first = Some(second),
            }
        }
        first
    }
}

// =============================================================================
// TESTS
// =============================================================================
