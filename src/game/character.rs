//! Character Physics
//!
//! Per-character state plus the three phases the world drives every tick:
//!
//! 1. [`Character::pre_tick`]: gravity, jumping, walking and the hook state
//!    machine. Reads other characters, writes only itself.
//! 2. [`Character::interact`]: pushing apart and hook drag. Writes itself
//!    and the character it drags.
//! 3. [`Character::move_pass`]: speed cap, velocity ramp and the swept box
//!    move through the grid.
//!
//! Weapons live in [`crate::game::weapons`], tile effects in
//! [`crate::game::tiles`].

use serde::{Serialize, Deserialize};

use crate::collision::movement::PHYSICAL_BOX;
use crate::collision::restrictions::PROBE_DISTANCE;
use crate::collision::{clamp_vel, HookHit, SwitchStateProvider, HALF_PHYSICAL_SIZE, PHYSICAL_SIZE};
use crate::core::quantize::{quantize_position_vec, quantize_velocity_vec};
use crate::core::rng::FastRand;
use crate::core::vec2::{closest_point_on_line, saturated_add, Vec2};
use crate::game::input::PlayerInput;
use crate::game::tuning::TuningParams;
use crate::game::weapons::{Weapon, NUM_WEAPONS};
use crate::game::world::TickEnv;

/// Speed above which velocity is scaled back, in units per tick.
pub const MAX_SPEED: f32 = 6000.0 / 32.0;

/// Hook grabs on a character end after this many ticks.
pub const HOOK_GRAB_TICKS: i32 = 60;

/// Ticks between a kill request and the next one being honoured.
pub const RESPAWN_DELAY_TICKS: i32 = 25;

/// Ninja powerup duration in ticks.
pub const NINJA_DURATION_TICKS: i32 = 750;

/// Ticks a ninja dash lasts.
pub const NINJA_MOVE_TICKS: i32 = 10;

/// Ninja dash speed in units per tick.
pub const NINJA_VELOCITY: f32 = 50.0;

/// A ninja dash damages at most this many characters.
pub const MAX_HIT_OBJECTS: usize = 10;

/// Distance within which a grabbed hook drags its owner towards the anchor.
const HOOK_DRAG_MIN_DISTANCE: f32 = 46.0;

/// Distance within which a flying hook grabs a character.
const HOOK_GRAB_RADIUS: f32 = PHYSICAL_SIZE + 2.0;

/// Handle to a character slot in a world.
///
/// Handles are never reused: removing a character retires its slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub(crate) u32);

impl CharacterId {
    /// Raw slot number.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Slot index into the world's character list.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Hook state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum HookState {
    /// Hook fully retracted; released only when the hook button is let go
    Retracted = -1,
    /// Hook at the character, ready to fire
    Idle = 0,
    /// Retract animation, first step
    RetractStart = 1,
    /// Retract animation, second step
    RetractMid = 2,
    /// Retract animation, last step
    RetractEnd = 3,
    /// Travelling outwards
    Flying = 4,
    /// Attached to ground or a character
    Grabbed = 5,
}

impl HookState {
    /// Signed wire value.
    #[inline]
    pub const fn as_i8(self) -> i8 {
        self as i8
    }

    fn retract_step(self) -> Self {
        match self {
            HookState::RetractStart => HookState::RetractMid,
            HookState::RetractMid => HookState::RetractEnd,
            HookState::RetractEnd => HookState::Retracted,
            other => other,
        }
    }
}

/// Ninja dash bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NinjaState {
    /// Dash direction
    pub activation_dir: Vec2,
    /// Tick the powerup was picked up
    pub activation_tick: i32,
    /// Remaining dash ticks
    pub move_time: i32,
    /// Speed restored when the dash ends
    pub old_vel_amount: i32,
}

/// One simulated character.
#[derive(Clone, Debug, PartialEq)]
pub struct Character {
    pub(crate) id: CharacterId,
    pub(crate) active: bool,

    pub(crate) pos: Vec2,
    pub(crate) prev_pos: Vec2,
    pub(crate) vel: Vec2,
    pub(crate) grounded: bool,

    // hook
    pub(crate) hook_pos: Vec2,
    pub(crate) hook_dir: Vec2,
    pub(crate) hook_tele_base: Vec2,
    pub(crate) hook_tick: i32,
    pub(crate) hook_state: HookState,
    pub(crate) hooked: Option<CharacterId>,
    pub(crate) new_hook: bool,

    // jumping
    pub(crate) jumped: i32,
    pub(crate) jumped_total: i32,
    pub(crate) jumps: i32,

    // input
    pub(crate) input: PlayerInput,
    pub(crate) saved_input: Option<PlayerInput>,
    pub(crate) prev_fire: i32,

    // weapons
    pub(crate) active_weapon: Weapon,
    pub(crate) last_weapon: Weapon,
    pub(crate) queued_weapon: Option<Weapon>,
    pub(crate) weapons_owned: [bool; NUM_WEAPONS],
    pub(crate) reload_timer: i32,
    pub(crate) attack_tick: i32,
    pub(crate) ninja: NinjaState,
    pub(crate) hit_objects: Vec<CharacterId>,

    // freeze
    pub(crate) freeze_time: i32,
    pub(crate) freeze_start: i32,
    pub(crate) frozen_last_tick: bool,
    pub(crate) deep_frozen: bool,
    pub(crate) live_frozen: bool,

    // modifiers
    pub(crate) solo: bool,
    pub(crate) endless_hook: bool,
    pub(crate) endless_jump: bool,
    pub(crate) collision_disabled: bool,
    pub(crate) hook_hit_disabled: bool,
    pub(crate) hammer_hit_disabled: bool,
    pub(crate) shotgun_hit_disabled: bool,
    pub(crate) grenade_hit_disabled: bool,
    pub(crate) laser_hit_disabled: bool,
    pub(crate) jetpack: bool,

    // telegun
    pub(crate) telegun_gun: bool,
    pub(crate) telegun_grenade: bool,
    pub(crate) telegun_laser: bool,
    pub(crate) telegun_teleport: bool,
    pub(crate) telegun_blue: bool,
    pub(crate) telegun_pos: Vec2,

    // cell state
    pub(crate) tune_zone: u8,
    pub(crate) move_restrictions: u8,
    pub(crate) colliding: i32,
    pub(crate) left_wall: bool,
    pub(crate) tele_checkpoint: u8,

    // race timing
    pub(crate) start_tick: i32,
    pub(crate) finish_tick: i32,
    pub(crate) start_time: i32,
    pub(crate) last_refill_jumps: bool,
    pub(crate) last_penalty: bool,
    pub(crate) last_bonus: bool,

    pub(crate) respawn_delay: i32,
    pub(crate) hit_num: i32,
}

impl Character {
    /// Fresh character at `pos`.
    pub fn new(id: CharacterId, pos: Vec2) -> Self {
        let mut weapons_owned = [false; NUM_WEAPONS];
        weapons_owned[Weapon::Hammer.index()] = true;
        weapons_owned[Weapon::Gun.index()] = true;

        Self {
            id,
            active: true,
            pos,
            prev_pos: pos,
            vel: Vec2::ZERO,
            grounded: false,
            hook_pos: pos,
            hook_dir: Vec2::ZERO,
            hook_tele_base: Vec2::ZERO,
            hook_tick: 0,
            hook_state: HookState::Idle,
            hooked: None,
            new_hook: false,
            jumped: 0,
            jumped_total: 0,
            jumps: 2,
            input: PlayerInput::new(),
            saved_input: None,
            prev_fire: 0,
            active_weapon: Weapon::Gun,
            last_weapon: Weapon::Hammer,
            queued_weapon: None,
            weapons_owned,
            reload_timer: 0,
            attack_tick: 0,
            ninja: NinjaState::default(),
            hit_objects: Vec::new(),
            freeze_time: 0,
            freeze_start: 0,
            frozen_last_tick: false,
            deep_frozen: false,
            live_frozen: false,
            solo: false,
            endless_hook: false,
            endless_jump: false,
            collision_disabled: false,
            hook_hit_disabled: false,
            hammer_hit_disabled: false,
            shotgun_hit_disabled: false,
            grenade_hit_disabled: false,
            laser_hit_disabled: false,
            jetpack: false,
            telegun_gun: false,
            telegun_grenade: false,
            telegun_laser: false,
            telegun_teleport: false,
            telegun_blue: false,
            telegun_pos: Vec2::ZERO,
            tune_zone: 0,
            move_restrictions: 0,
            colliding: 0,
            left_wall: false,
            tele_checkpoint: 0,
            start_tick: -1,
            finish_tick: -1,
            start_time: 0,
            last_refill_jumps: false,
            last_penalty: false,
            last_bonus: false,
            respawn_delay: 0,
            hit_num: 0,
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Handle of this character.
    #[inline]
    pub fn id(&self) -> CharacterId {
        self.id
    }

    /// False once the character was removed from its world.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Center position.
    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    /// Position at the end of the previous tick.
    #[inline]
    pub fn prev_pos(&self) -> Vec2 {
        self.prev_pos
    }

    /// Velocity in units per tick.
    #[inline]
    pub fn vel(&self) -> Vec2 {
        self.vel
    }

    /// Place the character, discarding the swept path.
    pub fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
        self.prev_pos = pos;
    }

    /// Overwrite the velocity.
    pub fn set_vel(&mut self, vel: Vec2) {
        self.vel = vel;
    }

    /// Standing on ground at the last pre-tick.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Hook state.
    #[inline]
    pub fn hook_state(&self) -> HookState {
        self.hook_state
    }

    /// Hook head position.
    #[inline]
    pub fn hook_pos(&self) -> Vec2 {
        self.hook_pos
    }

    /// Hook travel direction.
    #[inline]
    pub fn hook_dir(&self) -> Vec2 {
        self.hook_dir
    }

    /// Character the hook holds, if any.
    #[inline]
    pub fn hooked(&self) -> Option<CharacterId> {
        self.hooked
    }

    /// Ticks the hook has been attached.
    #[inline]
    pub fn hook_tick(&self) -> i32 {
        self.hook_tick
    }

    /// Jump bit set: 1 = jump held since the last jump, 2 = air jump used.
    #[inline]
    pub fn jumped(&self) -> i32 {
        self.jumped
    }

    /// Air jumps used since last touching ground.
    #[inline]
    pub fn jumped_total(&self) -> i32 {
        self.jumped_total
    }

    /// Allowed jumps (-1 = none at all).
    #[inline]
    pub fn jumps(&self) -> i32 {
        self.jumps
    }

    /// Input committed for the current tick.
    #[inline]
    pub fn input(&self) -> &PlayerInput {
        &self.input
    }

    /// Weapon in hand.
    #[inline]
    pub fn active_weapon(&self) -> Weapon {
        self.active_weapon
    }

    /// Whether `weapon` is owned.
    #[inline]
    pub fn has_weapon(&self, weapon: Weapon) -> bool {
        self.weapons_owned[weapon.index()]
    }

    /// Give or take a weapon.
    pub fn set_weapon_owned(&mut self, weapon: Weapon, owned: bool) {
        self.weapons_owned[weapon.index()] = owned;
    }

    /// Ticks until the weapon can fire again.
    #[inline]
    pub fn reload_timer(&self) -> i32 {
        self.reload_timer
    }

    /// Tick the last attack started.
    #[inline]
    pub fn attack_tick(&self) -> i32 {
        self.attack_tick
    }

    /// Ninja dash state.
    #[inline]
    pub fn ninja(&self) -> &NinjaState {
        &self.ninja
    }

    /// Remaining freeze ticks.
    #[inline]
    pub fn freeze_time(&self) -> i32 {
        self.freeze_time
    }

    /// Frozen right now.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.freeze_time > 0
    }

    /// Deep freeze: re-frozen every tick.
    #[inline]
    pub fn is_deep_frozen(&self) -> bool {
        self.deep_frozen
    }

    /// Live freeze: movement input ignored.
    #[inline]
    pub fn is_live_frozen(&self) -> bool {
        self.live_frozen
    }

    /// Solo characters ignore everyone else.
    #[inline]
    pub fn is_solo(&self) -> bool {
        self.solo
    }

    /// Grabbed hooks never time out.
    #[inline]
    pub fn has_endless_hook(&self) -> bool {
        self.endless_hook
    }

    /// Air jumps never run out.
    #[inline]
    pub fn has_endless_jump(&self) -> bool {
        self.endless_jump
    }

    /// Jetpack on the gun.
    #[inline]
    pub fn has_jetpack(&self) -> bool {
        self.jetpack
    }

    /// Tune zone the character stands in.
    #[inline]
    pub fn tune_zone(&self) -> u8 {
        self.tune_zone
    }

    /// Stopper bits around the character.
    #[inline]
    pub fn move_restrictions(&self) -> u8 {
        self.move_restrictions
    }

    /// Last teleport checkpoint touched.
    #[inline]
    pub fn tele_checkpoint(&self) -> u8 {
        self.tele_checkpoint
    }

    /// Tick the race started, -1 if not running.
    #[inline]
    pub fn start_tick(&self) -> i32 {
        self.start_tick
    }

    /// Tick the race finished, -1 if not finished.
    #[inline]
    pub fn finish_tick(&self) -> i32 {
        self.finish_tick
    }

    /// Race clock offset moved by time penalty and bonus tiles.
    #[inline]
    pub fn start_time(&self) -> i32 {
        self.start_time
    }

    /// Recent hit counter.
    #[inline]
    pub fn hit_num(&self) -> i32 {
        self.hit_num
    }

    // =========================================================================
    // STATE CHANGES
    // =========================================================================

    /// Reset to a fresh character at the spawn for this slot.
    ///
    /// Keeps the handle; with no spawn points the old position is kept.
    pub(crate) fn die(&mut self, env: &TickEnv<'_>) {
        let pos = env.collision.spawn_position(self.id.0).unwrap_or(self.pos);
        *self = Character::new(self.id, pos);
    }

    /// Freeze for `seconds`.
    ///
    /// Refused when a longer freeze is running or one started within the
    /// last second.
    pub(crate) fn freeze(&mut self, seconds: i32, now: i32) -> bool {
        if seconds <= 0 || self.freeze_time > seconds * crate::TICK_SPEED {
            return false;
        }
        if self.freeze_time == 0 || self.freeze_start < now - crate::TICK_SPEED {
            self.freeze_time = seconds * crate::TICK_SPEED;
            self.freeze_start = now;
            return true;
        }
        false
    }

    /// End a running freeze.
    pub(crate) fn unfreeze(&mut self) -> bool {
        if self.freeze_time <= 0 {
            return false;
        }
        if !self.has_weapon(self.active_weapon) {
            self.active_weapon = Weapon::Gun;
        }
        self.freeze_time = 0;
        self.frozen_last_tick = true;
        true
    }

    /// Add `force` to the velocity, respecting stoppers.
    #[inline]
    pub(crate) fn take_damage(&mut self, force: Vec2) {
        self.vel = clamp_vel(self.move_restrictions, self.vel + force);
    }

    /// Drop whatever the hook holds.
    pub(crate) fn reset_hook(&mut self) {
        self.hooked = None;
        self.hook_state = HookState::Retracted;
        self.hook_pos = self.pos;
    }

    /// Strip shotgun, grenade, laser and ninja.
    pub(crate) fn reset_pickups(&mut self) {
        for weapon in [Weapon::Shotgun, Weapon::Grenade, Weapon::Laser, Weapon::Ninja] {
            self.set_weapon_owned(weapon, false);
        }
        if self.active_weapon > Weapon::Shotgun {
            self.active_weapon = Weapon::Gun;
        }
    }

    /// Clear the ninja powerup and restore the previous weapon.
    pub(crate) fn remove_ninja(&mut self) {
        self.ninja = NinjaState::default();
        self.set_weapon_owned(Weapon::Ninja, false);
        self.active_weapon = self.last_weapon;
    }

    /// Release a hook that holds `target`.
    #[inline]
    pub(crate) fn release_if_hooking(&mut self, target: CharacterId) {
        if self.hooked == Some(target) {
            self.hooked = None;
            self.hook_state = HookState::Retracted;
        }
    }

    fn release_hook(&mut self) {
        self.hooked = None;
        self.hook_state = HookState::Retracted;
        self.hook_pos = self.pos;
    }

    /// Round position, velocity and hook to their wire precision.
    pub fn quantize(&mut self) {
        self.pos = quantize_position_vec(self.pos);
        self.hook_pos = quantize_position_vec(self.hook_pos);
        self.vel = quantize_velocity_vec(self.vel);
        self.hook_dir = quantize_velocity_vec(self.hook_dir);
    }

    // =========================================================================
    // PRE-TICK
    // =========================================================================

    /// Freeze countdown, live freeze and tune zone lookup.
    fn ddrace_tick(&mut self, env: &TickEnv<'_>) {
        if self.live_frozen {
            self.input.direction = 0;
            self.input.jump = false;
        }
        if self.freeze_time > 0 {
            self.freeze_time -= 1;
            self.input.direction = 0;
            self.input.jump = false;
            self.input.hook = false;
            if self.freeze_time == 1 {
                self.unfreeze();
            }
        }
        self.tune_zone = env.collision.is_tune(env.collision.map_index(self.pos));
    }

    /// Gravity, jumping, walking and hook.
    pub(crate) fn pre_tick(&mut self, env: &TickEnv<'_>, others: &Neighbors<'_>) {
        self.ddrace_tick(env);

        let col = env.collision;
        let tuning = env.tuning(self.tune_zone);
        let foot = HALF_PHYSICAL_SIZE + 5.0;
        self.grounded = col.check_point(self.pos + Vec2::new(HALF_PHYSICAL_SIZE, foot))
            || col.check_point(self.pos + Vec2::new(-HALF_PHYSICAL_SIZE, foot));

        self.vel.y += tuning.gravity;

        self.apply_jump(tuning);
        self.apply_hook_input(tuning);
        self.apply_control(tuning);
        self.update_hook(env, tuning, others);
    }

    fn apply_jump(&mut self, tuning: &TuningParams) {
        if !self.input.jump {
            self.jumped &= !1;
            return;
        }
        if self.jumped & 1 != 0 {
            return;
        }
        if self.grounded && (self.jumped & 2 == 0 || self.jumps != 0) {
            self.vel.y = -tuning.ground_jump_impulse;
            self.jumped |= if self.jumps > 1 { 1 } else { 3 };
            self.jumped_total = 0;
        } else if self.jumped & 2 == 0 {
            self.vel.y = -tuning.air_jump_impulse;
            self.jumped |= 3;
            self.jumped_total += 1;
        }
    }

    fn apply_hook_input(&mut self, tuning: &TuningParams) {
        if self.input.hook {
            if self.hook_state == HookState::Idle {
                let dir = self.input.target().normalize_nonzero();
                self.hook_state = HookState::Flying;
                self.hook_pos = self.pos + dir * (PHYSICAL_SIZE * 1.5);
                self.hook_dir = dir;
                self.hooked = None;
                self.hook_tick = (crate::TICK_SPEED as f32 * (1.25 - tuning.hook_duration)) as i32;
            }
        } else {
            self.hooked = None;
            self.hook_state = HookState::Idle;
            self.hook_pos = self.pos;
        }
    }

    fn apply_control(&mut self, tuning: &TuningParams) {
        let (max_speed, accel, friction) = if self.grounded {
            self.jumped &= !2;
            self.jumped_total = 0;
            (tuning.ground_control_speed, tuning.ground_control_accel, tuning.ground_friction)
        } else {
            (tuning.air_control_speed, tuning.air_control_accel, tuning.air_friction)
        };

        if self.input.direction < 0 {
            self.vel.x = saturated_add(-max_speed, max_speed, self.vel.x, -accel);
        } else if self.input.direction > 0 {
            self.vel.x = saturated_add(-max_speed, max_speed, self.vel.x, accel);
        } else {
            self.vel.x *= friction;
        }
    }

    fn update_hook(&mut self, env: &TickEnv<'_>, tuning: &TuningParams, others: &Neighbors<'_>) {
        match self.hook_state {
            HookState::Idle => {
                self.hooked = None;
                self.hook_pos = self.pos;
            }
            HookState::RetractStart | HookState::RetractMid | HookState::RetractEnd => {
                self.hook_state = self.hook_state.retract_step();
            }
            HookState::Flying => self.fly_hook(env, tuning, others),
            HookState::Retracted | HookState::Grabbed => {}
        }

        if self.hook_state == HookState::Grabbed {
            self.hold_hook(tuning, others);
        }
    }

    fn fly_hook(&mut self, env: &TickEnv<'_>, tuning: &TuningParams, others: &Neighbors<'_>) {
        let col = env.collision;
        let base = if self.new_hook { self.hook_tele_base } else { self.pos };
        let mut new_pos = self.hook_pos + self.hook_dir * tuning.hook_fire_speed;
        if base.distance_squared(new_pos) > tuning.hook_length * tuning.hook_length {
            self.hook_state = HookState::RetractStart;
            new_pos = base + (new_pos - base).normalize_nonzero() * tuning.hook_length;
        }
        let new_pos = col.clip_to_map(self.hook_pos, new_pos);

        let (hit, new_pos) = col.intersect_line_hook(self.hook_pos, new_pos, env.config.sv_old_teleport_hook != 0);

        if env.characters > 1
            && !self.hook_hit_disabled
            && tuning.player_hooking_enabled()
            && (self.hook_state == HookState::Flying || !self.new_hook)
        {
            let mut best = 0.0;
            for other in others.iter() {
                if other.solo || self.solo {
                    continue;
                }
                let Some(closest) = closest_point_on_line(self.hook_pos, new_pos, other.pos) else {
                    continue;
                };
                if other.pos.distance(closest) >= HOOK_GRAB_RADIUS {
                    continue;
                }
                let d = self.hook_pos.distance(other.pos);
                if self.hooked.is_none() || d < best {
                    self.hook_state = HookState::Grabbed;
                    self.hooked = Some(other.id);
                    best = d;
                }
            }
        }

        if self.hook_state != HookState::Flying {
            return;
        }
        match hit {
            HookHit::Ground(_) => {
                self.hook_state = HookState::Grabbed;
                self.hook_pos = new_pos;
            }
            HookHit::Blocked => {
                self.hook_state = HookState::RetractStart;
                self.hook_pos = new_pos;
            }
            HookHit::Teleport(number) => match col.tele_out(number, env.game_tick) {
                Some(out) => {
                    self.hooked = None;
                    self.new_hook = true;
                    let dir = self.input.target().normalize();
                    self.hook_pos = out + dir * (PHYSICAL_SIZE * 1.5);
                    self.hook_dir = dir;
                    self.hook_tele_base = self.hook_pos;
                }
                None => self.hook_pos = new_pos,
            },
            HookHit::Clear => self.hook_pos = new_pos,
        }
    }

    fn hold_hook(&mut self, tuning: &TuningParams, others: &Neighbors<'_>) {
        if let Some(target) = self.hooked {
            match others.get(target) {
                Some(other) => self.hook_pos = other.pos,
                None => {
                    self.release_hook();
                    return;
                }
            }
        } else if self.hook_pos.distance_squared(self.pos) > HOOK_DRAG_MIN_DISTANCE * HOOK_DRAG_MIN_DISTANCE {
            let mut hook_vel = (self.hook_pos - self.pos).normalize_nonzero() * tuning.hook_drag_accel;
            // pulling down is weaker than pulling up
            if hook_vel.y > 0.0 {
                hook_vel.y *= 0.3;
            }
            let direction = self.input.direction;
            if direction != 0 && hook_vel.x.is_sign_negative() == (direction < 0) {
                hook_vel.x *= 0.95;
            } else {
                hook_vel.x *= 0.75;
            }

            let new_vel = self.vel + hook_vel;
            let new_speed_sq = new_vel.length_squared();
            let max = tuning.hook_drag_speed;
            if new_speed_sq < max * max || new_speed_sq < self.vel.length_squared() {
                self.vel = new_vel;
            }
        }

        self.hook_tick += 1;
        if self.hooked.is_some() && self.hook_tick > HOOK_GRAB_TICKS {
            self.release_hook();
        }
    }

    // =========================================================================
    // INTERACTION
    // =========================================================================

    /// Push apart from nearby characters and drag a hooked one.
    ///
    /// Pushes consider the 3x3 cell neighbourhood in id order and stop
    /// after a handful of contacts.
    pub(crate) fn interact(&mut self, env: &TickEnv<'_>, others: &mut Neighbors<'_>) {
        const MAX_PUSHES: usize = 8;
        let cell = ((self.pos.x as i32) >> 5, (self.pos.y as i32) >> 5);
        let mut pushes = 0;

        for other in others.iter() {
            if pushes > MAX_PUSHES {
                break;
            }
            let other_cell = ((other.pos.x as i32) >> 5, (other.pos.y as i32) >> 5);
            if (other_cell.0 - cell.0).abs() > 1 || (other_cell.1 - cell.1).abs() > 1 {
                continue;
            }
            if self.push_from(other, env) {
                pushes += 1;
            }
        }

        self.drag_hooked(env, others);

        if self.hook_state != HookState::Flying {
            self.new_hook = false;
        }
    }

    /// Push away from `other`. Returns true when the bodies overlapped.
    fn push_from(&mut self, other: &Character, env: &TickEnv<'_>) -> bool {
        if self.solo || other.solo {
            return false;
        }
        let distance = self.pos.distance(other.pos);
        if distance == 0.0 {
            let mut rng = FastRand::for_pair(self.id.0, other.id.0, env.game_tick);
            let jx = (rng.next_unit() - rng.next_unit()) * 0.5;
            let jy = (rng.next_unit() - rng.next_unit()) * 0.5;
            self.vel += Vec2::new(jx, jy);
            return false;
        }

        let dir = (self.pos - other.pos).normalize();
        let tuning = env.tuning(self.tune_zone);
        let can_collide = !self.collision_disabled && !other.collision_disabled && tuning.player_collision_enabled();
        if !can_collide || distance >= PHYSICAL_SIZE * 1.25 {
            return false;
        }

        let overlap = PHYSICAL_SIZE * 1.45 - distance;
        let mut velocity = 0.5;
        // head-on approaches push harder than glancing ones
        if self.vel.length() > 0.0001 {
            velocity = 1.0 - (self.vel.normalize_nonzero().dot(dir) + 1.0) / 2.0;
        }
        self.vel += dir * overlap * (velocity * 0.75) * 0.85;
        true
    }

    fn drag_hooked(&mut self, env: &TickEnv<'_>, others: &mut Neighbors<'_>) {
        if env.characters <= 1 {
            return;
        }
        let Some(target_id) = self.hooked else { return };
        let Some(target) = others.get_mut(target_id) else { return };

        let tuning = env.tuning(self.tune_zone);
        let distance = self.pos.distance(target.pos);
        let dir = (self.pos - target.pos).normalize();

        if self.hook_hit_disabled || !tuning.player_hooking_enabled() || distance <= PHYSICAL_SIZE * 1.50 {
            return;
        }
        let accel = tuning.hook_drag_accel * (distance / tuning.hook_length);
        let drag_speed = tuning.hook_drag_speed;

        let target_vel = Vec2::new(
            saturated_add(-drag_speed, drag_speed, target.vel.x, accel * dir.x * 1.5),
            saturated_add(-drag_speed, drag_speed, target.vel.y, accel * dir.y * 1.5),
        );
        target.vel = clamp_vel(target.move_restrictions, target_vel);

        let own_vel = Vec2::new(
            saturated_add(-drag_speed, drag_speed, self.vel.x, -accel * dir.x * 0.25),
            saturated_add(-drag_speed, drag_speed, self.vel.y, -accel * dir.y * 0.25),
        );
        self.vel = clamp_vel(self.move_restrictions, own_vel);
    }

    // =========================================================================
    // MOVE
    // =========================================================================

    /// Speed cap, velocity ramp and the swept move.
    pub(crate) fn move_pass(&mut self, env: &TickEnv<'_>, switches: &dyn SwitchStateProvider) {
        let col = env.collision;
        let tuning = env.tuning(self.tune_zone);

        if self.vel.length() > MAX_SPEED {
            self.vel = self.vel.normalize_nonzero() * MAX_SPEED;
        }

        let speed = self.vel.length() * crate::TICK_SPEED as f32;
        let ramp = if speed >= tuning.velramp_start {
            let falloff = tuning.velramp_curvature.ln() / tuning.velramp_range;
            (-(speed - tuning.velramp_start) * falloff).exp()
        } else {
            1.0
        };

        let old_vel_x = self.vel.x * ramp;
        self.vel.x = old_vel_x;

        let target = self.pos + self.vel;
        let margin = HALF_PHYSICAL_SIZE + 2.0;
        let max_x = (col.width() * 32) as f32 - margin;
        let max_y = (col.height() * 32) as f32 - margin;
        if target.x < margin || target.y < margin || target.x >= max_x || target.y >= max_y {
            self.die(env);
            return;
        }

        let elasticity = Vec2::new(tuning.ground_elasticity_x, tuning.ground_elasticity_y);
        let moved = col.move_box(self.pos, self.vel, PHYSICAL_BOX, elasticity);
        self.vel = moved.vel;
        if moved.grounded {
            self.jumped &= !2;
            self.jumped_total = 0;
        }

        self.colliding = 0;
        if self.vel.x.abs() < 0.001 {
            if old_vel_x > 0.0 {
                self.colliding = 1;
            } else if old_vel_x < 0.0 {
                self.colliding = 2;
            }
        } else {
            self.left_wall = true;
        }

        if ramp != 1.0 {
            self.vel.x *= 1.0 / ramp;
        }

        self.pos = moved.pos;
        self.move_restrictions = col.move_restrictions(switches, self.pos, PROBE_DISTANCE, Some(col.map_index(self.pos)));
    }
}

/// First active character whose body touches the segment `p0`..`p1`.
///
/// `radius` widens the body. `not_this` is skipped; with `this_only` set,
/// only that character is considered. Returns the character and the
/// closest point on the segment.
pub(crate) fn intersect_character(
    characters: &[Character],
    p0: Vec2,
    p1: Vec2,
    radius: f32,
    not_this: Option<CharacterId>,
    this_only: Option<CharacterId>,
) -> Option<(CharacterId, Vec2)> {
    let mut closest_len = p0.distance(p1) * 100.0;
    let mut found = None;

    for c in characters.iter().filter(|c| c.active) {
        if not_this == Some(c.id) || this_only.is_some_and(|only| only != c.id) {
            continue;
        }
        let Some(point) = closest_point_on_line(p0, p1, c.pos) else {
            continue;
        };
        if c.pos.distance(point) < PHYSICAL_SIZE + radius {
            let len = p0.distance(point);
            if len < closest_len {
                closest_len = len;
                found = Some((c.id, point));
            }
        }
    }
    found
}

// =============================================================================
// NEIGHBORS
// =============================================================================

/// Every character except one, split around it.
pub(crate) struct Neighbors<'a> {
    before: &'a mut [Character],
    after: &'a mut [Character],
}

impl<'a> Neighbors<'a> {
    /// Split `characters` into slot `index` and everybody else.
    ///
    /// `None` when `index` is out of range.
    pub(crate) fn split(characters: &'a mut [Character], index: usize) -> Option<(&'a mut Character, Neighbors<'a>)> {
        if index >= characters.len() {
            return None;
        }
        let (before, rest) = characters.split_at_mut(index);
        let (me, after) = rest.split_first_mut()?;
        Some((me, Neighbors { before, after }))
    }

    /// Active neighbour with handle `id`.
    pub(crate) fn get(&self, id: CharacterId) -> Option<&Character> {
        let index = id.index();
        let split = self.before.len();
        let found = if index < split {
            self.before.get(index)
        } else if index > split {
            self.after.get(index - split - 1)
        } else {
            None
        };
        found.filter(|c| c.active)
    }

    /// Mutable active neighbour with handle `id`.
    pub(crate) fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        let index = id.index();
        let split = self.before.len();
        let found = if index < split {
            self.before.get_mut(index)
        } else if index > split {
            self.after.get_mut(index - split - 1)
        } else {
            None
        };
        found.filter(|c| c.active)
    }

    /// Active neighbours in id order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Character> {
        self.before.iter().chain(self.after.iter()).filter(|c| c.active)
    }

    /// Mutable active neighbours in id order.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Character> {
        self.before.iter_mut().chain(self.after.iter_mut()).filter(|c| c.active)
    }
}

// =============================================================================
// TESTS
// =============================================================================
