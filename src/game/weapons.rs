//! Weapons and Pickups
//!
//! Input commit, weapon switching and firing, the per-tick weapon update
//! (reload, jetpack, ninja dash) and pickup collection.
//!
//! Firing never touches the entity registry directly. Weapons that create
//! an entity return a [`Spawn`] and the world inserts it.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::collision::movement::PHYSICAL_BOX;
use crate::collision::{clamp_vel, PickupKind, PickupLayer, SwitchStateProvider, PHYSICAL_SIZE};
use crate::core::vec2::Vec2;
use crate::game::character::{
    Character, NinjaState, Neighbors, MAX_HIT_OBJECTS, NINJA_DURATION_TICKS, NINJA_MOVE_TICKS,
    NINJA_VELOCITY, RESPAWN_DELAY_TICKS,
};
use crate::game::input::PlayerInput;
use crate::game::laser::Laser;
use crate::game::projectile::Projectile;
use crate::game::world::TickEnv;

/// Number of weapon slots.
pub const NUM_WEAPONS: usize = 6;

/// Hammer reach, center to center.
const HAMMER_RANGE: f32 = PHYSICAL_SIZE * 1.5;

/// Ninja dash damage radius around the dasher.
const NINJA_HIT_RADIUS: f32 = PHYSICAL_SIZE * 2.0;

/// Pickups are collected within this distance of a cell center.
const PICKUP_RADIUS: f32 = 48.0;

/// Activation tick an armor pickup sets so the ninja expires at once.
const NINJA_EXPIRED_TICK: i32 = -500;

/// Weapon slots, in switch order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Weapon {
    /// Melee knockback
    Hammer = 0,
    /// Pistol; only fires with the teleport gun
    Gun = 1,
    /// Bouncing knockback beam
    Shotgun = 2,
    /// Explosive projectile
    Grenade = 3,
    /// Freezing beam
    Laser = 4,
    /// Dash powerup
    Ninja = 5,
}

impl Weapon {
    /// Every weapon, in slot order.
    pub const ALL: [Weapon; NUM_WEAPONS] = [
        Weapon::Hammer,
        Weapon::Gun,
        Weapon::Shotgun,
        Weapon::Grenade,
        Weapon::Laser,
        Weapon::Ninja,
    ];

    /// Weapon in slot `index`.
    #[inline]
    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    /// Slot index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Fires continuously while the button is held.
    #[inline]
    pub fn is_automatic(self) -> bool {
        matches!(self, Weapon::Shotgun | Weapon::Grenade | Weapon::Laser)
    }
}

/// Entity created by firing.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Spawn {
    /// A projectile
    Projectile(Projectile),
    /// A laser or shotgun beam
    Laser(Laser),
}

// =============================================================================
// INPUT COMMIT
// =============================================================================

/// Commit `input` for the current tick and fire if the weapon is ready.
pub(crate) fn commit_input(
    ch: &mut Character,
    input: PlayerInput,
    others: &mut Neighbors<'_>,
    env: &TickEnv<'_>,
) -> Option<Spawn> {
    if input.kill && ch.respawn_delay == 0 {
        debug!(character = ch.id.raw(), "kill requested");
        ch.die(env);
        ch.respawn_delay = RESPAWN_DELAY_TICKS;
    }

    ch.input = input.sanitized();
    do_weapon_switch(ch);

    let spawn = if ch.reload_timer == 0 { fire_weapon(ch, others, env) } else { None };
    ch.prev_fire = ch.input.fire;
    spawn
}

/// Queue the wanted weapon and switch to it when allowed.
fn do_weapon_switch(ch: &mut Character) {
    let wanted = Weapon::from_index(ch.input.wanted_weapon.clamp(0, NUM_WEAPONS as i32 - 1));
    if let Some(wanted) = wanted {
        if wanted != ch.active_weapon && ch.has_weapon(wanted) {
            ch.queued_weapon = Some(wanted);
        }
    }
    apply_queued_switch(ch);
}

fn apply_queued_switch(ch: &mut Character) {
    let Some(queued) = ch.queued_weapon else { return };
    if ch.has_weapon(queued) && ch.reload_timer == 0 && !ch.has_weapon(Weapon::Ninja) {
        ch.last_weapon = ch.active_weapon;
        ch.active_weapon = queued;
    }
}

// =============================================================================
// FIRING
// =============================================================================

/// Fire the active weapon if the input asks for it.
pub(crate) fn fire_weapon(ch: &mut Character, others: &mut Neighbors<'_>, env: &TickEnv<'_>) -> Option<Spawn> {
    apply_queued_switch(ch);

    if ch.freeze_time != 0 {
        return None;
    }
    if env.config.sv_deepfly == 0 && ch.active_weapon == Weapon::Hammer && ch.deep_frozen {
        return None;
    }

    let held = ch.input.fire_held();
    let auto_fire = ch.active_weapon.is_automatic()
        || (ch.jetpack && ch.active_weapon == Weapon::Gun)
        || ch.frozen_last_tick;
    if ch.prev_fire == ch.input.fire && !(held && auto_fire) {
        return None;
    }

    let dir = ch.input.target().normalize_nonzero();
    let start = ch.pos + dir * (PHYSICAL_SIZE * 0.75);
    let width = (env.collision.width() * 32) as f32;
    let height = (env.collision.height() * 32) as f32;
    if start.x < 0.0 || start.y < 0.0 || start.x >= width || start.y >= height {
        return None;
    }

    ch.attack_tick = env.game_tick;
    let tuning = env.tuning(ch.tune_zone);
    let tick_speed = crate::TICK_SPEED as f32;

    let spawn = match ch.active_weapon {
        Weapon::Hammer => {
            swing_hammer(ch, others, env);
            None
        }
        Weapon::Gun => ch.telegun_gun.then(|| {
            let lifespan = (tick_speed * tuning.gun_lifetime) as i32;
            Spawn::Projectile(Projectile::new(Weapon::Gun, Some(ch.id), start, dir, lifespan, env))
        }),
        kind @ (Weapon::Shotgun | Weapon::Laser) => {
            Some(Spawn::Laser(Laser::new(kind, Some(ch.id), ch.pos, dir, tuning.laser_reach, env)))
        }
        Weapon::Grenade => {
            let lifespan = (tick_speed * tuning.grenade_lifetime) as i32;
            let projectile = Projectile::new(Weapon::Grenade, Some(ch.id), start, dir, lifespan, env)
                .with_explosive(true);
            Some(Spawn::Projectile(projectile))
        }
        Weapon::Ninja => {
            ch.hit_objects.clear();
            ch.ninja.activation_dir = dir;
            ch.ninja.move_time = NINJA_MOVE_TICKS;
            ch.ninja.old_vel_amount = ch.vel.length() as i32;
            None
        }
    };

    if ch.reload_timer == 0 {
        ch.reload_timer = (tuning.fire_delay(ch.active_weapon) * tick_speed / 1000.0) as i32;
    }
    spawn
}

fn swing_hammer(ch: &mut Character, others: &mut Neighbors<'_>, env: &TickEnv<'_>) {
    ch.hit_objects.clear();
    if env.characters <= 1 || ch.hammer_hit_disabled || ch.solo {
        return;
    }

    let tuning = env.tuning(ch.tune_zone);
    let mut hits = 0;
    for target in others.iter_mut() {
        if target.pos.distance(ch.pos) >= HAMMER_RANGE || target.solo {
            continue;
        }
        let offset = target.pos - ch.pos;
        let dir = if offset.length_squared() > 0.0 { offset.normalize() } else { Vec2::UP };

        let boosted = target.vel + (dir + Vec2::new(0.0, -1.1)).normalize() * 10.0;
        let extra = clamp_vel(target.move_restrictions, boosted) - target.vel;
        let force = (Vec2::UP + extra) * tuning.hammer_strength;

        target.take_damage(force);
        target.unfreeze();
        hits += 1;
    }

    if hits > 0 {
        ch.reload_timer = (tuning.hammer_hit_fire_delay * crate::TICK_SPEED as f32 / 1000.0) as i32;
    }
}

// =============================================================================
// PER-TICK UPDATE
// =============================================================================

/// Reload countdown, jetpack thrust and the ninja dash.
pub(crate) fn handle_weapons(ch: &mut Character, others: &mut Neighbors<'_>, env: &TickEnv<'_>) -> Option<Spawn> {
    if ch.active_weapon == Weapon::Ninja {
        handle_ninja(ch, others, env);
    }
    if ch.jetpack && ch.active_weapon == Weapon::Gun {
        handle_jetpack(ch, env);
    }

    if ch.reload_timer > 0 {
        ch.reload_timer -= 1;
        return None;
    }
    fire_weapon(ch, others, env)
}

fn handle_jetpack(ch: &mut Character, env: &TickEnv<'_>) {
    if !ch.input.fire_held() || ch.freeze_time != 0 {
        return;
    }
    let strength = env.tuning(ch.tune_zone).jetpack_strength;
    let dir = ch.input.target().normalize();
    ch.take_damage(dir * -(strength / 100.0 / 6.11));
}

fn handle_ninja(ch: &mut Character, others: &mut Neighbors<'_>, env: &TickEnv<'_>) {
    if env.game_tick - ch.ninja.activation_tick > NINJA_DURATION_TICKS {
        ch.remove_ninja();
        return;
    }

    if ch.active_weapon != Weapon::Ninja {
        ch.last_weapon = ch.active_weapon;
    }
    ch.active_weapon = Weapon::Ninja;
    ch.ninja.move_time -= 1;

    if ch.ninja.move_time == 0 {
        ch.vel = ch.ninja.activation_dir * ch.ninja.old_vel_amount as f32;
    }
    if ch.ninja.move_time <= 0 {
        return;
    }

    let tuning = env.tuning(ch.tune_zone);
    let elasticity = Vec2::new(tuning.ground_elasticity_x, tuning.ground_elasticity_y);
    let old_pos = ch.pos;
    let moved = env.collision.move_box(ch.pos, ch.ninja.activation_dir * NINJA_VELOCITY, PHYSICAL_BOX, elasticity);
    ch.pos = moved.pos;
    ch.vel = Vec2::ZERO;

    if ch.solo || old_pos.distance(ch.pos) >= PHYSICAL_SIZE * 3.0 {
        return;
    }
    for other in others.iter_mut() {
        if other.solo {
            return;
        }
        if ch.hit_objects.contains(&other.id) || other.pos.distance(ch.pos) > NINJA_HIT_RADIUS {
            continue;
        }
        if ch.hit_objects.len() < MAX_HIT_OBJECTS {
            ch.hit_objects.push(other.id);
        }
        other.take_damage(Vec2::new(0.0, -10.0));
    }
}

// =============================================================================
// PICKUPS
// =============================================================================

/// Collect every pickup near the character.
pub(crate) fn collect_pickups(ch: &mut Character, switches: &dyn SwitchStateProvider, env: &TickEnv<'_>) {
    let col = env.collision;
    let cx = (ch.pos.x as i32) >> 5;
    let cy = (ch.pos.y as i32) >> 5;

    for y in cy - 1..=cy + 1 {
        for x in cx - 1..=cx + 1 {
            let center = Vec2::from_ints(x * 32 + 16, y * 32 + 16);
            if ch.pos.distance(center) >= PICKUP_RADIUS {
                continue;
            }
            let index = col.cell_index(x, y);
            for layer in [PickupLayer::Game, PickupLayer::Front] {
                let Some(pickup) = col.pickup_at(layer, index) else { continue };
                if pickup.number > 0 && !switches.is_active(pickup.number as i32) {
                    continue;
                }
                apply_pickup(ch, pickup.kind, pickup.subtype, env);
            }
        }
    }
}

fn apply_pickup(ch: &mut Character, kind: PickupKind, subtype: u8, env: &TickEnv<'_>) {
    match kind {
        PickupKind::Health => {
            ch.freeze(env.config.sv_freeze_delay, env.game_tick);
        }
        PickupKind::Armor => {
            for weapon in [Weapon::Shotgun, Weapon::Grenade, Weapon::Laser, Weapon::Ninja] {
                ch.set_weapon_owned(weapon, false);
            }
            expire_ninja(&mut ch.ninja);
            if ch.active_weapon >= Weapon::Shotgun {
                ch.active_weapon = Weapon::Hammer;
            }
        }
        PickupKind::ArmorShotgun => drop_weapon(ch, Weapon::Shotgun),
        PickupKind::ArmorGrenade => drop_weapon(ch, Weapon::Grenade),
        PickupKind::ArmorLaser => drop_weapon(ch, Weapon::Laser),
        PickupKind::ArmorNinja => expire_ninja(&mut ch.ninja),
        PickupKind::Weapon => {
            if let Some(weapon) = Weapon::from_index(subtype as i32) {
                ch.set_weapon_owned(weapon, true);
            }
        }
        PickupKind::Ninja => {
            ch.ninja.activation_tick = env.game_tick;
            ch.set_weapon_owned(Weapon::Ninja, true);
            if ch.active_weapon != Weapon::Ninja {
                ch.last_weapon = ch.active_weapon;
            }
            ch.active_weapon = Weapon::Ninja;
        }
    }
}

fn drop_weapon(ch: &mut Character, weapon: Weapon) {
    ch.set_weapon_owned(weapon, false);
    if ch.active_weapon == weapon {
        ch.active_weapon = Weapon::Hammer;
    }
}

fn expire_ninja(ninja: &mut NinjaState) {
    *ninja = NinjaState { activation_tick: NINJA_EXPIRED_TICK, ..NinjaState::default() };
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{Collision, NoSwitches};
    use crate::game::character::CharacterId;
    use crate::game::config::WorldConfig;
    use crate::game::tuning::TuningTable;
    use crate::map::MapBuilder;
    use crate::map::tiles::*;

    struct Fixture {
        collision: Collision,
        config: WorldConfig,
        tuning: TuningTable,
    }

    impl Fixture {
        fn new() -> Self {
            let map = MapBuilder::new(30, 30)
                .border()
                .rect(1, 20, 28, 20, TILE_SOLID)
                .spawn(5, 19)
                .tile(10, 19, ENTITY_OFFSET + ENTITY_WEAPON_SHOTGUN)
                .tile(14, 19, ENTITY_OFFSET + ENTITY_HEALTH_1)
                .tile(18, 19, ENTITY_OFFSET + ENTITY_ARMOR_1)
                .tile(22, 19, ENTITY_OFFSET + ENTITY_POWERUP_NINJA)
                .build();
            Self {
                collision: Collision::new(map).unwrap(),
                config: WorldConfig::default(),
                tuning: TuningTable::new(),
            }
        }

        fn env(&self, characters: usize) -> TickEnv<'_> {
            TickEnv {
                collision: &self.collision,
                config: &self.config,
                tuning: &self.tuning,
                game_tick: 100,
                characters,
            }
        }
    }

    fn cell_center(x: i32, y: i32) -> Vec2 {
        Vec2::from_ints(x * 32 + 16, y * 32 + 16)
    }

    fn firing(weapon: Weapon) -> PlayerInput {
        PlayerInput { fire: 1, wanted_weapon: weapon.index() as i32, ..PlayerInput::new() }.aiming(10, 0)
    }

    #[test]
    fn test_weapon_indices() {
        assert_eq!(Weapon::from_index(0), Some(Weapon::Hammer));
        assert_eq!(Weapon::from_index(5), Some(Weapon::Ninja));
        assert_eq!(Weapon::from_index(6), None);
        assert_eq!(Weapon::from_index(-1), None);
        assert_eq!(Weapon::Laser.index(), 4);
        assert!(Weapon::Grenade.is_automatic());
        assert!(!Weapon::Hammer.is_automatic());
    }

    #[test]
    fn test_switch_only_to_owned() {
        let fx = Fixture::new();
        let env = fx.env(1);
        let mut chars = vec![Character::new(CharacterId(0), cell_center(5, 19))];
        let (me, mut others) = Neighbors::split(&mut chars, 0).unwrap();

        let input = PlayerInput { wanted_weapon: Weapon::Laser.index() as i32, ..PlayerInput::new() };
        commit_input(me, input, &mut others, &env);
        assert_eq!(me.active_weapon(), Weapon::Gun);

        me.set_weapon_owned(Weapon::Laser, true);
        commit_input(me, input, &mut others, &env);
        assert_eq!(me.active_weapon(), Weapon::Laser);
        assert_eq!(me.last_weapon, Weapon::Gun);
    }

    #[test]
    fn test_wanted_weapon_clamped() {
        let fx = Fixture::new();
        let env = fx.env(1);
        let mut chars = vec![Character::new(CharacterId(0), cell_center(5, 19))];
        let (me, mut others) = Neighbors::split(&mut chars, 0).unwrap();
        let input = PlayerInput { wanted_weapon: -4, ..PlayerInput::new() };
        commit_input(me, input, &mut others, &env);
        assert_eq!(me.active_weapon(), Weapon::Hammer);
    }

    #[test]
    fn test_grenade_spawns_projectile_and_reloads() {
        let fx = Fixture::new();
        let env = fx.env(1);
        let mut chars = vec![Character::new(CharacterId(0), cell_center(5, 15))];
        chars[0].set_weapon_owned(Weapon::Grenade, true);
        let (me, mut others) = Neighbors::split(&mut chars, 0).unwrap();

        let spawn = commit_input(me, firing(Weapon::Grenade), &mut others, &env);
        match spawn {
            Some(Spawn::Projectile(p)) => {
                assert_eq!(p.kind(), Weapon::Grenade);
                assert!(p.is_explosive());
                assert_eq!(p.lifespan(), 100);
                assert_eq!(p.owner(), Some(CharacterId(0)));
            }
            other => panic!("expected a projectile, got {other:?}"),
        }
        assert_eq!(me.reload_timer(), 25);
        assert_eq!(me.attack_tick(), 100);
    }

    #[test]
    fn test_gun_needs_telegun() {
        let fx = Fixture::new();
        let env = fx.env(1);
        let mut chars = vec![Character::new(CharacterId(0), cell_center(5, 15))];
        let (me, mut others) = Neighbors::split(&mut chars, 0).unwrap();
        assert!(commit_input(me, firing(Weapon::Gun), &mut others, &env).is_none());
        assert_eq!(me.reload_timer(), 6);
    }

    #[test]
    fn test_frozen_cannot_fire() {
        let fx = Fixture::new();
        let env = fx.env(1);
        let mut chars = vec![Character::new(CharacterId(0), cell_center(5, 15))];
        chars[0].set_weapon_owned(Weapon::Grenade, true);
        chars[0].freeze(3, 0);
        let (me, mut others) = Neighbors::split(&mut chars, 0).unwrap();
        assert!(commit_input(me, firing(Weapon::Grenade), &mut others, &env).is_none());
        assert_eq!(me.reload_timer(), 0);
    }

    #[test]
    fn test_semi_auto_needs_fresh_press() {
        let fx = Fixture::new();
        let env = fx.env(2);
        let mut chars = vec![
            Character::new(CharacterId(0), cell_center(5, 15)),
            Character::new(CharacterId(1), cell_center(5, 15) + Vec2::new(30.0, 0.0)),
        ];
        let input = PlayerInput { fire: 1, wanted_weapon: 0, ..PlayerInput::new() }.aiming(10, 0);
        {
            let (me, mut others) = Neighbors::split(&mut chars, 0).unwrap();
            commit_input(me, input, &mut others, &env);
            assert_eq!(me.active_weapon(), Weapon::Hammer);
        }
        // the hammer hit the neighbour upwards
        assert!(chars[1].vel().y < 0.0);
        assert_eq!(chars[0].reload_timer(), 16);

        let (me, mut others) = Neighbors::split(&mut chars, 0).unwrap();
        me.reload_timer = 0;
        let before = me.attack_tick();
        me.attack_tick = -1;
        commit_input(me, input, &mut others, &env);
        // same fire counter: no new swing
        assert_eq!(me.attack_tick(), -1);
        assert_eq!(before, 100);
    }

    #[test]
    fn test_hammer_skips_solo() {
        let fx = Fixture::new();
        let env = fx.env(2);
        let mut chars = vec![
            Character::new(CharacterId(0), cell_center(5, 15)),
            Character::new(CharacterId(1), cell_center(5, 15) + Vec2::new(30.0, 0.0)),
        ];
        chars[1].solo = true;
        chars[0].active_weapon = Weapon::Hammer;
        let (me, mut others) = Neighbors::split(&mut chars, 0).unwrap();
        let input = PlayerInput { fire: 1, ..PlayerInput::new() }.aiming(10, 0);
        commit_input(me, input, &mut others, &env);
        assert_eq!(me.reload_timer(), 6);
        assert_eq!(chars[1].vel(), Vec2::ZERO);
    }

    #[test]
    fn test_kill_respawns_with_delay() {
        let fx = Fixture::new();
        let env = fx.env(1);
        let mut chars = vec![Character::new(CharacterId(0), cell_center(12, 5))];
        let (me, mut others) = Neighbors::split(&mut chars, 0).unwrap();
        let input = PlayerInput { kill: true, ..PlayerInput::new() };
        commit_input(me, input, &mut others, &env);
        assert_eq!(me.pos(), cell_center(5, 19));
        assert_eq!(me.respawn_delay, RESPAWN_DELAY_TICKS);

        me.set_pos(cell_center(12, 5));
        commit_input(me, input, &mut others, &env);
        assert_eq!(me.pos(), cell_center(12, 5));
    }

    #[test]
    fn test_reload_counts_down() {
        let fx = Fixture::new();
        let env = fx.env(1);
        let mut chars = vec![Character::new(CharacterId(0), cell_center(5, 15))];
        let (me, mut others) = Neighbors::split(&mut chars, 0).unwrap();
        me.reload_timer = 3;
        handle_weapons(me, &mut others, &env);
        assert_eq!(me.reload_timer(), 2);
    }

    #[test]
    fn test_jetpack_pushes_against_aim() {
        let fx = Fixture::new();
        let env = fx.env(1);
        let mut chars = vec![Character::new(CharacterId(0), cell_center(5, 15))];
        chars[0].jetpack = true;
        chars[0].input = PlayerInput { fire: 1, ..PlayerInput::new() }.aiming(0, 10);
        chars[0].reload_timer = 5;
        let (me, mut others) = Neighbors::split(&mut chars, 0).unwrap();
        handle_weapons(me, &mut others, &env);
        let expected = -(400.0 / 100.0 / 6.11);
        assert!((me.vel().y - expected).abs() < 1e-5);
    }

    #[test]
    fn test_ninja_dash_and_expiry() {
        let fx = Fixture::new();
        let env = fx.env(1);
        let mut chars = vec![Character::new(CharacterId(0), cell_center(5, 10))];
        chars[0].set_weapon_owned(Weapon::Ninja, true);
        chars[0].active_weapon = Weapon::Ninja;
        chars[0].ninja.activation_tick = 90;
        chars[0].ninja.activation_dir = Vec2::new(1.0, 0.0);
        chars[0].ninja.move_time = NINJA_MOVE_TICKS;
        chars[0].reload_timer = 5;
        let start = chars[0].pos();
        let (me, mut others) = Neighbors::split(&mut chars, 0).unwrap();
        handle_weapons(me, &mut others, &env);
        assert!((me.pos().x - (start.x + NINJA_VELOCITY)).abs() < 0.01);
        assert_eq!(me.pos().y, start.y);
        assert_eq!(me.vel(), Vec2::ZERO);

        me.ninja.activation_tick = 100 - NINJA_DURATION_TICKS - 1;
        handle_weapons(me, &mut others, &env);
        assert!(!me.has_weapon(Weapon::Ninja));
        assert_eq!(me.active_weapon(), me.last_weapon);
    }

    #[test]
    fn test_pickups() {
        let fx = Fixture::new();
        let env = fx.env(1);

        let mut c = Character::new(CharacterId(0), cell_center(10, 19));
        collect_pickups(&mut c, &NoSwitches, &env);
        assert!(c.has_weapon(Weapon::Shotgun));

        c.set_pos(cell_center(14, 19));
        collect_pickups(&mut c, &NoSwitches, &env);
        assert_eq!(c.freeze_time(), 150);

        c.set_pos(cell_center(22, 19));
        collect_pickups(&mut c, &NoSwitches, &env);
        assert_eq!(c.active_weapon(), Weapon::Ninja);
        assert_eq!(c.ninja().activation_tick, 100);

        c.set_pos(cell_center(18, 19));
        collect_pickups(&mut c, &NoSwitches, &env);
        assert!(!c.has_weapon(Weapon::Shotgun));
        assert!(!c.has_weapon(Weapon::Ninja));
        assert_eq!(c.active_weapon(), Weapon::Hammer);
        assert_eq!(c.ninja().activation_tick, NINJA_EXPIRED_TICK);
    }

    #[test]
    fn test_pickup_out_of_reach() {
        let fx = Fixture::new();
        let env = fx.env(1);
        let mut c = Character::new(CharacterId(0), cell_center(10, 16));
        collect_pickups(&mut c, &NoSwitches, &env);
        assert!(!c.has_weapon(Weapon::Shotgun));
    }
}
