//! Projectiles and Explosions
//!
//! A projectile follows a closed-form ballistic curve from its start point,
//! so its position at any tick is a pure function of its parameters. Each
//! tick it sweeps the segment between its previous and current position
//! against the grid and against characters.

use serde::{Serialize, Deserialize};

use crate::collision::{clamp_vel, SwitchStateProvider, PHYSICAL_SIZE};
use crate::core::vec2::Vec2;
use crate::game::character::{intersect_character, Character, CharacterId};
use crate::game::tuning::TuningParams;
use crate::game::weapons::Weapon;
use crate::game::world::TickEnv;
use crate::map::tiles::{TILE_ALLOW_BLUE_TELE_GUN, TILE_ALLOW_TELE_GUN};

/// Extra reach added to the character radius for projectile hits.
const PROJECTILE_HIT_RADIUS: f32 = 6.0;

/// Explosions push fully within this distance.
const EXPLOSION_INNER_RADIUS: f32 = 48.0;

/// Explosions fade to nothing at this distance.
const EXPLOSION_RADIUS: f32 = 135.0;

/// Map layer an entity was placed from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityLayer {
    /// Game layer, or fired by a character
    #[default]
    Game,
    /// Front layer
    Front,
    /// Switch layer; the entity only acts while its switch is on
    Switch,
}

/// Position on a ballistic curve after `time` seconds.
#[inline]
pub fn curve_pos(start: Vec2, dir: Vec2, curvature: f32, speed: f32, time: f32) -> Vec2 {
    let t = time * speed;
    Vec2::new(start.x + dir.x * t, start.y + dir.y * t + curvature / 10000.0 * (t * t))
}

/// A flying projectile.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub(crate) kind: Weapon,
    pub(crate) owner: Option<CharacterId>,
    pub(crate) pos: Vec2,
    pub(crate) dir: Vec2,
    pub(crate) lifespan: i32,
    pub(crate) start_tick: i32,
    pub(crate) explosive: bool,
    pub(crate) freeze: bool,
    pub(crate) bouncing: i32,
    pub(crate) layer: EntityLayer,
    pub(crate) number: i32,
    pub(crate) tune_zone: u8,
}

impl Projectile {
    /// Projectile of `kind` launched at `pos` in `dir` on the current tick.
    ///
    /// `lifespan` counts ticks; -2 never expires.
    pub(crate) fn new(
        kind: Weapon,
        owner: Option<CharacterId>,
        pos: Vec2,
        dir: Vec2,
        lifespan: i32,
        env: &TickEnv<'_>,
    ) -> Self {
        Self {
            kind,
            owner,
            pos,
            dir,
            lifespan,
            start_tick: env.game_tick,
            explosive: false,
            freeze: false,
            bouncing: 0,
            layer: EntityLayer::Game,
            number: 0,
            tune_zone: env.collision.is_tune(env.collision.map_index(pos)),
        }
    }

    pub(crate) fn with_explosive(mut self, explosive: bool) -> Self {
        self.explosive = explosive;
        self
    }

    pub(crate) fn with_freeze(mut self, freeze: bool) -> Self {
        self.freeze = freeze;
        self
    }

    /// 1 reflects X on impact, 2 reflects Y, 0 stops.
    pub(crate) fn with_bouncing(mut self, bouncing: i32) -> Self {
        self.bouncing = bouncing;
        self
    }

    pub(crate) fn on_layer(mut self, layer: EntityLayer, number: i32) -> Self {
        self.layer = layer;
        self.number = number;
        self
    }

    /// Weapon that fired it.
    #[inline]
    pub fn kind(&self) -> Weapon {
        self.kind
    }

    /// Character that fired it.
    #[inline]
    pub fn owner(&self) -> Option<CharacterId> {
        self.owner
    }

    /// Start of the current flight arc.
    #[inline]
    pub fn start_pos(&self) -> Vec2 {
        self.pos
    }

    /// Launch direction of the current arc.
    #[inline]
    pub fn dir(&self) -> Vec2 {
        self.dir
    }

    /// Remaining ticks (-1 expired, -2 endless).
    #[inline]
    pub fn lifespan(&self) -> i32 {
        self.lifespan
    }

    /// Tick the current arc started.
    #[inline]
    pub fn start_tick(&self) -> i32 {
        self.start_tick
    }

    /// Explodes on impact or expiry.
    #[inline]
    pub fn is_explosive(&self) -> bool {
        self.explosive
    }

    /// Freezes characters it touches.
    #[inline]
    pub fn is_freezing(&self) -> bool {
        self.freeze
    }

    /// Bounce mode.
    #[inline]
    pub fn bouncing(&self) -> i32 {
        self.bouncing
    }

    /// Layer it was placed from.
    #[inline]
    pub fn layer(&self) -> EntityLayer {
        self.layer
    }

    /// Gating switch number.
    #[inline]
    pub fn number(&self) -> i32 {
        self.number
    }

    /// Tune zone it was launched in.
    #[inline]
    pub fn tune_zone(&self) -> u8 {
        self.tune_zone
    }

    /// Position `time` seconds into the current arc.
    pub fn pos_at(&self, tuning: &TuningParams, time: f32) -> Vec2 {
        let (curvature, speed) = match self.kind {
            Weapon::Grenade => (tuning.grenade_curvature, tuning.grenade_speed),
            Weapon::Shotgun => (tuning.shotgun_curvature, tuning.shotgun_speed),
            Weapon::Gun => (tuning.gun_curvature, tuning.gun_speed),
            _ => (0.0, 0.0),
        };
        curve_pos(self.pos, self.dir, curvature, speed, time)
    }

    /// Advance one tick. Returns false once the projectile is gone.
    pub(crate) fn tick(
        &mut self,
        env: &TickEnv<'_>,
        characters: &mut [Character],
        switches: &dyn SwitchStateProvider,
    ) -> bool {
        let col = env.collision;
        let tuning = env.tuning(self.tune_zone);
        let tick_speed = crate::TICK_SPEED as f32;
        let prev_time = (env.game_tick - self.start_tick - 1) as f32 / tick_speed;
        let cur_time = (env.game_tick - self.start_tick) as f32 / tick_speed;
        let prev_pos = self.pos_at(tuning, prev_time);
        let cur_pos = self.pos_at(tuning, cur_time);

        if cur_pos.x < 0.0
            || cur_pos.y < 0.0
            || ((cur_pos.x + 0.5) as i32) >> 5 >= col.width()
            || ((cur_pos.y + 0.5) as i32) >> 5 >= col.height()
        {
            return false;
        }

        let line = col.intersect_line(prev_pos, cur_pos);
        let collide = line.is_hit();
        let mut col_pos = line.pos;
        let new_pos = line.before;

        let owner = self.owner.filter(|id| characters.get(id.index()).is_some_and(|c| c.active));
        let hits_enabled = match owner {
            Some(id) => !characters[id.index()].grenade_hit_disabled,
            None => env.config.sv_hit != 0,
        };
        let mut target = None;
        if hits_enabled {
            if let Some((id, at)) = intersect_character(characters, prev_pos, col_pos, PROJECTILE_HIT_RADIUS, owner, None) {
                target = Some(id);
                col_pos = at;
            }
        }

        if self.lifespan > -1 {
            self.lifespan -= 1;
        }

        if collide || target.is_some() {
            if self.explosive && (target.is_none() || (self.kind == Weapon::Shotgun && collide)) {
                explode(characters, col_pos, owner, env);
            } else if self.freeze {
                let gate_open = self.layer != EntityLayer::Switch || (self.number > 0 && switches.is_active(self.number));
                if gate_open {
                    for c in characters.iter_mut().filter(|c| c.active) {
                        if cur_pos.distance(c.pos) < PHYSICAL_SIZE + 1.0 {
                            c.freeze(env.config.sv_freeze_delay, env.game_tick);
                        }
                    }
                }
            } else if let Some(id) = target {
                let hit = &mut characters[id.index()];
                hit.vel = clamp_vel(hit.move_restrictions, hit.vel);
            }

            if let Some(owner_id) = owner {
                self.telegun(env, characters, owner_id, target, collide, col_pos, new_pos, cur_pos);
            }

            if collide && self.bouncing != 0 {
                self.start_tick = env.game_tick;
                self.pos = new_pos + self.dir * -4.0;
                match self.bouncing {
                    1 => self.dir.x = -self.dir.x,
                    2 => self.dir.y = -self.dir.y,
                    _ => {}
                }
                if self.dir.x.abs() < 1e-6 {
                    self.dir.x = 0.0;
                }
                if self.dir.y.abs() < 1e-6 {
                    self.dir.y = 0.0;
                }
                self.pos += self.dir;
            } else if self.kind == Weapon::Gun {
                return false;
            }
            if collide && self.bouncing == 0 && !self.freeze {
                return false;
            }
        }

        if self.lifespan == -1 {
            if self.explosive {
                explode(characters, col_pos, owner, env);
            }
            return false;
        }

        if col.has_tele_layer() {
            let number = col.is_teleport_weapon(col.cell_index_between(prev_pos, cur_pos));
            if number != 0 {
                if let Some(out) = col.tele_out(number, env.game_tick) {
                    self.pos = out;
                    self.start_tick = env.game_tick;
                }
            }
        }
        true
    }

    /// Arm the owner's teleport gun if the impact point allows it.
    #[allow(clippy::too_many_arguments)]
    fn telegun(
        &self,
        env: &TickEnv<'_>,
        characters: &mut [Character],
        owner: CharacterId,
        target: Option<CharacterId>,
        collide: bool,
        col_pos: Vec2,
        new_pos: Vec2,
        cur_pos: Vec2,
    ) {
        let col = env.collision;
        let owner_char = &characters[owner.index()];
        let armed = match self.kind {
            Weapon::Grenade => owner_char.telegun_grenade,
            Weapon::Gun => owner_char.telegun_gun,
            _ => false,
        };
        if !armed {
            return;
        }

        let target_pos = target.map(|id| characters[id.index()].pos);
        let index = col.pure_map_index(target_pos.unwrap_or(col_pos));
        let front = col.front_tile_index(index);
        let switch_kind = col.switch_type(index);
        let mut allow = switch_kind == TILE_ALLOW_TELE_GUN;
        let mut allow_blue = switch_kind == TILE_ALLOW_BLUE_TELE_GUN;
        if allow || allow_blue {
            let wanted = match col.switch_delay(index) {
                1 => Some(Weapon::Gun),
                2 => Some(Weapon::Grenade),
                3 => Some(Weapon::Laser),
                _ => None,
            };
            if wanted.is_some_and(|w| w != self.kind) {
                allow = false;
                allow_blue = false;
            }
        }

        let front_allows = front == TILE_ALLOW_TELE_GUN || front == TILE_ALLOW_BLUE_TELE_GUN;
        if !(front_allows || allow || allow_blue || target.is_some()) {
            return;
        }

        let found = if !collide {
            col.nearest_air_pos_player(target_pos.unwrap_or(col_pos))
        } else {
            col.nearest_air_pos(new_pos, cur_pos)
        };
        if let Some(pos) = found {
            let owner_char = &mut characters[owner.index()];
            owner_char.telegun_pos = pos;
            owner_char.telegun_teleport = true;
            owner_char.telegun_blue = front == TILE_ALLOW_BLUE_TELE_GUN || allow_blue;
        }
    }
}

/// Push every character near `pos` away from it.
///
/// Strength comes from the owner's tune zone, or the base tuning for
/// ownerless explosions.
pub(crate) fn explode(characters: &mut [Character], pos: Vec2, owner: Option<CharacterId>, env: &TickEnv<'_>) {
    let owner_state = owner
        .and_then(|id| characters.get(id.index()))
        .filter(|c| c.active)
        .map(|c| (c.tune_zone, c.grenade_hit_disabled));
    let strength = match owner_state {
        Some((zone, _)) => env.tuning(zone).explosion_strength,
        None => env.tuning.base().explosion_strength,
    };
    let owner_hit_disabled = owner_state.is_some_and(|(_, disabled)| disabled);

    for c in characters.iter_mut().filter(|c| c.active) {
        let diff = c.pos - pos;
        let distance = diff.length();
        if distance >= EXPLOSION_RADIUS + PHYSICAL_SIZE {
            continue;
        }
        let force_dir = if distance != 0.0 { diff.normalize_nonzero() } else { Vec2::DOWN };
        let falloff = 1.0
            - ((distance - EXPLOSION_INNER_RADIUS) / (EXPLOSION_RADIUS - EXPLOSION_INNER_RADIUS)).clamp(0.0, 1.0);
        let damage = strength * falloff;
        if damage as i32 == 0 {
            continue;
        }

        c.hit_num = (c.hit_num as f32 + damage) as i32;
        let is_owner = owner == Some(c.id);
        if !owner_hit_disabled || is_owner {
            if c.solo && !is_owner {
                continue;
            }
            c.take_damage(force_dir * (damage * 2.0));
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{Collision, NoSwitches};
    use crate::game::config::WorldConfig;
    use crate::game::tuning::TuningTable;
    use crate::map::MapBuilder;
    use crate::map::tiles::TILE_SOLID;

    struct Fixture {
        collision: Collision,
        config: WorldConfig,
        tuning: TuningTable,
    }

    impl Fixture {
        /// 40x30 box with a wall at column 30.
        fn new() -> Self {
            let map = MapBuilder::new(40, 30)
                .border()
                .rect(30, 1, 30, 28, TILE_SOLID)
                .build();
            Self {
                collision: Collision::new(map).unwrap(),
                config: WorldConfig::default(),
                tuning: TuningTable::new(),
            }
        }

        fn env(&self, tick: i32, characters: usize) -> TickEnv<'_> {
            TickEnv {
                collision: &self.collision,
                config: &self.config,
                tuning: &self.tuning,
                game_tick: tick,
                characters,
            }
        }
    }

    #[test]
    fn test_curve_pos() {
        let p = curve_pos(Vec2::new(10.0, 20.0), Vec2::new(1.0, 0.0), 100.0, 1000.0, 0.1);
        assert_eq!(p.x, 110.0);
        assert_eq!(p.y, 20.0 + 100.0);
    }

    #[test]
    fn test_gun_projectile_flies_and_hits_wall() {
        let fx = Fixture::new();
        let mut chars: Vec<Character> = Vec::new();
        let start_env = fx.env(10, 0);
        let mut p = Projectile::new(Weapon::Gun, None, Vec2::new(500.0, 400.0), Vec2::new(1.0, 0.0), 100, &start_env);
        let mut alive_ticks = 0;
        for tick in 11..40 {
            if !p.tick(&fx.env(tick, 0), &mut chars, &NoSwitches) {
                break;
            }
            alive_ticks += 1;
        }
        // 44 units per tick towards a wall at x = 960
        assert!(alive_ticks >= 9 && alive_ticks <= 11, "alive for {alive_ticks}");
    }

    #[test]
    fn test_projectile_expires() {
        let fx = Fixture::new();
        let mut chars: Vec<Character> = Vec::new();
        let mut p = Projectile::new(Weapon::Gun, None, Vec2::new(100.0, 100.0), Vec2::new(0.0, -1.0), 2, &fx.env(0, 0));
        p.dir = Vec2::ZERO;
        assert!(p.tick(&fx.env(1, 0), &mut chars, &NoSwitches));
        assert!(p.tick(&fx.env(2, 0), &mut chars, &NoSwitches));
        assert!(!p.tick(&fx.env(3, 0), &mut chars, &NoSwitches));
    }

    #[test]
    fn test_out_of_map_destroyed() {
        let fx = Fixture::new();
        let mut chars: Vec<Character> = Vec::new();
        let mut p = Projectile::new(Weapon::Gun, None, Vec2::new(-50.0, 100.0), Vec2::new(-1.0, 0.0), 50, &fx.env(0, 0));
        assert!(!p.tick(&fx.env(1, 0), &mut chars, &NoSwitches));
    }

    #[test]
    fn test_grenade_explodes_on_wall() {
        let fx = Fixture::new();
        let mut chars = vec![Character::new(CharacterId(0), Vec2::new(900.0, 400.0))];
        let mut p = Projectile::new(Weapon::Grenade, None, Vec2::new(850.0, 400.0), Vec2::new(1.0, 0.0), 100, &fx.env(0, 1))
            .with_explosive(true);
        let mut ticks = 0;
        while p.tick(&fx.env(ticks + 1, 1), &mut chars, &NoSwitches) {
            ticks += 1;
            assert!(ticks < 20);
        }
        // pushed back from the wall
        assert!(chars[0].vel().x < 0.0);
    }

    #[test]
    fn test_explosion_falloff_and_solo() {
        let fx = Fixture::new();
        let env = fx.env(0, 3);
        let mut chars = vec![
            Character::new(CharacterId(0), Vec2::new(400.0, 400.0)),
            Character::new(CharacterId(1), Vec2::new(440.0, 400.0)),
            Character::new(CharacterId(2), Vec2::new(700.0, 400.0)),
        ];
        chars[1].solo = true;
        explode(&mut chars, Vec2::new(420.0, 400.0), Some(CharacterId(0)), &env);
        // owner inside the inner radius gets the full push
        assert_eq!(chars[0].vel(), Vec2::new(-12.0, 0.0));
        // solo characters only count hits
        assert_eq!(chars[1].vel(), Vec2::ZERO);
        assert_eq!(chars[1].hit_num(), 6);
        // out of range
        assert_eq!(chars[2].vel(), Vec2::ZERO);
    }

    #[test]
    fn test_explosion_respects_owner_hit_disable() {
        let fx = Fixture::new();
        let env = fx.env(0, 2);
        let mut chars = vec![
            Character::new(CharacterId(0), Vec2::new(400.0, 400.0)),
            Character::new(CharacterId(1), Vec2::new(440.0, 400.0)),
        ];
        chars[0].grenade_hit_disabled = true;
        explode(&mut chars, Vec2::new(420.0, 400.0), Some(CharacterId(0)), &env);
        assert!(chars[0].vel().x < 0.0);
        assert_eq!(chars[1].vel(), Vec2::ZERO);
    }

    #[test]
    fn test_ownerless_explosion_at_center_pushes_down() {
        let fx = Fixture::new();
        let env = fx.env(0, 1);
        let mut chars = vec![Character::new(CharacterId(0), Vec2::new(400.0, 400.0))];
        explode(&mut chars, Vec2::new(400.0, 400.0), None, &env);
        assert_eq!(chars[0].vel(), Vec2::new(0.0, 12.0));
    }

    #[test]
    fn test_freeze_projectile_bounces_and_freezes() {
        let fx = Fixture::new();
        let mut chars = vec![Character::new(CharacterId(0), Vec2::new(940.0, 400.0))];
        let mut p = Projectile::new(Weapon::Shotgun, None, Vec2::new(880.0, 400.0), Vec2::new(1.0, 0.0), -2, &fx.env(0, 1))
            .with_freeze(true)
            .with_bouncing(1);
        let mut bounced = false;
        for tick in 1..10 {
            assert!(p.tick(&fx.env(tick, 1), &mut chars, &NoSwitches));
            if p.dir().x < 0.0 {
                bounced = true;
                break;
            }
        }
        assert!(bounced);
        assert!(chars[0].is_frozen());
    }
}
