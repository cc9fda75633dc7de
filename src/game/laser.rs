//! Lasers
//!
//! A laser is a beam segment that advances one bounce at a time. Each bounce
//! casts from the current head towards `dir * energy`, reflects off solid
//! tiles and spends the distance travelled. Laser-rifle beams unfreeze the
//! character they hit; shotgun beams pull it towards the shooter.

use crate::collision::{clamp_vel, WeaponHit};
use crate::core::vec2::Vec2;
use crate::game::character::{intersect_character, Character, CharacterId};
use crate::game::weapons::Weapon;
use crate::game::world::TickEnv;
use crate::map::tiles::{TILE_ALLOW_BLUE_TELE_GUN, TILE_ALLOW_TELE_GUN};

/// Velocity given to a character hit by a shotgun beam fired from inside it.
const STACKED_SHOTGUN_VELOCITY: Vec2 = Vec2::new(-2147483648.0, -2147483648.0);

/// A bouncing beam.
#[derive(Clone, Debug, PartialEq)]
pub struct Laser {
    pub(crate) kind: Weapon,
    pub(crate) owner: Option<CharacterId>,
    pub(crate) pos: Vec2,
    pub(crate) from: Vec2,
    pub(crate) prev_pos: Vec2,
    pub(crate) dir: Vec2,
    pub(crate) energy: f32,
    pub(crate) bounces: i32,
    pub(crate) eval_tick: i32,
    pub(crate) was_tele: bool,
    pub(crate) tele_pos: Vec2,
    pub(crate) zero_energy_bounce: bool,
    pub(crate) teleport_cancelled: bool,
    pub(crate) blue_teleport: bool,
    pub(crate) tune_zone: u8,
}

impl Laser {
    /// Beam of `kind` starting at `pos`. The world runs the first bounce on
    /// insertion.
    pub(crate) fn new(
        kind: Weapon,
        owner: Option<CharacterId>,
        pos: Vec2,
        dir: Vec2,
        energy: f32,
        env: &TickEnv<'_>,
    ) -> Self {
        Self {
            kind,
            owner,
            pos,
            from: pos,
            prev_pos: pos,
            dir,
            energy,
            bounces: 0,
            eval_tick: env.game_tick,
            was_tele: false,
            tele_pos: Vec2::ZERO,
            zero_energy_bounce: false,
            teleport_cancelled: false,
            blue_teleport: false,
            tune_zone: env.collision.is_tune(env.collision.map_index(pos)),
        }
    }

    /// Shotgun or laser rifle.
    #[inline]
    pub fn kind(&self) -> Weapon {
        self.kind
    }

    /// Character that fired it.
    #[inline]
    pub fn owner(&self) -> Option<CharacterId> {
        self.owner
    }

    /// Beam head.
    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    /// Start of the last beam segment.
    #[inline]
    pub fn from(&self) -> Vec2 {
        self.from
    }

    /// Current travel direction.
    #[inline]
    pub fn dir(&self) -> Vec2 {
        self.dir
    }

    /// Remaining reach; negative once spent.
    #[inline]
    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Reflections so far.
    #[inline]
    pub fn bounces(&self) -> i32 {
        self.bounces
    }

    /// Tick of the last bounce.
    #[inline]
    pub fn eval_tick(&self) -> i32 {
        self.eval_tick
    }

    /// The last bounce tile forbids a teleport-gun jump.
    #[inline]
    pub fn is_teleport_cancelled(&self) -> bool {
        self.teleport_cancelled
    }

    fn live_owner(&self, characters: &[Character]) -> Option<CharacterId> {
        self.owner.filter(|id| characters.get(id.index()).is_some_and(|c| c.active))
    }

    /// Whether the owner's modifiers let this beam hit other characters.
    fn hits_enabled(&self, characters: &[Character], owner: Option<CharacterId>, env: &TickEnv<'_>) -> bool {
        match owner {
            Some(id) => {
                let c = &characters[id.index()];
                match self.kind {
                    Weapon::Laser => !c.laser_hit_disabled,
                    Weapon::Shotgun => !c.shotgun_hit_disabled,
                    _ => false,
                }
            }
            None => env.config.sv_hit != 0,
        }
    }

    /// Try to hit a character on the way to `to`. On a hit the beam ends
    /// there.
    pub(crate) fn hit_character(
        &mut self,
        env: &TickEnv<'_>,
        characters: &mut [Character],
        from: Vec2,
        to: Vec2,
    ) -> bool {
        let owner = self.live_owner(characters);
        let dont_hit_self = self.bounces == 0 && !self.was_tele;
        let enabled = self.hits_enabled(characters, owner, env);
        let not_this = if dont_hit_self { owner } else { None };
        let this_only = if enabled { None } else { owner };

        let Some((hit_id, at)) = intersect_character(characters, self.pos, to, 0.0, not_this, this_only) else {
            return false;
        };
        if !enabled && Some(hit_id) != owner {
            return false;
        }

        self.from = from;
        self.pos = at;
        self.energy = -1.0;

        let strength = env.tuning(self.tune_zone).shotgun_strength;
        let hit = &mut characters[hit_id.index()];
        match self.kind {
            Weapon::Shotgun => {
                if self.prev_pos != hit.pos {
                    hit.vel += (self.prev_pos - hit.pos).normalize() * strength;
                } else {
                    hit.vel = STACKED_SHOTGUN_VELOCITY;
                }
            }
            Weapon::Laser => {
                hit.unfreeze();
            }
            _ => {}
        }
        hit.vel = clamp_vel(hit.move_restrictions, hit.vel);
        hit.hit_num += 2;
        true
    }

    /// Advance the beam by one segment. Returns false once spent.
    pub(crate) fn bounce(&mut self, env: &TickEnv<'_>, characters: &mut [Character]) -> bool {
        self.eval_tick = env.game_tick;
        if self.energy < 0.0 {
            return false;
        }

        let col = env.collision;
        self.prev_pos = self.pos;
        if self.was_tele {
            self.prev_pos = self.tele_pos;
            self.pos = self.tele_pos;
            self.tele_pos = Vec2::ZERO;
        }

        let start = self.pos;
        let mut to = col.clip_to_map(start, start + self.dir * self.energy);
        let (hit, at) = col.intersect_line_weapon(start, to);

        if hit.is_hit() {
            to = at;
            if !self.hit_character(env, characters, start, to) {
                self.from = start;
                self.pos = to;

                if !matches!(hit, WeaponHit::Teleport(_)) {
                    self.reflect(env);
                }

                let distance = self.from.distance(self.pos);
                if distance == 0.0 && self.zero_energy_bounce {
                    self.energy = -1.0;
                } else {
                    self.energy -= distance + env.tuning(self.tune_zone).laser_bounce_cost;
                }
                self.zero_energy_bounce = distance == 0.0;

                let tele_out = match hit {
                    WeaponHit::Teleport(number) => col.tele_out(number, env.game_tick),
                    _ => None,
                };
                match tele_out {
                    Some(out) => {
                        self.tele_pos = out;
                        self.was_tele = true;
                    }
                    None => {
                        self.bounces += 1;
                        self.was_tele = false;
                    }
                }
                if self.bounces as f32 > env.tuning(self.tune_zone).laser_bounce_num {
                    self.energy = -1.0;
                }
            }
        } else if !self.hit_character(env, characters, start, to) {
            self.from = start;
            self.pos = to;
            self.energy = -1.0;
        }

        self.update_telegun(env, characters, to);
        true
    }

    fn reflect(&mut self, env: &TickEnv<'_>) {
        let col = env.collision;
        let mut reflected = false;
        if col.check_point(self.pos + Vec2::new(0.0, 1.0)) || col.check_point(self.pos + Vec2::new(0.0, -1.0)) {
            self.dir.y = -self.dir.y;
            reflected = true;
        }
        if col.check_point(self.pos + Vec2::new(1.0, 0.0)) || col.check_point(self.pos + Vec2::new(-1.0, 0.0)) {
            self.dir.x = -self.dir.x;
            reflected = true;
        }
        if !reflected {
            self.dir = -self.dir;
        }
    }

    /// Arm the owner's laser teleport gun at the end of the beam, or record
    /// whether the last bounce tile allows it.
    fn update_telegun(&mut self, env: &TickEnv<'_>, characters: &mut [Character], end: Vec2) {
        let Some(owner) = self.live_owner(characters) else { return };
        let col = env.collision;

        if self.energy <= 0.0
            && !self.teleport_cancelled
            && characters[owner.index()].telegun_laser
            && self.kind == Weapon::Laser
        {
            let dont_hit_self = self.bounces == 0 && !self.was_tele;
            let not_this = if dont_hit_self { Some(owner) } else { None };
            let this_only = if characters[owner.index()].laser_hit_disabled { Some(owner) } else { None };
            let found = match intersect_character(characters, self.pos, end, 0.0, not_this, this_only) {
                Some((hit_id, _)) => col.nearest_air_pos_player(characters[hit_id.index()].pos),
                None => col.nearest_air_pos(self.pos, self.from),
            };
            if let Some(pos) = found {
                let c = &mut characters[owner.index()];
                c.telegun_pos = pos;
                c.telegun_teleport = true;
                c.telegun_blue = self.blue_teleport;
            }
            return;
        }

        let index = col.pure_map_index(end);
        if col.has_tele_layer() && col.is_teleport_weapon(index) != 0 {
            return;
        }
        let front = col.front_tile_index(index);
        let switch_kind = col.switch_type(index);
        let mut allow = switch_kind == TILE_ALLOW_TELE_GUN;
        let mut allow_blue = switch_kind == TILE_ALLOW_BLUE_TELE_GUN;
        if (allow || allow_blue) && self.kind == Weapon::Laser {
            let delay = col.switch_delay(index);
            if delay != 0 && delay != 3 {
                allow = false;
                allow_blue = false;
            }
        }

        self.blue_teleport = front == TILE_ALLOW_BLUE_TELE_GUN || allow_blue;
        self.teleport_cancelled = self.kind == Weapon::Laser
            && front != TILE_ALLOW_TELE_GUN
            && front != TILE_ALLOW_BLUE_TELE_GUN
            && !allow
            && !allow_blue;
    }

    /// Bounce again once the bounce delay has passed. Returns false once
    /// spent.
    pub(crate) fn tick(&mut self, env: &TickEnv<'_>, characters: &mut [Character]) -> bool {
        let delay = crate::TICK_SPEED as f32 * env.tuning(self.tune_zone).laser_bounce_delay / 1000.0;
        if (env.game_tick - self.eval_tick) as f32 > delay {
            return self.bounce(env, characters);
        }
        true
    }
}

// =============================================================================
// TESTS
// =============================================================================
