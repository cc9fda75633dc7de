//! Tuning Parameters
//!
//! Named float parameters that shape movement, hooking and weapons. One
//! base table plus an override table per tune zone; a character reads the
//! table of the zone it currently stands in.
//!
//! The parameter list is declared once in [`define_tuning!`], which
//! generates the struct, the [`TuneKey`] enum and the by-key accessors.

use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::collision::NUM_TUNE_ZONES;
use crate::game::config::ConfigError;
use crate::game::weapons::Weapon;

macro_rules! define_tuning {
    ($( $variant:ident => $field:ident = $default:expr ),+ $(,)?) => {
        /// One complete tuning table.
        #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        #[allow(missing_docs)]
        pub struct TuningParams {
            $( pub $field: f32, )+
        }

        impl Default for TuningParams {
            fn default() -> Self {
                Self { $( $field: $default, )+ }
            }
        }

        /// Compact key for one tuning parameter.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[allow(missing_docs)]
        pub enum TuneKey {
            $( $variant, )+
        }

        impl TuneKey {
            /// Every key, in declaration order.
            pub const ALL: &'static [TuneKey] = &[$( TuneKey::$variant, )+];

            /// Snake-case parameter name.
            pub fn name(self) -> &'static str {
                match self {
                    $( TuneKey::$variant => stringify!($field), )+
                }
            }

            /// Look a key up by its parameter name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( stringify!($field) => Some(TuneKey::$variant), )+
                    _ => None,
                }
            }
        }

        impl TuningParams {
            /// Read a parameter by key.
            #[inline]
            pub fn get(&self, key: TuneKey) -> f32 {
                match key {
                    $( TuneKey::$variant => self.$field, )+
                }
            }

            /// Write a parameter by key.
            #[inline]
            pub fn set(&mut self, key: TuneKey, value: f32) {
                match key {
                    $( TuneKey::$variant => self.$field = value, )+
                }
            }
        }
    };
}

define_tuning! {
    // movement
    GroundControlSpeed => ground_control_speed = 10.0,
    GroundControlAccel => ground_control_accel = 2.0,
    GroundFriction => ground_friction = 0.5,
    GroundJumpImpulse => ground_jump_impulse = 13.2,
    AirJumpImpulse => air_jump_impulse = 12.0,
    AirControlSpeed => air_control_speed = 5.0,
    AirControlAccel => air_control_accel = 1.5,
    AirFriction => air_friction = 0.95,

    // hook
    HookLength => hook_length = 380.0,
    HookFireSpeed => hook_fire_speed = 80.0,
    HookDragAccel => hook_drag_accel = 3.0,
    HookDragSpeed => hook_drag_speed = 15.0,

    // gravity and speed ramp
    Gravity => gravity = 0.5,
    VelrampStart => velramp_start = 550.0,
    VelrampRange => velramp_range = 2000.0,
    VelrampCurvature => velramp_curvature = 1.4,

    // projectiles
    GunCurvature => gun_curvature = 1.25,
    GunSpeed => gun_speed = 2200.0,
    GunLifetime => gun_lifetime = 2.0,
    ShotgunCurvature => shotgun_curvature = 1.25,
    ShotgunSpeed => shotgun_speed = 2750.0,
    ShotgunSpeeddiff => shotgun_speeddiff = 0.8,
    ShotgunLifetime => shotgun_lifetime = 0.2,
    GrenadeCurvature => grenade_curvature = 7.0,
    GrenadeSpeed => grenade_speed = 1000.0,
    GrenadeLifetime => grenade_lifetime = 2.0,

    // lasers
    LaserReach => laser_reach = 800.0,
    LaserBounceDelay => laser_bounce_delay = 150.0,
    LaserBounceNum => laser_bounce_num = 1000.0,
    LaserBounceCost => laser_bounce_cost = 0.0,
    LaserDamage => laser_damage = 5.0,

    // interaction
    PlayerCollision => player_collision = 1.0,
    PlayerHooking => player_hooking = 1.0,
    JetpackStrength => jetpack_strength = 400.0,
    ShotgunStrength => shotgun_strength = 10.0,
    ExplosionStrength => explosion_strength = 6.0,
    HammerStrength => hammer_strength = 1.0,
    HookDuration => hook_duration = 1.25,

    // fire delays (ms)
    HammerFireDelay => hammer_fire_delay = 125.0,
    GunFireDelay => gun_fire_delay = 125.0,
    ShotgunFireDelay => shotgun_fire_delay = 500.0,
    GrenadeFireDelay => grenade_fire_delay = 500.0,
    LaserFireDelay => laser_fire_delay = 800.0,
    NinjaFireDelay => ninja_fire_delay = 800.0,
    HammerHitFireDelay => hammer_hit_fire_delay = 320.0,

    GroundElasticityX => ground_elasticity_x = 0.0,
    GroundElasticityY => ground_elasticity_y = 0.0,
}

impl TuningParams {
    /// Fire delay of `weapon` in milliseconds.
    pub fn fire_delay(&self, weapon: Weapon) -> f32 {
        match weapon {
            Weapon::Hammer => self.hammer_fire_delay,
            Weapon::Gun => self.gun_fire_delay,
            Weapon::Shotgun => self.shotgun_fire_delay,
            Weapon::Grenade => self.grenade_fire_delay,
            Weapon::Laser => self.laser_fire_delay,
            Weapon::Ninja => self.ninja_fire_delay,
        }
    }

    /// Player-vs-player collision is enabled.
    #[inline]
    pub fn player_collision_enabled(&self) -> bool {
        self.player_collision != 0.0
    }

    /// Hooking other players is enabled.
    #[inline]
    pub fn player_hooking_enabled(&self) -> bool {
        self.player_hooking != 0.0
    }

    /// Set a parameter by name.
    pub fn set_by_name(&mut self, name: &str, value: f32) -> Result<(), ConfigError> {
        let key = TuneKey::from_name(name).ok_or_else(|| ConfigError::UnknownTuning(name.to_string()))?;
        self.set(key, value);
        Ok(())
    }
}

/// Base tuning plus one override table per tune zone.
#[derive(Clone, Debug, PartialEq)]
pub struct TuningTable {
    zones: Vec<TuningParams>,
}

impl Default for TuningTable {
    fn default() -> Self {
        Self { zones: vec![TuningParams::default(); NUM_TUNE_ZONES] }
    }
}

impl TuningTable {
    /// Table with every zone at the compiled-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective tuning for `zone` (0 = base).
    ///
    /// # Panics
    ///
    /// If `zone >= 256`.
    #[inline]
    pub fn get(&self, zone: usize) -> &TuningParams {
        assert!(zone < NUM_TUNE_ZONES, "tune zone {zone} out of range");
        &self.zones[zone]
    }

    /// Mutable tuning for `zone`.
    ///
    /// # Panics
    ///
    /// If `zone >= 256`.
    pub fn get_mut(&mut self, zone: usize) -> &mut TuningParams {
        assert!(zone < NUM_TUNE_ZONES, "tune zone {zone} out of range");
        &mut self.zones[zone]
    }

    /// Base tuning.
    #[inline]
    pub fn base(&self) -> &TuningParams {
        &self.zones[0]
    }

    /// Mutable base tuning.
    #[inline]
    pub fn base_mut(&mut self) -> &mut TuningParams {
        &mut self.zones[0]
    }

    /// Apply named overrides from a JSON object such as `{"gravity": 0.4}`.
    ///
    /// `zone` of `None` targets the base table. Unknown names are skipped
    /// with a warning. Returns how many parameters were set.
    pub fn apply_json(&mut self, json: &str, zone: Option<usize>) -> Result<usize, ConfigError> {
        let values: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let params = self.get_mut(zone.unwrap_or(0));

        let mut applied = 0;
        for (name, value) in &values {
            let Some(value) = value.as_f64() else {
                return Err(ConfigError::InvalidValue { name: name.clone() });
            };
            match TuneKey::from_name(name) {
                Some(key) => {
                    params.set(key, value as f32);
                    applied += 1;
                }
                None => warn!(name = %name, "ignoring unknown tuning parameter"),
            }
        }
        Ok(applied)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_count_and_names() {
        assert_eq!(TuneKey::ALL.len(), 47);
        for &key in TuneKey::ALL {
            assert_eq!(TuneKey::from_name(key.name()), Some(key));
        }
        assert_eq!(TuneKey::from_name("gravity"), Some(TuneKey::Gravity));
        assert_eq!(TuneKey::from_name("Gravity"), None);
    }

    #[test]
    fn test_defaults() {
        let t = TuningParams::default();
        assert_eq!(t.ground_control_accel, 2.0);
        assert_eq!(t.air_control_speed, 5.0);
        assert_eq!(t.velramp_curvature, 1.4);
        assert_eq!(t.get(TuneKey::HookLength), 380.0);
        assert_eq!(t.fire_delay(Weapon::Shotgun), 500.0);
        assert_eq!(t.fire_delay(Weapon::Ninja), 800.0);
        assert!(t.player_collision_enabled());
    }

    #[test]
    fn test_set_by_key_and_name() {
        let mut t = TuningParams::default();
        t.set(TuneKey::Gravity, 0.25);
        assert_eq!(t.gravity, 0.25);
        t.set_by_name("hook_length", 500.0).unwrap();
        assert_eq!(t.hook_length, 500.0);
        assert!(matches!(t.set_by_name("warp", 1.0), Err(ConfigError::UnknownTuning(_))));
    }

    #[test]
    fn test_zone_tables() {
        let mut table = TuningTable::new();
        table.get_mut(7).gravity = 1.0;
        assert_eq!(table.get(7).gravity, 1.0);
        assert_eq!(table.get(0).gravity, 0.5);
        assert_eq!(table.base().gravity, 0.5);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_zone_out_of_range_panics() {
        let table = TuningTable::new();
        let _ = table.get(256);
    }

    #[test]
    fn test_apply_json() {
        let mut table = TuningTable::new();
        let n = table.apply_json(r#"{"gravity": 0.4, "bogus": 3}"#, None).unwrap();
        assert_eq!(n, 1);
        assert_eq!(table.base().gravity, 0.4);

        table.apply_json(r#"{"hook_length": 100}"#, Some(3)).unwrap();
        assert_eq!(table.get(3).hook_length, 100.0);
        assert_eq!(table.base().hook_length, 380.0);

        assert!(matches!(table.apply_json("[1]", None), Err(ConfigError::Json(_))));
        assert!(matches!(
            table.apply_json(r#"{"gravity": "x"}"#, None),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
