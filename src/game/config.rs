//! World Configuration
//!
//! Flat record of named integer toggles a host hands to a world. The field
//! list is declared once in [`define_config!`]; the struct, its defaults and
//! the by-name accessors are all generated from it.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Failure while loading configuration or tuning overrides.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Input was not valid JSON or did not match the expected shape.
    #[error("malformed config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// No toggle with this name exists.
    #[error("unknown config toggle '{0}'")]
    UnknownToggle(String),

    /// No tuning parameter with this name exists.
    #[error("unknown tuning parameter '{0}'")]
    UnknownTuning(String),

    /// A value had the wrong type.
    #[error("value for '{name}' is not a number")]
    InvalidValue {
        /// Parameter name
        name: String,
    },
}

macro_rules! define_config {
    ($( $(#[$doc:meta])* $field:ident = $default:expr ),+ $(,)?) => {
        /// Integer toggles read by the simulation.
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        pub struct WorldConfig {
            $( $(#[$doc])* pub $field: i32, )+
        }

        impl Default for WorldConfig {
            fn default() -> Self {
                Self { $( $field: $default, )+ }
            }
        }

        impl WorldConfig {
            /// Names of every toggle, in declaration order.
            pub const NAMES: &'static [&'static str] = &[$( stringify!($field), )+];

            /// Value of the toggle called `name`.
            pub fn get(&self, name: &str) -> Option<i32> {
                match name {
                    $( stringify!($field) => Some(self.$field), )+
                    _ => None,
                }
            }

            /// Set the toggle called `name`.
            pub fn set(&mut self, name: &str, value: i32) -> Result<(), ConfigError> {
                match name {
                    $( stringify!($field) => self.$field = value, )+
                    _ => return Err(ConfigError::UnknownToggle(name.to_string())),
                }
                Ok(())
            }
        }
    };
}

define_config! {
    /// Ownerless projectiles and lasers may hit characters.
    sv_hit = 1,
    /// Seconds a freeze tile freezes for.
    sv_freeze_delay = 3,
    /// Grabbed hooks never time out.
    sv_endless_drag = 0,
    /// Deep-frozen characters may still use the hammer.
    sv_deepfly = 1,
    /// The start tile only starts a run once.
    sv_solo_server = 0,
    /// Teleports keep the hook attached.
    sv_teleport_hold_hook = 0,
    /// Teleports strip shotgun, grenade, laser and ninja.
    sv_teleport_lose_weapons = 0,
    /// Hooks travel through plain TELEIN tiles instead of TELEINHOOK tiles.
    sv_old_teleport_hook = 0,
}

impl WorldConfig {
    /// Parse a JSON object; missing toggles keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to a JSON object.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = WorldConfig::default();
        assert_eq!(c.sv_hit, 1);
        assert_eq!(c.sv_freeze_delay, 3);
        assert_eq!(c.sv_deepfly, 1);
        assert_eq!(c.sv_endless_drag, 0);
        assert_eq!(WorldConfig::NAMES.len(), 8);
    }

    #[test]
    fn test_get_set_by_name() {
        let mut c = WorldConfig::default();
        assert_eq!(c.get("sv_freeze_delay"), Some(3));
        c.set("sv_freeze_delay", 5).unwrap();
        assert_eq!(c.sv_freeze_delay, 5);
        assert_eq!(c.get("sv_nope"), None);
        assert!(matches!(c.set("sv_nope", 1), Err(ConfigError::UnknownToggle(n)) if n == "sv_nope"));
    }

    #[test]
    fn test_from_json_partial() {
        let c = WorldConfig::from_json(r#"{"sv_hit": 0, "sv_old_teleport_hook": 1}"#).unwrap();
        assert_eq!(c.sv_hit, 0);
        assert_eq!(c.sv_old_teleport_hook, 1);
        assert_eq!(c.sv_freeze_delay, 3);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(WorldConfig::from_json("{"), Err(ConfigError::Json(_))));
        assert!(matches!(WorldConfig::from_json(r#"{"sv_bogus": 1}"#), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let mut c = WorldConfig::default();
        c.sv_teleport_hold_hook = 1;
        let back = WorldConfig::from_json(&c.to_json().unwrap()).unwrap();
        assert_eq!(back, c);
    }
}
