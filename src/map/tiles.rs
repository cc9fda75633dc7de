//! Tile, entity and flag constants.
//!
//! Ids are the raw byte values stored in map layers. Several ids are only
//! meaningful on a particular layer (switch-layer ids overlap game-layer
//! ids), so a constant names the value, not the layer.

#![allow(missing_docs)]

// =============================================================================
// GAME / FRONT LAYER TILES
// =============================================================================

pub const TILE_AIR: u8 = 0;
pub const TILE_SOLID: u8 = 1;
pub const TILE_DEATH: u8 = 2;
pub const TILE_NOHOOK: u8 = 3;
pub const TILE_NOLASER: u8 = 4;
pub const TILE_THROUGH_CUT: u8 = 5;
pub const TILE_THROUGH: u8 = 6;
pub const TILE_JUMP: u8 = 7;
pub const TILE_FREEZE: u8 = 9;
pub const TILE_TELEINEVIL: u8 = 10;
pub const TILE_UNFREEZE: u8 = 11;
pub const TILE_DFREEZE: u8 = 12;
pub const TILE_DUNFREEZE: u8 = 13;
pub const TILE_TELEINWEAPON: u8 = 14;
pub const TILE_TELEINHOOK: u8 = 15;
pub const TILE_WALLJUMP: u8 = 16;
pub const TILE_EHOOK_ENABLE: u8 = 17;
pub const TILE_EHOOK_DISABLE: u8 = 18;
pub const TILE_HIT_ENABLE: u8 = 19;
pub const TILE_HIT_DISABLE: u8 = 20;
pub const TILE_SOLO_ENABLE: u8 = 21;
pub const TILE_SOLO_DISABLE: u8 = 22;
pub const TILE_SWITCHTIMEDOPEN: u8 = 22;
pub const TILE_SWITCHTIMEDCLOSE: u8 = 23;
pub const TILE_SWITCHOPEN: u8 = 24;
pub const TILE_SWITCHCLOSE: u8 = 25;
pub const TILE_TELEIN: u8 = 26;
pub const TILE_TELEOUT: u8 = 27;
pub const TILE_SPEED_BOOST_OLD: u8 = 28;
pub const TILE_SPEED_BOOST: u8 = 29;
pub const TILE_TELECHECK: u8 = 29;
pub const TILE_TELECHECKOUT: u8 = 30;
pub const TILE_TELECHECKIN: u8 = 31;
pub const TILE_REFILL_JUMPS: u8 = 32;
pub const TILE_START: u8 = 33;
pub const TILE_FINISH: u8 = 34;
pub const TILE_STOP: u8 = 60;
pub const TILE_STOPS: u8 = 61;
pub const TILE_STOPA: u8 = 62;
pub const TILE_TELECHECKINEVIL: u8 = 63;
pub const TILE_THROUGH_ALL: u8 = 66;
pub const TILE_THROUGH_DIR: u8 = 67;
pub const TILE_TUNE: u8 = 68;
pub const TILE_NPC: u8 = 72;
pub const TILE_EHOOK: u8 = 73;
pub const TILE_NOHIT: u8 = 74;
pub const TILE_NPH: u8 = 75;
pub const TILE_ADD_TIME: u8 = 79;
pub const TILE_NPC_DISABLE: u8 = 88;
pub const TILE_UNLIMITED_JUMPS_DISABLE: u8 = 89;
pub const TILE_JETPACK_DISABLE: u8 = 90;
pub const TILE_NPH_DISABLE: u8 = 91;
pub const TILE_SUBTRACT_TIME: u8 = 95;
pub const TILE_TELE_GUN_ENABLE: u8 = 96;
pub const TILE_TELE_GUN_DISABLE: u8 = 97;
pub const TILE_ALLOW_TELE_GUN: u8 = 98;
pub const TILE_ALLOW_BLUE_TELE_GUN: u8 = 99;
pub const TILE_NPC_ENABLE: u8 = 104;
pub const TILE_UNLIMITED_JUMPS_ENABLE: u8 = 105;
pub const TILE_JETPACK_ENABLE: u8 = 106;
pub const TILE_NPH_ENABLE: u8 = 107;
pub const TILE_TELE_GRENADE_ENABLE: u8 = 112;
pub const TILE_TELE_GRENADE_DISABLE: u8 = 113;
pub const TILE_TELE_LASER_ENABLE: u8 = 128;
pub const TILE_TELE_LASER_DISABLE: u8 = 129;
pub const TILE_LFREEZE: u8 = 144;
pub const TILE_LUNFREEZE: u8 = 145;

/// Game-layer ids at or above this offset are entities.
pub const ENTITY_OFFSET: u8 = 191;

/// Spawn tiles (any of the three spawn variants).
pub const ENTITY_SPAWN_FIRST: u8 = 192;
pub const ENTITY_SPAWN_LAST: u8 = 194;

// =============================================================================
// ENTITIES (relative to ENTITY_OFFSET)
// =============================================================================

pub const ENTITY_ARMOR_1: u8 = 6;
pub const ENTITY_HEALTH_1: u8 = 7;
pub const ENTITY_WEAPON_SHOTGUN: u8 = 8;
pub const ENTITY_WEAPON_GRENADE: u8 = 9;
pub const ENTITY_POWERUP_NINJA: u8 = 10;
pub const ENTITY_WEAPON_LASER: u8 = 11;
pub const ENTITY_CRAZY_SHOTGUN_EX: u8 = 33;
pub const ENTITY_CRAZY_SHOTGUN: u8 = 34;
pub const ENTITY_ARMOR_SHOTGUN: u8 = 35;
pub const ENTITY_ARMOR_GRENADE: u8 = 36;
pub const ENTITY_ARMOR_NINJA: u8 = 37;
pub const ENTITY_ARMOR_LASER: u8 = 38;

// =============================================================================
// TILE FLAGS
// =============================================================================

pub const TILEFLAG_XFLIP: u8 = 1;
pub const TILEFLAG_YFLIP: u8 = 2;
pub const TILEFLAG_OPAQUE: u8 = 4;
pub const TILEFLAG_ROTATE: u8 = 8;

pub const ROTATION_0: u8 = 0;
pub const ROTATION_90: u8 = TILEFLAG_ROTATE;
pub const ROTATION_180: u8 = TILEFLAG_XFLIP | TILEFLAG_YFLIP;
pub const ROTATION_270: u8 = TILEFLAG_XFLIP | TILEFLAG_YFLIP | TILEFLAG_ROTATE;

// =============================================================================
// MOVE RESTRICTIONS
// =============================================================================

pub const CANTMOVE_LEFT: u8 = 1 << 0;
pub const CANTMOVE_RIGHT: u8 = 1 << 1;
pub const CANTMOVE_UP: u8 = 1 << 2;
pub const CANTMOVE_DOWN: u8 = 1 << 3;

/// True for the three spawn tile ids.
#[inline]
pub fn is_spawn_tile(tile: u8) -> bool {
    (ENTITY_SPAWN_FIRST..=ENTITY_SPAWN_LAST).contains(&tile)
}

/// Entity id of a raw tile, if it lies in the entity range.
#[inline]
pub fn entity_id(tile: u8) -> Option<u8> {
    tile.checked_sub(ENTITY_OFFSET).filter(|&e| e > 0)
}
