//! Teecore Simulation Demo
//!
//! Builds a small race map, runs a few characters through it with scripted
//! input, then replays the same input on a forked world and checks that the
//! state fingerprints match.

use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use teecore::{
    game::{PlayerInput, WorldConfig, WorldCore},
    map::tiles::*,
    Collision, MapBuilder, MapData, TICK_SPEED, VERSION,
};

const DEMO_TICKS: i32 = 20 * TICK_SPEED;
const CHARACTERS: usize = 4;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to install tracing subscriber")?;

    info!("Teecore Simulation v{}", VERSION);
    info!("Tick Speed: {} Hz", TICK_SPEED);

    demo_run()
}

/// Flat course with a start line, a freeze pit, a teleporter and a finish.
fn demo_map() -> MapData {
    MapBuilder::new(120, 40)
        .border()
        .rect(1, 30, 118, 38, TILE_SOLID)
        .rect(40, 30, 43, 30, TILE_FREEZE)
        .rect(20, 22, 26, 22, TILE_SOLID)
        .rect(8, 27, 8, 29, TILE_START)
        .tele(70, 29, TILE_TELEIN, 1)
        .tele(90, 25, TILE_TELEOUT, 1)
        .rect(110, 25, 110, 29, TILE_FINISH)
        .spawn(3, 29)
        .spawn(4, 29)
        .build()
}

/// Scripted input for character `index` at tick `t`.
fn scripted_input(index: usize, t: i32) -> PlayerInput {
    let phase = t + index as i32 * 13;
    PlayerInput {
        direction: if phase % 150 < 120 { 1 } else { -1 },
        jump: phase % 40 == 0,
        hook: phase % 90 < 25,
        fire: phase / 30,
        ..PlayerInput::new()
    }
    .aiming(60, -40)
}

fn run(world: &mut WorldCore, ticks: i32) {
    let ids: Vec<_> = world.characters().iter().map(|c| c.id()).collect();
    for _ in 0..ticks {
        let t = world.game_tick();
        for (i, &id) in ids.iter().enumerate() {
            world.on_input(id, scripted_input(i, t));
        }
        world.tick();
        world.quantize();
    }
}

fn demo_run() -> Result<()> {
    info!("=== Starting Demo Run ===");

    let collision = Arc::new(Collision::new(demo_map()).context("demo map rejected")?);
    let mut world = WorldCore::new(Arc::clone(&collision), WorldConfig::default());
    for _ in 0..CHARACTERS {
        let id = world.add_character().context("demo map has no spawn")?;
        let pos = world.character(id).pos();
        info!("Added character {} at ({:.1}, {:.1})", id.raw(), pos.x, pos.y);
    }

    // Fork halfway so the replay also exercises world copies
    run(&mut world, DEMO_TICKS / 2);
    let fork = world.clone();
    run(&mut world, DEMO_TICKS - DEMO_TICKS / 2);

    info!("=== Run Results ===");
    for c in world.characters() {
        let finished = if c.finish_tick() >= 0 { "finished" } else { "running" };
        info!(
            "Character {}: pos ({:.1}, {:.1}) start {} finish {} ({})",
            c.id().raw(),
            c.pos().x,
            c.pos().y,
            c.start_tick(),
            c.finish_tick(),
            finished
        );
    }
    let hash = world.state_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    info!("=== Verifying Determinism ===");
    let mut replay = WorldCore::new(collision, WorldConfig::default());
    for _ in 0..CHARACTERS {
        replay.add_character().context("demo map has no spawn")?;
    }
    run(&mut replay, DEMO_TICKS);
    let replay_hash = replay.state_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    let mut resumed = fork;
    run(&mut resumed, DEMO_TICKS - DEMO_TICKS / 2);
    let resumed_hash = resumed.state_hash();
    info!("Forked State Hash: {}", hex::encode(resumed_hash));

    ensure!(hash == replay_hash, "DETERMINISM FAILURE: replay diverged");
    ensure!(hash == resumed_hash, "DETERMINISM FAILURE: fork diverged");
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}
