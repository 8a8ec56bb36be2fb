//! Fixed timestep simulation tick
//!
//! Core game loop that advances a run deterministically.

use glam::Vec2;

use super::behavior::{Spawns, update_boss, update_enemy};
use super::combat::{
    aim_between, collect_orbs, fire_homing, fire_primary, resolve_contacts, resolve_projectiles,
    settle_deaths,
};
use super::state::{GameEvent, Owner, RunPhase, World};
use crate::consts::*;
use crate::persistence::ProgressionState;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement direction; any length, normalized on use
    pub move_dir: Vec2,
    /// Cursor position in playfield coordinates
    pub aim: Option<Vec2>,
    /// Primary fire held
    pub fire: bool,
    /// Launch a homing missile if one is ready
    pub homing: bool,
    /// Pause toggle
    pub pause: bool,
    /// Autopilot - the sim flies the ship itself
    pub autopilot: bool,
}

/// Advance the run by one step.
///
/// Boss shards earned this step land in `progression` directly.
pub fn tick(world: &mut World, progression: &mut ProgressionState, input: &TickInput, dt: f32) {
    if input.pause {
        match world.phase {
            RunPhase::Playing => {
                world.phase = RunPhase::Paused;
                return;
            }
            RunPhase::Paused => world.phase = RunPhase::Playing,
            RunPhase::Ended => {}
        }
    }

    if world.phase != RunPhase::Playing {
        return;
    }

    let dt = dt.min(MAX_DT);
    if dt <= 0.0 {
        return;
    }
    let input = if input.autopilot {
        autopilot_input(world)
    } else {
        input.clone()
    };
    world.time_ticks += 1;

    update_player(world, &input, dt);

    let gained = world.player.resolve_leveling();
    if gained > 0 {
        let level = world.player.level;
        log::debug!("Level up -> {} ({} skill points)", level, world.player.skill_points);
        world.events.push(GameEvent::LevelUp { level });
    }

    let wave = world.spawner.update(dt, world.enemies.len(), &mut world.rng);
    if let Some(enemy) = wave.enemy {
        world.add_enemy(enemy);
    }
    if let Some(boss) = wave.boss {
        world.events.push(GameEvent::BossSpawned { kind: boss.kind });
        world.add_boss(boss);
    }

    let target = world.player.pos;
    let mut spawns = Spawns::default();
    for enemy in &mut world.enemies {
        update_enemy(enemy, target, dt, &mut world.rng, &mut spawns);
    }
    for boss in &mut world.bosses {
        update_boss(boss, target, dt, &mut world.rng, &mut spawns);
    }
    for projectile in spawns.projectiles {
        world.add_projectile(projectile);
    }
    for enemy in spawns.enemies {
        world.add_enemy(enemy);
    }

    world.projectiles.retain_mut(|p| p.integrate(dt));

    resolve_contacts(world);
    resolve_projectiles(world);

    settle_deaths(world, progression);
    collect_orbs(world, dt);

    if !world.player.alive {
        world.phase = RunPhase::Ended;
        let score = world.player.score;
        log::info!(
            "Run over after {:.1}s: score {} level {}",
            world.spawner.elapsed,
            score,
            world.player.level
        );
        world.events.push(GameEvent::RunEnded { score });
    }
}

/// Movement, timers, regen and weapons
fn update_player(world: &mut World, input: &TickInput, dt: f32) {
    let shots = {
        let player = &mut world.player;
        if let Some(dir) = input.move_dir.try_normalize() {
            player.vel += dir * player.stats.speed * dt;
        }
        player.vel *= PLAYER_DAMPING;
        player.pos = crate::clamp_to_field(player.pos + player.vel * dt, player.radius);
        if let Some(cursor) = input.aim {
            player.facing = aim_between(player.pos, cursor, player.facing);
        }

        player.fire_cooldown = (player.fire_cooldown - dt).max(0.0);
        player.homing_cooldown = (player.homing_cooldown - dt).max(0.0);
        if player.stats.regen > 0.0 {
            player.heal(player.stats.regen * dt);
        }
        if player.stats.shield_regen && !player.shield_active {
            player.shield_timer -= dt;
            if player.shield_timer <= 0.0 {
                player.shield_timer = 0.0;
                player.shield_active = true;
            }
        }

        if input.fire && player.fire_cooldown <= 0.0 {
            player.fire_cooldown = player.stats.fire_interval();
            fire_primary(player)
        } else {
            Vec::new()
        }
    };
    for shot in shots {
        world.add_projectile(shot);
    }

    if input.homing && world.player.homing_ready() {
        if let Some(missile) = fire_homing(&world.player, &world.bosses, &world.enemies) {
            world.player.homing_cooldown = HOMING_COOLDOWN;
            world.add_projectile(missile);
        }
    }
}

/// Input the autopilot would give this step: keep clear of threats, drift
/// back toward the middle, shoot whatever is closest.
pub fn autopilot_input(world: &World) -> TickInput {
    let player = &world.player;
    let center = Vec2::new(FIELD_W / 2.0, FIELD_H / 2.0);

    let threats = world
        .enemies
        .iter()
        .map(|e| e.pos)
        .chain(world.bosses.iter().map(|b| b.pos))
        .chain(world.projectiles.iter().filter(|p| p.owner == Owner::Enemy).map(|p| p.pos));
    let mut away = Vec2::ZERO;
    for pos in threats {
        let offset = player.pos - pos;
        let dist = offset.length();
        if dist > 0.01 && dist < 180.0 {
            away += offset / (dist * dist);
        }
    }
    let move_dir = away.normalize_or_zero() + (center - player.pos) / FIELD_W;

    let nearest = world
        .bosses
        .iter()
        .map(|b| b.pos)
        .chain(world.enemies.iter().map(|e| e.pos))
        .min_by(|a, b| {
            a.distance_squared(player.pos)
                .partial_cmp(&b.distance_squared(player.pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    TickInput {
        move_dir,
        aim: nearest,
        fire: nearest.is_some(),
        homing: true,
        pause: false,
        autopilot: false,
    }
}
