//! Per-variant enemy and boss movement and attacks
//!
//! Each policy is a function of the entity's own state plus the player's
//! position. Anything an entity creates (shots, minions) goes into `Spawns`
//! and is added to the world after the update pass.

use glam::Vec2;
use rand::Rng;

use super::state::{Behavior, Boss, BossKind, Enemy, EnemyKind, Owner, Projectile};
use crate::consts::*;

/// Entities created during a behavior pass
#[derive(Debug, Default)]
pub struct Spawns {
    pub projectiles: Vec<Projectile>,
    pub enemies: Vec<Enemy>,
}

/// Keep an enemy inside the playfield, reflecting velocity off the edge it hit
fn bounce(enemy: &mut Enemy) {
    let r = enemy.radius;
    if enemy.pos.x < r {
        enemy.pos.x = r;
        enemy.vel.x = -enemy.vel.x;
    }
    if enemy.pos.x > FIELD_W - r {
        enemy.pos.x = FIELD_W - r;
        enemy.vel.x = -enemy.vel.x;
    }
    if enemy.pos.y < r {
        enemy.pos.y = r;
        enemy.vel.y = -enemy.vel.y;
    }
    if enemy.pos.y > FIELD_H - r {
        enemy.pos.y = FIELD_H - r;
        enemy.vel.y = -enemy.vel.y;
    }
}

fn chase(enemy: &mut Enemy, player_pos: Vec2, dt: f32) {
    let to_player = player_pos - enemy.pos;
    if to_player.length_squared() > 0.01 {
        enemy.vel += to_player.normalize() * enemy.speed * CHASER_STEER * dt;
    }
    enemy.vel = enemy.vel.clamp_length_max(enemy.speed);
    enemy.pos += enemy.vel * dt;
    bounce(enemy);
}

/// Advance one enemy by its variant policy
pub fn update_enemy(enemy: &mut Enemy, player_pos: Vec2, dt: f32, rng: &mut impl Rng, spawns: &mut Spawns) {
    let to_player = player_pos - enemy.pos;
    let dist = to_player.length();

    match &mut enemy.behavior {
        Behavior::Chase => chase(enemy, player_pos, dt),

        Behavior::Shoot { fire_cd } => {
            *fire_cd -= dt;
            let ready = *fire_cd <= 0.0 && dist <= SHOOTER_FIRE_RANGE && dist > 0.1;
            if ready {
                *fire_cd = 1.0 / SHOOTER_FIRE_RATE;
            }

            if dist < SHOOTER_STRAFE_DIST {
                enemy.vel = to_player.perp().normalize_or_zero() * enemy.speed;
            } else if dist > SHOOTER_APPROACH_DIST {
                enemy.vel = to_player.normalize_or_zero() * enemy.speed;
            } else {
                enemy.vel *= 0.95;
            }
            enemy.pos += enemy.vel * dt;
            bounce(enemy);

            if ready {
                let dir = to_player / dist;
                spawns.projectiles.push(Projectile::new(
                    Owner::Enemy,
                    enemy.pos + dir * (enemy.radius + 6.0),
                    dir * SHOOTER_SHOT_SPEED,
                    SHOOTER_SHOT_DAMAGE,
                ));
            }
        }

        Behavior::Dash {
            charge_cd,
            dash_time,
            dashing,
        } => {
            *charge_cd -= dt;
            if *dashing {
                enemy.pos += enemy.vel * DASHER_BURST * dt;
                *dash_time -= dt;
                if *dash_time <= 0.0 {
                    *dashing = false;
                }
            } else {
                if dist > 0.1 {
                    enemy.vel = to_player / dist * enemy.speed * DASHER_DRIFT;
                }
                enemy.pos += enemy.vel * dt;
                if *charge_cd <= 0.0 {
                    // Lock onto where the player is right now
                    let aim = player_pos - enemy.pos;
                    if aim.length_squared() > 0.01 {
                        enemy.vel = aim.normalize() * enemy.speed;
                        *dashing = true;
                        *dash_time = DASH_DURATION;
                        *charge_cd = rng.random_range(2.0..4.0);
                    }
                }
            }
            bounce(enemy);
        }

        Behavior::Orbit {
            orbit_radius,
            angle,
            rate,
        } => {
            *angle = (*angle + *rate * dt) % std::f32::consts::TAU;
            let target = player_pos + crate::unit(*angle) * *orbit_radius;
            let next = crate::clamp_to_field(target, enemy.radius);
            if dt > 0.0 {
                enemy.vel = (next - enemy.pos) / dt;
            }
            enemy.pos = next;
        }
    }
}

/// Two weak Chasers left behind by a dead Splitter
pub fn split(parent: &Enemy, rng: &mut impl Rng) -> [Enemy; 2] {
    std::array::from_fn(|_| {
        let offset = Vec2::new(rng.random_range(-12.0..12.0), rng.random_range(-12.0..12.0));
        let pos = crate::clamp_to_field(parent.pos + offset, ENEMY_RADIUS);
        Enemy::with_stats(EnemyKind::Chaser, pos, 12.0, 140.0, rng)
    })
}

/// Advance one boss by its variant policy
pub fn update_boss(boss: &mut Boss, player_pos: Vec2, dt: f32, rng: &mut impl Rng, spawns: &mut Spawns) {
    boss.timer += dt;
    boss.attack_cd -= dt;
    let to_player = player_pos - boss.pos;
    let dist = to_player.length();
    let dir = to_player.normalize_or_zero();
    let attack = boss.attack_cd <= 0.0;

    match boss.kind {
        BossKind::Juggernaut => {
            if dist > 60.0 {
                boss.pos += dir * boss.speed * 0.5 * dt;
            }
            if attack {
                boss.attack_cd = 2.6;
                let step = std::f32::consts::TAU / JUGGERNAUT_VOLLEY as f32;
                for i in 0..JUGGERNAUT_VOLLEY {
                    let dv = crate::unit(i as f32 * step);
                    spawns.projectiles.push(Projectile::new(Owner::Enemy, boss.pos + dv * 40.0, dv * 180.0, 12.0));
                }
            }
        }
        BossKind::Sentinel => {
            if dist > 240.0 {
                boss.pos += dir * boss.speed * dt;
            }
            if attack {
                boss.attack_cd = 1.0;
                if dir != Vec2::ZERO {
                    spawns.projectiles.push(Projectile::new(Owner::Enemy, boss.pos + dir * 40.0, dir * 320.0, 18.0));
                }
            }
        }
        BossKind::HiveQueen => {
            if dist > 120.0 {
                boss.pos += dir * boss.speed * 0.4 * dt;
            }
            if attack {
                boss.attack_cd = 3.0;
                for _ in 0..HIVE_MINIONS {
                    let offset = Vec2::new(rng.random_range(-60.0..60.0), rng.random_range(-60.0..60.0));
                    let pos = crate::clamp_to_field(boss.pos + offset, ENEMY_RADIUS);
                    spawns.enemies.push(Enemy::with_stats(EnemyKind::Chaser, pos, 18.0, 120.0, rng));
                }
            }
        }
    }

    // Bosses may overhang the edge by their own radius
    boss.pos = crate::clamp_to_field(boss.pos, -boss.radius);
}
