//! Time-driven enemy and boss spawning
//!
//! Spawn cadence tightens with elapsed time, rarer variants ramp up in
//! weight, and every boss kill ratchets toughness for the rest of the run.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Boss, BossKind, Enemy, EnemyKind};
use crate::consts::*;

/// Playfield edge an entity enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl SpawnEdge {
    pub const ALL: [SpawnEdge; 4] = [SpawnEdge::Top, SpawnEdge::Bottom, SpawnEdge::Left, SpawnEdge::Right];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// A point `margin` outside this edge; `inset` keeps it away from corners
    pub fn point(&self, margin: f32, inset: f32, rng: &mut impl Rng) -> Vec2 {
        match self {
            SpawnEdge::Top => Vec2::new(rng.random_range(inset..FIELD_W - inset), -margin),
            SpawnEdge::Bottom => Vec2::new(rng.random_range(inset..FIELD_W - inset), FIELD_H + margin),
            SpawnEdge::Left => Vec2::new(-margin, rng.random_range(inset..FIELD_H - inset)),
            SpawnEdge::Right => Vec2::new(FIELD_W + margin, rng.random_range(inset..FIELD_H - inset)),
        }
    }
}

/// Ramp rule for one variant: `base + min(cap, elapsed / ramp)`
#[derive(Debug, Clone, Copy)]
struct VariantWeight {
    kind: EnemyKind,
    base: f32,
    cap: f32,
    ramp: f32,
}

const WEIGHTS: [VariantWeight; 6] = [
    VariantWeight { kind: EnemyKind::Chaser, base: 0.45, cap: 0.0, ramp: 1.0 },
    VariantWeight { kind: EnemyKind::Shooter, base: 0.20, cap: 0.25, ramp: 600.0 },
    VariantWeight { kind: EnemyKind::Dasher, base: 0.12, cap: 0.18, ramp: 500.0 },
    VariantWeight { kind: EnemyKind::Tank, base: 0.08, cap: 0.12, ramp: 700.0 },
    VariantWeight { kind: EnemyKind::Orbiter, base: 0.10, cap: 0.0, ramp: 1.0 },
    VariantWeight { kind: EnemyKind::Splitter, base: 0.05, cap: 0.0, ramp: 1.0 },
];

/// What the director produced this step
#[derive(Debug, Default)]
pub struct SpawnWave {
    pub enemy: Option<Enemy>,
    pub boss: Option<Boss>,
}

/// Procedural spawn timing and difficulty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnDirector {
    /// Run-elapsed seconds
    pub elapsed: f32,
    pub spawn_timer: f32,
    pub spawn_interval: f32,
    pub boss_timer: f32,
    /// Toughness scalar, multiplied by `BOSS_RATCHET` per boss kill
    pub post_boss_multiplier: f32,
}

impl Default for SpawnDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnDirector {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            spawn_timer: 0.0,
            spawn_interval: BASE_SPAWN_INTERVAL,
            boss_timer: 0.0,
            post_boss_multiplier: 1.0,
        }
    }

    /// Regular spawn interval at a given run time
    pub fn interval_at(elapsed: f32) -> f32 {
        (BASE_SPAWN_INTERVAL - elapsed / SPAWN_DECAY).max(MIN_SPAWN_INTERVAL)
    }

    /// Unnormalized spawn weight per variant at a given run time
    pub fn weights_at(elapsed: f32) -> [(EnemyKind, f32); 6] {
        WEIGHTS.map(|w| (w.kind, w.base + w.cap.min(elapsed / w.ramp)))
    }

    /// Weighted draw of the next variant
    pub fn pick_variant(elapsed: f32, rng: &mut impl Rng) -> EnemyKind {
        let weights = Self::weights_at(elapsed);
        let total: f32 = weights.iter().map(|(_, w)| w).sum();
        let mut roll = rng.random_range(0.0..total);
        for (kind, weight) in weights {
            if roll < weight {
                return kind;
            }
            roll -= weight;
        }
        // Float slop on the last bucket
        weights[weights.len() - 1].0
    }

    /// Build a regular enemy, scaling Chasers with time and the ratchet
    pub fn make_enemy(&self, kind: EnemyKind, pos: Vec2, rng: &mut impl Rng) -> Enemy {
        match kind {
            EnemyKind::Chaser => {
                let hp = (20.0 * self.post_boss_multiplier + self.elapsed / 20.0).floor();
                let speed = 100.0 + self.elapsed / 120.0;
                Enemy::with_stats(kind, pos, hp, speed, rng)
            }
            _ => Enemy::spawn(kind, pos, rng),
        }
    }

    /// Build a boss scaled by time and the ratchet
    pub fn make_boss(&self, kind: BossKind, pos: Vec2) -> Boss {
        let hp = ((1200.0 + self.elapsed * 18.0) * self.post_boss_multiplier).floor();
        Boss::new(kind, pos, hp)
    }

    /// Advance timers; may yield one enemy and/or one boss
    pub fn update(&mut self, dt: f32, live_enemies: usize, rng: &mut impl Rng) -> SpawnWave {
        let mut wave = SpawnWave::default();
        self.elapsed += dt;
        self.spawn_interval = Self::interval_at(self.elapsed);
        self.spawn_timer -= dt;

        if self.spawn_timer <= 0.0 && live_enemies < ENEMY_CAP {
            self.spawn_timer = self.spawn_interval;
            let pos = SpawnEdge::random(rng).point(SPAWN_MARGIN, 0.0, rng);
            let kind = Self::pick_variant(self.elapsed, rng);
            log::debug!("Spawning {:?} at ({:.0}, {:.0})", kind, pos.x, pos.y);
            wave.enemy = Some(self.make_enemy(kind, pos, rng));
        }

        self.boss_timer += dt;
        if self.boss_timer >= BOSS_INTERVAL {
            self.boss_timer = 0.0;
            let kind = BossKind::ALL[rng.random_range(0..BossKind::ALL.len())];
            let pos = SpawnEdge::random(rng).point(BOSS_SPAWN_MARGIN, BOSS_SPAWN_INSET, rng);
            let boss = self.make_boss(kind, pos);
            log::info!("Boss incoming: {:?} with {} hp", kind, boss.max_hp);
            wave.boss = Some(boss);
        }

        wave
    }

    /// Apply the post-boss difficulty ratchet
    pub fn record_boss_kill(&mut self) {
        self.post_boss_multiplier *= BOSS_RATCHET;
    }
}
