//! Astro Rogue - simulation core of a top-down roguelite shooter
//!
//! Core modules:
//! - `sim`: Fixed-step world simulation (entities, spawning, combat)
//! - `progression`: Upgrade graphs, derived stats, prestige economy
//! - `persistence`: Progression save schema and stores
//! - `game`: Facade consumed by the presentation/input layer

pub mod error;
pub mod game;
pub mod persistence;
pub mod progression;
pub mod settings;
pub mod sim;

pub use error::{PrestigeError, PurchaseError};
pub use game::Game;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest dt a single step will integrate (avoids jumps after stalls)
    pub const MAX_DT: f32 = 1.0 / 30.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Playfield dimensions
    pub const FIELD_W: f32 = 1200.0;
    pub const FIELD_H: f32 = 760.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 14.0;
    pub const PLAYER_DAMPING: f32 = 0.97;
    pub const BASE_SPEED: f32 = 220.0;
    pub const BASE_FIRE_RATE: f32 = 5.0;
    pub const BASE_DAMAGE: f32 = 14.0;
    pub const BASE_MAX_HEALTH: f32 = 100.0;
    pub const BASE_BULLET_SPEED: f32 = 520.0;
    pub const BASE_MONEY_MULT: f64 = 1.0;
    /// XP required for the first level-up; also the per-level increment
    pub const XP_PER_LEVEL: u32 = 100;

    /// Projectiles
    pub const PROJECTILE_RADIUS: f32 = 4.0;
    pub const PROJECTILE_LIFE: f32 = 4.0;
    pub const MUZZLE_OFFSET: f32 = 8.0;
    /// Fraction of player velocity inherited by fired projectiles
    pub const MUZZLE_INHERIT: f32 = 0.2;
    /// Double-shot spread (degrees either side of aim)
    pub const DOUBLE_SHOT_SPREAD_DEG: f32 = 6.0;
    pub const HOMING_SPEED: f32 = 340.0;
    pub const HOMING_DAMAGE_MULT: f32 = 1.8;
    pub const HOMING_COOLDOWN: f32 = 4.0;
    /// Explosion radius when the primary target is an enemy
    pub const EXPLOSION_RADIUS: f32 = 36.0;
    /// Explosion radius when the primary target is a boss
    pub const EXPLOSION_RADIUS_BOSS: f32 = 40.0;

    /// Enemies
    pub const ENEMY_RADIUS: f32 = 16.0;
    pub const TANK_RADIUS: f32 = 28.0;
    pub const ENEMY_CONTACT_DAMAGE: f32 = 18.0;
    /// Chaser steering acceleration as a fraction of its top speed
    pub const CHASER_STEER: f32 = 0.6;
    pub const SHOOTER_STRAFE_DIST: f32 = 180.0;
    pub const SHOOTER_APPROACH_DIST: f32 = 260.0;
    pub const SHOOTER_FIRE_RANGE: f32 = 420.0;
    pub const SHOOTER_FIRE_RATE: f32 = 1.0;
    pub const SHOOTER_SHOT_SPEED: f32 = 260.0;
    pub const SHOOTER_SHOT_DAMAGE: f32 = 8.0;
    pub const DASHER_DRIFT: f32 = 0.45;
    pub const DASHER_BURST: f32 = 2.2;
    pub const DASH_DURATION: f32 = 0.6;

    /// Bosses
    pub const BOSS_RADIUS: f32 = 60.0;
    pub const BOSS_CONTACT_DAMAGE: f32 = 40.0;
    pub const JUGGERNAUT_VOLLEY: u32 = 16;
    pub const HIVE_MINIONS: u32 = 3;

    /// Spawn director
    pub const BASE_SPAWN_INTERVAL: f32 = 1.8;
    pub const MIN_SPAWN_INTERVAL: f32 = 0.5;
    pub const SPAWN_DECAY: f32 = 140.0;
    pub const ENEMY_CAP: usize = 40;
    pub const BOSS_INTERVAL: f32 = 55.0;
    /// Post-boss difficulty ratchet factor
    pub const BOSS_RATCHET: f32 = 1.08;
    /// Distance outside the playfield regular enemies appear at
    pub const SPAWN_MARGIN: f32 = 20.0;
    pub const BOSS_SPAWN_MARGIN: f32 = 120.0;
    /// Keeps bosses away from the corners when they enter
    pub const BOSS_SPAWN_INSET: f32 = 200.0;

    /// Pickups
    pub const ORB_RADIUS: f32 = 8.0;
    pub const ORB_LIFE: f32 = 12.0;
    pub const ORB_ATTRACT_DIST: f32 = 140.0;
    pub const ORB_ATTRACT_SPEED: f32 = 120.0;
    pub const ORB_DRIFT_SPEED: f32 = 10.0;
    pub const ORB_COLLECT_SLACK: f32 = 6.0;
    pub const ORB_MIN_XP: u32 = 8;

    /// Rewards
    pub const ENEMY_MONEY_BASE: u32 = 15;
    pub const BOSS_MONEY: f64 = 600.0;
    /// Elapsed seconds per bonus core shard on boss kills
    pub const BOSS_SHARD_TIME_STEP: f32 = 140.0;

    /// Player damage resolution
    pub const EVASION_PER_LEVEL: f32 = 0.06;
    pub const CRIT_PER_LEVEL: f32 = 0.05;
    pub const CRIT_MULT: f32 = 1.5;
    pub const REGEN_PER_LEVEL: f32 = 0.5;
    pub const SHIELD_RECHARGE: f32 = 20.0;
    /// Recharge reduction per Quick Shield level
    pub const QUICK_SHIELD_CUT: f32 = 0.3;

    /// Prestige
    pub const PRESTIGE_THRESHOLD: u64 = 6000;
    pub const PRESTIGE_MULT_STEP: f64 = 0.05;
    /// Normal tree cost growth per owned level
    pub const NORMAL_COST_GROWTH: f64 = 1.9;
}

/// Whether two circles overlap (strict, squared-distance test)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// Clamp a position so a circle of `radius` stays inside the playfield.
///
/// A negative radius lets the circle overhang the edge by that much.
#[inline]
pub fn clamp_to_field(pos: Vec2, radius: f32) -> Vec2 {
    Vec2::new(
        pos.x.clamp(radius, consts::FIELD_W - radius),
        pos.y.clamp(radius, consts::FIELD_H - radius),
    )
}

/// Whether a point lies inside the playfield (edges inclusive)
#[inline]
pub fn in_field(pos: Vec2) -> bool {
    (0.0..=consts::FIELD_W).contains(&pos.x) && (0.0..=consts::FIELD_H).contains(&pos.y)
}

/// Rotate a vector by `degrees`
#[inline]
pub fn rotate_deg(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}

/// Unit vector for an angle in radians
#[inline]
pub fn unit(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}
