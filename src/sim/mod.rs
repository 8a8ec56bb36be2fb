//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod behavior;
pub mod combat;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use snapshot::{EntityKind, EntityView, Hud, WorldSnapshot, capture};
pub use spawn::{SpawnDirector, SpawnEdge};
pub use state::{
    Behavior, Boss, BossKind, Enemy, EnemyKind, GameEvent, Owner, Player, Projectile, RunPhase,
    World, XpOrb,
};
pub use tick::{TickInput, autopilot_input, tick};
