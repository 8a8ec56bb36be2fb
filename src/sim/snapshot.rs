//! Read-only view of a run for the presentation layer

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{BossKind, EnemyKind, Owner, RunPhase, World};
use crate::persistence::ProgressionState;

/// What an entity is, as far as drawing it goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy(EnemyKind),
    Boss(BossKind),
    Projectile(Owner),
    XpOrb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub radius: f32,
    /// 0..=1 for things with health, 1 otherwise
    pub hp_ratio: f32,
}

/// Heads-up display values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub health: f32,
    pub max_health: f32,
    pub score: u64,
    pub money: u64,
    pub level: u32,
    pub xp: u32,
    pub xp_next: u32,
    pub skill_points: u64,
    pub core_shards: u64,
    pub prestige_points: u64,
    pub best_score: u64,
    pub shield_active: bool,
    pub homing_ready: bool,
    pub boss_present: bool,
    pub phase: RunPhase,
    /// Run-elapsed seconds
    pub elapsed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub entities: Vec<EntityView>,
    pub hud: Hud,
}

fn ratio(hp: f32, max_hp: f32) -> f32 {
    if max_hp > 0.0 { (hp / max_hp).clamp(0.0, 1.0) } else { 0.0 }
}

/// Capture the current run. Entities are listed player first, then bosses,
/// enemies, projectiles and orbs, each in spawn order.
pub fn capture(world: &World, progression: &ProgressionState) -> WorldSnapshot {
    let player = &world.player;
    let mut entities = Vec::with_capacity(
        1 + world.bosses.len() + world.enemies.len() + world.projectiles.len() + world.orbs.len(),
    );

    entities.push(EntityView {
        id: 0,
        kind: EntityKind::Player,
        pos: player.pos,
        radius: player.radius,
        hp_ratio: ratio(player.health, player.stats.max_health),
    });
    entities.extend(world.bosses.iter().map(|b| EntityView {
        id: b.id,
        kind: EntityKind::Boss(b.kind),
        pos: b.pos,
        radius: b.radius,
        hp_ratio: ratio(b.hp, b.max_hp),
    }));
    entities.extend(world.enemies.iter().map(|e| EntityView {
        id: e.id,
        kind: EntityKind::Enemy(e.kind),
        pos: e.pos,
        radius: e.radius,
        hp_ratio: ratio(e.hp, e.max_hp),
    }));
    entities.extend(world.projectiles.iter().map(|p| EntityView {
        id: p.id,
        kind: EntityKind::Projectile(p.owner),
        pos: p.pos,
        radius: p.radius,
        hp_ratio: 1.0,
    }));
    entities.extend(world.orbs.iter().map(|o| EntityView {
        id: o.id,
        kind: EntityKind::XpOrb,
        pos: o.pos,
        radius: o.radius,
        hp_ratio: 1.0,
    }));

    WorldSnapshot {
        tick: world.time_ticks,
        entities,
        hud: Hud {
            health: player.health,
            max_health: player.stats.max_health,
            score: player.score,
            money: player.money,
            level: player.level,
            xp: player.xp,
            xp_next: player.xp_next,
            skill_points: player.skill_points,
            core_shards: progression.core_shards,
            prestige_points: progression.prestige_points,
            best_score: progression.best_score.max(player.score),
            shield_active: player.shield_active,
            homing_ready: player.homing_ready(),
            boss_present: !world.bosses.is_empty(),
            phase: world.phase,
            elapsed: world.spawner.elapsed,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Boss, Enemy, XpOrb};

    #[test]
    fn test_capture_lists_every_entity() {
        let progression = ProgressionState::default();
        let mut world = World::new(5, &progression);
        let mut enemy = Enemy::spawn(EnemyKind::Tank, Vec2::new(50.0, 50.0), &mut world.rng);
        enemy.take_damage(85.0);
        world.add_enemy(enemy);
        world.add_boss(Boss::new(BossKind::HiveQueen, Vec2::new(600.0, 0.0), 1000.0));
        world.add_orb(XpOrb::new(Vec2::new(80.0, 80.0), 12));

        let snap = capture(&world, &progression);
        let kinds: Vec<EntityKind> = snap.entities.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EntityKind::Player,
                EntityKind::Boss(BossKind::HiveQueen),
                EntityKind::Enemy(EnemyKind::Tank),
                EntityKind::XpOrb,
            ]
        );
        assert_eq!(snap.entities[2].hp_ratio, 0.5);
        assert!(snap.hud.boss_present);
        assert_eq!(snap.hud.phase, RunPhase::Playing);
        assert_eq!(snap.hud.health, snap.hud.max_health);
    }

    #[test]
    fn test_hud_best_score_tracks_live_run() {
        let progression = ProgressionState {
            best_score: 900,
            ..Default::default()
        };
        let mut world = World::new(5, &progression);
        assert_eq!(capture(&world, &progression).hud.best_score, 900);
        world.player.score = 1500;
        assert_eq!(capture(&world, &progression).hud.best_score, 1500);
    }
}
