//! Derived player stats
//!
//! Stats are always rebuilt from base values plus every owned upgrade, core
//! unlock, prestige perk and skill. Nothing is patched incrementally, so the
//! result depends only on what is owned, never on purchase order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::trees::ids::*;
use crate::consts::*;
use crate::persistence::ProgressionState;

/// Un-upgraded player stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub speed: f32,
    /// Shots per second
    pub fire_rate: f32,
    pub damage: f32,
    pub max_health: f32,
    pub bullet_speed: f32,
    pub money_mult: f64,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            speed: BASE_SPEED,
            fire_rate: BASE_FIRE_RATE,
            damage: BASE_DAMAGE,
            max_health: BASE_MAX_HEALTH,
            bullet_speed: BASE_BULLET_SPEED,
            money_mult: BASE_MONEY_MULT,
        }
    }
}

/// Effective stats for the current run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub speed: f32,
    pub fire_rate: f32,
    pub damage: f32,
    pub max_health: f32,
    pub bullet_speed: f32,
    pub money_mult: f64,
    pub homing_unlocked: bool,
    pub shield_on_spawn: bool,
    /// Extra targets each player projectile passes through
    pub pierce: u32,
    pub double_shot: bool,
    pub explosive: bool,
    /// Consumed shields re-arm after `shield_recharge` seconds
    pub shield_regen: bool,
    pub shield_recharge: f32,
    pub evasion_chance: f32,
    pub crit_chance: f32,
    /// Health per second
    pub regen: f32,
}

impl DerivedStats {
    /// Rebuild stats from scratch.
    ///
    /// `skills` are the current run's skill-tree levels.
    pub fn compute(
        base: &BaseStats,
        progression: &ProgressionState,
        skills: &BTreeMap<String, u32>,
    ) -> Self {
        let normal = |id: &str| progression.normal_level(id) as i32;
        let core = |id: &str| progression.core_level(id) > 0;
        let perk = |id: &str| progression.owns_perk(id);
        let skill = |id: &str| skills.get(id).copied().unwrap_or(0) as f32;

        let speed = base.speed
            * 1.08f32.powi(normal(ROOT_SPEED))
            * 1.10f32.powi(normal(SPEED_2))
            * 1.12f32.powi(normal(SPEED_3));
        let mut fire_rate = base.fire_rate * 1.12f32.powi(normal(FIRE_1));
        let mut damage = base.damage + 6.0 * normal(DAMAGE_1) as f32;
        let max_health = base.max_health + 25.0 * normal(HP_1) as f32;
        let mut money_mult = base.money_mult * 1.10f64.powi(normal(MONEY_1));
        let bullet_speed = base.bullet_speed * 1.20f32.powi(normal(BULLET_SPEED));

        if perk(PS_DMG5) {
            damage = (damage * 1.05).floor();
        }
        if perk(PS_MONEY10) {
            money_mult *= 1.10;
        }
        if perk(PS_FIRE5) {
            fire_rate *= 1.05;
        }
        let pierce = if core(CORE_PIERCE2) {
            2
        } else if core(CORE_PIERCE1) {
            1
        } else {
            0
        };

        Self {
            speed,
            fire_rate,
            damage,
            max_health,
            bullet_speed,
            money_mult,
            homing_unlocked: normal(HOMING) > 0,
            shield_on_spawn: normal(SHIELD_ON_SPAWN) > 0,
            pierce,
            double_shot: core(CORE_DOUBLE),
            explosive: core(CORE_EXPLODE),
            shield_regen: core(CORE_SHIELD),
            shield_recharge: SHIELD_RECHARGE * (1.0 - QUICK_SHIELD_CUT * skill(SKILL_SHIELD)),
            evasion_chance: EVASION_PER_LEVEL * skill(SKILL_EVASION),
            crit_chance: CRIT_PER_LEVEL * skill(SKILL_CRIT),
            regen: REGEN_PER_LEVEL * skill(SKILL_REGEN),
        }
    }

    /// Seconds between shots
    pub fn fire_interval(&self) -> f32 {
        1.0 / self.fire_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::{CORE_TREE, NORMAL_TREE, RunSession, RunWallet, SKILL_TREE, TreeId, purchase};
    use proptest::prelude::*;

    fn owned_everything() -> (ProgressionState, BTreeMap<String, u32>) {
        let mut p = ProgressionState::default();
        for (id, lvl) in [(ROOT_SPEED, 2), (FIRE_1, 3), (DAMAGE_1, 2), (HP_1, 4), (MONEY_1, 1), (HOMING, 1)] {
            p.normal_upgrades.insert(id.to_string(), lvl);
        }
        for id in [CORE_PIERCE1, CORE_PIERCE2, CORE_DOUBLE, CORE_SHIELD] {
            p.core_upgrades.insert(id.to_string(), 1);
        }
        p.prestige_shop.insert(PS_DMG5.to_string(), true);
        p.prestige_shop.insert(PS_MONEY10.to_string(), true);
        let skills = BTreeMap::from([(SKILL_EVASION.to_string(), 2), (SKILL_SHIELD.to_string(), 1)]);
        (p, skills)
    }

    #[test]
    fn test_no_upgrades_is_base() {
        let base = BaseStats::default();
        let stats = DerivedStats::compute(&base, &ProgressionState::default(), &BTreeMap::new());
        assert_eq!(stats.speed, base.speed);
        assert_eq!(stats.damage, base.damage);
        assert_eq!(stats.max_health, base.max_health);
        assert_eq!(stats.pierce, 0);
        assert!(!stats.homing_unlocked && !stats.double_shot);
        assert_eq!(stats.evasion_chance, 0.0);
        assert!((stats.fire_interval() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_upgrade_effects() {
        let (p, skills) = owned_everything();
        let stats = DerivedStats::compute(&BaseStats::default(), &p, &skills);
        assert_eq!(stats.damage, ((14.0f32 + 12.0) * 1.05).floor());
        assert_eq!(stats.max_health, 200.0);
        assert!((stats.speed - 220.0 * 1.08 * 1.08).abs() < 1e-3);
        assert!((stats.money_mult - 1.21).abs() < 1e-5);
        assert_eq!(stats.pierce, 2);
        assert!(stats.homing_unlocked && stats.double_shot && stats.shield_regen);
        assert!(!stats.explosive);
        assert!((stats.evasion_chance - 0.12).abs() < 1e-6);
        assert!((stats.shield_recharge - 14.0).abs() < 1e-4);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let (p, skills) = owned_everything();
        let a = DerivedStats::compute(&BaseStats::default(), &p, &skills);
        let b = DerivedStats::compute(&BaseStats::default(), &p, &skills);
        assert_eq!(a, b);
    }

    fn any_node() -> impl Strategy<Value = (TreeId, &'static str)> {
        prop_oneof![
            prop::sample::select(NORMAL_TREE.nodes).prop_map(|n| (TreeId::Normal, n.id)),
            prop::sample::select(CORE_TREE.nodes).prop_map(|n| (TreeId::Core, n.id)),
            prop::sample::select(SKILL_TREE.nodes).prop_map(|n| (TreeId::Skill, n.id)),
        ]
    }

    /// Keep buying from `order` until a full pass buys nothing
    fn buy_all(order: &[(TreeId, &'static str)]) -> (ProgressionState, RunSession) {
        let mut prog = ProgressionState {
            core_shards: 1_000_000,
            ..Default::default()
        };
        let mut session = RunSession::default();
        let (mut money, mut points) = (u64::MAX / 2, 1_000_000);
        loop {
            let mut bought = false;
            for &(tree, id) in order {
                let wallet = RunWallet {
                    money: &mut money,
                    skill_points: &mut points,
                    session: &mut session,
                };
                bought |= purchase(tree, id, &mut prog, wallet).is_ok();
            }
            if !bought {
                return (prog, session);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_stats_ignore_purchase_order(picks in prop::collection::vec(any_node(), 1..30)) {
            let reversed: Vec<_> = picks.iter().rev().copied().collect();
            let (prog_a, session_a) = buy_all(&picks);
            let (prog_b, session_b) = buy_all(&reversed);

            prop_assert_eq!(&prog_a.normal_upgrades, &prog_b.normal_upgrades);
            prop_assert_eq!(&prog_a.core_upgrades, &prog_b.core_upgrades);
            prop_assert_eq!(&session_a.skills, &session_b.skills);

            let base = BaseStats::default();
            let a = DerivedStats::compute(&base, &prog_a, &session_a.skills);
            let b = DerivedStats::compute(&base, &prog_b, &session_b.skills);
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a, DerivedStats::compute(&base, &prog_a, &session_a.skills));
        }
    }
}
