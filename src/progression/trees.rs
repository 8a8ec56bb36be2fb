//! Static upgrade graphs
//!
//! Three independent DAGs (Normal, Core, Skill) plus the flat prestige shop.
//! Node ids double as save-file keys, so renaming one orphans saved levels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::NORMAL_COST_GROWTH;
use crate::error::PurchaseError;

/// Which upgrade graph a node belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeId {
    /// Funded by run money, wiped on prestige
    Normal,
    /// Funded by core shards, permanent
    Core,
    /// Funded by skill points, current run only
    Skill,
}

impl TreeId {
    pub const ALL: [TreeId; 3] = [TreeId::Normal, TreeId::Core, TreeId::Skill];

    pub fn as_str(&self) -> &'static str {
        match self {
            TreeId::Normal => "normal",
            TreeId::Core => "core",
            TreeId::Skill => "skill",
        }
    }

    pub fn tree(&self) -> &'static UpgradeTree {
        match self {
            TreeId::Normal => &NORMAL_TREE,
            TreeId::Core => &CORE_TREE,
            TreeId::Skill => &SKILL_TREE,
        }
    }
}

/// Pricing rule for a node's next level
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cost {
    /// `base * growth^level`, truncated
    Scaling { base: u64, growth: f64 },
    /// Same price every level
    Flat(u64),
}

/// A purchasable node in one of the graphs
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeNode {
    pub id: &'static str,
    pub name: &'static str,
    pub desc: &'static str,
    pub cost: Cost,
    pub max_level: u32,
    /// (node id in the same tree, minimum level)
    pub prereqs: &'static [(&'static str, u32)],
}

impl UpgradeNode {
    /// Price to go from `level` to `level + 1`
    pub fn cost_at(&self, level: u32) -> u64 {
        match self.cost {
            Cost::Scaling { base, growth } => (base as f64 * growth.powf(level as f64)) as u64,
            Cost::Flat(cost) => cost,
        }
    }

    /// Validate a purchase against owned levels and available currency.
    ///
    /// Returns the cost of the next level when every precondition holds.
    pub fn check_purchase(
        &self,
        levels: &BTreeMap<String, u32>,
        available: u64,
    ) -> Result<u64, PurchaseError> {
        let current = levels.get(self.id).copied().unwrap_or(0);
        if current >= self.max_level {
            return Err(PurchaseError::MaxLevel {
                node: self.id,
                max_level: self.max_level,
            });
        }
        for &(requires, min_level) in self.prereqs {
            if levels.get(requires).copied().unwrap_or(0) < min_level {
                return Err(PurchaseError::MissingPrerequisite {
                    node: self.id,
                    requires,
                    min_level,
                });
            }
        }
        let cost = self.cost_at(current);
        if available < cost {
            return Err(PurchaseError::InsufficientFunds {
                node: self.id,
                cost,
                available,
            });
        }
        Ok(cost)
    }
}

/// A named set of nodes with prerequisite edges
#[derive(Debug)]
pub struct UpgradeTree {
    pub id: TreeId,
    pub nodes: &'static [UpgradeNode],
}

impl UpgradeTree {
    pub fn node(&self, id: &str) -> Option<&'static UpgradeNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Look up a node that must exist.
    ///
    /// # Panics
    /// Unknown ids only come from a broken static table or a caller typo.
    pub fn expect_node(&self, id: &str) -> &'static UpgradeNode {
        match self.node(id) {
            Some(node) => node,
            None => panic!("unknown node '{}' in {} tree", id, self.id.as_str()),
        }
    }
}

/// Node ids, shared with the stat recompute
pub mod ids {
    pub const ROOT_SPEED: &str = "root_speed";
    pub const SPEED_2: &str = "speed_2";
    pub const SPEED_3: &str = "speed_3";
    pub const FIRE_1: &str = "fire_1";
    pub const DAMAGE_1: &str = "damage_1";
    pub const HP_1: &str = "hp_1";
    pub const MONEY_1: &str = "money_1";
    pub const BULLET_SPEED: &str = "bullet_speed";
    pub const HOMING: &str = "homing";
    pub const SHIELD_ON_SPAWN: &str = "shield_on_spawn";

    pub const CORE_PIERCE1: &str = "core_pierce1";
    pub const CORE_PIERCE2: &str = "core_pierce2";
    pub const CORE_DOUBLE: &str = "core_double";
    pub const CORE_EXPLODE: &str = "core_explode";
    pub const CORE_SHIELD: &str = "core_shield";

    pub const SKILL_EVASION: &str = "skill_evasion";
    pub const SKILL_CRIT: &str = "skill_crit";
    pub const SKILL_REGEN: &str = "skill_regen";
    pub const SKILL_SHIELD: &str = "skill_shield";

    pub const PS_DMG5: &str = "ps_dmg5";
    pub const PS_MONEY10: &str = "ps_money10";
    pub const PS_FIRE5: &str = "ps_fire5";
}

use ids::*;

const fn scaling(base: u64) -> Cost {
    Cost::Scaling {
        base,
        growth: NORMAL_COST_GROWTH,
    }
}

#[rustfmt::skip]
pub static NORMAL_TREE: UpgradeTree = UpgradeTree {
    id: TreeId::Normal,
    nodes: &[
        UpgradeNode { id: ROOT_SPEED, name: "Engine I", desc: "+8% speed per level", cost: scaling(100), max_level: 3, prereqs: &[] },
        UpgradeNode { id: SPEED_2, name: "Engine II", desc: "+10% speed per level", cost: scaling(220), max_level: 3, prereqs: &[(ROOT_SPEED, 1)] },
        UpgradeNode { id: SPEED_3, name: "Engine III", desc: "+12% speed per level", cost: scaling(420), max_level: 2, prereqs: &[(SPEED_2, 1)] },
        UpgradeNode { id: FIRE_1, name: "AutoFeed I", desc: "+12% fire rate per level", cost: scaling(120), max_level: 3, prereqs: &[(ROOT_SPEED, 1)] },
        UpgradeNode { id: DAMAGE_1, name: "Rounds I", desc: "+6 damage per level", cost: scaling(140), max_level: 3, prereqs: &[(ROOT_SPEED, 1)] },
        UpgradeNode { id: HP_1, name: "Plating I", desc: "+25 HP per level", cost: scaling(160), max_level: 4, prereqs: &[(ROOT_SPEED, 1)] },
        UpgradeNode { id: MONEY_1, name: "Scavenger", desc: "+10% money per level", cost: scaling(150), max_level: 4, prereqs: &[(HP_1, 1)] },
        UpgradeNode { id: BULLET_SPEED, name: "Light Rounds", desc: "+20% bullet speed per level", cost: scaling(200), max_level: 2, prereqs: &[(FIRE_1, 1)] },
        UpgradeNode { id: HOMING, name: "Homing Missiles", desc: "Unlock homing missile", cost: scaling(420), max_level: 1, prereqs: &[(DAMAGE_1, 2)] },
        UpgradeNode { id: SHIELD_ON_SPAWN, name: "Spawn Shield", desc: "Gain 1-time shield at spawn", cost: scaling(380), max_level: 1, prereqs: &[(HP_1, 2)] },
    ],
};

#[rustfmt::skip]
pub static CORE_TREE: UpgradeTree = UpgradeTree {
    id: TreeId::Core,
    nodes: &[
        UpgradeNode { id: CORE_PIERCE1, name: "Pierce I", desc: "Pierce 1 enemy", cost: Cost::Flat(2), max_level: 1, prereqs: &[] },
        UpgradeNode { id: CORE_PIERCE2, name: "Pierce II", desc: "Pierce 2 enemies", cost: Cost::Flat(4), max_level: 1, prereqs: &[(CORE_PIERCE1, 1)] },
        UpgradeNode { id: CORE_DOUBLE, name: "Double Shot", desc: "Shoot double bullets", cost: Cost::Flat(5), max_level: 1, prereqs: &[(CORE_PIERCE1, 1)] },
        UpgradeNode { id: CORE_EXPLODE, name: "Explosive Rounds", desc: "Bullets explode on hit", cost: Cost::Flat(6), max_level: 1, prereqs: &[(CORE_DOUBLE, 1)] },
        UpgradeNode { id: CORE_SHIELD, name: "Shield Regen", desc: "Regenerate shield slowly", cost: Cost::Flat(6), max_level: 1, prereqs: &[(CORE_DOUBLE, 1)] },
    ],
};

#[rustfmt::skip]
pub static SKILL_TREE: UpgradeTree = UpgradeTree {
    id: TreeId::Skill,
    nodes: &[
        UpgradeNode { id: SKILL_EVASION, name: "Evasion", desc: "Chance to dodge damage", cost: Cost::Flat(1), max_level: 3, prereqs: &[] },
        UpgradeNode { id: SKILL_CRIT, name: "Critical", desc: "Chance for hits taken to land at 150%", cost: Cost::Flat(1), max_level: 3, prereqs: &[(SKILL_EVASION, 1)] },
        UpgradeNode { id: SKILL_REGEN, name: "Regeneration", desc: "Slow HP regen", cost: Cost::Flat(1), max_level: 2, prereqs: &[(SKILL_CRIT, 1)] },
        UpgradeNode { id: SKILL_SHIELD, name: "Quick Shield", desc: "Shorter shield recharge", cost: Cost::Flat(1), max_level: 1, prereqs: &[(SKILL_REGEN, 1)] },
    ],
};

/// One-time permanent perk bought with prestige points
#[derive(Debug, Clone, PartialEq)]
pub struct PrestigePerk {
    pub id: &'static str,
    pub name: &'static str,
    pub desc: &'static str,
    pub cost: u64,
}

#[rustfmt::skip]
pub static PRESTIGE_SHOP: &[PrestigePerk] = &[
    PrestigePerk { id: PS_DMG5, name: "+5% Damage", desc: "Permanent +5% damage", cost: 1 },
    PrestigePerk { id: PS_MONEY10, name: "+10% Money", desc: "Permanent +10% money", cost: 2 },
    PrestigePerk { id: PS_FIRE5, name: "+5% Fire Rate", desc: "Permanent +5% fire rate", cost: 2 },
];

/// Look up a prestige perk that must exist.
///
/// # Panics
/// On an id missing from `PRESTIGE_SHOP`.
pub fn expect_perk(id: &str) -> &'static PrestigePerk {
    match PRESTIGE_SHOP.iter().find(|p| p.id == id) {
        Some(perk) => perk,
        None => panic!("unknown prestige perk '{}'", id),
    }
}
