//! Purchases, prestige and the prestige shop
//!
//! Every operation validates first and mutates only on success, so a
//! rejected call leaves all balances and levels exactly as they were.
//! Stat recompute and checkpoint saves are the caller's follow-up.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::trees::{PrestigePerk, TreeId, expect_perk};
use crate::consts::{PRESTIGE_MULT_STEP, PRESTIGE_THRESHOLD};
use crate::error::{PrestigeError, PurchaseError};
use crate::persistence::ProgressionState;

/// Per-run progression state, created fresh at run start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSession {
    /// Skill-tree levels bought this run
    pub skills: BTreeMap<String, u32>,
    /// Set once this run's prestige has been taken
    pub prestige_claimed: bool,
}

impl RunSession {
    pub fn skill_level(&self, id: &str) -> u32 {
        self.skills.get(id).copied().unwrap_or(0)
    }
}

/// Run-scoped balances a purchase may draw from
pub struct RunWallet<'a> {
    pub money: &'a mut u64,
    pub skill_points: &'a mut u64,
    pub session: &'a mut RunSession,
}

/// What a successful purchase did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseReceipt {
    pub tree: TreeId,
    pub node: &'static str,
    /// Level after the purchase
    pub level: u32,
    pub cost: u64,
    /// Currency left in the funding wallet
    pub remaining: u64,
}

/// What a successful prestige did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrestigeReceipt {
    pub prestige_points: u64,
    pub prestige_multiplier: f64,
    /// Normal-tree nodes that were reset
    pub cleared_nodes: usize,
}

/// Buy the next level of `node_id` in `tree`.
///
/// # Panics
/// On a node id missing from the tree.
pub fn purchase(
    tree: TreeId,
    node_id: &str,
    progression: &mut ProgressionState,
    wallet: RunWallet<'_>,
) -> Result<PurchaseReceipt, PurchaseError> {
    let node = tree.tree().expect_node(node_id);
    let (levels, funds) = match tree {
        TreeId::Normal => (&mut progression.normal_upgrades, wallet.money),
        TreeId::Core => (&mut progression.core_upgrades, &mut progression.core_shards),
        TreeId::Skill => (&mut wallet.session.skills, wallet.skill_points),
    };

    let cost = node.check_purchase(levels, *funds)?;
    *funds -= cost;
    let level = levels.entry(node.id.to_string()).or_insert(0);
    *level += 1;

    log::info!(
        "Bought {} '{}' -> level {} for {}",
        tree.as_str(),
        node.name,
        level,
        cost
    );
    Ok(PurchaseReceipt {
        tree,
        node: node.id,
        level: *level,
        cost,
        remaining: *funds,
    })
}

/// Trade the Normal tree for a prestige point and a bigger multiplier.
///
/// Only valid once per ended run, with a final score at or above the threshold.
pub fn prestige(
    progression: &mut ProgressionState,
    session: &mut RunSession,
    run_ended: bool,
    score: u64,
) -> Result<PrestigeReceipt, PrestigeError> {
    if !run_ended {
        return Err(PrestigeError::RunInProgress);
    }
    if session.prestige_claimed {
        return Err(PrestigeError::AlreadyClaimed);
    }
    if score < PRESTIGE_THRESHOLD {
        return Err(PrestigeError::ScoreTooLow {
            score,
            threshold: PRESTIGE_THRESHOLD,
        });
    }

    progression.prestige_points += 1;
    progression.prestige_multiplier += PRESTIGE_MULT_STEP;
    let cleared_nodes = progression.normal_upgrades.len();
    progression.normal_upgrades.clear();
    session.prestige_claimed = true;

    log::info!(
        "Prestige! points={} multiplier={:.2}",
        progression.prestige_points,
        progression.prestige_multiplier
    );
    Ok(PrestigeReceipt {
        prestige_points: progression.prestige_points,
        prestige_multiplier: progression.prestige_multiplier,
        cleared_nodes,
    })
}

/// Buy a one-time prestige shop perk.
///
/// # Panics
/// On a perk id missing from the shop.
pub fn buy_perk(
    progression: &mut ProgressionState,
    perk_id: &str,
) -> Result<&'static PrestigePerk, PurchaseError> {
    let perk = expect_perk(perk_id);
    if progression.owns_perk(perk.id) {
        return Err(PurchaseError::AlreadyOwned(perk.id));
    }
    if progression.prestige_points < perk.cost {
        return Err(PurchaseError::InsufficientFunds {
            node: perk.id,
            cost: perk.cost,
            available: progression.prestige_points,
        });
    }
    progression.prestige_points -= perk.cost;
    progression.prestige_shop.insert(perk.id.to_string(), true);
    log::info!("Bought prestige perk '{}'", perk.name);
    Ok(perk)
}
