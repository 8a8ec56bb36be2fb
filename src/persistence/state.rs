//! Persisted progression schema
//!
//! Everything that survives between runs lives here. Normal-tree levels are
//! wiped on prestige; Core levels, shards, prestige data and best score are
//! permanent. Skill-tree levels are never written (the `skill_tree` slot is
//! kept only so older saves round-trip).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Logical save data, keyed the same way the save file is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionState {
    /// Normal tree: node id -> level (cleared on prestige)
    pub normal_upgrades: BTreeMap<String, u32>,
    /// Core tree: node id -> level (permanent)
    pub core_upgrades: BTreeMap<String, u32>,
    /// Reserved; skill levels are run-scoped and never persisted
    pub skill_tree: BTreeMap<String, u32>,
    pub prestige_points: u64,
    /// Permanent reward multiplier, never below 1.0
    pub prestige_multiplier: f64,
    /// Prestige shop: perk id -> owned
    pub prestige_shop: BTreeMap<String, bool>,
    /// Meta-currency earned from boss kills
    pub core_shards: u64,
    pub best_score: u64,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            normal_upgrades: BTreeMap::new(),
            core_upgrades: BTreeMap::new(),
            skill_tree: BTreeMap::new(),
            prestige_points: 0,
            prestige_multiplier: 1.0,
            prestige_shop: BTreeMap::new(),
            core_shards: 0,
            best_score: 0,
        }
    }
}

impl ProgressionState {
    /// Repair values a hand-edited or damaged save could carry
    pub fn sanitized(mut self) -> Self {
        if !self.prestige_multiplier.is_finite() || self.prestige_multiplier < 1.0 {
            self.prestige_multiplier = 1.0;
        }
        self.skill_tree.clear();
        self
    }

    pub fn normal_level(&self, id: &str) -> u32 {
        self.normal_upgrades.get(id).copied().unwrap_or(0)
    }

    pub fn core_level(&self, id: &str) -> u32 {
        self.core_upgrades.get(id).copied().unwrap_or(0)
    }

    pub fn owns_perk(&self, id: &str) -> bool {
        self.prestige_shop.get(id).copied().unwrap_or(false)
    }

    /// Record a finished run's score. Returns true on a new best.
    pub fn record_score(&mut self, score: u64) -> bool {
        if score > self.best_score {
            self.best_score = score;
            true
        } else {
            false
        }
    }
}
