//! Progression economy
//!
//! Three upgrade graphs, derived stat recompute, prestige and its shop.
//! Operates on an explicit `ProgressionState`; never touches storage itself.

pub mod economy;
pub mod stats;
pub mod trees;

pub use economy::{PrestigeReceipt, PurchaseReceipt, RunSession, RunWallet, buy_perk, prestige, purchase};
pub use stats::{BaseStats, DerivedStats};
pub use trees::{
    CORE_TREE, Cost, NORMAL_TREE, PRESTIGE_SHOP, PrestigePerk, SKILL_TREE, TreeId, UpgradeNode,
    UpgradeTree, ids,
};
