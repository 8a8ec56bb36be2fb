//! Rejection outcomes for economy operations
//!
//! None of these are fatal: a rejected purchase or prestige leaves every
//! piece of state untouched.

/// Why an upgrade or perk purchase was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PurchaseError {
    /// Node already at its max level
    #[error("'{node}' is already at max level {max_level}")]
    MaxLevel { node: &'static str, max_level: u32 },

    /// A prerequisite in the same tree is below its required level
    #[error("'{node}' requires '{requires}' at level {min_level}")]
    MissingPrerequisite {
        node: &'static str,
        requires: &'static str,
        min_level: u32,
    },

    /// Not enough currency for the next level
    #[error("'{node}' costs {cost}, only {available} available")]
    InsufficientFunds {
        node: &'static str,
        cost: u64,
        available: u64,
    },

    /// Prestige perks are one-time purchases
    #[error("perk '{0}' is already owned")]
    AlreadyOwned(&'static str),
}

/// Why a prestige request was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrestigeError {
    /// Prestige is only offered once the run has ended
    #[error("prestige is only available after the run ends")]
    RunInProgress,

    /// Final score below the prestige threshold
    #[error("score {score} is below the prestige threshold {threshold}")]
    ScoreTooLow { score: u64, threshold: u64 },

    /// This run's prestige has already been taken
    #[error("prestige already claimed for this run")]
    AlreadyClaimed,
}
