//! Game facade
//!
//! Owns the current run, the in-memory progression and its store. The
//! presentation layer talks to the core only through this type: it feeds
//! input to `step`, draws the returned snapshot and forwards menu actions.

use crate::error::{PrestigeError, PurchaseError};
use crate::persistence::{ProgressionState, ProgressionStore, load_or_default};
use crate::progression::{
    PrestigePerk, PrestigeReceipt, PurchaseReceipt, RunWallet, TreeId, buy_perk, prestige, purchase,
};
use crate::sim::{GameEvent, TickInput, World, WorldSnapshot, capture, tick};

/// Seed stride between consecutive runs of one session
const RUN_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

pub struct Game<S: ProgressionStore> {
    store: S,
    progression: ProgressionState,
    world: World,
    base_seed: u64,
    runs_started: u64,
    /// Events from the latest step
    events: Vec<GameEvent>,
}

impl<S: ProgressionStore> Game<S> {
    /// Load progression (defaults on any read failure) and start the first run
    pub fn new(store: S, seed: u64) -> Self {
        let progression = load_or_default(&store);
        let world = World::new(seed, &progression);
        log::info!("Run 1 started (seed {})", seed);
        Self {
            store,
            progression,
            world,
            base_seed: seed,
            runs_started: 1,
            events: Vec::new(),
        }
    }

    /// Throw away the current run and begin a fresh one.
    ///
    /// Skill levels, money and the spawn director reset; persistent
    /// progression carries over.
    pub fn start_run(&mut self) {
        let seed = self
            .base_seed
            .wrapping_add(self.runs_started.wrapping_mul(RUN_SEED_STRIDE));
        self.runs_started += 1;
        self.world = World::new(seed, &self.progression);
        self.events.clear();
        log::info!("Run {} started (seed {})", self.runs_started, seed);
    }

    /// Advance one step and return what to draw
    pub fn step(&mut self, dt: f32, input: &TickInput) -> WorldSnapshot {
        tick(&mut self.world, &mut self.progression, input, dt);
        self.events = std::mem::take(&mut self.world.events);

        let mut checkpoint = false;
        for event in &self.events {
            match event {
                GameEvent::BossKilled { .. } => checkpoint = true,
                GameEvent::RunEnded { score } => {
                    if self.progression.record_score(*score) {
                        log::info!("New best score: {}", score);
                    }
                    checkpoint = true;
                }
                _ => {}
            }
        }
        if checkpoint {
            self.save();
        }
        self.snapshot()
    }

    /// Buy the next level of a node, then recompute stats and save
    pub fn purchase(&mut self, tree: TreeId, node_id: &str) -> Result<PurchaseReceipt, PurchaseError> {
        let player = &mut self.world.player;
        let wallet = RunWallet {
            money: &mut player.money,
            skill_points: &mut player.skill_points,
            session: &mut self.world.session,
        };
        let receipt = purchase(tree, node_id, &mut self.progression, wallet)?;
        self.world.recompute_stats(&self.progression);
        self.save();
        Ok(receipt)
    }

    /// Prestige after a qualifying run has ended
    pub fn prestige(&mut self) -> Result<PrestigeReceipt, PrestigeError> {
        let run_ended = self.world.is_over();
        let score = self.world.player.score;
        let receipt = prestige(&mut self.progression, &mut self.world.session, run_ended, score)?;
        self.world.recompute_stats(&self.progression);
        self.save();
        Ok(receipt)
    }

    /// Buy a prestige shop perk with prestige points
    pub fn buy_perk(&mut self, perk_id: &str) -> Result<&'static PrestigePerk, PurchaseError> {
        let perk = buy_perk(&mut self.progression, perk_id)?;
        self.world.recompute_stats(&self.progression);
        self.save();
        Ok(perk)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        capture(&self.world, &self.progression)
    }

    /// Events produced by the latest `step`
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn progression(&self) -> &ProgressionState {
        &self.progression
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_run_over(&self) -> bool {
        self.world.is_over()
    }

    /// Write a checkpoint. Failures are logged; in-memory state stays authoritative.
    pub fn save(&mut self) {
        if let Err(e) = self.store.save(&self.progression) {
            log::warn!("Progression checkpoint failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::persistence::MemoryStore;
    use crate::progression::ids::*;
    use crate::sim::{Boss, BossKind, RunPhase};
    use glam::Vec2;

    fn game() -> Game<MemoryStore> {
        Game::new(MemoryStore::new(), 77)
    }

    fn end_run(game: &mut Game<MemoryStore>, score: u64) {
        game.world.player.score = score;
        game.world.player.health = 0.0;
        game.world.player.alive = false;
        // The next step notices the dead player
        game.step(SIM_DT, &TickInput::default());
        assert!(game.is_run_over());
    }

    #[test]
    fn test_new_game_falls_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.json = Some("{ not json".to_string());
        let game = Game::new(store, 1);
        assert_eq!(game.progression(), &ProgressionState::default());
        assert_eq!(game.world().phase, RunPhase::Playing);
    }

    #[test]
    fn test_purchase_recomputes_and_saves() {
        let mut game = game();
        game.world.player.money = 500;
        let receipt = game.purchase(TreeId::Normal, ROOT_SPEED).unwrap();
        assert_eq!((receipt.level, receipt.cost), (1, 100));
        assert_eq!(game.world().player.money, 400);
        assert!((game.world().player.stats.speed - BASE_SPEED * 1.08).abs() < 1e-3);
        assert_eq!(game.store().saves, 1);
        assert_eq!(game.store().saved().unwrap().normal_level(ROOT_SPEED), 1);

        // Prerequisite now met
        let receipt = game.purchase(TreeId::Normal, DAMAGE_1).unwrap();
        assert_eq!(game.world().player.money, 400 - receipt.cost);
        assert_eq!(game.world().player.stats.damage, BASE_DAMAGE + 6.0);
    }

    #[test]
    fn test_rejected_purchase_changes_nothing() {
        let mut game = game();
        let before = game.progression().clone();
        let err = game.purchase(TreeId::Normal, ROOT_SPEED).unwrap_err();
        assert!(matches!(err, PurchaseError::InsufficientFunds { .. }));
        assert_eq!(game.progression(), &before);
        assert_eq!(game.store().saves, 0);
    }

    #[test]
    fn test_skill_purchase_is_run_scoped() {
        let mut game = game();
        game.world.player.skill_points = 3;
        game.purchase(TreeId::Skill, SKILL_EVASION).unwrap();
        assert!(game.world().player.stats.evasion_chance > 0.0);
        assert!(game.store().saved().unwrap().skill_tree.is_empty());

        game.start_run();
        assert_eq!(game.world().session.skill_level(SKILL_EVASION), 0);
        assert_eq!(game.world().player.stats.evasion_chance, 0.0);
    }

    #[test]
    fn test_failed_save_keeps_memory_state() {
        let mut store = MemoryStore::new();
        store.fail_writes = true;
        let mut game = Game::new(store, 3);
        game.world.player.money = 500;
        game.purchase(TreeId::Normal, ROOT_SPEED).unwrap();
        assert_eq!(game.progression().normal_level(ROOT_SPEED), 1);
        assert!(game.store().saved().is_none());
    }

    #[test]
    fn test_run_end_records_best_and_saves() {
        let mut game = game();
        end_run(&mut game, 4200);
        assert_eq!(game.progression().best_score, 4200);
        assert_eq!(game.store().saved().unwrap().best_score, 4200);
        assert!(matches!(game.events().last(), Some(GameEvent::RunEnded { score: 4200 })));

        game.start_run();
        end_run(&mut game, 100);
        assert_eq!(game.progression().best_score, 4200);
    }

    #[test]
    fn test_boss_kill_checkpoints_shards() {
        let mut game = game();
        let far = Vec2::new(100.0, 100.0);
        game.world.add_boss(Boss::new(BossKind::Sentinel, far, 100.0));
        game.world.bosses[0].hp = 0.0;
        game.step(SIM_DT, &TickInput::default());
        assert_eq!(game.progression().core_shards, 3);
        assert_eq!(game.store().saved().unwrap().core_shards, 3);
    }

    #[test]
    fn test_prestige_gated_on_run_end() {
        let mut game = game();
        game.world.player.money = 500;
        game.purchase(TreeId::Normal, ROOT_SPEED).unwrap();
        assert_eq!(game.prestige().unwrap_err(), PrestigeError::RunInProgress);

        end_run(&mut game, PRESTIGE_THRESHOLD);
        let receipt = game.prestige().unwrap();
        assert_eq!(receipt.prestige_points, 1);
        assert!((receipt.prestige_multiplier - 1.05).abs() < 1e-6);
        assert!(game.progression().normal_upgrades.is_empty());
        assert_eq!(game.prestige().unwrap_err(), PrestigeError::AlreadyClaimed);

        let saved = game.store().saved().unwrap();
        assert_eq!(saved.prestige_points, 1);
    }

    #[test]
    fn test_prestige_rejects_low_score() {
        let mut game = game();
        end_run(&mut game, PRESTIGE_THRESHOLD - 1);
        assert!(matches!(game.prestige(), Err(PrestigeError::ScoreTooLow { .. })));
        assert_eq!(game.progression().prestige_points, 0);
    }

    #[test]
    fn test_perk_applies_to_stats() {
        let mut game = game();
        game.progression.prestige_points = 2;
        game.buy_perk(PS_MONEY10).unwrap();
        assert!((game.world().player.stats.money_mult - 1.1).abs() < 1e-6);
        assert_eq!(game.progression().prestige_points, 0);
        assert!(matches!(game.buy_perk(PS_MONEY10), Err(PurchaseError::AlreadyOwned(_))));
    }

    #[test]
    fn test_step_returns_snapshot() {
        let mut game = game();
        let snap = game.step(SIM_DT, &TickInput::default());
        assert_eq!(snap.tick, 1);
        assert_eq!(snap.hud.phase, RunPhase::Playing);
    }
}
