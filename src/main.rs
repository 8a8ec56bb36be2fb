//! Astro Rogue headless runner
//!
//! Plays autopilot runs against the real save file, spends whatever the run
//! earned and logs the outcome. Rendering and input live in a separate front end.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::Path;

    use astro_rogue::Game;
    use astro_rogue::consts::MAX_SUBSTEPS;
    use astro_rogue::persistence::{JsonFileStore, ProgressionStore};
    use astro_rogue::progression::{PRESTIGE_SHOP, TreeId};
    use astro_rogue::settings::{SETTINGS_FILE, Settings};
    use astro_rogue::sim::TickInput;

    /// Simulated display refresh; slower than the sim so the accumulator substeps
    const FRAME_DT: f32 = 1.0 / 45.0;

    /// Fixed-step driver around the game facade
    struct Runner<S: ProgressionStore> {
        game: Game<S>,
        accumulator: f32,
        sim_dt: f32,
        max_frame_dt: f32,
        input: TickInput,
    }

    impl<S: ProgressionStore> Runner<S> {
        fn new(game: Game<S>, settings: &Settings) -> Self {
            Self {
                game,
                accumulator: 0.0,
                sim_dt: settings.sim_dt,
                max_frame_dt: settings.max_frame_dt,
                input: TickInput {
                    autopilot: true,
                    ..Default::default()
                },
            }
        }

        /// Run simulation ticks for one frame. Returns simulated seconds.
        fn update(&mut self, dt: f32) -> f32 {
            let dt = dt.min(self.max_frame_dt);
            self.accumulator += dt;

            let mut substeps = 0;
            let mut simulated = 0.0;
            while self.accumulator >= self.sim_dt && substeps < MAX_SUBSTEPS {
                self.game.step(self.sim_dt, &self.input);
                self.accumulator -= self.sim_dt;
                simulated += self.sim_dt;
                substeps += 1;
            }
            simulated
        }

        /// Play until the ship dies or the time limit passes
        fn play(&mut self, limit: f32) {
            self.accumulator = 0.0;
            let mut elapsed = 0.0;
            while !self.game.is_run_over() && elapsed < limit {
                elapsed += self.update(FRAME_DT);
            }
        }

        /// Buy anything affordable, tree by tree, until nothing is
        fn spend(&mut self) -> usize {
            let mut bought = 0;
            loop {
                let before = bought;
                for tree in TreeId::ALL {
                    for node in tree.tree().nodes {
                        match self.game.purchase(tree, node.id) {
                            Ok(_) => bought += 1,
                            Err(e) => log::trace!("skip {}: {e}", node.id),
                        }
                    }
                }
                for perk in PRESTIGE_SHOP.iter() {
                    if self.game.buy_perk(perk.id).is_ok() {
                        bought += 1;
                    }
                }
                if bought == before {
                    return bought;
                }
            }
        }
    }

    pub fn run() {
        env_logger::init();

        let settings = Settings::load(Path::new(SETTINGS_FILE));
        let seed = settings.seed_or_clock();
        log::info!("Astro Rogue (headless) starting, seed {seed}");

        let store = JsonFileStore::new(settings.save_path.clone());
        log::info!("Progression file: {}", store.path().display());
        let mut runner = Runner::new(Game::new(store, seed), &settings);

        for run in 0..settings.autopilot_runs {
            if run > 0 {
                runner.game.start_run();
            }
            runner.play(settings.autopilot_seconds);

            let hud = runner.game.snapshot().hud;
            log::info!(
                "Run {} finished: score {} level {} after {:.1}s ({:?})",
                run + 1,
                hud.score,
                hud.level,
                hud.elapsed,
                hud.phase
            );

            if runner.game.is_run_over() {
                match runner.game.prestige() {
                    Ok(receipt) => log::info!(
                        "Prestiged: {} points, x{:.2}",
                        receipt.prestige_points,
                        receipt.prestige_multiplier
                    ),
                    Err(e) => log::info!("No prestige this run: {e}"),
                }
            } else {
                // Time limit reached mid-run
                runner.game.save();
            }

            let bought = runner.spend();
            if bought > 0 {
                log::info!("Bought {bought} upgrades with run earnings");
            }
        }

        let progression = runner.game.progression();
        println!(
            "best score {} | core shards {} | prestige points {} (x{:.2})",
            progression.best_score,
            progression.core_shards,
            progression.prestige_points,
            progression.prestige_multiplier
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web; the front end embeds the library directly
}
