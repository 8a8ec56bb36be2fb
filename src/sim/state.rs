//! World state and core simulation types
//!
//! Everything a run mutates lives in `World`. Persistent progression is kept
//! outside and passed to the step explicitly.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::spawn::SpawnDirector;
use crate::consts::*;
use crate::persistence::ProgressionState;
use crate::progression::{BaseStats, DerivedStats, RunSession};

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Active gameplay
    Playing,
    /// Frozen while a menu or tree is open
    Paused,
    /// Player died; prestige may be offered
    Ended,
}

/// The player ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Unit aim direction, kept when the cursor sits on the ship
    pub facing: Vec2,
    pub base: BaseStats,
    pub stats: DerivedStats,
    pub health: f32,
    pub money: u64,
    pub score: u64,
    pub skill_points: u64,
    pub level: u32,
    pub xp: u32,
    pub xp_next: u32,
    pub fire_cooldown: f32,
    pub homing_cooldown: f32,
    pub shield_active: bool,
    /// Seconds until a consumed shield re-arms (needs Shield Regen)
    pub shield_timer: f32,
    pub alive: bool,
}

impl Player {
    pub fn new(base: BaseStats, stats: DerivedStats) -> Self {
        // Without a spawn shield, Shield Regen arms the first one after a full recharge
        let shield_timer = if stats.shield_on_spawn { 0.0 } else { stats.shield_recharge };
        Self {
            pos: Vec2::new(FIELD_W / 2.0, FIELD_H / 2.0),
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            facing: Vec2::X,
            base,
            health: stats.max_health,
            shield_active: stats.shield_on_spawn,
            stats,
            money: 0,
            score: 0,
            skill_points: 0,
            level: 1,
            xp: 0,
            xp_next: XP_PER_LEVEL,
            fire_cooldown: 0.0,
            homing_cooldown: 0.0,
            shield_timer,
            alive: true,
        }
    }

    /// Swap in freshly computed stats, keeping health within the new max
    pub fn apply_stats(&mut self, stats: DerivedStats) {
        self.stats = stats;
        self.health = self.health.clamp(0.0, self.stats.max_health);
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).clamp(0.0, self.stats.max_health);
    }

    /// Convert banked XP into levels. Returns the number of levels gained.
    pub fn resolve_leveling(&mut self) -> u32 {
        let mut gained = 0;
        while self.xp >= self.xp_next {
            self.xp -= self.xp_next;
            self.level += 1;
            self.skill_points += 1;
            self.xp_next += XP_PER_LEVEL;
            gained += 1;
        }
        gained
    }

    pub fn homing_ready(&self) -> bool {
        self.stats.homing_unlocked && self.homing_cooldown <= 0.0
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// A bullet in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub owner: Owner,
    pub radius: f32,
    /// Seconds left before it fizzles
    pub life: f32,
    /// Hits it may survive
    pub pierce: u32,
    pub explode: bool,
    /// Targets already struck, so a piercing round never hits one twice
    #[serde(default)]
    pub struck: Vec<u32>,
}

impl Projectile {
    pub fn new(owner: Owner, pos: Vec2, vel: Vec2, damage: f32) -> Self {
        Self {
            id: 0,
            pos,
            vel,
            damage,
            owner,
            radius: PROJECTILE_RADIUS,
            life: PROJECTILE_LIFE,
            pierce: 0,
            explode: false,
            struck: Vec::new(),
        }
    }

    /// Advance one step; false once it should be culled
    pub fn integrate(&mut self, dt: f32) -> bool {
        self.pos += self.vel * dt;
        self.life -= dt;
        self.life > 0.0 && crate::in_field(self.pos)
    }
}

/// Regular enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Chaser,
    Shooter,
    Dasher,
    Tank,
    Orbiter,
    Splitter,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 6] = [
        EnemyKind::Chaser,
        EnemyKind::Shooter,
        EnemyKind::Dasher,
        EnemyKind::Tank,
        EnemyKind::Orbiter,
        EnemyKind::Splitter,
    ];

    /// XP dropped on death
    pub fn xp_yield(&self) -> u32 {
        match self {
            EnemyKind::Chaser => 12,
            EnemyKind::Shooter => 16,
            EnemyKind::Dasher => 18,
            EnemyKind::Tank => 36,
            EnemyKind::Orbiter => 22,
            EnemyKind::Splitter => 26,
        }
    }

    pub fn radius(&self) -> f32 {
        match self {
            EnemyKind::Tank => TANK_RADIUS,
            _ => ENEMY_RADIUS,
        }
    }
}

/// Per-variant movement state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    /// Home in and bounce off edges (Chaser, Tank, Splitter)
    Chase,
    /// Hold a distance band and take aimed shots
    Shoot { fire_cd: f32 },
    /// Drift in, then burst toward where the player was
    Dash {
        charge_cd: f32,
        dash_time: f32,
        dashing: bool,
    },
    /// Circle the player; `angle` and `rate` in radians
    Orbit { orbit_radius: f32, angle: f32, rate: f32 },
}

/// A regular enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub behavior: Behavior,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
}

impl Enemy {
    /// Build an enemy with its variant's stock hp and speed
    pub fn spawn(kind: EnemyKind, pos: Vec2, rng: &mut impl Rng) -> Self {
        let (hp, speed) = match kind {
            EnemyKind::Chaser => (20.0, 100.0),
            EnemyKind::Shooter => (44.0, 78.0),
            EnemyKind::Dasher => (28.0, 160.0),
            EnemyKind::Tank => (170.0, 36.0),
            EnemyKind::Orbiter => (36.0, 100.0),
            EnemyKind::Splitter => (60.0, 120.0),
        };
        Self::with_stats(kind, pos, hp, speed, rng)
    }

    pub fn with_stats(kind: EnemyKind, pos: Vec2, hp: f32, speed: f32, rng: &mut impl Rng) -> Self {
        let behavior = match kind {
            EnemyKind::Chaser | EnemyKind::Tank | EnemyKind::Splitter => Behavior::Chase,
            EnemyKind::Shooter => Behavior::Shoot { fire_cd: 0.0 },
            EnemyKind::Dasher => Behavior::Dash {
                charge_cd: rng.random_range(1.0..3.0),
                dash_time: 0.0,
                dashing: false,
            },
            EnemyKind::Orbiter => Behavior::Orbit {
                orbit_radius: rng.random_range(90.0..160.0),
                angle: rng.random_range(0.0..std::f32::consts::TAU),
                rate: rng.random_range(40.0f32..80.0).to_radians(),
            },
        };
        let heading = rng.random_range(0.0..std::f32::consts::TAU);
        let hp = hp.max(1.0);
        Self {
            id: 0,
            kind,
            behavior,
            pos,
            vel: crate::unit(heading) * speed,
            radius: kind.radius(),
            hp,
            max_hp: hp,
            speed,
        }
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.hp = (self.hp - amount).clamp(0.0, self.max_hp);
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }
}

/// Boss variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossKind {
    Juggernaut,
    Sentinel,
    HiveQueen,
}

impl BossKind {
    pub const ALL: [BossKind; 3] = [BossKind::Juggernaut, BossKind::Sentinel, BossKind::HiveQueen];

    pub fn speed(&self) -> f32 {
        match self {
            BossKind::Juggernaut => 40.0,
            BossKind::Sentinel => 80.0,
            BossKind::HiveQueen => 36.0,
        }
    }

    /// Core shards granted on kill, before the elapsed-time bonus
    pub fn shard_reward(&self) -> u64 {
        match self {
            BossKind::Juggernaut => 4,
            BossKind::Sentinel | BossKind::HiveQueen => 3,
        }
    }
}

/// A boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub id: u32,
    pub kind: BossKind,
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
    /// Seconds alive
    pub timer: f32,
    pub attack_cd: f32,
}

impl Boss {
    pub fn new(kind: BossKind, pos: Vec2, hp: f32) -> Self {
        let hp = hp.max(1.0);
        Self {
            id: 0,
            kind,
            pos,
            radius: BOSS_RADIUS,
            hp,
            max_hp: hp,
            speed: kind.speed(),
            timer: 0.0,
            attack_cd: 0.0,
        }
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.hp = (self.hp - amount).clamp(0.0, self.max_hp);
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }
}

/// An XP orb dropped by a dead enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpOrb {
    pub id: u32,
    pub pos: Vec2,
    pub amount: u32,
    pub radius: f32,
    pub life: f32,
    pub collected: bool,
}

impl XpOrb {
    pub fn new(pos: Vec2, amount: u32) -> Self {
        Self {
            id: 0,
            pos,
            amount,
            radius: ORB_RADIUS,
            life: ORB_LIFE,
            collected: false,
        }
    }

    /// Drift or home toward the player; collect on touch.
    ///
    /// Returns the XP picked up this step.
    pub fn update(&mut self, dt: f32, player_pos: Vec2, player_radius: f32) -> u32 {
        let to_player = player_pos - self.pos;
        let dist = to_player.length();
        if dist < ORB_ATTRACT_DIST {
            self.pos += to_player.normalize_or_zero() * ORB_ATTRACT_SPEED * dt;
        } else {
            self.pos.y += ORB_DRIFT_SPEED * dt;
        }
        self.life -= dt;
        if dist < self.radius + player_radius + ORB_COLLECT_SLACK {
            self.collected = true;
            return self.amount;
        }
        0
    }

    pub fn is_expired(&self) -> bool {
        self.collected || self.life <= 0.0
    }
}

/// Notable things that happened during a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemyKilled { kind: EnemyKind, pos: Vec2, money: u64 },
    BossSpawned { kind: BossKind },
    BossKilled { kind: BossKind, shards: u64 },
    LevelUp { level: u32 },
    Dodged,
    ShieldAbsorbed,
    PlayerHit { damage: f32, crit: bool },
    RunEnded { score: u64 },
}

/// Everything owned by the current run
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: RunPhase,
    /// Simulation step counter
    pub time_ticks: u64,
    pub player: Player,
    pub projectiles: Vec<Projectile>,
    pub enemies: Vec<Enemy>,
    pub bosses: Vec<Boss>,
    pub orbs: Vec<XpOrb>,
    pub spawner: SpawnDirector,
    pub session: RunSession,
    /// Events from the latest step (drained by the caller)
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl World {
    /// Start a fresh run from persisted progression
    pub fn new(seed: u64, progression: &ProgressionState) -> Self {
        let session = RunSession::default();
        let base = BaseStats::default();
        let stats = DerivedStats::compute(&base, progression, &session.skills);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: RunPhase::Playing,
            time_ticks: 0,
            player: Player::new(base, stats),
            projectiles: Vec::new(),
            enemies: Vec::new(),
            bosses: Vec::new(),
            orbs: Vec::new(),
            spawner: SpawnDirector::new(),
            session,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_enemy(&mut self, mut enemy: Enemy) {
        enemy.id = self.next_entity_id();
        self.enemies.push(enemy);
    }

    pub fn add_boss(&mut self, mut boss: Boss) {
        boss.id = self.next_entity_id();
        self.bosses.push(boss);
    }

    pub fn add_projectile(&mut self, mut projectile: Projectile) {
        projectile.id = self.next_entity_id();
        self.projectiles.push(projectile);
    }

    pub fn add_orb(&mut self, mut orb: XpOrb) {
        orb.id = self.next_entity_id();
        self.orbs.push(orb);
    }

    /// Rebuild player stats from base values and everything owned
    pub fn recompute_stats(&mut self, progression: &ProgressionState) {
        let stats = DerivedStats::compute(&self.player.base, progression, &self.session.skills);
        self.player.apply_stats(stats);
    }

    pub fn is_over(&self) -> bool {
        self.phase == RunPhase::Ended
    }

    /// Post-boss difficulty multiplier for this run
    pub fn difficulty(&self) -> f32 {
        self.spawner.post_boss_multiplier
    }
}
