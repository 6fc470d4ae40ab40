//! Game state and core simulation types
//!
//! Everything a session needs to replay deterministically lives here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, clamp_to_field};
use super::difficulty::DifficultyEngine;
use super::milestones::Milestones;
use super::spawn::{Spawner, pick_spawn_x};
use crate::consts::*;
use crate::move_toward;
use crate::tuning::{EntityTuning, Tuning};

/// Ship spawn height (bottom edge)
pub const SHIP_START_Y: f32 = 160.0;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Simulation running
    Active,
    /// Frozen until resumed
    Paused,
    /// Out of lives; only a restart leaves this phase
    GameOver,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Threat collisions cost no life
    Shield,
    /// Ship moves faster
    SpeedBoost,
    /// Pickups are pulled toward the ship
    Magnet,
    /// Resource score doubled
    DoubleScore,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Shield,
        PowerUpKind::SpeedBoost,
        PowerUpKind::Magnet,
        PowerUpKind::DoubleScore,
    ];

    fn index(self) -> usize {
        match self {
            PowerUpKind::Shield => 0,
            PowerUpKind::SpeedBoost => 1,
            PowerUpKind::Magnet => 2,
            PowerUpKind::DoubleScore => 3,
        }
    }
}

/// Falling object variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    LightThreat,
    /// Slower to dodge; drifts toward the ship
    HeavyThreat,
    /// Fuel canister
    Resource,
    /// Restores a life
    RecoveryItem,
    PowerUp(PowerUpKind),
}

impl EntityKind {
    pub fn is_threat(self) -> bool {
        matches!(self, EntityKind::LightThreat | EntityKind::HeavyThreat)
    }

    /// Steers horizontally toward the ship
    pub fn pursues(self) -> bool {
        self == EntityKind::HeavyThreat
    }

    /// Pulled by the magnet buff
    pub fn magnetic(self) -> bool {
        matches!(self, EntityKind::Resource | EntityKind::RecoveryItem)
    }

    /// Sprite edge length
    pub fn size(self) -> f32 {
        match self {
            EntityKind::LightThreat | EntityKind::HeavyThreat => THREAT_SIZE,
            EntityKind::Resource | EntityKind::RecoveryItem => PICKUP_SIZE,
            EntityKind::PowerUp(_) => POWERUP_SIZE,
        }
    }

    /// Fraction of the sprite used for overlap tests
    pub fn hitbox_factor(self) -> f32 {
        match self {
            EntityKind::LightThreat => 0.85,
            EntityKind::HeavyThreat => 0.8,
            EntityKind::Resource | EntityKind::RecoveryItem => 0.9,
            EntityKind::PowerUp(_) => 1.0,
        }
    }

    /// Fall speed in px/s at the given difficulty
    pub fn fall_speed(self, tuning: &EntityTuning, difficulty: f32) -> f32 {
        match self {
            EntityKind::LightThreat => tuning.light_fall + tuning.light_fall_per_difficulty * difficulty,
            EntityKind::HeavyThreat => tuning.heavy_fall + tuning.heavy_fall_per_difficulty * difficulty,
            EntityKind::Resource | EntityKind::RecoveryItem => tuning.pickup_fall,
            EntityKind::PowerUp(_) => tuning.powerup_fall,
        }
    }

    /// Horizontal pursuit speed in px/s (zero for non-pursuing kinds)
    pub fn pursuit_speed(self, tuning: &EntityTuning, difficulty: f32) -> f32 {
        if self.pursues() {
            tuning.heavy_pursuit + tuning.heavy_pursuit_per_difficulty * difficulty
        } else {
            0.0
        }
    }

    /// Points for letting a threat pass
    pub fn dodge_score(self, tuning: &EntityTuning) -> u64 {
        match self {
            EntityKind::LightThreat => tuning.light_score as u64,
            EntityKind::HeavyThreat => tuning.heavy_score as u64,
            _ => 0,
        }
    }
}

/// A falling entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    /// Bottom-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            size: Vec2::splat(kind.size()),
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn hitbox(&self) -> Aabb {
        self.bounds().shrunk(self.kind.hitbox_factor())
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

/// Elapsed/duration pair of an active buff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuffTimer {
    pub elapsed: f32,
    pub duration: f32,
}

impl BuffTimer {
    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }
}

/// Remaining time of one buff, reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveBuff {
    pub kind: PowerUpKind,
    pub remaining: f32,
}

/// Timed buffs on the ship, one slot per power-up type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Buffs {
    slots: [Option<BuffTimer>; 4],
}

impl Buffs {
    pub fn get(&self, kind: PowerUpKind) -> Option<&BuffTimer> {
        self.slots[kind.index()].as_ref()
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    /// Start a buff, or restart its timer if already running.
    /// Returns true when an active buff was refreshed.
    pub fn activate(&mut self, kind: PowerUpKind, duration: f32) -> bool {
        let slot = &mut self.slots[kind.index()];
        let refreshed = slot.is_some();
        *slot = Some(BuffTimer {
            elapsed: 0.0,
            duration,
        });
        refreshed
    }

    /// Count all buffs down by `dt`, returning the ones that ran out
    pub fn advance(&mut self, dt: f32) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        for kind in PowerUpKind::ALL {
            let slot = &mut self.slots[kind.index()];
            if let Some(timer) = slot {
                timer.elapsed += dt;
                if timer.elapsed >= timer.duration {
                    *slot = None;
                    expired.push(kind);
                }
            }
        }
        expired
    }

    pub fn active(&self) -> Vec<ActiveBuff> {
        PowerUpKind::ALL
            .into_iter()
            .filter_map(|kind| {
                self.get(kind).map(|timer| ActiveBuff {
                    kind,
                    remaining: timer.remaining(),
                })
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }
}

/// The player's ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    /// Bottom-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub buffs: Buffs,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            pos: Vec2::new((FIELD_WIDTH - SHIP_SIZE) * 0.5, SHIP_START_Y),
            size: Vec2::splat(SHIP_SIZE),
            buffs: Buffs::default(),
        }
    }
}

impl Ship {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Move the ship center toward `target` at up to `speed` px/s, staying on the field
    pub fn steer(&mut self, target: Vec2, speed: f32, dt: f32) {
        let center = move_toward(self.center(), target, speed * dt);
        self.pos = clamp_to_field(center - self.size * 0.5, self.size, field_size());
    }
}

/// Play-field extent
#[inline]
pub fn field_size() -> Vec2 {
    Vec2::new(FIELD_WIDTH, FIELD_HEIGHT)
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Balance in effect for this session
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    pub fuel: f32,
    /// Set while lives are below max; gates recovery item spawns
    pub life_missing: bool,
    /// Fuel already dropped through the low-fuel line since the last refill above it
    pub low_fuel_warned: bool,
    pub ship: Ship,
    /// Falling entities (sorted by id for determinism)
    pub entities: Vec<Entity>,
    pub difficulty: DifficultyEngine,
    pub spawner: Spawner,
    pub milestones: Milestones,
    /// Simulation tick counter
    pub time_ticks: u64,
    next_id: u32,
}

impl GameState {
    /// Create a new session with default balance
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Create a new session with custom balance
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let tuning = tuning.sanitized();
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Active,
            score: 0,
            lives: START_LIVES,
            fuel: tuning.player.max_fuel,
            life_missing: false,
            low_fuel_warned: false,
            ship: Ship::default(),
            entities: Vec::new(),
            difficulty: DifficultyEngine::new(tuning.difficulty.clone()),
            spawner: Spawner::new(&tuning.spawn),
            milestones: Milestones::default(),
            time_ticks: 0,
            next_id: 1,
            tuning,
        }
    }

    /// Start over with the same seed and balance
    pub fn reset(&mut self) {
        let tuning = std::mem::take(&mut self.tuning);
        *self = Self::with_tuning(self.seed, tuning);
        log::info!("session reset (seed {})", self.seed);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn an entity of `kind` along the top edge
    pub fn spawn(&mut self, kind: EntityKind) -> u32 {
        let x = pick_spawn_x(&mut self.rng, kind, FIELD_HEIGHT, &self.entities);
        let id = self.next_entity_id();
        self.entities.push(Entity::new(id, kind, Vec2::new(x, FIELD_HEIGHT)));
        log::debug!("spawned {kind:?} #{id} at x={x:.0}");
        id
    }

    /// Place an entity at an exact position (used by hosts for scripted setups)
    pub fn spawn_at(&mut self, kind: EntityKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.entities.push(Entity::new(id, kind, pos));
        id
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.entities.sort_by_key(|e| e.id);
    }

    /// Ship speed including the speed boost
    pub fn ship_speed(&self) -> f32 {
        let base = self.tuning.player.ship_speed;
        if self.ship.buffs.is_active(PowerUpKind::SpeedBoost) {
            base * self.tuning.player.speed_boost_multiplier
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session() {
        let state = GameState::new(42);
        assert_eq!(state.phase, GamePhase::Active);
        assert_eq!(state.lives, START_LIVES);
        assert_eq!(state.fuel, state.tuning.player.max_fuel);
        assert!(state.entities.is_empty());
        assert_eq!(state.difficulty.level(), 1);
    }

    #[test]
    fn test_buff_refresh_and_expiry() {
        let mut buffs = Buffs::default();
        assert!(!buffs.activate(PowerUpKind::Shield, 10.0));
        assert!(buffs.advance(6.0).is_empty());
        assert!(buffs.activate(PowerUpKind::Shield, 10.0));
        assert_eq!(buffs.get(PowerUpKind::Shield).map(|t| t.remaining()), Some(10.0));
        assert!(buffs.advance(9.0).is_empty());
        assert_eq!(buffs.advance(1.0), vec![PowerUpKind::Shield]);
        assert!(!buffs.is_active(PowerUpKind::Shield));
    }

    #[test]
    fn test_active_buffs_listing() {
        let mut buffs = Buffs::default();
        buffs.activate(PowerUpKind::DoubleScore, 10.0);
        buffs.activate(PowerUpKind::Magnet, 4.0);
        buffs.advance(1.0);
        let active = buffs.active();
        assert_eq!(active.len(), 2);
        // Listed in PowerUpKind::ALL order
        assert_eq!(active[0].kind, PowerUpKind::Magnet);
        assert!((active[0].remaining - 3.0).abs() < 1e-5);
        assert_eq!(active[1].kind, PowerUpKind::DoubleScore);
    }

    #[test]
    fn test_ship_stays_on_field() {
        let mut ship = Ship::default();
        for _ in 0..200 {
            ship.steer(Vec2::new(-500.0, -500.0), 500.0, 0.1);
        }
        assert_eq!(ship.pos, Vec2::ZERO);
        for _ in 0..200 {
            ship.steer(Vec2::new(5000.0, 5000.0), 500.0, 0.1);
        }
        assert_eq!(ship.pos, field_size() - ship.size);
    }

    #[test]
    fn test_ship_speed_cap() {
        let mut ship = Ship::default();
        let start = ship.center();
        ship.steer(start + Vec2::new(1000.0, 0.0), 500.0, 0.1);
        assert!((ship.center().x - start.x - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_speed_boost() {
        let mut state = GameState::new(1);
        assert_eq!(state.ship_speed(), 500.0);
        state.ship.buffs.activate(PowerUpKind::SpeedBoost, 10.0);
        assert_eq!(state.ship_speed(), 750.0);
    }

    #[test]
    fn test_spawn_at_top_edge_sorted() {
        let mut state = GameState::new(5);
        let a = state.spawn(EntityKind::LightThreat);
        let b = state.spawn(EntityKind::Resource);
        assert!(b > a);
        assert!(state.entities.iter().all(|e| e.pos.y == FIELD_HEIGHT));
        assert!(state.entities.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_entity_kind_traits() {
        let tuning = EntityTuning::default();
        assert!(EntityKind::HeavyThreat.pursues());
        assert!(!EntityKind::LightThreat.pursues());
        assert!(EntityKind::Resource.magnetic());
        assert!(!EntityKind::PowerUp(PowerUpKind::Magnet).magnetic());
        assert_eq!(EntityKind::LightThreat.fall_speed(&tuning, 2.0), 140.0);
        assert_eq!(EntityKind::HeavyThreat.pursuit_speed(&tuning, 2.0), 90.0);
        assert_eq!(EntityKind::HeavyThreat.dodge_score(&tuning), 25);
        assert_eq!(EntityKind::Resource.dodge_score(&tuning), 0);
    }
}
