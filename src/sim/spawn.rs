//! Spawn cadence and placement
//!
//! Threats arrive in grouped bursts: once the (difficulty-scaled) interval
//! has elapsed, up to `group_size` spawns happen back to back at that
//! interval, then a mandatory group pause must pass before the next burst.
//! The pause is only checked when a spawn is already due, so a pause shorter
//! than the interval has no visible effect.
//!
//! All timers are cooperative: they advance by the caller's dt only.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{Entity, EntityKind, PowerUpKind};
use crate::consts::FIELD_WIDTH;
use crate::tuning::SpawnTuning;

/// Lowest multiplier used when scaling intervals (guards against divide-by-zero)
const MIN_INTERVAL_DIVISOR: f32 = 0.1;

/// Burst state of a grouped spawner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurstState {
    /// Nothing spawned yet this session
    Idle,
    /// Mid-burst with `spawned` entities in the current group
    Bursting { spawned: u32 },
    /// Group full; waiting out the group pause
    CoolingDown,
}

/// Grouped-burst spawn gate for threat kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstGate {
    pub base_interval: f32,
    pub group_size: u32,
    pub group_pause: f32,
    /// Seconds since the last spawn from this gate
    pub since_last: f32,
    pub state: BurstState,
}

impl BurstGate {
    pub fn new(base_interval: f32, group_size: u32, group_pause: f32) -> Self {
        Self {
            base_interval,
            group_size: group_size.max(1),
            group_pause,
            since_last: 0.0,
            state: BurstState::Idle,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.since_last += dt;
    }

    /// Interval at the given difficulty
    pub fn interval(&self, difficulty: f32) -> f32 {
        self.base_interval / difficulty.max(MIN_INTERVAL_DIVISOR)
    }

    /// Returns true if a spawn should happen now, and records it
    pub fn try_spawn(&mut self, difficulty: f32) -> bool {
        if self.since_last <= self.interval(difficulty) {
            return false;
        }
        let next = match self.state {
            BurstState::Idle => 1,
            BurstState::Bursting { spawned } if spawned < self.group_size => spawned + 1,
            BurstState::Bursting { .. } | BurstState::CoolingDown => {
                if self.since_last <= self.group_pause {
                    self.state = BurstState::CoolingDown;
                    return false;
                }
                1
            }
        };
        self.since_last = 0.0;
        self.state = if next >= self.group_size {
            BurstState::CoolingDown
        } else {
            BurstState::Bursting { spawned: next }
        };
        true
    }

    /// Entities spawned in the current group
    pub fn group_count(&self) -> u32 {
        match self.state {
            BurstState::Idle => 0,
            BurstState::Bursting { spawned } => spawned,
            BurstState::CoolingDown => self.group_size,
        }
    }
}

/// Plain fixed-interval gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalGate {
    pub interval: f32,
    pub since_last: f32,
}

impl IntervalGate {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            since_last: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.since_last += dt;
    }

    pub fn try_fire(&mut self) -> bool {
        if self.since_last > self.interval {
            self.since_last = 0.0;
            true
        } else {
            false
        }
    }
}

/// Periodic chance-based power-up drop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpRoller {
    pub interval: f32,
    pub retry_delay: f32,
    pub base_chance: f32,
    pub difficulty_chance: f32,
    pub elapsed: f32,
}

impl PowerUpRoller {
    pub fn new(tuning: &SpawnTuning) -> Self {
        Self {
            interval: tuning.powerup_roll_interval,
            retry_delay: tuning.powerup_retry_delay,
            base_chance: tuning.powerup_base_chance,
            difficulty_chance: tuning.powerup_difficulty_chance,
            elapsed: 0.0,
        }
    }

    /// Chance of a drop at the given difficulty
    pub fn chance(&self, difficulty: f32) -> f32 {
        (self.base_chance + (difficulty / 15.0) * self.difficulty_chance).clamp(0.0, 1.0)
    }

    /// Advance the timer and roll when due. A miss retries after `retry_delay`.
    pub fn roll(&mut self, dt: f32, difficulty: f32, rng: &mut Pcg32) -> bool {
        self.elapsed += dt;
        if self.elapsed < self.interval {
            return false;
        }
        if rng.random::<f32>() < self.chance(difficulty) {
            self.elapsed = 0.0;
            true
        } else {
            self.elapsed = (self.interval - self.retry_delay).max(0.0);
            false
        }
    }
}

/// All spawn gates of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawner {
    pub light: BurstGate,
    pub heavy: BurstGate,
    pub resource: IntervalGate,
    pub recovery: IntervalGate,
    pub powerup: PowerUpRoller,
    pub heavy_min_score: u64,
}

impl Spawner {
    pub fn new(tuning: &SpawnTuning) -> Self {
        Self {
            light: BurstGate::new(tuning.light_interval, tuning.light_group, tuning.group_pause),
            heavy: BurstGate::new(tuning.heavy_interval, tuning.heavy_group, tuning.group_pause),
            resource: IntervalGate::new(tuning.resource_interval),
            recovery: IntervalGate::new(tuning.recovery_interval),
            powerup: PowerUpRoller::new(tuning),
            heavy_min_score: tuning.heavy_min_score,
        }
    }

    /// Advance all gates and return the kinds due this tick, in spawn order
    pub fn poll(
        &mut self,
        dt: f32,
        difficulty: f32,
        score: u64,
        life_missing: bool,
        rng: &mut Pcg32,
    ) -> Vec<SpawnRequest> {
        let mut due = Vec::new();

        self.light.advance(dt);
        if self.light.try_spawn(difficulty) {
            due.push(SpawnRequest::Kind(EntityKind::LightThreat));
        }

        self.heavy.advance(dt);
        if score > self.heavy_min_score && self.heavy.try_spawn(difficulty) {
            due.push(SpawnRequest::Kind(EntityKind::HeavyThreat));
        }

        self.resource.advance(dt);
        if self.resource.try_fire() {
            due.push(SpawnRequest::Kind(EntityKind::Resource));
        }

        self.recovery.advance(dt);
        if life_missing && self.recovery.try_fire() {
            due.push(SpawnRequest::Kind(EntityKind::RecoveryItem));
        }

        if self.powerup.roll(dt, difficulty, rng) {
            due.push(SpawnRequest::RandomPowerUp);
        }

        due
    }
}

/// What a gate asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnRequest {
    Kind(EntityKind),
    /// Power-up whose type is chosen against currently active buffs
    RandomPowerUp,
}

/// Pick a power-up type, preferring one whose buff is not active
pub fn choose_powerup_kind(rng: &mut Pcg32, is_active: impl Fn(PowerUpKind) -> bool) -> PowerUpKind {
    for _ in 0..3 {
        let kind = random_powerup_kind(rng);
        if !is_active(kind) {
            return kind;
        }
    }
    random_powerup_kind(rng)
}

pub fn random_powerup_kind(rng: &mut Pcg32) -> PowerUpKind {
    PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())]
}

/// Minimum center distance between a new entity and an existing one, as a
/// fraction of their summed sizes. `None` means they may overlap freely.
fn spacing_factor(new: EntityKind, existing: EntityKind) -> Option<f32> {
    use EntityKind::*;
    match (new, existing) {
        (LightThreat, LightThreat) | (HeavyThreat, HeavyThreat) => Some(0.4),
        (HeavyThreat, LightThreat) => Some(0.35),
        (Resource | RecoveryItem | PowerUp(_), LightThreat | HeavyThreat) => Some(0.4),
        _ => None,
    }
}

/// Choose an x coordinate along the top edge for a new entity of `kind`,
/// retrying to keep clear of entities still near the spawn row.
pub fn pick_spawn_x(rng: &mut Pcg32, kind: EntityKind, spawn_y: f32, entities: &[Entity]) -> f32 {
    let size = kind.size();
    let max_x = (FIELD_WIDTH - size).max(0.0);
    let attempts = if kind.is_threat() { 10 } else { 15 };
    // Pickups give up on spacing for the last 30% of attempts
    let relax_after = if kind.is_threat() { attempts } else { attempts * 7 / 10 };

    let mut x = 0.0;
    for attempt in 0..attempts {
        x = if max_x > 0.0 { rng.random_range(0.0..max_x) } else { 0.0 };
        if attempt >= relax_after {
            break;
        }
        let center = glam::Vec2::new(x + size * 0.5, spawn_y + size * 0.5);
        let crowded = entities.iter().any(|other| {
            spacing_factor(kind, other.kind).is_some_and(|factor| {
                let min_dist = (size + other.size.x) * factor;
                other.bounds().center().distance(center) < min_dist
            })
        });
        if !crowded {
            break;
        }
    }
    x
}
