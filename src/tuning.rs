//! Data-driven game balance
//!
//! Every number the simulation and the difficulty engine use lives here.
//! Defaults are the shipped values; hosts may override any subset from JSON.

use serde::{Deserialize, Serialize};

/// Complete balance sheet for a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub difficulty: DifficultyTuning,
    pub spawn: SpawnTuning,
    pub entities: EntityTuning,
    pub player: PlayerTuning,
}

/// Adaptive difficulty constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    pub min_difficulty: f32,
    pub max_difficulty: f32,
    pub min_skill: f32,
    pub max_skill: f32,

    /// Base difficulty gained per score point
    pub progression_rate: f32,
    /// Base difficulty gained per level reached
    pub level_jump: f32,
    /// Lerp rate (per second) of current difficulty toward target
    pub smoothing_rate: f32,

    pub skill_success_delta: f32,
    pub skill_failure_delta: f32,
    /// Weight of (skill - 1) in the target formula
    pub skill_weight: f32,
    /// Combo length from which skill gains are amplified
    pub long_combo: u32,
    pub long_combo_amplifier: f32,
    /// Aggressive scalar below which a player counts as cautious
    pub cautious_threshold: f32,
    /// Failure penalty multiplier for cautious players
    pub cautious_damping: f32,

    pub aggressive_weight: f32,
    pub collector_weight: f32,
    pub dodge_style_nudge: f32,
    pub collect_style_nudge: f32,

    /// Survival bonus per second spent on the current level
    pub survival_bonus_rate: f32,
    pub survival_bonus_cap: f32,

    /// Seconds a combo survives without a new success
    pub combo_window: f32,
    /// Combo length from which the target gets a bonus
    pub combo_bonus_min: u32,
    pub combo_bonus_step: f32,
    pub combo_bonus_cap: f32,

    /// Relative target bias after a recent success/failure
    pub event_bias: f32,
    pub success_cooldown: f32,
    pub failure_cooldown: f32,

    /// Outcomes per skill-ratio recalibration
    pub recalibration_window: u32,
    /// Fraction of the counters kept after recalibration
    pub counter_decay: f32,
    pub style_nudge: f32,

    pub comfort_start: (f32, f32),
    pub comfort_widest: (f32, f32),
    pub comfort_narrowest: (f32, f32),
    pub comfort_step: f32,
    /// Seconds of play between comfort-zone widenings
    pub comfort_interval: f32,

    /// Cumulative score required for each level (index = level - 1)
    pub level_thresholds: Vec<u64>,
    /// Points per level beyond the table
    pub open_ended_step: u64,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            min_difficulty: 1.0,
            max_difficulty: 5.0,
            min_skill: 0.5,
            max_skill: 2.0,

            progression_rate: 0.0005,
            level_jump: 0.3,
            smoothing_rate: 0.1,

            skill_success_delta: 0.05,
            skill_failure_delta: 0.1,
            skill_weight: 0.7,
            long_combo: 10,
            long_combo_amplifier: 1.5,
            cautious_threshold: 0.35,
            cautious_damping: 0.6,

            aggressive_weight: 0.3,
            collector_weight: 0.2,
            dodge_style_nudge: 0.01,
            collect_style_nudge: 0.02,

            survival_bonus_rate: 0.002,
            survival_bonus_cap: 0.15,

            combo_window: 3.0,
            combo_bonus_min: 5,
            combo_bonus_step: 0.02,
            combo_bonus_cap: 0.2,

            event_bias: 0.1,
            success_cooldown: 1.0,
            failure_cooldown: 2.0,

            recalibration_window: 15,
            counter_decay: 0.2,
            style_nudge: 0.05,

            comfort_start: (0.8, 1.2),
            comfort_widest: (0.6, 1.4),
            comfort_narrowest: (0.9, 1.1),
            comfort_step: 0.05,
            comfort_interval: 60.0,

            level_thresholds: vec![0, 500, 1200, 2000, 3000, 5000, 8000, 12000, 17000, 25000],
            open_ended_step: 10_000,
        }
    }
}

impl DifficultyTuning {
    /// Replace non-finite values with their defaults and put bounds in order
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let d = &mut self;
        for (value, fallback) in [
            (&mut d.min_difficulty, defaults.min_difficulty),
            (&mut d.max_difficulty, defaults.max_difficulty),
            (&mut d.min_skill, defaults.min_skill),
            (&mut d.max_skill, defaults.max_skill),
            (&mut d.progression_rate, defaults.progression_rate),
            (&mut d.level_jump, defaults.level_jump),
            (&mut d.smoothing_rate, defaults.smoothing_rate),
            (&mut d.skill_success_delta, defaults.skill_success_delta),
            (&mut d.skill_failure_delta, defaults.skill_failure_delta),
            (&mut d.skill_weight, defaults.skill_weight),
            (&mut d.long_combo_amplifier, defaults.long_combo_amplifier),
            (&mut d.cautious_threshold, defaults.cautious_threshold),
            (&mut d.cautious_damping, defaults.cautious_damping),
            (&mut d.aggressive_weight, defaults.aggressive_weight),
            (&mut d.collector_weight, defaults.collector_weight),
            (&mut d.dodge_style_nudge, defaults.dodge_style_nudge),
            (&mut d.collect_style_nudge, defaults.collect_style_nudge),
            (&mut d.survival_bonus_rate, defaults.survival_bonus_rate),
            (&mut d.survival_bonus_cap, defaults.survival_bonus_cap),
            (&mut d.combo_window, defaults.combo_window),
            (&mut d.combo_bonus_step, defaults.combo_bonus_step),
            (&mut d.combo_bonus_cap, defaults.combo_bonus_cap),
            (&mut d.event_bias, defaults.event_bias),
            (&mut d.success_cooldown, defaults.success_cooldown),
            (&mut d.failure_cooldown, defaults.failure_cooldown),
            (&mut d.counter_decay, defaults.counter_decay),
            (&mut d.style_nudge, defaults.style_nudge),
            (&mut d.comfort_start.0, defaults.comfort_start.0),
            (&mut d.comfort_start.1, defaults.comfort_start.1),
            (&mut d.comfort_widest.0, defaults.comfort_widest.0),
            (&mut d.comfort_widest.1, defaults.comfort_widest.1),
            (&mut d.comfort_narrowest.0, defaults.comfort_narrowest.0),
            (&mut d.comfort_narrowest.1, defaults.comfort_narrowest.1),
            (&mut d.comfort_step, defaults.comfort_step),
            (&mut d.comfort_interval, defaults.comfort_interval),
        ] {
            if !value.is_finite() {
                *value = fallback;
            }
        }

        d.min_difficulty = d.min_difficulty.max(0.1);
        d.max_difficulty = d.max_difficulty.max(d.min_difficulty);
        d.min_skill = d.min_skill.max(0.0);
        d.max_skill = d.max_skill.max(d.min_skill);
        d.recalibration_window = d.recalibration_window.max(1);
        d.counter_decay = d.counter_decay.clamp(0.0, 1.0);
        d.comfort_interval = d.comfort_interval.max(f32::EPSILON);
        // Comfort bounds must bracket 1.0
        d.comfort_widest.0 = d.comfort_widest.0.clamp(0.0, 1.0);
        d.comfort_widest.1 = d.comfort_widest.1.max(1.0);
        d.comfort_narrowest.0 = d.comfort_narrowest.0.clamp(d.comfort_widest.0, 1.0);
        d.comfort_narrowest.1 = d.comfort_narrowest.1.clamp(1.0, d.comfort_widest.1);
        d.comfort_start.0 = d.comfort_start.0.clamp(d.comfort_widest.0, d.comfort_narrowest.0);
        d.comfort_start.1 = d.comfort_start.1.clamp(d.comfort_narrowest.1, d.comfort_widest.1);
        if d.level_thresholds.len() < 2 {
            d.level_thresholds = defaults.level_thresholds;
        }
        // Thresholds must strictly increase
        for i in 1..d.level_thresholds.len() {
            let prev = d.level_thresholds[i - 1];
            if d.level_thresholds[i] <= prev {
                d.level_thresholds[i] = prev + 1;
            }
        }
        d.open_ended_step = d.open_ended_step.max(1);

        self
    }
}

/// Spawn cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Seconds between light threats at difficulty 1 (divided by difficulty)
    pub light_interval: f32,
    pub light_group: u32,
    pub heavy_interval: f32,
    pub heavy_group: u32,
    /// Heavy threats only appear once the score exceeds this
    pub heavy_min_score: u64,
    /// Mandatory pause after a full threat group
    pub group_pause: f32,
    pub resource_interval: f32,
    pub recovery_interval: f32,
    pub powerup_roll_interval: f32,
    /// Delay before rolling again after a missed power-up roll
    pub powerup_retry_delay: f32,
    pub powerup_base_chance: f32,
    pub powerup_difficulty_chance: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            light_interval: 2.0,
            light_group: 4,
            heavy_interval: 4.0,
            heavy_group: 2,
            heavy_min_score: 300,
            group_pause: 2.0,
            resource_interval: 11.0,
            recovery_interval: 5.0,
            powerup_roll_interval: 15.0,
            powerup_retry_delay: 5.0,
            powerup_base_chance: 0.2,
            powerup_difficulty_chance: 0.3,
        }
    }
}

/// Per-kind motion and scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityTuning {
    pub light_fall: f32,
    pub light_fall_per_difficulty: f32,
    pub light_score: u32,
    pub heavy_fall: f32,
    pub heavy_fall_per_difficulty: f32,
    pub heavy_pursuit: f32,
    pub heavy_pursuit_per_difficulty: f32,
    pub heavy_score: u32,
    pub pickup_fall: f32,
    pub resource_score: u32,
    pub recovery_score: u32,
    pub powerup_fall: f32,
    /// Speed at which magnetized pickups are pulled toward the ship
    pub magnet_speed: f32,
    /// Magnetized pickups whose center is this close to the ship's are collected
    pub magnet_collect_radius: f32,
}

impl Default for EntityTuning {
    fn default() -> Self {
        Self {
            light_fall: 100.0,
            light_fall_per_difficulty: 20.0,
            light_score: 15,
            heavy_fall: 100.0,
            heavy_fall_per_difficulty: 25.0,
            heavy_pursuit: 60.0,
            heavy_pursuit_per_difficulty: 15.0,
            heavy_score: 25,
            pickup_fall: 80.0,
            resource_score: 25,
            recovery_score: 50,
            powerup_fall: 200.0,
            magnet_speed: 300.0,
            magnet_collect_radius: 150.0,
        }
    }
}

/// Ship, fuel gauge and buffs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub ship_speed: f32,
    pub speed_boost_multiplier: f32,
    pub max_fuel: f32,
    /// Fuel drained per second
    pub fuel_drain: f32,
    pub resource_fuel: f32,
    /// Gauge level after running dry
    pub dry_refill: f32,
    /// Fraction of max fuel that triggers the low-fuel warning
    pub low_fuel_fraction: f32,
    pub buff_duration: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            ship_speed: 500.0,
            speed_boost_multiplier: 1.5,
            max_fuel: 100.0,
            fuel_drain: 2.4,
            resource_fuel: 25.0,
            dry_refill: 50.0,
            low_fuel_fraction: 0.2,
            buff_duration: 10.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning override from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Clamp values that would break simulation invariants
    pub fn sanitized(mut self) -> Self {
        self.difficulty = self.difficulty.sanitized();

        let s = &mut self.spawn;
        for interval in [
            &mut s.light_interval,
            &mut s.heavy_interval,
            &mut s.group_pause,
            &mut s.resource_interval,
            &mut s.recovery_interval,
            &mut s.powerup_roll_interval,
            &mut s.powerup_retry_delay,
        ] {
            // NaN also ends up at zero here
            *interval = interval.max(0.0);
        }
        s.light_group = s.light_group.max(1);
        s.heavy_group = s.heavy_group.max(1);

        let p = &mut self.player;
        p.max_fuel = p.max_fuel.max(1.0);
        p.fuel_drain = p.fuel_drain.max(0.0);
        p.dry_refill = p.dry_refill.clamp(0.0, p.max_fuel);
        p.low_fuel_fraction = p.low_fuel_fraction.clamp(0.0, 1.0);
        p.buff_duration = p.buff_duration.max(0.0);

        self
    }
}
