//! Adaptive difficulty engine
//!
//! Turns score progress and gameplay outcomes into a smoothed difficulty
//! multiplier and a level index. Three signals feed the target:
//! - base difficulty, which grows with score and jumps on level-up
//! - a fast-moving skill estimate driven by successes and failures
//! - play-style scalars (aggressive vs. collector)
//!
//! The target is kept inside a comfort zone around base difficulty that
//! widens with sustained play and narrows on every level-up.

use serde::{Deserialize, Serialize};

use crate::tuning::DifficultyTuning;
use crate::{lerp, sanitize_dt};

/// Success ratio above which the player looks under-challenged
const UNDER_CHALLENGED_RATIO: f32 = 0.8;
/// Success ratio below which the player looks over-challenged
const OVER_CHALLENGED_RATIO: f32 = 0.4;
/// Ratio bounds for the secondary skill nudge
const HIGH_SUCCESS_RATIO: f32 = 0.7;
const LOW_SUCCESS_RATIO: f32 = 0.3;

/// Which kind of outcome triggered a recalibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
}

/// Difficulty engine state. Only this type mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyEngine {
    tuning: DifficultyTuning,

    base_difficulty: f32,
    current_difficulty: f32,
    skill: f32,
    aggressive_style: f32,
    collector_style: f32,

    success_count: u32,
    failure_count: u32,

    combo: u32,
    combo_timer: f32,

    comfort_min: f32,
    comfort_max: f32,
    /// Seconds since the comfort zone last widened
    comfort_timer: f32,

    recent_success: bool,
    recent_failure: bool,
    event_cooldown: f32,

    last_score: u64,
    level: u32,
    score_for_next_level: u64,
    /// Seconds spent on the current level
    time_on_level: f32,
    level_changed: bool,
}

impl Default for DifficultyEngine {
    fn default() -> Self {
        Self::new(DifficultyTuning::default())
    }
}

impl DifficultyEngine {
    pub fn new(tuning: DifficultyTuning) -> Self {
        let mut engine = Self {
            tuning: tuning.sanitized(),
            base_difficulty: 0.0,
            current_difficulty: 0.0,
            skill: 0.0,
            aggressive_style: 0.0,
            collector_style: 0.0,
            success_count: 0,
            failure_count: 0,
            combo: 0,
            combo_timer: 0.0,
            comfort_min: 0.0,
            comfort_max: 0.0,
            comfort_timer: 0.0,
            recent_success: false,
            recent_failure: false,
            event_cooldown: 0.0,
            last_score: 0,
            level: 1,
            score_for_next_level: 0,
            time_on_level: 0.0,
            level_changed: false,
        };
        engine.reset();
        engine
    }

    /// Restore initial values
    pub fn reset(&mut self) {
        let t = &self.tuning;
        self.base_difficulty = t.min_difficulty;
        self.current_difficulty = t.min_difficulty;
        self.skill = 1.0_f32.clamp(t.min_skill, t.max_skill);
        self.aggressive_style = 0.5;
        self.collector_style = 0.5;
        self.success_count = 0;
        self.failure_count = 0;
        self.combo = 0;
        self.combo_timer = 0.0;
        self.comfort_min = t.comfort_start.0;
        self.comfort_max = t.comfort_start.1;
        self.comfort_timer = 0.0;
        self.recent_success = false;
        self.recent_failure = false;
        self.event_cooldown = 0.0;
        self.last_score = 0;
        self.level = 1;
        self.score_for_next_level = self.level_threshold(2);
        self.time_on_level = 0.0;
        self.level_changed = false;
    }

    /// Advance one frame. Call exactly once per simulated frame.
    pub fn update(&mut self, score: u64, dt: f32) {
        let dt = sanitize_dt(dt);
        self.level_changed = false;

        self.time_on_level += dt;
        if self.combo > 0 {
            self.combo_timer -= dt;
            if self.combo_timer <= 0.0 {
                self.combo = 0;
                self.combo_timer = 0.0;
            }
        }

        self.comfort_timer += dt;
        if self.comfort_timer >= self.tuning.comfort_interval {
            self.comfort_timer = 0.0;
            self.widen_comfort_zone();
        }

        if self.event_cooldown > 0.0 {
            self.event_cooldown -= dt;
            if self.event_cooldown <= 0.0 {
                self.event_cooldown = 0.0;
                self.recent_success = false;
                self.recent_failure = false;
            }
        }

        if score > self.last_score {
            let gained = (score - self.last_score) as f32;
            let mut increment = gained * self.tuning.progression_rate;
            if self.aggressive_style > 0.5 {
                increment *= 1.0 + (self.aggressive_style - 0.5);
            }
            self.base_difficulty = self.clamp_difficulty(self.base_difficulty + increment);
            self.last_score = score;
            self.check_level_progress(score);
        }

        let target = self.target_difficulty();
        let blend = self.tuning.smoothing_rate * dt;
        self.current_difficulty = self.clamp_difficulty(lerp(self.current_difficulty, target, blend));
    }

    /// Target multiplier before smoothing
    pub fn target_difficulty(&self) -> f32 {
        let t = &self.tuning;
        let skill_modifier = (self.skill - 1.0) * t.skill_weight;
        let style_modifier = (self.aggressive_style - 0.5) * t.aggressive_weight
            - (self.collector_style - 0.5).max(0.0) * t.collector_weight;
        let survival_bonus = (self.time_on_level * t.survival_bonus_rate).min(t.survival_bonus_cap);

        let raw = self.base_difficulty * (1.0 + skill_modifier + style_modifier + survival_bonus);
        let mut target = raw.clamp(
            self.base_difficulty * self.comfort_min,
            self.base_difficulty * self.comfort_max,
        );

        if self.combo >= t.combo_bonus_min {
            let steps = (self.combo - t.combo_bonus_min + 1) as f32;
            target *= 1.0 + (steps * t.combo_bonus_step).min(t.combo_bonus_cap);
        }

        if self.recent_failure {
            target *= 1.0 - t.event_bias;
        } else if self.recent_success {
            target *= 1.0 + t.event_bias;
        }

        target
    }

    fn check_level_progress(&mut self, score: u64) {
        let start_level = self.level;
        let table_len = self.tuning.level_thresholds.len() as u32;

        while self.level < table_len && score >= self.level_threshold(self.level + 1) {
            self.level += 1;
        }
        // Past the table the step is constant, so jump straight there
        if self.level >= table_len {
            let last = self.level_threshold(table_len);
            if score >= last {
                let extra = ((score - last) / self.tuning.open_ended_step.max(1)) as u32;
                self.level = self.level.max(table_len + extra);
            }
        }

        let gained = self.level - start_level;
        if gained == 0 {
            return;
        }

        self.score_for_next_level = self.level_threshold(self.level + 1);
        self.base_difficulty =
            self.clamp_difficulty(self.base_difficulty + self.tuning.level_jump * gained as f32);
        for _ in 0..gained {
            self.narrow_comfort_zone();
        }
        self.time_on_level = 0.0;
        self.level_changed = true;

        log::info!(
            "Level {} -> {} (next at {}, base difficulty {:.2})",
            start_level,
            self.level,
            self.score_for_next_level,
            self.base_difficulty
        );
    }

    fn widen_comfort_zone(&mut self) {
        let t = &self.tuning;
        self.comfort_min = (self.comfort_min - t.comfort_step).max(t.comfort_widest.0);
        self.comfort_max = (self.comfort_max + t.comfort_step).min(t.comfort_widest.1);
        log::debug!("Comfort zone widened to [{:.2}, {:.2}]", self.comfort_min, self.comfort_max);
    }

    fn narrow_comfort_zone(&mut self) {
        let t = &self.tuning;
        self.comfort_min = (self.comfort_min + t.comfort_step).min(t.comfort_narrowest.0);
        self.comfort_max = (self.comfort_max - t.comfort_step).max(t.comfort_narrowest.1);
    }

    /// Generic success (dodge, pickup, survival milestone)
    pub fn register_success(&mut self) {
        self.success_count += 1;
        self.combo += 1;
        self.combo_timer = self.tuning.combo_window;

        let mut delta = self.tuning.skill_success_delta;
        if self.combo >= self.tuning.long_combo {
            delta *= self.tuning.long_combo_amplifier;
        }
        self.skill = self.clamp_skill(self.skill + delta);

        self.recent_success = true;
        self.recent_failure = false;
        self.event_cooldown = self.tuning.success_cooldown;

        self.maybe_recalibrate(Outcome::Success);
    }

    /// Threat dodged: counts as aggressive play and away from collecting
    pub fn register_dodge(&mut self) {
        self.aggressive_style = (self.aggressive_style + self.tuning.dodge_style_nudge).clamp(0.0, 1.0);
        self.collector_style = (self.collector_style - self.tuning.collect_style_nudge).clamp(0.0, 1.0);
        self.register_success();
    }

    /// Resource picked up: counts as collector play
    pub fn register_fuel_collection(&mut self) {
        self.collector_style = (self.collector_style + self.tuning.collect_style_nudge).clamp(0.0, 1.0);
        self.register_success();
    }

    /// Life lost
    pub fn register_failure(&mut self) {
        self.failure_count += 1;
        self.combo = 0;
        self.combo_timer = 0.0;

        let mut delta = self.tuning.skill_failure_delta;
        if self.aggressive_style < self.tuning.cautious_threshold {
            delta *= self.tuning.cautious_damping;
        }
        self.skill = self.clamp_skill(self.skill - delta);

        self.recent_failure = true;
        self.recent_success = false;
        self.event_cooldown = self.tuning.failure_cooldown;

        self.maybe_recalibrate(Outcome::Failure);
    }

    fn maybe_recalibrate(&mut self, trigger: Outcome) {
        let total = self.success_count + self.failure_count;
        if total < self.tuning.recalibration_window {
            return;
        }
        let ratio = self.success_count as f32 / total as f32;
        let t = &self.tuning;

        if ratio > UNDER_CHALLENGED_RATIO {
            self.aggressive_style = (self.aggressive_style + t.style_nudge).clamp(0.0, 1.0);
        } else if ratio < OVER_CHALLENGED_RATIO {
            self.aggressive_style = (self.aggressive_style - t.style_nudge).clamp(0.0, 1.0);
        }

        let nudge = if ratio > HIGH_SUCCESS_RATIO {
            t.skill_success_delta
        } else if ratio < LOW_SUCCESS_RATIO {
            -t.skill_failure_delta
        } else {
            0.0
        };
        // A success never lowers skill, a failure never raises it
        let nudge = match trigger {
            Outcome::Success => nudge.max(0.0),
            Outcome::Failure => nudge.min(0.0),
        };
        self.skill = self.clamp_skill(self.skill + nudge);

        // Keep a trailing signal instead of starting from zero
        self.success_count = (self.success_count as f32 * t.counter_decay) as u32;
        self.failure_count = (self.failure_count as f32 * t.counter_decay) as u32;

        log::debug!(
            "Skill recalibrated: ratio {:.2}, skill {:.2}, aggressive {:.2}",
            ratio,
            self.skill,
            self.aggressive_style
        );
    }

    /// NaN lands on the lower bound
    fn clamp_difficulty(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.tuning.min_difficulty;
        }
        value.clamp(self.tuning.min_difficulty, self.tuning.max_difficulty)
    }

    fn clamp_skill(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.tuning.min_skill;
        }
        value.clamp(self.tuning.min_skill, self.tuning.max_skill)
    }

    /// Cumulative score at which `level` is reached (level 1 starts at the first entry)
    pub fn level_threshold(&self, level: u32) -> u64 {
        let table = &self.tuning.level_thresholds;
        if level == 0 || table.is_empty() {
            return 0;
        }
        let index = (level - 1) as usize;
        match table.get(index) {
            Some(&threshold) => threshold,
            None => {
                let last = table[table.len() - 1];
                let beyond = (index - (table.len() - 1)) as u64;
                last.saturating_add(beyond.saturating_mul(self.tuning.open_ended_step))
            }
        }
    }

    /// Smoothed multiplier applied to spawn rates and speeds
    pub fn difficulty(&self) -> f32 {
        self.current_difficulty
    }

    pub fn base_difficulty(&self) -> f32 {
        self.base_difficulty
    }

    pub fn skill(&self) -> f32 {
        self.skill
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score_for_next_level(&self) -> u64 {
        self.score_for_next_level
    }

    /// True only for the update in which the level changed
    pub fn level_changed(&self) -> bool {
        self.level_changed
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    /// Seconds before the current combo expires
    pub fn combo_remaining(&self) -> f32 {
        self.combo_timer
    }

    pub fn aggressive_style(&self) -> f32 {
        self.aggressive_style
    }

    pub fn collector_style(&self) -> f32 {
        self.collector_style
    }

    /// Comfort-zone bounds relative to base difficulty
    pub fn comfort_zone(&self) -> (f32, f32) {
        (self.comfort_min, self.comfort_max)
    }

    /// Fraction of the way to the next comfort-zone widening
    pub fn comfort_expansion_progress(&self) -> f32 {
        (self.comfort_timer / self.tuning.comfort_interval).clamp(0.0, 1.0)
    }

    pub fn recent_success(&self) -> bool {
        self.recent_success
    }

    pub fn recent_failure(&self) -> bool {
        self.recent_failure
    }

    pub fn tuning(&self) -> &DifficultyTuning {
        &self.tuning
    }
}
