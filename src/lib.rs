//! Space Courier - a dodge-and-collect arcade game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, adaptive difficulty)
//! - `tuning`: Data-driven game balance
//! - `highscores`: Leaderboard value type for hosts

pub mod highscores;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play-field dimensions (origin bottom-left, y up)
    pub const FIELD_WIDTH: f32 = 720.0;
    pub const FIELD_HEIGHT: f32 = 1560.0;

    /// Entity sizes (square sprites)
    pub const SHIP_SIZE: f32 = 96.0;
    pub const THREAT_SIZE: f32 = 96.0;
    pub const PICKUP_SIZE: f32 = 48.0;
    pub const POWERUP_SIZE: f32 = 64.0;

    /// Lives
    pub const START_LIVES: u8 = 3;
    pub const MAX_LIVES: u8 = 3;
}

/// Sanitize a caller-supplied timestep: negative, NaN and infinite become zero
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() { dt.max(0.0) } else { 0.0 }
}

/// Linear interpolation with the blend factor clamped to [0, 1]
#[inline]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Step `current` toward `target` by at most `max_step` (per axis length)
#[inline]
pub fn move_toward(current: Vec2, target: Vec2, max_step: f32) -> Vec2 {
    let delta = target - current;
    let dist = delta.length();
    if dist <= max_step || dist <= f32::EPSILON {
        target
    } else {
        current + delta / dist * max_step
    }
}
