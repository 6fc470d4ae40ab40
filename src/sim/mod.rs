//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only (no wall clock)
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No audio, rendering or persistence; side effects leave as events

pub mod collision;
pub mod difficulty;
pub mod events;
pub mod milestones;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use difficulty::DifficultyEngine;
pub use events::{AchievementId, GameEvent, LifeLossCause, SoundCue};
pub use milestones::{Milestones, SessionStats};
pub use spawn::{BurstGate, BurstState, IntervalGate, Spawner};
pub use state::{ActiveBuff, Buffs, Entity, EntityKind, GamePhase, GameState, PowerUpKind, Ship};
pub use tick::{TickInput, TickResult, tick};
