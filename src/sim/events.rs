//! Events emitted by a tick
//!
//! The core never touches audio or persistence. Hosts read these to play
//! sounds, show notifications and update achievement storage.

use serde::{Deserialize, Serialize};

use super::state::{EntityKind, PowerUpKind};

/// Sound effect cues for the host's audio layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// Threat hit the ship
    Explosion,
    /// Resource, recovery item or power-up picked up
    Collect,
    LevelUp,
    LowFuel,
    GameOver,
}

impl SoundCue {
    pub fn name(&self) -> &'static str {
        match self {
            SoundCue::Explosion => "explosion",
            SoundCue::Collect => "collect",
            SoundCue::LevelUp => "level_up",
            SoundCue::LowFuel => "low_fuel",
            SoundCue::GameOver => "game_over",
        }
    }
}

/// Achievements the core reports progress for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AchievementId {
    FirstFlight,
    Level5,
    Level10,
    Level15,
    Level20,
    Score10000,
    Score25000,
    NoDamage,
    Collect50Fuel,
    Collect100Fuel,
    Survive5Min,
    Survive10Min,
}

impl AchievementId {
    pub const ALL: [AchievementId; 12] = [
        AchievementId::FirstFlight,
        AchievementId::Level5,
        AchievementId::Level10,
        AchievementId::Level15,
        AchievementId::Level20,
        AchievementId::Score10000,
        AchievementId::Score25000,
        AchievementId::NoDamage,
        AchievementId::Collect50Fuel,
        AchievementId::Collect100Fuel,
        AchievementId::Survive5Min,
        AchievementId::Survive10Min,
    ];

    /// Stable storage id
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementId::FirstFlight => "first_flight",
            AchievementId::Level5 => "level_5",
            AchievementId::Level10 => "level_10",
            AchievementId::Level15 => "level_15",
            AchievementId::Level20 => "level_20",
            AchievementId::Score10000 => "score_10000",
            AchievementId::Score25000 => "score_25000",
            AchievementId::NoDamage => "no_damage",
            AchievementId::Collect50Fuel => "collect_50_fuel",
            AchievementId::Collect100Fuel => "collect_100_fuel",
            AchievementId::Survive5Min => "survive_5_min",
            AchievementId::Survive10Min => "survive_10_min",
        }
    }

    /// Progress value at which the achievement is complete
    pub fn target(&self) -> u32 {
        match self {
            AchievementId::FirstFlight | AchievementId::NoDamage => 1,
            AchievementId::Level5 => 5,
            AchievementId::Level10 => 10,
            AchievementId::Level15 => 15,
            AchievementId::Level20 => 20,
            AchievementId::Score10000 => 10_000,
            AchievementId::Score25000 => 25_000,
            AchievementId::Collect50Fuel => 50,
            AchievementId::Collect100Fuel => 100,
            AchievementId::Survive5Min => 300,
            AchievementId::Survive10Min => 600,
        }
    }
}

/// Why a life was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeLossCause {
    Collision,
    FuelDepleted,
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A threat left the field bottom without hitting the ship
    Dodged { kind: EntityKind, points: u64 },
    /// A threat overlapped the ship
    Collided { kind: EntityKind, shielded: bool },
    /// A pickup overlapped the ship
    Collected { kind: EntityKind, points: u64 },
    LifeLost { cause: LifeLossCause, lives_left: u8 },
    LifeRestored { lives: u8 },
    BuffActivated { kind: PowerUpKind, refreshed: bool },
    BuffExpired { kind: PowerUpKind },
    LowFuel,
    LevelUp { level: u32 },
    GameOver { score: u64 },
    Sound(SoundCue),
    AchievementProgress { id: AchievementId, progress: u32 },
}
