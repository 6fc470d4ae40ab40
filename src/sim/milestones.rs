//! Session statistics and achievement-progress signals
//!
//! The core only reports progress. Unlock state and storage belong to the host.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::events::{AchievementId, GameEvent};

/// Score a session must reach without losing a life for `no_damage`
pub const NO_DAMAGE_SCORE: u64 = 3000;

/// Read-only statistics for the current session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Seconds of active (unpaused) play
    pub play_time: f32,
    pub resources_collected: u32,
    pub threats_dodged: u32,
    /// A life has been lost this session
    pub damage_taken: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Milestones {
    pub stats: SessionStats,
    /// Highest progress reported so far per id
    reported: BTreeMap<AchievementId, u32>,
}

impl Milestones {
    /// Last reported progress for `id`
    pub fn progress(&self, id: AchievementId) -> u32 {
        self.reported.get(&id).copied().unwrap_or(0)
    }

    /// Record progress, emitting an event only when it goes up
    fn report(&mut self, id: AchievementId, progress: u32, events: &mut Vec<GameEvent>) {
        let progress = progress.min(id.target());
        let entry = self.reported.entry(id).or_insert(0);
        if progress > *entry {
            *entry = progress;
            events.push(GameEvent::AchievementProgress { id, progress });
        }
    }

    /// Emit progress for everything derivable from the current session
    pub fn check(&mut self, score: u64, level: u32, events: &mut Vec<GameEvent>) {
        self.report(AchievementId::FirstFlight, 1, events);

        for id in [
            AchievementId::Level5,
            AchievementId::Level10,
            AchievementId::Level15,
            AchievementId::Level20,
        ] {
            // Starting level is not progress
            if level > 1 {
                self.report(id, level, events);
            }
        }

        for id in [AchievementId::Score10000, AchievementId::Score25000] {
            if score >= id.target() as u64 {
                self.report(id, id.target(), events);
            }
        }

        if !self.stats.damage_taken && score >= NO_DAMAGE_SCORE {
            self.report(AchievementId::NoDamage, 1, events);
        }

        for id in [AchievementId::Collect50Fuel, AchievementId::Collect100Fuel] {
            self.report(id, self.stats.resources_collected, events);
        }

        let survived = self.stats.play_time as u32;
        for id in [AchievementId::Survive5Min, AchievementId::Survive10Min] {
            if survived >= id.target() {
                self.report(id, survived, events);
            }
        }
    }
}
