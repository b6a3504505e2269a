//! Match orchestration state: wave progression, towers, and outcome.
//!
//! The orchestrator only holds state and decides transitions. The engine
//! performs the side effects (recalling enemies, publishing events) around
//! each transition.

use hecs::Entity;

use beachhead_core::enums::MatchPhase;

/// What happens after a wave is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveResolution {
    /// The final configured wave was survived.
    Won,
    /// Back to PreWave; the countdown should be reset for `next_wave_index`.
    Continue { next_wave_index: u32 },
}

#[derive(Debug)]
pub struct MatchOrchestrator {
    phase: MatchPhase,
    /// Waves sent so far. Also the zero-based index of the next wave.
    wave_index: u32,
    waves_total: u32,
    towers_remaining: u32,
    /// Enemies currently on the field, in activation order, no duplicates.
    active_enemies: Vec<Entity>,
    /// Enemies pulled off the field at the last wave end.
    recalled: Vec<Entity>,
}

impl MatchOrchestrator {
    pub fn new(waves_total: u32, towers: u32) -> Self {
        Self {
            phase: MatchPhase::PreWave,
            wave_index: 0,
            waves_total,
            towers_remaining: towers,
            active_enemies: Vec::new(),
            recalled: Vec::new(),
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn wave_index(&self) -> u32 {
        self.wave_index
    }

    pub fn waves_total(&self) -> u32 {
        self.waves_total
    }

    pub fn towers_remaining(&self) -> u32 {
        self.towers_remaining
    }

    pub fn active_enemies(&self) -> &[Entity] {
        &self.active_enemies
    }

    pub fn recalled(&self) -> &[Entity] {
        &self.recalled
    }

    /// Start sending a wave. Returns the wave index to announce, or `None`
    /// outside PreWave.
    pub fn begin_wave(&mut self) -> Option<u32> {
        if self.phase != MatchPhase::PreWave {
            return None;
        }
        self.recalled.clear();
        Some(self.wave_index)
    }

    /// Finish sending a wave. Returns the new wave number.
    pub fn commit_wave(&mut self) -> u32 {
        self.wave_index += 1;
        self.phase = MatchPhase::WaveActive;
        self.wave_index
    }

    /// Track a newly activated enemy.
    pub fn add_enemy(&mut self, enemy: Entity) {
        if !self.active_enemies.contains(&enemy) {
            self.active_enemies.push(enemy);
        }
    }

    /// Stop tracking an enemy. Returns whether it was tracked.
    pub fn remove_enemy(&mut self, enemy: Entity) -> bool {
        let before = self.active_enemies.len();
        self.active_enemies.retain(|&e| e != enemy);
        before != self.active_enemies.len()
    }

    /// Enter Resolving and hand back the enemies that must be recalled.
    /// Returns `None` unless a wave is active, which makes repeated
    /// wave-ended notifications harmless.
    pub fn begin_resolution(&mut self) -> Option<Vec<Entity>> {
        if self.phase != MatchPhase::WaveActive {
            return None;
        }
        self.phase = MatchPhase::Resolving;
        self.recalled = std::mem::take(&mut self.active_enemies);
        Some(self.recalled.clone())
    }

    /// Leave Resolving: either the match is won or the next wave can be sent.
    pub fn finish_resolution(&mut self) -> WaveResolution {
        if self.wave_index >= self.waves_total {
            self.phase = MatchPhase::Won;
            WaveResolution::Won
        } else {
            self.phase = MatchPhase::PreWave;
            WaveResolution::Continue {
                next_wave_index: self.wave_index,
            }
        }
    }

    /// Record a tower loss. Returns `true` if this loss lost the match.
    /// Saturates at zero and is ignored once the match is over.
    pub fn tower_destroyed(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.towers_remaining = self.towers_remaining.saturating_sub(1);
        if self.towers_remaining == 0 {
            self.phase = MatchPhase::Lost;
            return true;
        }
        false
    }
}
