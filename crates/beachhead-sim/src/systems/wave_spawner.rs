//! Wave roster release.
//!
//! When a wave starts, its enemy counts are expanded into a roster,
//! shuffled, and released one enemy per cadence step through the
//! scheduler. Starting another wave cancels any release still in flight.

use std::collections::VecDeque;

use log::debug;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use beachhead_core::config::{MatchConfig, WaveDescriptor};
use beachhead_core::enums::EnemyCategory;

use crate::scheduler::{CancelToken, Scheduler};
use crate::tasks::Task;

/// Expand a wave descriptor into one entry per enemy, grouped by category.
pub fn build_roster(wave: &WaveDescriptor) -> Vec<EnemyCategory> {
    let mut roster = Vec::with_capacity(wave.total() as usize);
    for category in EnemyCategory::ALL {
        for _ in 0..wave.count(category) {
            roster.push(category);
        }
    }
    roster
}

/// Release order state for the current wave.
#[derive(Debug, Default)]
pub struct WaveSpawner {
    pending: VecDeque<EnemyCategory>,
    sequence: Option<CancelToken>,
}

impl WaveSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any running release and start releasing wave `wave_index`.
    ///
    /// The first enemy comes due on the next scheduler advance. Returns
    /// `false` for an unknown or empty wave.
    pub fn begin(
        &mut self,
        config: &MatchConfig,
        wave_index: u32,
        rng: &mut ChaCha8Rng,
        scheduler: &mut Scheduler<Task>,
    ) -> bool {
        self.cancel();

        let Some(wave) = config.waves.get(wave_index as usize) else {
            debug!("no wave configured at index {wave_index}");
            return false;
        };

        let mut roster = build_roster(wave);
        roster.shuffle(rng);
        self.pending = roster.into();
        if self.pending.is_empty() {
            return false;
        }

        let token = scheduler.schedule(0.0, Task::ReleaseNext);
        self.sequence = Some(token);
        true
    }

    /// Stop releasing. Enemies already on the field are unaffected.
    pub fn cancel(&mut self) {
        if let Some(token) = self.sequence.take() {
            token.cancel();
        }
        self.pending.clear();
    }

    /// Pop the next category to release.
    pub fn next_release(&mut self) -> Option<EnemyCategory> {
        self.pending.pop_front()
    }

    /// Token of the running release sequence, if any.
    pub fn sequence(&self) -> Option<&CancelToken> {
        self.sequence.as_ref()
    }

    /// Mark the release sequence as complete.
    pub fn finish(&mut self) {
        self.sequence = None;
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn is_releasing(&self) -> bool {
        self.sequence.is_some()
    }
}
