//! Snapshot system: assembles the presentation view of the match.
//!
//! This system is read-only; it never modifies the world.

use beachhead_core::config::MatchConfig;
use beachhead_core::events::{MatchEvent, NavigationOrder};
use beachhead_core::state::MatchSnapshot;
use beachhead_core::types::SimTime;

use crate::orchestrator::MatchOrchestrator;
use crate::systems::placement::PlacementController;
use crate::systems::wave_timer::WaveTimer;

/// Build a complete MatchSnapshot from the current match state.
pub fn build_snapshot(
    time: &SimTime,
    config: &MatchConfig,
    orchestrator: &MatchOrchestrator,
    timer: &WaveTimer,
    placement: &PlacementController,
    events: Vec<MatchEvent>,
    navigation: Vec<NavigationOrder>,
) -> MatchSnapshot {
    MatchSnapshot {
        time: *time,
        phase: orchestrator.phase(),
        wave_number: orchestrator.wave_index(),
        waves_total: orchestrator.waves_total(),
        timer: timer.view(),
        towers_remaining: orchestrator.towers_remaining(),
        active_enemies: orchestrator.active_enemies().len() as u32,
        quotas: placement.quota_views(&config.obstacle_templates),
        placement: placement.view(),
        events,
        navigation,
    }
}
