//! Match state snapshot: the complete visible state handed to the
//! presentation layer after each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::{MatchEvent, NavigationOrder};
use crate::types::SimTime;

/// Complete match state broadcast after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub time: SimTime,
    pub phase: MatchPhase,
    /// Number of waves sent so far (the wave index after increment).
    pub wave_number: u32,
    pub waves_total: u32,
    pub timer: TimerView,
    pub towers_remaining: u32,
    pub active_enemies: u32,
    pub quotas: Vec<QuotaView>,
    pub placement: PlacementView,
    /// Events raised during this tick, in dispatch order.
    pub events: Vec<MatchEvent>,
    /// Navigation orders raised during this tick.
    pub navigation: Vec<NavigationOrder>,
}

/// Wave countdown for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerView {
    pub state: TimerState,
    pub remaining_secs: f64,
    /// Remaining time rounded up to whole seconds.
    pub display_secs: u32,
}

/// Per-template placement allowance for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotaView {
    pub name: String,
    pub description: String,
    pub health: f32,
    pub damage: f32,
    pub max_count: u32,
    pub current_count: u32,
    pub can_place: bool,
    /// Placements still available this wave.
    pub remaining: u32,
}

/// Placement session for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacementView {
    pub state: PlacementState,
    pub selected: Option<usize>,
    pub preview_visible: bool,
    pub rotation_degrees: f32,
}
