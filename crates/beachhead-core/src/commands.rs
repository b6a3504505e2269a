//! Inputs to the simulation: player commands and spatial contacts.
//!
//! Both are queued and processed at the next tick boundary, commands first.

use serde::{Deserialize, Serialize};

use crate::types::{EntityId, SurfaceHit};

/// All possible player actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Waves ---
    /// Start the next wave. Ignored unless the match is between waves.
    SendWave,

    // --- Placement ---
    /// Select an obstacle template and open a preview session.
    SelectObstacle { index: usize },
    /// Latest cursor ray result from the spatial collaborator.
    /// `None` means the ray hit nothing.
    PointerMoved { hit: Option<SurfaceHit> },
    /// Cycle the preview rotation to the next step.
    RotatePreview,
    /// Place the previewed obstacle at its current spot.
    ConfirmPlacement,
    /// Abandon the current preview session.
    CancelPlacement,
}

/// Trigger and collision notifications from the spatial collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Contact {
    /// An enemy entered a tower's trigger region.
    TowerBreached { tower: EntityId, enemy: EntityId },
    /// An enemy entered an obstacle's trigger or collision region.
    ObstacleEntered { obstacle: EntityId, enemy: EntityId },
    /// An enemy left an obstacle's trigger or collision region.
    ObstacleExited { obstacle: EntityId, enemy: EntityId },
}
