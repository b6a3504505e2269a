//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Enemy archetype. Doubles as the pooling key for enemy instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyCategory {
    /// Fast, fragile runner.
    Tiny,
    /// Balanced infantry.
    Medium,
    /// Slow, heavily armoured attacker.
    Tank,
}

impl EnemyCategory {
    pub const ALL: [EnemyCategory; 3] = [Self::Tiny, Self::Medium, Self::Tank];
}

/// Lifecycle status of a pooled enemy instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyStatus {
    /// Active and accepting damage.
    #[default]
    Alive,
    /// Health reached zero.
    Killed,
    /// Pulled from the field when the wave timer elapsed.
    Recalled,
}

/// Behaviour archetype of a placeable obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Blocks enemies and loses health while they push against it.
    Wall,
    /// Damages every enemy standing inside it at a fixed interval.
    Spikes,
}

/// Top-level match state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Waiting for the player to send the next wave. Placement is open.
    #[default]
    PreWave,
    /// Countdown running, enemies on the field.
    WaveActive,
    /// Wave timer elapsed; remaining enemies are being recalled.
    Resolving,
    /// Every configured wave survived.
    Won,
    /// Every tower destroyed.
    Lost,
}

impl MatchPhase {
    /// Won and Lost are irreversible within a session.
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchPhase::Won | MatchPhase::Lost)
    }
}

/// Wave countdown clock state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerState {
    #[default]
    Stopped,
    Running,
}

/// Obstacle placement session state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementState {
    #[default]
    Idle,
    /// A template is selected and its preview follows the cursor.
    PreviewActive,
}
