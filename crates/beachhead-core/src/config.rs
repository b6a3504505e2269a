//! Match configuration: static data loaded once at match start.
//!
//! Wave composition, countdown durations, spawn cadence, obstacle templates
//! and their per-wave quotas, enemy archetypes, and tower layout. Nothing
//! here changes while a match runs.

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PLACEMENT_LAYER, DEFAULT_SEED, SPIKE_DEFAULT_INTERVAL_SECS};
use crate::enums::{EnemyCategory, ObstacleKind};
use crate::error::{ConfigError, ConfigResult};

/// Enemy counts for a single wave.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveDescriptor {
    /// Enemies to release: (category, count). Order is irrelevant, the
    /// roster is shuffled before release.
    pub enemies: Vec<(EnemyCategory, u32)>,
}

impl WaveDescriptor {
    /// Number of enemies of `category` in this wave.
    pub fn count(&self, category: EnemyCategory) -> u32 {
        self.enemies
            .iter()
            .filter(|(c, _)| *c == category)
            .map(|(_, n)| n)
            .sum()
    }

    /// Total enemies in this wave.
    pub fn total(&self) -> u32 {
        self.enemies.iter().map(|(_, n)| n).sum()
    }
}

/// Stats for one enemy archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub category: EnemyCategory,
    pub health: f32,
    pub speed: f32,
    pub damage: f32,
}

/// Archetype for a placeable obstacle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: ObstacleKind,
    pub health: f32,
    pub damage: f32,
    /// Seconds between spike strikes.
    #[serde(default = "default_strike_interval")]
    pub strike_interval_secs: f64,
    /// Placement cap before any wave-specific quota applies.
    #[serde(default)]
    pub initial_max_count: u32,
}

fn default_strike_interval() -> f64 {
    SPIKE_DEFAULT_INTERVAL_SECS
}

/// A defended structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerConfig {
    pub position: Vec3,
    pub health: f32,
}

/// Complete configuration for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// RNG seed for determinism. Same seed = same match.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Waves in play order.
    pub waves: Vec<WaveDescriptor>,
    /// Countdown length per wave index.
    pub wave_durations_secs: Vec<f64>,
    /// Seconds between two releases within a wave.
    pub spawn_cadence_secs: f64,
    pub spawn_position: Vec3,
    /// Candidate navigation destinations shared by every enemy.
    pub destinations: Vec<Vec3>,
    pub enemy_templates: Vec<EnemyTemplate>,
    pub obstacle_templates: Vec<ObstacleTemplate>,
    /// Max placement counts per obstacle template, keyed by wave number
    /// (the wave index after it has been incremented by sending a wave).
    /// Wave numbers without an entry keep the previous limits.
    #[serde(default)]
    pub quota_schedule: BTreeMap<u32, Vec<u32>>,
    pub towers: Vec<TowerConfig>,
    /// Surface layer that accepts obstacle placement.
    #[serde(default = "default_placement_layer")]
    pub placement_layer: u32,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_placement_layer() -> u32 {
    DEFAULT_PLACEMENT_LAYER
}

impl MatchConfig {
    /// Parse and validate a config from JSON text.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a config file.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Check the structural invariants the simulation relies on.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.waves.is_empty() {
            return Err(ConfigError::NoWaves);
        }
        if self.destinations.is_empty() {
            return Err(ConfigError::NoDestinations);
        }
        if self.towers.is_empty() {
            return Err(ConfigError::NoTowers);
        }
        if !self.spawn_cadence_secs.is_finite() || self.spawn_cadence_secs < 0.0 {
            return Err(ConfigError::InvalidCadence(self.spawn_cadence_secs));
        }
        for index in 0..self.waves.len() {
            let secs = *self
                .wave_durations_secs
                .get(index)
                .ok_or(ConfigError::MissingDuration { index })?;
            if !secs.is_finite() || secs <= 0.0 {
                return Err(ConfigError::InvalidDuration { index, secs });
            }
        }
        let expected = self.obstacle_templates.len();
        for (&wave_number, limits) in &self.quota_schedule {
            if limits.len() != expected {
                return Err(ConfigError::QuotaArity {
                    wave_number,
                    found: limits.len(),
                    expected,
                });
            }
        }
        for template in &self.enemy_templates {
            if template.health <= 0.0 {
                return Err(ConfigError::InvalidHealth {
                    what: format!("{:?} enemy", template.category),
                    health: template.health,
                });
            }
        }
        for template in &self.obstacle_templates {
            if template.health <= 0.0 {
                return Err(ConfigError::InvalidHealth {
                    what: format!("obstacle '{}'", template.name),
                    health: template.health,
                });
            }
        }
        for (i, tower) in self.towers.iter().enumerate() {
            if tower.health <= 0.0 {
                return Err(ConfigError::InvalidHealth {
                    what: format!("tower {i}"),
                    health: tower.health,
                });
            }
        }
        Ok(())
    }

    /// Number of configured waves.
    pub fn wave_count(&self) -> u32 {
        self.waves.len() as u32
    }

    /// Countdown length for a wave index, if configured.
    pub fn duration_for(&self, wave_index: u32) -> Option<f64> {
        self.wave_durations_secs.get(wave_index as usize).copied()
    }

    /// Quota limits for a wave number, if configured.
    pub fn quota_limits(&self, wave_number: u32) -> Option<&[u32]> {
        self.quota_schedule.get(&wave_number).map(Vec::as_slice)
    }

    /// Stats for an enemy category, if configured.
    pub fn enemy_template(&self, category: EnemyCategory) -> Option<&EnemyTemplate> {
        self.enemy_templates.iter().find(|t| t.category == category)
    }

    /// Largest count of `category` in any single wave.
    pub fn peak_count(&self, category: EnemyCategory) -> u32 {
        self.waves
            .iter()
            .map(|w| w.count(category))
            .max()
            .unwrap_or(0)
    }
}
