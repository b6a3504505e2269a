//! Obstacle placement: template selection, cursor preview, rotation, and
//! per-wave quotas.
//!
//! The preview is a non-colliding entity carrying only [`Preview`] and a
//! [`Transform`]; contacts naming it resolve to no obstacle and are ignored.

use glam::{Quat, Vec3};
use hecs::{Entity, World};
use log::debug;

use beachhead_core::components::{Obstacle, Preview};
use beachhead_core::config::ObstacleTemplate;
use beachhead_core::constants::PLACEMENT_ROTATION_STEPS;
use beachhead_core::enums::PlacementState;
use beachhead_core::state::{PlacementView, QuotaView};
use beachhead_core::types::{SurfaceHit, Transform};

use crate::systems::obstacle_registry::ObstacleRegistry;

/// Placement allowance for one obstacle template in the current wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleQuota {
    pub max_count: u32,
    pub current_count: u32,
    /// False exactly when `current_count` has reached `max_count`.
    pub can_place: bool,
}

impl ObstacleQuota {
    pub fn new(max_count: u32) -> Self {
        Self {
            max_count,
            current_count: 0,
            can_place: max_count > 0,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.max_count.saturating_sub(self.current_count)
    }

    fn refresh(&mut self) {
        self.can_place = self.current_count < self.max_count;
    }
}

#[derive(Debug)]
pub struct PlacementController {
    quotas: Vec<ObstacleQuota>,
    state: PlacementState,
    selected: Option<usize>,
    preview: Option<Entity>,
    preview_visible: bool,
    cursor: Option<SurfaceHit>,
    /// Last projected spot that passed validation.
    last_valid: Option<Vec3>,
    rotation_step: usize,
    placement_layer: u32,
}

impl PlacementController {
    pub fn new(templates: &[ObstacleTemplate], placement_layer: u32) -> Self {
        Self {
            quotas: templates
                .iter()
                .map(|t| ObstacleQuota::new(t.initial_max_count))
                .collect(),
            state: PlacementState::Idle,
            selected: None,
            preview: None,
            preview_visible: false,
            cursor: None,
            last_valid: None,
            rotation_step: 0,
            placement_layer,
        }
    }

    pub fn state(&self) -> PlacementState {
        self.state
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn preview(&self) -> Option<Entity> {
        self.preview
    }

    pub fn preview_visible(&self) -> bool {
        self.preview_visible
    }

    pub fn quotas(&self) -> &[ObstacleQuota] {
        &self.quotas
    }

    pub fn quota(&self, index: usize) -> Option<&ObstacleQuota> {
        self.quotas.get(index)
    }

    pub fn rotation_degrees(&self) -> f32 {
        PLACEMENT_ROTATION_STEPS[self.rotation_step]
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.rotation_degrees().to_radians())
    }

    /// Open a preview session for template `index`, replacing any current
    /// preview. Out-of-range indices are ignored.
    pub fn select(&mut self, world: &mut World, index: usize) -> bool {
        if index >= self.quotas.len() {
            debug!("select ignored: no obstacle template {index}");
            return false;
        }
        self.discard_preview(world);

        let preview = world.spawn((
            Preview {
                template: index,
                visible: false,
            },
            Transform::new(Vec3::ZERO, self.rotation()),
        ));
        self.preview = Some(preview);
        self.selected = Some(index);
        self.state = PlacementState::PreviewActive;
        self.update_preview(world);
        true
    }

    /// Record the latest cursor ray result and re-project the preview.
    pub fn set_cursor(&mut self, world: &mut World, hit: Option<SurfaceHit>) {
        self.cursor = hit;
        self.update_preview(world);
    }

    /// Project the cursor onto the ground and show or hide the preview.
    pub fn update_preview(&mut self, world: &mut World) {
        let (Some(index), Some(preview)) = (self.selected, self.preview) else {
            return;
        };
        let can_place = self.quotas.get(index).is_some_and(|q| q.can_place);

        let spot = match self.cursor {
            Some(hit) if can_place && hit.layer == self.placement_layer => {
                Some(Vec3::new(hit.point.x, 0.0, hit.point.z))
            }
            _ => None,
        };
        if spot.is_some() {
            self.last_valid = spot;
        }
        self.preview_visible = spot.is_some();

        let rotation = self.rotation();
        if let Ok(mut p) = world.get::<&mut Preview>(preview) {
            p.visible = self.preview_visible;
        }
        if let Ok(mut transform) = world.get::<&mut Transform>(preview) {
            if let Some(position) = spot {
                transform.position = position;
            }
            transform.rotation = rotation;
        }
    }

    /// Cycle to the next rotation step. Only meaningful with a preview open.
    pub fn rotate(&mut self, world: &mut World) {
        if self.state != PlacementState::PreviewActive {
            return;
        }
        self.rotation_step = (self.rotation_step + 1) % PLACEMENT_ROTATION_STEPS.len();
        let rotation = self.rotation();
        if let Some(preview) = self.preview {
            if let Ok(mut transform) = world.get::<&mut Transform>(preview) {
                transform.rotation = rotation;
            }
        }
    }

    /// Place the previewed obstacle. Returns the new obstacle, or `None` if
    /// the preview is hidden or the quota is spent.
    pub fn confirm(
        &mut self,
        world: &mut World,
        templates: &[ObstacleTemplate],
        registry: &mut ObstacleRegistry,
    ) -> Option<Entity> {
        if self.state != PlacementState::PreviewActive || !self.preview_visible {
            debug!("confirm ignored: no visible preview");
            return None;
        }
        let index = self.selected?;
        let template = templates.get(index)?;
        let position = self.last_valid?;
        let rotation = self.rotation();
        let quota = self.quotas.get_mut(index)?;
        if quota.current_count >= quota.max_count {
            debug!("confirm ignored: quota for '{}' spent", template.name);
            return None;
        }

        let obstacle = world.spawn((
            Obstacle {
                template: index,
                kind: template.kind,
                health: template.health,
                damage: template.damage,
                strike_interval_secs: template.strike_interval_secs,
            },
            Transform::new(position, rotation),
        ));
        registry.register(obstacle);

        quota.current_count += 1;
        quota.refresh();

        self.discard_preview(world);
        self.rotation_step = 0;
        Some(obstacle)
    }

    /// Abandon the preview session.
    pub fn cancel(&mut self, world: &mut World) {
        self.discard_preview(world);
    }

    /// New wave allowance: counts back to zero for every template.
    pub fn reset_quotas(&mut self) {
        for quota in &mut self.quotas {
            quota.current_count = 0;
            quota.refresh();
        }
    }

    /// Install per-template maximums for the wave being sent.
    ///
    /// A maximum below the count already placed is raised to that count so
    /// `current_count <= max_count` always holds.
    pub fn apply_limits(&mut self, limits: &[u32]) {
        for (quota, &max) in self.quotas.iter_mut().zip(limits) {
            quota.max_count = max.max(quota.current_count);
            quota.refresh();
        }
    }

    pub fn view(&self) -> PlacementView {
        PlacementView {
            state: self.state,
            selected: self.selected,
            preview_visible: self.preview_visible,
            rotation_degrees: self.rotation_degrees(),
        }
    }

    pub fn quota_views(&self, templates: &[ObstacleTemplate]) -> Vec<QuotaView> {
        templates
            .iter()
            .zip(&self.quotas)
            .map(|(t, q)| QuotaView {
                name: t.name.clone(),
                description: t.description.clone(),
                health: t.health,
                damage: t.damage,
                max_count: q.max_count,
                current_count: q.current_count,
                can_place: q.can_place,
                remaining: q.remaining(),
            })
            .collect()
    }

    fn discard_preview(&mut self, world: &mut World) {
        if let Some(preview) = self.preview.take() {
            let _ = world.despawn(preview);
        }
        self.selected = None;
        self.preview_visible = false;
        self.last_valid = None;
        self.state = PlacementState::Idle;
    }
}
