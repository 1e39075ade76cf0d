//! Canvas metrics: the logical (CSS pixel) size of the play surface.
//!
//! Gameplay math only ever sees these logical pixels. The primary window is
//! the canvas; `WindowResized` is the resize notifier.

use bevy::{prelude::*, window::PrimaryWindow, window::WindowResized};

use super::{manager::BubbleManager, scene::PlayScene};
use crate::AppSystems;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<CanvasMetrics>();
    app.init_resource::<CanvasMetrics>();
    app.add_systems(Startup, sync_initial_metrics);
    app.add_systems(Update, apply_resize.in_set(AppSystems::TickTimers));
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Resource)]
pub struct CanvasMetrics {
    pub width: f32,
    pub height: f32,
}

impl CanvasMetrics {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Zero-sized canvases have not been laid out yet; spawning waits.
    pub fn is_laid_out(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }

    /// Radius in CSS pixels for a fraction of the smaller side.
    pub fn radius(&self, ratio: f32) -> f32 {
        self.min_side() * ratio
    }

    /// Canvas point (origin top-left, y down) to world space for a 2D camera
    /// centred on the canvas.
    pub fn to_world(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(x - self.width * 0.5, self.height * 0.5 - y)
    }

    /// Normalized position to world space.
    pub fn normalized_to_world(&self, x: f32, y: f32) -> Vec2 {
        self.to_world(x * self.width, y * self.height)
    }
}

fn sync_initial_metrics(
    mut metrics: ResMut<CanvasMetrics>,
    window: Query<&Window, With<PrimaryWindow>>,
) {
    let Ok(window) = window.single() else {
        return;
    };
    *metrics = CanvasMetrics::new(window.width(), window.height());
    info!("Canvas {}x{}", metrics.width, metrics.height);
}

/// Apply the latest resize to the metrics and to everything sized from them.
fn apply_resize(
    mut resized: MessageReader<WindowResized>,
    window: Query<Entity, With<PrimaryWindow>>,
    mut metrics: ResMut<CanvasMetrics>,
    manager: Option<ResMut<BubbleManager>>,
    scene: Option<ResMut<PlayScene>>,
) {
    let primary = window.single().ok();
    let Some(last) = resized
        .read()
        .filter(|e| primary.is_none_or(|p| p == e.window))
        .last()
    else {
        return;
    };

    let next = CanvasMetrics::new(last.width, last.height);
    if next == *metrics {
        return;
    }
    *metrics = next;
    debug!("Canvas resized to {}x{}", next.width, next.height);

    if let Some(mut manager) = manager {
        manager.handle_resize(next);
    }
    if let Some(mut scene) = scene {
        scene.handle_resize(next);
    }
}
