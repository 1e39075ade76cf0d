//! Debug overlay for hit testing.
//!
//! Toggle with the 'D' key during gameplay.
//! Shows:
//! - The live hit circle of every bubble (it follows the tap spring)
//! - The exit lines bubbles must cross before they are retired
//! - The band spawns are confined to

use bevy::{color::palettes::css, input::common_conditions::input_just_pressed, prelude::*};

use super::{
    bubble::{Bubble, EXIT_MARGIN},
    canvas::CanvasMetrics,
    manager::BubbleManager,
    scene::{PlayScene, PlaySystems},
};
use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<DebugOverlayVisible>();

    app.add_systems(
        Update,
        toggle_debug.run_if(in_state(Screen::Gameplay).and(input_just_pressed(KeyCode::KeyD))),
    );

    app.add_systems(
        Update,
        draw_debug_overlay.in_set(PlaySystems).run_if(debug_visible),
    );
}

/// Resource to track if the overlay is visible.
#[derive(Resource, Default)]
pub struct DebugOverlayVisible(pub bool);

fn debug_visible(debug: Res<DebugOverlayVisible>) -> bool {
    debug.0
}

fn toggle_debug(mut debug: ResMut<DebugOverlayVisible>) {
    debug.0 = !debug.0;
    let state = if debug.0 { "ON" } else { "OFF" };
    info!("Debug overlay: {}", state);
}

fn draw_hit_circle(gizmos: &mut Gizmos, bubble: &Bubble, canvas: &CanvasMetrics, color: Srgba) {
    let centre = canvas.normalized_to_world(bubble.x, bubble.y);
    gizmos.circle_2d(
        Isometry2d::from_translation(centre),
        bubble.r * bubble.scale(),
        color,
    );
    gizmos.cross_2d(Isometry2d::from_translation(centre), 4.0, color);
}

fn draw_debug_overlay(
    mut gizmos: Gizmos,
    scene: Res<PlayScene>,
    manager: Res<BubbleManager>,
    canvas: Res<CanvasMetrics>,
) {
    let target = scene.indicator().map(|b| b.romaji.as_str());
    for bubble in manager.entities() {
        let color = if !bubble.is_active() {
            css::GRAY
        } else if Some(bubble.romaji.as_str()) == target {
            css::LIMEGREEN
        } else {
            css::AQUA
        };
        draw_hit_circle(&mut gizmos, bubble, &canvas, color);
    }
    if let Some(indicator) = scene.indicator() {
        draw_hit_circle(&mut gizmos, indicator, &canvas, css::GOLD);
    }

    // Exit lines, beyond each edge by the retirement margin.
    let exit_color = css::INDIAN_RED.with_alpha(0.6);
    for y in [-EXIT_MARGIN, 1.0 + EXIT_MARGIN] {
        gizmos.line_2d(
            canvas.normalized_to_world(0.0, y),
            canvas.normalized_to_world(1.0, y),
            exit_color,
        );
    }

    // Spawn band: centres stay one radius inside each side.
    if canvas.is_laid_out() {
        let r_norm = manager.radius() / canvas.width;
        let band_color = css::ORANGE.with_alpha(0.5);
        for x in [r_norm, 1.0 - r_norm] {
            gizmos.line_2d(
                canvas.normalized_to_world(x, 0.0),
                canvas.normalized_to_world(x, 1.0),
                band_color,
            );
        }
    }
}
