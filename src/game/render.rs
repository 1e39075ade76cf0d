//! Drawing the field.
//!
//! Bubbles are gizmo rings: a few translucent inner rings stand in for the
//! fill, the outer ring is the rim and a flash adds a second rim. Labels come
//! from a pool of `Text2d` entities that is re-synced every frame, so no
//! bubble ever owns an entity. Roaming bubbles draw first, then the
//! indicator, then floating labels.

use bevy::prelude::*;

use super::{
    bubble::{Bubble, FlashTint},
    canvas::CanvasMetrics,
    manager::BubbleManager,
    scene::{PlayScene, PlaySystems},
};
use crate::{
    AppSystems,
    screens::Screen,
    theme::{
        GameFont,
        palette::{ERROR_RIM, FLASH_RIM, LABEL_TEXT},
    },
};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<BubbleLabel>();
    app.add_systems(OnEnter(Screen::Gameplay), spawn_streak_hud);
    app.add_systems(
        Update,
        (draw_bubbles, sync_labels, update_streak_hud)
            .after(AppSystems::Update)
            .in_set(PlaySystems),
    );
}

/// Inner rings used to suggest a filled body.
const FILL_RINGS: usize = 4;

/// Gap between the rim and the flash ring, in pixels.
const FLASH_RING_GAP: f32 = 2.0;

/// Glyph height relative to the bubble radius.
const GLYPH_SIZE: f32 = 1.0;

/// Romaji are longer, so they render smaller.
const ROMAJI_SIZE: f32 = 0.7;

const FLOATING_LABEL_SIZE: f32 = 24.0;

/// One slot of the label pool.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct BubbleLabel {
    pub slot: usize,
}

#[derive(Component)]
struct StreakHud;

/// What one label slot should show this frame.
#[derive(Debug, Clone, PartialEq)]
struct LabelView {
    text: String,
    position: Vec2,
    size: f32,
    alpha: f32,
    z: f32,
}

impl LabelView {
    fn for_bubble(bubble: &Bubble, canvas: &CanvasMetrics, z: f32) -> Self {
        let size_ratio = if bubble.showing_romaji {
            ROMAJI_SIZE
        } else {
            GLYPH_SIZE
        };
        Self {
            text: bubble.label().to_string(),
            position: canvas.normalized_to_world(bubble.x, bubble.y),
            size: bubble.r * bubble.scale() * bubble.current_text_scale() * size_ratio,
            alpha: bubble.current_text_opacity(),
            z,
        }
    }
}

fn rim_colour(tint: FlashTint) -> Color {
    match tint {
        FlashTint::Tap => FLASH_RIM,
        FlashTint::Error => ERROR_RIM,
    }
}

fn draw_bubble(gizmos: &mut Gizmos, bubble: &Bubble, canvas: &CanvasMetrics) {
    let centre = Isometry2d::from_translation(canvas.normalized_to_world(bubble.x, bubble.y));
    let r = bubble.r * bubble.scale();

    for ring in 1..FILL_RINGS {
        let f = ring as f32 / FILL_RINGS as f32;
        gizmos.circle_2d(centre, r * f, bubble.color.with_alpha(0.35));
    }
    gizmos.circle_2d(centre, r, bubble.color);

    let flash = bubble.flash_alpha();
    if flash > 0.0 {
        gizmos.circle_2d(
            centre,
            r + FLASH_RING_GAP,
            rim_colour(bubble.flash_tint()).with_alpha(flash),
        );
    }
}

fn draw_bubbles(
    mut gizmos: Gizmos,
    scene: Res<PlayScene>,
    manager: Res<BubbleManager>,
    canvas: Res<CanvasMetrics>,
) {
    for bubble in manager.entities().iter().filter(|b| b.is_active()) {
        draw_bubble(&mut gizmos, bubble, &canvas);
    }
    if let Some(indicator) = scene.indicator() {
        draw_bubble(&mut gizmos, indicator, &canvas);
    }
}

fn label_views(
    scene: &PlayScene,
    manager: &BubbleManager,
    canvas: &CanvasMetrics,
) -> Vec<LabelView> {
    let live = manager.entities().iter().filter(|b| b.is_active());
    let mut views: Vec<LabelView> = live
        .enumerate()
        .map(|(i, b)| LabelView::for_bubble(b, canvas, 1.0 + i as f32 * 0.001))
        .collect();
    if let Some(indicator) = scene.indicator() {
        views.push(LabelView::for_bubble(indicator, canvas, 5.0));
    }
    views.extend(scene.labels().iter().map(|label| LabelView {
        text: label.text.clone(),
        position: canvas.normalized_to_world(label.x, label.y),
        size: FLOATING_LABEL_SIZE,
        alpha: label.alpha(),
        z: 6.0,
    }));
    views
}

fn sync_labels(
    mut commands: Commands,
    scene: Res<PlayScene>,
    manager: Res<BubbleManager>,
    canvas: Res<CanvasMetrics>,
    font: Option<Res<GameFont>>,
    mut pool: Query<(
        &BubbleLabel,
        &mut Text2d,
        &mut TextFont,
        &mut TextColor,
        &mut Transform,
        &mut Visibility,
    )>,
) {
    let views = label_views(&scene, &manager, &canvas);
    let font = font.map(|f| f.0.clone()).unwrap_or_default();

    let mut pooled = 0;
    for (label, mut text, mut text_font, mut colour, mut transform, mut visibility) in &mut pool {
        pooled += 1;
        let Some(view) = views.get(label.slot) else {
            *visibility = Visibility::Hidden;
            continue;
        };
        if text.0 != view.text {
            text.0.clone_from(&view.text);
        }
        text_font.font_size = view.size.max(1.0);
        colour.0 = LABEL_TEXT.with_alpha(view.alpha);
        transform.translation = view.position.extend(view.z);
        *visibility = Visibility::Visible;
    }

    for (slot, view) in views.iter().enumerate().skip(pooled) {
        commands.spawn((
            Name::new("Bubble Label"),
            BubbleLabel { slot },
            Text2d::new(view.text.clone()),
            TextFont {
                font: font.clone(),
                font_size: view.size.max(1.0),
                ..default()
            },
            TextColor(LABEL_TEXT.with_alpha(view.alpha)),
            Transform::from_translation(view.position.extend(view.z)),
            DespawnOnExit(Screen::Gameplay),
        ));
    }
}

fn spawn_streak_hud(mut commands: Commands, font: Option<Res<GameFont>>) {
    commands.spawn((
        Name::new("Streak"),
        StreakHud,
        Text2d::new("0"),
        TextFont {
            font: font.map(|f| f.0.clone()).unwrap_or_default(),
            font_size: 28.0,
            ..default()
        },
        TextColor(LABEL_TEXT),
        Transform::from_xyz(0.0, 0.0, 10.0),
        DespawnOnExit(Screen::Gameplay),
    ));
}

/// Streak in the top-right corner, "best" in brackets once it differs.
fn update_streak_hud(
    scene: Res<PlayScene>,
    canvas: Res<CanvasMetrics>,
    mut hud: Query<(&mut Text2d, &mut Transform), With<StreakHud>>,
) {
    let Ok((mut text, mut transform)) = hud.single_mut() else {
        return;
    };
    let label = if scene.best_streak() > scene.streak() {
        format!("{} ({})", scene.streak(), scene.best_streak())
    } else {
        scene.streak().to_string()
    };
    if text.0 != label {
        text.0 = label;
    }
    let corner = canvas.to_world(canvas.width - 48.0, 32.0);
    transform.translation = corner.extend(10.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::{
            config::GameConfig, cues::CueQueue, language::tests::sample, manager::SpawnContext,
            rng::GameRng,
        },
        theme::ThemePalette,
    };

    #[test]
    fn indicator_label_comes_after_the_field() {
        let canvas = CanvasMetrics::new(400.0, 800.0);
        let symbols = sample();
        let palette = ThemePalette::default();
        let mut rng = GameRng::seeded(4);
        let mut cues = CueQueue::default();
        let mut manager = BubbleManager::new(canvas, GameConfig::default());
        let mut scene = PlayScene::new(canvas, GameConfig::default());
        let mut ctx = SpawnContext {
            symbols: &symbols,
            palette: &palette,
            rng: &mut rng,
        };
        scene.enter(&mut manager, &mut ctx, &mut cues);

        let views = label_views(&scene, &manager, &canvas);
        assert_eq!(views.len(), manager.entities().len() + 1);
        let last = views.last().unwrap();
        assert_eq!(last.text, scene.indicator().unwrap().romaji);
        assert!(views[..views.len() - 1].iter().all(|v| v.z < last.z));
    }

    #[test]
    fn romaji_labels_are_smaller() {
        let canvas = CanvasMetrics::new(100.0, 100.0);
        let mut bubble = Bubble::new(0.5, 0.5, Color::WHITE, "あ", "a", 20.0);
        let glyph = LabelView::for_bubble(&bubble, &canvas, 1.0);
        bubble.showing_romaji = true;
        let romaji = LabelView::for_bubble(&bubble, &canvas, 1.0);
        assert_eq!(glyph.text, "あ");
        assert_eq!(romaji.text, "a");
        assert!(romaji.size < glyph.size);
        assert_eq!(glyph.position, Vec2::ZERO);
    }
}
