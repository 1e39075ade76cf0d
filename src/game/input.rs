//! Pointer and touch input.
//!
//! A press is resolved to canvas coordinates (logical pixels, origin top-left)
//! and hit-tested against the indicator first, then the roaming bubbles. The
//! bubble that was hit handles the tap itself; the scene is then told which
//! bubble it was so it can score it.

use bevy::{prelude::*, window::PrimaryWindow};

use super::{
    bubble::Bubble,
    cues::CueQueue,
    language::SymbolSet,
    manager::{BubbleManager, SpawnContext},
    rng::GameRng,
    scene::{PlayScene, PlaySystems},
};
use crate::{AppSystems, PausableSystems, screens::Screen, theme::ThemePalette};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<PointerInput>();
    app.add_systems(OnEnter(Screen::Gameplay), attach_pointer);
    app.add_systems(OnExit(Screen::Gameplay), detach_pointer);
    app.add_systems(
        Update,
        handle_pointer_presses
            .in_set(AppSystems::RecordInput)
            .in_set(PlaySystems)
            .in_set(PausableSystems),
    );
}

/// What a press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapTarget {
    Indicator,
    /// Index into [`BubbleManager::entities`].
    Bubble(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapHit {
    pub target: TapTarget,
    pub romaji: String,
}

/// Routes presses to bubbles while attached.
#[derive(Resource, Debug, Default)]
pub struct PointerInput {
    attached: bool,
}

impl PointerInput {
    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Resolve a press at `point` (canvas pixels) at `now` seconds.
    ///
    /// `extra_target` is tested before the pool so the indicator wins over
    /// any bubble drifting underneath it. Returns `None` on a miss or while
    /// detached.
    pub fn handle_pointer_down(
        &self,
        point: Vec2,
        now: f64,
        manager: &mut BubbleManager,
        extra_target: Option<&mut Bubble>,
        cues: &mut CueQueue,
    ) -> Option<TapHit> {
        if !self.is_attached() {
            return None;
        }
        let canvas = manager.canvas();

        if let Some(extra) = extra_target
            && extra.contains(point.x, point.y, canvas.width, canvas.height)
        {
            extra.handle_click(now, cues);
            return Some(TapHit {
                target: TapTarget::Indicator,
                romaji: extra.romaji.clone(),
            });
        }

        let index = manager.hit_test(point.x, point.y)?;
        let bubble = manager.entity_mut(index)?;
        bubble.handle_click(now, cues);
        debug!("Hit '{}' at {:?}", bubble.romaji, point);
        Some(TapHit {
            target: TapTarget::Bubble(index),
            romaji: bubble.romaji.clone(),
        })
    }
}

fn attach_pointer(mut input: ResMut<PointerInput>) {
    input.attach();
}

fn detach_pointer(mut input: ResMut<PointerInput>) {
    input.detach();
}

/// First new touch of the frame, else a fresh left click at the cursor.
fn pressed_point(
    touches: &Touches,
    mouse: &ButtonInput<MouseButton>,
    window: Option<&Window>,
) -> Option<Vec2> {
    if let Some(touch) = touches.iter_just_pressed().next() {
        return Some(touch.position());
    }
    if mouse.just_pressed(MouseButton::Left) {
        return window.and_then(Window::cursor_position);
    }
    None
}

pub(super) fn handle_pointer_presses(
    input: Res<PointerInput>,
    touches: Res<Touches>,
    mouse: Res<ButtonInput<MouseButton>>,
    window: Query<&Window, With<PrimaryWindow>>,
    time: Res<Time>,
    mut manager: ResMut<BubbleManager>,
    mut scene: ResMut<PlayScene>,
    mut cues: ResMut<CueQueue>,
    symbols: Res<SymbolSet>,
    palette: Res<ThemePalette>,
    mut rng: ResMut<GameRng>,
) {
    let Some(point) = pressed_point(&touches, &mouse, window.single().ok()) else {
        return;
    };

    let now = time.elapsed_secs_f64();
    let Some(hit) =
        input.handle_pointer_down(point, now, &mut manager, scene.indicator_mut(), &mut cues)
    else {
        return;
    };

    let mut ctx = SpawnContext {
        symbols: &symbols,
        palette: &palette,
        rng: &mut rng,
    };
    scene.on_bubble_tap(&hit, &mut manager, &mut ctx, &mut cues);
}
