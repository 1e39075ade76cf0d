//! The play scene: target, streak and difficulty.
//!
//! [`PlayScene`] owns the indicator bubble and the streak, pushes difficulty
//! into the [`BubbleManager`] and keeps the round winnable: after every frame
//! at least one roaming bubble carries the indicator's romaji.

use bevy::prelude::*;

use super::{
    bubble::{Bubble, FlashTint, INDICATOR_ERROR_FLASH},
    canvas::CanvasMetrics,
    config::{GameConfig, INDICATOR_TOP_MARGIN},
    cues::{CueQueue, GameCue, HapticPattern},
    input::{TapHit, TapTarget},
    label::FloatingLabel,
    language::SymbolSet,
    manager::{BubbleManager, SpawnContext},
    rng::GameRng,
};
use crate::{AppSystems, PausableSystems, screens::Screen, theme::ThemePalette};

pub(super) fn plugin(app: &mut App) {
    app.configure_sets(
        Update,
        PlaySystems.run_if(
            in_state(Screen::Gameplay)
                .and(resource_exists::<PlayScene>)
                .and(resource_exists::<BubbleManager>),
        ),
    );
    app.add_systems(OnEnter(Screen::Gameplay), enter_play_scene);
    app.add_systems(OnExit(Screen::Gameplay), exit_play_scene);
    app.add_systems(
        Update,
        advance_play_scene
            .in_set(AppSystems::Update)
            .in_set(PlaySystems)
            .in_set(PausableSystems),
    );
}

/// Systems that need a running play scene.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaySystems;

/// Result of scoring a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// The indicator itself was tapped; it handles that on its own.
    Indicator,
    Correct,
    Wrong,
    /// No target yet, or the tapped bubble is already gone.
    Ignored,
}

#[derive(Resource, Debug, Clone)]
pub struct PlayScene {
    indicator: Option<Bubble>,
    streak: u32,
    best_streak: u32,
    labels: Vec<FloatingLabel>,
    canvas: CanvasMetrics,
    config: GameConfig,
}

/// Capped linear ramp: one full step per `streak_for_level_up` correct taps.
pub fn difficulty_for_streak(streak: u32, config: &GameConfig) -> f32 {
    let ramp = 1.0 + streak as f32 / config.streak_for_level_up as f32;
    ramp.min(config.max_difficulty)
}

impl PlayScene {
    pub fn new(canvas: CanvasMetrics, config: GameConfig) -> Self {
        Self {
            indicator: None,
            streak: 0,
            best_streak: 0,
            labels: Vec::new(),
            canvas,
            config,
        }
    }

    pub fn indicator(&self) -> Option<&Bubble> {
        self.indicator.as_ref()
    }

    pub fn indicator_mut(&mut self) -> Option<&mut Bubble> {
        self.indicator.as_mut()
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    pub fn labels(&self) -> &[FloatingLabel] {
        &self.labels
    }

    /// Start a round: fresh streak, fresh target.
    pub fn enter(
        &mut self,
        manager: &mut BubbleManager,
        ctx: &mut SpawnContext<'_>,
        cues: &mut CueQueue,
    ) {
        manager.handle_resize(self.canvas);
        self.streak = 0;
        self.update_difficulty(manager);
        self.spawn_indicator(manager, ctx, cues);
        info!("Play scene entered ({} symbols)", ctx.symbols.symbols.len());
    }

    pub fn exit(&mut self, manager: &mut BubbleManager) {
        manager.clear();
        self.indicator = None;
        self.labels.clear();
        info!("Play scene exited (best streak {})", self.best_streak);
    }

    /// Advance one frame of `dt` seconds.
    pub fn update(
        &mut self,
        dt: f32,
        manager: &mut BubbleManager,
        ctx: &mut SpawnContext<'_>,
        cues: &mut CueQueue,
    ) {
        manager.update(dt, ctx);

        // A target may be missing when the language or layout was not ready
        // on enter.
        if self.indicator.is_none() {
            self.spawn_indicator(manager, ctx, cues);
        }

        if let Some(target) = self.indicator.as_ref().map(|b| b.romaji.clone())
            && !manager.entities().iter().any(|b| b.romaji == target)
        {
            let symbols = ctx.symbols;
            if let Some(symbol) = symbols.find_by_roman(&target) {
                debug!("Guaranteeing a '{}' bubble", target);
                manager.guarantee(symbol, ctx);
            }
        }

        if let Some(indicator) = self.indicator.as_mut() {
            indicator.step(dt);
        }

        for label in &mut self.labels {
            label.step(dt);
        }
        self.labels.retain(FloatingLabel::is_alive);
    }

    /// Score a tap the input layer has already delivered to the bubble.
    pub fn on_bubble_tap(
        &mut self,
        hit: &TapHit,
        manager: &mut BubbleManager,
        ctx: &mut SpawnContext<'_>,
        cues: &mut CueQueue,
    ) -> TapOutcome {
        let Some(indicator) = self.indicator.as_mut() else {
            return TapOutcome::Ignored;
        };
        let TapTarget::Bubble(index) = hit.target else {
            return TapOutcome::Indicator;
        };

        if hit.romaji == indicator.romaji {
            let Some(bubble) = manager.entity_mut(index) else {
                return TapOutcome::Ignored;
            };
            bubble.pop();
            self.labels
                .push(FloatingLabel::new(bubble.x, bubble.y, &bubble.romaji, bubble.speed));

            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
            self.update_difficulty(manager);
            cues.push(GameCue::PlayPop);
            cues.push(GameCue::Haptic(HapticPattern::Success));
            info!(
                "Matched '{}' (streak {}, difficulty {:.2})",
                hit.romaji, self.streak, manager.difficulty()
            );
            self.spawn_indicator(manager, ctx, cues);
            TapOutcome::Correct
        } else {
            indicator.flash(INDICATOR_ERROR_FLASH, FlashTint::Error);
            debug!("Wrong bubble '{}', wanted '{}'", hit.romaji, indicator.romaji);
            if self.streak > 0 {
                info!("Streak of {} broken", self.streak);
            }
            self.streak = 0;
            self.update_difficulty(manager);
            cues.push(GameCue::Haptic(HapticPattern::Error));
            TapOutcome::Wrong
        }
    }

    fn update_difficulty(&self, manager: &mut BubbleManager) {
        manager.set_difficulty(difficulty_for_streak(self.streak, &self.config));
    }

    /// Pick a new random target, make sure it is on the field and announce it.
    pub fn spawn_indicator(
        &mut self,
        manager: &mut BubbleManager,
        ctx: &mut SpawnContext<'_>,
        cues: &mut CueQueue,
    ) {
        if !self.canvas.is_laid_out() {
            return;
        }
        let symbols = ctx.symbols;
        let Some(symbol) = symbols.random_symbol(ctx.rng) else {
            return;
        };

        let (r, y) = self.indicator_geometry();
        let colour = ctx.palette.random_colour(ctx.rng);
        let variants = [
            symbols.variant(symbol, 0).to_owned(),
            symbols.variant(symbol, 1).to_owned(),
        ];
        self.indicator = Some(Bubble::indicator(
            0.5,
            y,
            colour,
            symbol.roman.clone(),
            variants,
            r,
        ));

        manager.guarantee(symbol, ctx);
        cues.push(GameCue::PlayRoman {
            roman: symbol.roman.clone(),
        });
        info!("New target '{}'", symbol.roman);
    }

    /// Radius and normalized `y` placing the indicator just below the top edge.
    fn indicator_geometry(&self) -> (f32, f32) {
        let r = self.canvas.radius(self.config.indicator_radius_ratio);
        (r, r / self.canvas.height + INDICATOR_TOP_MARGIN)
    }

    /// Re-size and re-seat the indicator for new canvas metrics.
    pub fn handle_resize(&mut self, canvas: CanvasMetrics) {
        self.canvas = canvas;
        if !canvas.is_laid_out() {
            return;
        }
        let (r, y) = self.indicator_geometry();
        if let Some(indicator) = self.indicator.as_mut() {
            indicator.r = r;
            indicator.y = y;
        }
    }
}

fn enter_play_scene(
    mut commands: Commands,
    canvas: Res<CanvasMetrics>,
    config: Res<GameConfig>,
    symbols: Res<SymbolSet>,
    palette: Res<ThemePalette>,
    mut rng: ResMut<GameRng>,
    mut cues: ResMut<CueQueue>,
) {
    let mut manager = BubbleManager::new(*canvas, config.clone());
    let mut scene = PlayScene::new(*canvas, config.clone());
    let mut ctx = SpawnContext {
        symbols: &symbols,
        palette: &palette,
        rng: &mut rng,
    };
    scene.enter(&mut manager, &mut ctx, &mut cues);
    commands.insert_resource(manager);
    commands.insert_resource(scene);
}

fn exit_play_scene(
    mut commands: Commands,
    scene: Option<ResMut<PlayScene>>,
    manager: Option<ResMut<BubbleManager>>,
) {
    if let (Some(mut scene), Some(mut manager)) = (scene, manager) {
        scene.exit(&mut manager);
    }
    commands.remove_resource::<PlayScene>();
    commands.remove_resource::<BubbleManager>();
}

pub(super) fn advance_play_scene(
    time: Res<Time>,
    mut scene: ResMut<PlayScene>,
    mut manager: ResMut<BubbleManager>,
    symbols: Res<SymbolSet>,
    palette: Res<ThemePalette>,
    mut rng: ResMut<GameRng>,
    mut cues: ResMut<CueQueue>,
) {
    // A resumed tab delivers one huge frame; treat it as a short one.
    let dt = time.delta_secs().min(scene.config.max_frame_dt);
    let mut ctx = SpawnContext {
        symbols: &symbols,
        palette: &palette,
        rng: &mut rng,
    };
    scene.update(dt, &mut manager, &mut ctx, &mut cues);
}
