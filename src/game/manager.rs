//! The pool of roaming bubbles.
//!
//! [`BubbleManager`] owns every live gameplay bubble. It schedules spawn
//! batches from the current difficulty, steps and culls bubbles, keeps their
//! radius in sync with the canvas and answers hit tests. The indicator is not
//! part of the pool.

use bevy::prelude::*;

use super::{
    bubble::Bubble,
    canvas::CanvasMetrics,
    config::GameConfig,
    language::{SymbolDef, SymbolSet},
    rng::GameRng,
};
use crate::theme::ThemePalette;

/// Read-only data and the random source a spawn draws from.
pub struct SpawnContext<'a> {
    pub symbols: &'a SymbolSet,
    pub palette: &'a ThemePalette,
    pub rng: &'a mut GameRng,
}

#[derive(Resource, Debug, Clone)]
pub struct BubbleManager {
    bubbles: Vec<Bubble>,
    /// Seconds until the next batch; non-positive means due.
    spawn_timer: f32,
    r_px: f32,
    difficulty: f32,
    canvas: CanvasMetrics,
    config: GameConfig,
}

impl BubbleManager {
    pub fn new(canvas: CanvasMetrics, config: GameConfig) -> Self {
        Self {
            bubbles: Vec::new(),
            spawn_timer: 0.0,
            r_px: canvas.radius(config.bubble_radius_ratio),
            difficulty: 1.0,
            canvas,
            config,
        }
    }

    /// Live bubbles in spawn order.
    pub fn entities(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn entity_mut(&mut self, index: usize) -> Option<&mut Bubble> {
        self.bubbles.get_mut(index)
    }

    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    pub fn radius(&self) -> f32 {
        self.r_px
    }

    pub fn canvas(&self) -> CanvasMetrics {
        self.canvas
    }

    fn speed_multiplier(&self, difficulty: f32) -> f32 {
        difficulty.min(self.config.speed_difficulty_cap)
    }

    /// Bubbles per batch at the current difficulty.
    pub fn batch_size(&self) -> u32 {
        // The float-to-int cast saturates; the add must too.
        (self.difficulty.floor() as u32)
            .saturating_add(1)
            .min(self.config.max_bubbles_per_spawn)
    }

    /// Seconds between batches at the current difficulty.
    pub fn spawn_interval(&self) -> f32 {
        self.config.spawn_interval / self.difficulty
    }

    /// Set the difficulty multiplier (at least 1). Bubbles already in flight
    /// keep their individual variance: only the change in the capped speed
    /// multiplier is applied to them.
    pub fn set_difficulty(&mut self, mult: f32) {
        let mult = if mult.is_finite() { mult.max(1.0) } else { 1.0 };
        let ratio = self.speed_multiplier(mult) / self.speed_multiplier(self.difficulty);
        self.difficulty = mult;
        if ratio != 1.0 {
            for bubble in &mut self.bubbles {
                bubble.speed *= ratio;
            }
        }
    }

    /// Run due spawn batches, then step every bubble and cull the inactive.
    ///
    /// A long frame runs several batches to catch up, but never more than
    /// `max_spawn_batches_per_update`; anything beyond that is dropped and the
    /// schedule restarts from now.
    pub fn update(&mut self, dt: f32, ctx: &mut SpawnContext<'_>) {
        self.spawn_timer -= dt;
        let mut batches = 0;
        while self.spawn_timer <= 0.0 {
            if batches >= self.config.max_spawn_batches_per_update {
                debug!("Dropping spawn backlog after {} batches", batches);
                self.spawn_timer = self.spawn_interval();
                break;
            }
            for _ in 0..self.batch_size() {
                self.spawn(None, ctx);
            }
            self.spawn_timer += self.spawn_interval();
            batches += 1;
        }

        for bubble in &mut self.bubbles {
            bubble.step(dt);
        }
        if self.bubbles.iter().any(|b| !b.is_active()) {
            self.bubbles.retain(Bubble::is_active);
        }
    }

    /// Adopt new canvas metrics; live bubbles take the new radius in place.
    pub fn handle_resize(&mut self, canvas: CanvasMetrics) {
        self.canvas = canvas;
        self.r_px = canvas.radius(self.config.bubble_radius_ratio);
        for bubble in &mut self.bubbles {
            bubble.r = self.r_px;
        }
    }

    /// Index of the topmost bubble under the CSS-pixel point. Later spawns
    /// draw on top, so they win.
    pub fn hit_test(&self, px: f32, py: f32) -> Option<usize> {
        let CanvasMetrics { width, height } = self.canvas;
        self.bubbles
            .iter()
            .rposition(|b| b.contains(px, py, width, height))
    }

    pub fn clear(&mut self) {
        self.bubbles.clear();
        self.spawn_timer = 0.0;
    }

    /// Force one bubble of `symbol` onto the field right away.
    pub fn guarantee(&mut self, symbol: &SymbolDef, ctx: &mut SpawnContext<'_>) -> bool {
        self.spawn(Some(symbol), ctx)
    }

    /// Spawn one bubble at the entry edge, of `symbol` or a random symbol.
    /// Returns `false` when nothing could be spawned: no language data yet, or
    /// a canvas that has not been laid out.
    pub fn spawn(&mut self, symbol: Option<&SymbolDef>, ctx: &mut SpawnContext<'_>) -> bool {
        if !self.canvas.is_laid_out() {
            return false;
        }
        let symbols = ctx.symbols;
        if symbols.is_empty() {
            return false;
        }
        let Some(symbol) = symbol.or_else(|| symbols.random_symbol(ctx.rng)) else {
            return false;
        };
        let glyph = symbols.random_glyph(symbol, ctx.rng).to_owned();

        let r_norm = (self.r_px / self.canvas.width).min(0.5);
        let x = r_norm + ctx.rng.unit() * (1.0 - 2.0 * r_norm);
        let y = self.config.direction.spawn_y(r_norm);

        let colour = ctx.palette.random_colour(ctx.rng);
        let mut bubble = Bubble::new(x, y, colour, glyph, symbol.roman.clone(), self.r_px)
            .with_direction(self.config.direction);

        let variance = 1.0 + ctx.rng.signed_unit() * self.config.speed_variance;
        bubble.speed =
            self.config.bubble_speed * self.speed_multiplier(self.difficulty) * variance;

        if ctx.rng.chance(self.config.romaji_spawn_prob) {
            bubble.showing_romaji = true;
        }

        self.bubbles.push(bubble);
        debug!("Spawned '{}' [{:?}] ({} live)", symbol.roman, symbol.category, self.bubbles.len());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{config::TravelDirection, language::tests::sample};
    use approx::assert_relative_eq;

    struct Fixture {
        symbols: SymbolSet,
        palette: ThemePalette,
        rng: GameRng,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                symbols: sample(),
                palette: ThemePalette::default(),
                rng: GameRng::seeded(17),
            }
        }

        fn ctx(&mut self) -> SpawnContext<'_> {
            SpawnContext {
                symbols: &self.symbols,
                palette: &self.palette,
                rng: &mut self.rng,
            }
        }
    }

    fn canvas() -> CanvasMetrics {
        CanvasMetrics::new(400.0, 800.0)
    }

    /// Bubbles that barely move, so a long frame does not cull them.
    fn slow_config() -> GameConfig {
        GameConfig {
            bubble_speed: 1e-4,
            ..GameConfig::default()
        }
    }

    #[test]
    fn first_update_spawns_a_batch() {
        let mut fx = Fixture::new();
        let mut manager = BubbleManager::new(canvas(), GameConfig::default());
        manager.update(0.016, &mut fx.ctx());
        assert_eq!(manager.entities().len(), 2);
    }

    #[test]
    fn spawns_stay_inside_horizontally() {
        let mut fx = Fixture::new();
        let mut manager = BubbleManager::new(canvas(), GameConfig::default());
        let r_norm = manager.radius() / canvas().width;
        for _ in 0..200 {
            assert!(manager.spawn(None, &mut fx.ctx()));
        }
        for b in manager.entities() {
            assert!(b.x >= r_norm && b.x <= 1.0 - r_norm, "x = {}", b.x);
            assert_relative_eq!(b.y, 1.0 + r_norm);
            assert_relative_eq!(b.r, 24.0);
        }
    }

    #[test]
    fn downward_bubbles_enter_from_the_top() {
        let mut fx = Fixture::new();
        let config = GameConfig {
            direction: TravelDirection::Down,
            ..GameConfig::default()
        };
        let mut manager = BubbleManager::new(canvas(), config);
        manager.spawn(None, &mut fx.ctx());
        let b = &manager.entities()[0];
        assert!(b.y < 0.0);
        assert_eq!(b.direction, TravelDirection::Down);
    }

    #[test]
    fn speeds_vary_within_bounds() {
        let mut fx = Fixture::new();
        let mut manager = BubbleManager::new(canvas(), GameConfig::default());
        for _ in 0..100 {
            manager.spawn(None, &mut fx.ctx());
        }
        let speeds: Vec<f32> = manager.entities().iter().map(|b| b.speed).collect();
        assert!(speeds.iter().all(|s| (0.14..=0.26).contains(s)));
        let min = speeds.iter().cloned().fold(f32::MAX, f32::min);
        let max = speeds.iter().cloned().fold(f32::MIN, f32::max);
        assert!(max - min > 0.01);
    }

    #[test]
    fn some_bubbles_start_on_romaji() {
        let mut fx = Fixture::new();
        let mut manager = BubbleManager::new(canvas(), GameConfig::default());
        for _ in 0..200 {
            manager.spawn(None, &mut fx.ctx());
        }
        let romaji = manager
            .entities()
            .iter()
            .filter(|b| b.showing_romaji)
            .count();
        assert!(romaji > 0 && romaji < 200);
    }

    #[test]
    fn catch_up_is_bounded() {
        let mut fx = Fixture::new();
        let mut manager = BubbleManager::new(canvas(), slow_config());
        manager.set_difficulty(4.0);
        assert_eq!(manager.batch_size(), MAX_BATCH);
        manager.update(10.0, &mut fx.ctx());
        let cap = GameConfig::default().max_spawn_batches_per_update;
        assert_eq!(manager.entities().len() as u32, cap * MAX_BATCH);
        assert!(manager.spawn_timer > 0.0);
    }

    const MAX_BATCH: u32 = crate::game::config::MAX_BUBBLES_PER_SPAWN;

    #[test]
    fn batch_grows_with_difficulty() {
        let mut manager = BubbleManager::new(canvas(), GameConfig::default());
        assert_eq!(manager.batch_size(), 2);
        manager.set_difficulty(1.9);
        assert_eq!(manager.batch_size(), 2);
        manager.set_difficulty(2.0);
        assert_eq!(manager.batch_size(), 3);
        assert_relative_eq!(manager.spawn_interval(), 0.6);
    }

    #[test]
    fn huge_difficulty_clamps_batch_size() {
        let mut manager = BubbleManager::new(canvas(), GameConfig::default());
        manager.set_difficulty(5.0e9);
        assert_eq!(manager.batch_size(), MAX_BATCH);
        manager.set_difficulty(f32::MAX);
        assert_eq!(manager.batch_size(), MAX_BATCH);
    }

    #[test]
    fn difficulty_rescales_live_speeds_by_capped_ratio() {
        let mut fx = Fixture::new();
        let mut manager = BubbleManager::new(canvas(), GameConfig::default());
        for _ in 0..5 {
            manager.spawn(None, &mut fx.ctx());
        }
        let before: Vec<f32> = manager.entities().iter().map(|b| b.speed).collect();

        manager.set_difficulty(1.5);
        for (b, s) in manager.entities().iter().zip(&before) {
            assert_relative_eq!(b.speed, s * 1.5, epsilon = 1e-6);
        }

        manager.set_difficulty(3.0);
        for (b, s) in manager.entities().iter().zip(&before) {
            assert_relative_eq!(b.speed, s * 2.0, epsilon = 1e-6);
        }

        manager.set_difficulty(4.0);
        for (b, s) in manager.entities().iter().zip(&before) {
            assert_relative_eq!(b.speed, s * 2.0, epsilon = 1e-6);
        }

        manager.set_difficulty(1.0);
        for (b, s) in manager.entities().iter().zip(&before) {
            assert_relative_eq!(b.speed, *s, epsilon = 1e-6);
        }
    }

    #[test]
    fn difficulty_never_drops_below_one() {
        let mut manager = BubbleManager::new(canvas(), GameConfig::default());
        manager.set_difficulty(0.0);
        assert_eq!(manager.difficulty(), 1.0);
        manager.set_difficulty(f32::NAN);
        assert_eq!(manager.difficulty(), 1.0);
    }

    #[test]
    fn topmost_bubble_wins_the_hit_test() {
        let mut fx = Fixture::new();
        let mut manager = BubbleManager::new(canvas(), GameConfig::default());
        manager.spawn(None, &mut fx.ctx());
        manager.spawn(None, &mut fx.ctx());
        for i in 0..2 {
            let b = manager.entity_mut(i).unwrap();
            b.x = 0.5;
            b.y = 0.5;
        }
        assert_eq!(manager.hit_test(200.0, 400.0), Some(1));
        assert_eq!(manager.hit_test(10.0, 10.0), None);

        manager.entity_mut(1).unwrap().pop();
        assert_eq!(manager.hit_test(200.0, 400.0), Some(0));
    }

    #[test]
    fn resize_updates_live_radii() {
        let mut fx = Fixture::new();
        let mut manager = BubbleManager::new(canvas(), GameConfig::default());
        manager.spawn(None, &mut fx.ctx());
        let x = manager.entities()[0].x;

        manager.handle_resize(CanvasMetrics::new(1000.0, 500.0));
        assert_relative_eq!(manager.radius(), 30.0);
        assert_relative_eq!(manager.entities()[0].r, 30.0);
        assert_eq!(manager.entities()[0].x, x);
    }

    #[test]
    fn bubbles_leave_and_are_culled() {
        let mut fx = Fixture::new();
        let config = GameConfig {
            spawn_interval: 100.0,
            ..GameConfig::default()
        };
        let mut manager = BubbleManager::new(canvas(), config);
        manager.update(0.0, &mut fx.ctx());
        assert_eq!(manager.entities().len(), 2);
        for _ in 0..100 {
            manager.update(0.1, &mut fx.ctx());
        }
        assert!(manager.entities().is_empty());
    }

    #[test]
    fn unlaid_canvas_skips_spawns() {
        let mut fx = Fixture::new();
        let mut manager = BubbleManager::new(CanvasMetrics::default(), GameConfig::default());
        manager.update(5.0, &mut fx.ctx());
        assert!(manager.entities().is_empty());
        assert!(!manager.spawn(None, &mut fx.ctx()));
    }

    #[test]
    fn empty_language_skips_spawns() {
        let mut fx = Fixture::new();
        fx.symbols = SymbolSet::default();
        let mut manager = BubbleManager::new(canvas(), GameConfig::default());
        manager.update(5.0, &mut fx.ctx());
        assert!(manager.entities().is_empty());
    }

    #[test]
    fn guarantee_spawns_the_requested_symbol() {
        let mut fx = Fixture::new();
        let mut manager = BubbleManager::new(canvas(), GameConfig::default());
        let ka = fx.symbols.find_by_roman("ka").unwrap().clone();
        assert!(manager.guarantee(&ka, &mut fx.ctx()));
        let b = &manager.entities()[0];
        assert_eq!(b.romaji, "ka");
        assert!(b.glyph == "か" || b.glyph == "カ");
    }

    #[test]
    fn clear_empties_the_pool() {
        let mut fx = Fixture::new();
        let mut manager = BubbleManager::new(canvas(), GameConfig::default());
        manager.update(0.0, &mut fx.ctx());
        manager.clear();
        assert!(manager.entities().is_empty());
    }
}
