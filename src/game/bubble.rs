//! Bubble entities - the tappable targets.
//!
//! A bubble carries one symbol, shown either as a glyph or as its romaji.
//! Roaming bubbles drift across the canvas; the indicator bubble stays put and
//! shows the symbol the player is hunting for. Both share the same animation
//! state (tap spring, label fade, rim flash), so they are one type with a
//! [`BubbleKind`] tag rather than two.
//!
//! Positions are normalized fractions of the canvas (`x` of width, `y` of
//! height); the radius is in CSS pixels.

use bevy::prelude::*;

use super::{
    config::{BUBBLE_SPEED, TravelDirection},
    cues::{CueQueue, GameCue, HapticPattern},
    spring::{BUBBLE_SQUASH_SCALE, TapSpring},
};

/// Minimum seconds between two registered taps on the same bubble.
pub const AUDIO_COOLDOWN: f64 = 0.4;

/// Seconds the rim flash lasts after a tap.
pub const FLASH_DURATION: f32 = 0.2;

/// Seconds of the indicator's rim flash after a wrong answer.
pub const INDICATOR_ERROR_FLASH: f32 = 0.15;

/// Seconds for the label to fade out before it swaps faces.
pub const TEXT_FADE_DURATION: f32 = 0.15;

/// Rate (per second) at which a shrunken label grows back to full size.
pub const TEXT_SCALE_EASE_RATE: f32 = 5.0;

/// How far past the exit edge (normalized) a bubble may travel before it is
/// retired, so it never disappears while still partly visible.
pub const EXIT_MARGIN: f32 = 0.05;

/// Which face the indicator shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum IndicatorMode {
    #[default]
    Romaji,
    /// First script, e.g. hiragana.
    VariantA,
    /// Second script, e.g. katakana.
    VariantB,
}

impl IndicatorMode {
    pub fn next(self) -> Self {
        match self {
            IndicatorMode::Romaji => IndicatorMode::VariantA,
            IndicatorMode::VariantA => IndicatorMode::VariantB,
            IndicatorMode::VariantB => IndicatorMode::Romaji,
        }
    }
}

/// Movement and tap behaviour.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub enum BubbleKind {
    /// Drifts toward the exit edge; taps are rate-limited and cross-fade the label.
    Roaming,
    /// Pinned in place; every tap cycles the face instantly.
    Indicator {
        mode: IndicatorMode,
        /// Glyphs for [`IndicatorMode::VariantA`] and [`IndicatorMode::VariantB`].
        variants: [String; 2],
    },
}

/// Colour of the rim flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum FlashTint {
    #[default]
    Tap,
    Error,
}

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct Bubble {
    pub x: f32,
    pub y: f32,
    /// Radius in CSS pixels.
    pub r: f32,
    /// Canvas heights per second, always non-negative; direction is separate.
    pub speed: f32,
    pub direction: TravelDirection,
    pub color: Color,
    pub glyph: String,
    pub romaji: String,
    pub showing_romaji: bool,
    pub kind: BubbleKind,
    active: bool,
    spring: TapSpring,
    text_scale: f32,
    text_opacity: f32,
    /// Seconds left in the label fade, `None` when no fade is running.
    text_transition: Option<f32>,
    flash_timer: f32,
    flash_tint: FlashTint,
    last_spoken: Option<f64>,
}

impl Bubble {
    pub fn new(
        x: f32,
        y: f32,
        color: Color,
        glyph: impl Into<String>,
        romaji: impl Into<String>,
        radius: f32,
    ) -> Self {
        Self {
            x,
            y,
            r: radius,
            speed: BUBBLE_SPEED,
            direction: TravelDirection::default(),
            color,
            glyph: glyph.into(),
            romaji: romaji.into(),
            showing_romaji: false,
            kind: BubbleKind::Roaming,
            active: true,
            spring: TapSpring::default(),
            text_scale: 1.0,
            text_opacity: 1.0,
            text_transition: None,
            flash_timer: 0.0,
            flash_tint: FlashTint::Tap,
            last_spoken: None,
        }
    }

    /// Stationary target bubble. It opens on its romaji face; `variants` are
    /// the glyphs for the two script faces it cycles through.
    pub fn indicator(
        x: f32,
        y: f32,
        color: Color,
        romaji: impl Into<String>,
        variants: [String; 2],
        radius: f32,
    ) -> Self {
        let glyph = variants[0].clone();
        Self {
            speed: 0.0,
            showing_romaji: true,
            kind: BubbleKind::Indicator {
                mode: IndicatorMode::Romaji,
                variants,
            },
            ..Self::new(x, y, color, glyph, romaji, radius)
        }
    }

    pub fn with_direction(mut self, direction: TravelDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_indicator(&self) -> bool {
        matches!(self.kind, BubbleKind::Indicator { .. })
    }

    /// Retire the bubble; it is culled on the next manager pass.
    pub fn pop(&mut self) {
        self.active = false;
    }

    /// Render scale from the tap spring (1 at rest).
    pub fn scale(&self) -> f32 {
        self.spring.scale()
    }

    /// Rim flash strength in `[0, 1]`.
    pub fn flash_alpha(&self) -> f32 {
        if self.flash_timer > 0.0 {
            (self.flash_timer / FLASH_DURATION).min(1.0)
        } else {
            0.0
        }
    }

    pub fn flash_tint(&self) -> FlashTint {
        self.flash_tint
    }

    pub fn current_text_opacity(&self) -> f32 {
        self.text_opacity
    }

    pub fn current_text_scale(&self) -> f32 {
        self.text_scale
    }

    /// The label currently on display.
    pub fn label(&self) -> &str {
        if self.showing_romaji {
            &self.romaji
        } else {
            &self.glyph
        }
    }

    /// React to a tap at `now` seconds. Peripheral requests go to `cues`.
    ///
    /// Roaming bubbles ignore taps closer than [`AUDIO_COOLDOWN`] to the last
    /// registered one and return `false` for them. Indicators always respond.
    pub fn handle_click(&mut self, now: f64, cues: &mut CueQueue) -> bool {
        if self.is_indicator() {
            self.cycle_indicator(cues);
            return true;
        }

        if let Some(last) = self.last_spoken
            && now - last < AUDIO_COOLDOWN
        {
            return false;
        }
        self.last_spoken = Some(now);

        cues.push(GameCue::Haptic(HapticPattern::Pop));
        self.trigger_tap_animation();
        self.start_text_transition();
        cues.push(GameCue::PlayRoman {
            roman: self.romaji.clone(),
        });
        self.flash(FLASH_DURATION, FlashTint::Tap);
        true
    }

    fn cycle_indicator(&mut self, cues: &mut CueQueue) {
        let BubbleKind::Indicator { mode, variants } = &mut self.kind else {
            return;
        };
        *mode = mode.next();
        let glyph = match *mode {
            IndicatorMode::Romaji => None,
            IndicatorMode::VariantA => Some(variants[0].clone()),
            IndicatorMode::VariantB => Some(variants[1].clone()),
        };

        cues.push(GameCue::Haptic(HapticPattern::Pop));
        self.trigger_tap_animation();
        self.showing_romaji = glyph.is_none();
        if let Some(glyph) = glyph {
            self.glyph = glyph;
        }
        cues.push(GameCue::PlayRoman {
            roman: self.romaji.clone(),
        });
        self.flash(FLASH_DURATION, FlashTint::Tap);
    }

    /// Restart the tap spring and shrink the label as an immediate cue.
    pub fn trigger_tap_animation(&mut self) {
        self.spring.trigger();
        self.text_scale = BUBBLE_SQUASH_SCALE;
    }

    /// Fade the label out; it swaps faces when the fade completes.
    pub fn start_text_transition(&mut self) {
        self.text_transition = Some(TEXT_FADE_DURATION);
        self.text_opacity = 0.0;
    }

    /// Flash the rim for `duration` seconds.
    pub fn flash(&mut self, duration: f32, tint: FlashTint) {
        self.flash_timer = duration.max(0.0);
        self.flash_tint = tint;
    }

    /// Advance motion and every animation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        if self.active && !self.is_indicator() {
            self.y += self.speed * dt * self.direction.sign();
            if self.direction.has_exited(self.y, EXIT_MARGIN) {
                self.active = false;
            }
        }

        self.spring.step(dt);

        self.flash_timer = (self.flash_timer - dt).max(0.0);

        match self.text_transition {
            Some(remaining) => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.showing_romaji = !self.showing_romaji;
                    self.text_transition = None;
                    self.text_opacity = 1.0;
                    self.text_scale = 1.0;
                } else {
                    self.text_transition = Some(remaining);
                    self.text_opacity = (remaining / TEXT_FADE_DURATION).clamp(0.0, 1.0);
                }
            }
            None if self.text_scale < 1.0 => {
                self.text_scale = (self.text_scale + TEXT_SCALE_EASE_RATE * dt).min(1.0);
            }
            None => {}
        }
    }

    /// Whether the CSS-pixel point lies inside the bubble on a `css_w` x
    /// `css_h` canvas. The hit radius follows the spring scale.
    pub fn contains(&self, px: f32, py: f32, css_w: f32, css_h: f32) -> bool {
        if !self.active {
            return false;
        }
        let dx = px - self.x * css_w;
        let dy = py - self.y * css_h;
        let hit_r = self.r * self.scale();
        dx * dx + dy * dy <= hit_r * hit_r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::spring::BUBBLE_STRETCH_SCALE;
    use approx::assert_relative_eq;

    fn bubble() -> Bubble {
        Bubble::new(0.5, 1.0, Color::WHITE, "あ", "a", 20.0)
    }

    fn mode(b: &Bubble) -> Option<IndicatorMode> {
        match &b.kind {
            BubbleKind::Indicator { mode, .. } => Some(*mode),
            BubbleKind::Roaming => None,
        }
    }

    fn indicator() -> Bubble {
        Bubble::indicator(
            0.5,
            0.12,
            Color::WHITE,
            "a",
            ["あ".to_string(), "ア".to_string()],
            40.0,
        )
    }

    #[test]
    fn rises_then_leaves() {
        let mut b = bubble();
        b.step(1.0);
        assert_relative_eq!(b.y, 0.8, epsilon = 1e-6);
        assert!(b.is_active());
        b.step(5.0);
        assert!(!b.is_active());
    }

    #[test]
    fn retires_only_past_the_margin() {
        let mut b = Bubble::new(0.5, 0.0, Color::WHITE, "あ", "a", 20.0);
        b.step(0.2);
        assert!(b.is_active(), "y = {}", b.y);
        b.step(0.1);
        assert!(!b.is_active(), "y = {}", b.y);
    }

    #[test]
    fn falling_bubbles_exit_at_the_bottom() {
        let mut b = Bubble::new(0.5, 0.0, Color::WHITE, "あ", "a", 20.0)
            .with_direction(TravelDirection::Down);
        b.step(1.0);
        assert_relative_eq!(b.y, 0.2, epsilon = 1e-6);
        b.step(5.0);
        assert!(!b.is_active());
    }

    #[test]
    fn deactivation_is_permanent() {
        let mut b = bubble();
        b.pop();
        for _ in 0..10 {
            b.step(0.1);
            assert!(!b.is_active());
        }
        let mut cues = CueQueue::default();
        b.handle_click(10.0, &mut cues);
        assert!(!b.is_active());
    }

    #[test]
    fn hit_test_is_circular() {
        let b = Bubble::new(0.5, 0.5, Color::WHITE, "あ", "a", 20.0);
        assert!(b.contains(50.0, 50.0, 100.0, 100.0));
        assert!(b.contains(48.0, 48.0, 100.0, 100.0));
        assert!(b.contains(70.0, 50.0, 100.0, 100.0));
        assert!(!b.contains(0.0, 0.0, 100.0, 100.0));
        assert!(!b.contains(66.0, 66.0, 100.0, 100.0));
    }

    #[test]
    fn hit_radius_follows_spring() {
        let mut b = Bubble::new(0.5, 0.5, Color::WHITE, "あ", "a", 20.0);
        b.speed = 0.0;
        assert!(b.contains(69.0, 50.0, 100.0, 100.0));
        b.trigger_tap_animation();
        b.step(0.079);
        assert!(b.scale() < 0.95);
        assert!(!b.contains(69.0, 50.0, 100.0, 100.0));
    }

    #[test]
    fn popped_bubbles_are_not_hit() {
        let mut b = Bubble::new(0.5, 0.5, Color::WHITE, "あ", "a", 20.0);
        b.pop();
        assert!(!b.contains(50.0, 50.0, 100.0, 100.0));
    }

    #[test]
    fn cooldown_blocks_rapid_taps() {
        let mut b = bubble();
        let mut cues = CueQueue::default();
        assert!(b.handle_click(0.0, &mut cues));
        assert_eq!(b.last_spoken, Some(0.0));

        assert!(!b.handle_click(0.1, &mut cues));
        assert_eq!(b.last_spoken, Some(0.0));

        assert!(b.handle_click(0.5, &mut cues));
        assert_eq!(b.last_spoken, Some(0.5));
    }

    #[test]
    fn tap_requests_haptics_and_audio() {
        let mut b = bubble();
        let mut cues = CueQueue::default();
        b.handle_click(1.0, &mut cues);
        assert_eq!(
            cues.drain().collect::<Vec<_>>(),
            vec![
                GameCue::Haptic(HapticPattern::Pop),
                GameCue::PlayRoman { roman: "a".into() }
            ]
        );
        assert_eq!(b.flash_alpha(), 1.0);
        let mut squashing = TapSpring::default();
        squashing.trigger();
        assert_eq!(b.spring, squashing);
    }

    #[test]
    fn ignored_tap_raises_no_cues() {
        let mut b = bubble();
        let mut cues = CueQueue::default();
        b.handle_click(1.0, &mut cues);
        let _ = cues.drain().count();
        b.handle_click(1.2, &mut cues);
        assert!(cues.is_empty());
    }

    #[test]
    fn label_fades_out_then_swaps() {
        let mut b = bubble();
        b.speed = 0.0;
        let mut cues = CueQueue::default();
        b.handle_click(0.0, &mut cues);
        assert_eq!(b.current_text_opacity(), 0.0);
        assert_relative_eq!(b.current_text_scale(), BUBBLE_SQUASH_SCALE);
        assert_eq!(b.label(), "あ");

        b.step(TEXT_FADE_DURATION * 0.5);
        assert!(b.text_transition.is_some());
        assert_relative_eq!(b.current_text_opacity(), 0.5, epsilon = 1e-5);

        b.step(TEXT_FADE_DURATION);
        assert!(b.text_transition.is_none());
        assert!(b.showing_romaji);
        assert_eq!(b.label(), "a");
        assert_eq!(b.current_text_opacity(), 1.0);
        assert_eq!(b.current_text_scale(), 1.0);
    }

    #[test]
    fn text_opacity_stays_in_unit_range() {
        let mut b = bubble();
        let mut cues = CueQueue::default();
        b.handle_click(0.0, &mut cues);
        for _ in 0..40 {
            b.step(0.013);
            let o = b.current_text_opacity();
            assert!((0.0..=1.0).contains(&o));
        }
    }

    #[test]
    fn shrunken_label_eases_back() {
        let mut b = bubble();
        b.trigger_tap_animation();
        b.step(0.01);
        assert!(b.current_text_scale() < 1.0);
        b.step(1.0);
        assert_eq!(b.current_text_scale(), 1.0);
    }

    #[test]
    fn flash_decays_to_zero() {
        let mut b = bubble();
        b.flash(FLASH_DURATION, FlashTint::Tap);
        b.step(FLASH_DURATION / 2.0);
        assert_relative_eq!(b.flash_alpha(), 0.5, epsilon = 1e-5);
        b.step(1.0);
        assert_eq!(b.flash_alpha(), 0.0);
    }

    #[test]
    fn spring_bounds_hold_through_bubble_steps() {
        let mut b = bubble();
        let mut cues = CueQueue::default();
        b.handle_click(0.0, &mut cues);
        for dt in [0.01, 0.25, 0.016, 0.25, 0.001] {
            b.step(dt);
            assert!(b.scale() >= BUBBLE_SQUASH_SCALE && b.scale() <= BUBBLE_STRETCH_SCALE);
        }
        assert_eq!(b.scale(), 1.0);
    }

    #[test]
    fn indicator_never_moves() {
        let mut ind = indicator();
        ind.speed = 0.7;
        let y = ind.y;
        for dt in [0.016, 0.25, 3.0, 100.0] {
            ind.step(dt);
            assert_eq!(ind.y, y);
            assert!(ind.is_active());
        }
    }

    #[test]
    fn indicator_cycles_faces_without_cooldown() {
        let mut ind = indicator();
        let mut cues = CueQueue::default();
        assert_eq!(ind.label(), "a");

        assert!(ind.handle_click(0.0, &mut cues));
        assert_eq!(mode(&ind), Some(IndicatorMode::VariantA));
        assert_eq!(ind.label(), "あ");

        assert!(ind.handle_click(0.01, &mut cues));
        assert_eq!(mode(&ind), Some(IndicatorMode::VariantB));
        assert_eq!(ind.label(), "ア");

        assert!(ind.handle_click(0.02, &mut cues));
        assert_eq!(mode(&ind), Some(IndicatorMode::Romaji));
        assert_eq!(ind.label(), "a");

        assert!(ind.text_transition.is_none());
        assert_eq!(ind.last_spoken, None);
        assert!(cues.drain().any(|c| c == GameCue::PlayRoman { roman: "a".into() }));
    }

    #[test]
    fn indicator_swap_is_instant() {
        let mut ind = indicator();
        let mut cues = CueQueue::default();
        ind.handle_click(0.0, &mut cues);
        assert_eq!(ind.current_text_opacity(), 1.0);
        ind.step(1.0);
        assert_eq!(ind.label(), "あ");
    }
}
