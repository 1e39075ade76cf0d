//! Floating romaji that rises out of a correctly popped bubble.

use bevy::prelude::*;

/// Seconds a label stays on screen.
pub const LABEL_LIFETIME: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct FloatingLabel {
    /// Normalized position, like bubbles.
    pub x: f32,
    pub y: f32,
    pub text: String,
    /// Canvas heights per second, upward.
    pub speed: f32,
    ttl: f32,
}

impl FloatingLabel {
    pub fn new(x: f32, y: f32, text: impl Into<String>, speed: f32) -> Self {
        Self {
            x,
            y,
            text: text.into(),
            speed: speed.abs(),
            ttl: LABEL_LIFETIME,
        }
    }

    pub fn step(&mut self, dt: f32) {
        self.y -= self.speed * dt;
        self.ttl = (self.ttl - dt).max(0.0);
    }

    pub fn is_alive(&self) -> bool {
        self.ttl > 0.0
    }

    /// Linear fade from 1 to 0 over the lifetime.
    pub fn alpha(&self) -> f32 {
        (self.ttl / LABEL_LIFETIME).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rises_and_fades_out() {
        let mut label = FloatingLabel::new(0.5, 0.5, "ka", 0.2);
        label.step(0.5);
        assert_relative_eq!(label.y, 0.4);
        assert_relative_eq!(label.alpha(), 0.5);
        assert!(label.is_alive());
        label.step(0.6);
        assert!(!label.is_alive());
        assert_eq!(label.alpha(), 0.0);
    }
}
