//! Tap "spring": the squash, stretch, settle pulse a bubble plays when tapped.
//!
//! `None -> Squash -> Stretch -> Settle -> None`. Each phase eases the render
//! scale between two fixed values with an ease-out quadratic curve, so the
//! scale never leaves `[BUBBLE_SQUASH_SCALE, BUBBLE_STRETCH_SCALE]` and lands on
//! exactly `1.0` once idle.

use bevy::prelude::*;

/// Seconds spent shrinking.
pub const BUBBLE_SQUASH_TIME: f32 = 0.08;
/// Seconds spent overshooting.
pub const BUBBLE_STRETCH_TIME: f32 = 0.1;
/// Seconds spent returning to rest.
pub const BUBBLE_SETTLE_TIME: f32 = 0.14;
/// Smallest scale, reached at the end of the squash.
pub const BUBBLE_SQUASH_SCALE: f32 = 0.85;
/// Largest scale, reached at the end of the stretch.
pub const BUBBLE_STRETCH_SCALE: f32 = 1.2;

/// `t < 1 ? 1 - (1 - t)^2 : 1`
pub fn ease_out_quad(t: f32) -> f32 {
    if t < 1.0 {
        let inv = 1.0 - t;
        1.0 - inv * inv
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum SpringPhase {
    #[default]
    None,
    Squash,
    Stretch,
    Settle,
}

/// One edge of the transition table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringEdge {
    pub duration: f32,
    pub from: f32,
    pub to: f32,
    pub next: SpringPhase,
}

impl SpringPhase {
    /// Timing and scale range of this phase; `None` for the idle phase.
    pub fn edge(self) -> Option<SpringEdge> {
        match self {
            SpringPhase::None => None,
            SpringPhase::Squash => Some(SpringEdge {
                duration: BUBBLE_SQUASH_TIME,
                from: 1.0,
                to: BUBBLE_SQUASH_SCALE,
                next: SpringPhase::Stretch,
            }),
            SpringPhase::Stretch => Some(SpringEdge {
                duration: BUBBLE_STRETCH_TIME,
                from: BUBBLE_SQUASH_SCALE,
                to: BUBBLE_STRETCH_SCALE,
                next: SpringPhase::Settle,
            }),
            SpringPhase::Settle => Some(SpringEdge {
                duration: BUBBLE_SETTLE_TIME,
                from: BUBBLE_STRETCH_SCALE,
                to: 1.0,
                next: SpringPhase::None,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct TapSpring {
    phase: SpringPhase,
    elapsed: f32,
    scale: f32,
}

impl Default for TapSpring {
    fn default() -> Self {
        Self {
            phase: SpringPhase::None,
            elapsed: 0.0,
            scale: 1.0,
        }
    }
}

impl TapSpring {
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Start (or restart) the pulse from rest. A tap mid-cycle discards the
    /// remaining phases.
    pub fn trigger(&mut self) {
        self.phase = SpringPhase::Squash;
        self.elapsed = 0.0;
        self.scale = 1.0;
    }

    /// Advance by `dt` seconds. Time left over at the end of a phase carries
    /// into the next one, so one long frame may cross several phases.
    pub fn step(&mut self, dt: f32) {
        let mut remaining = dt.max(0.0);
        while let Some(edge) = self.phase.edge() {
            self.elapsed += remaining;
            if self.elapsed < edge.duration {
                let t = ease_out_quad(self.elapsed / edge.duration);
                let (lo, hi) = (edge.from.min(edge.to), edge.from.max(edge.to));
                self.scale = (edge.from + (edge.to - edge.from) * t).clamp(lo, hi);
                return;
            }
            remaining = self.elapsed - edge.duration;
            self.phase = edge.next;
            self.elapsed = 0.0;
            self.scale = edge.to;
        }
        self.scale = 1.0;
    }
}
